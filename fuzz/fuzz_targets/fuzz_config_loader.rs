#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not. A config that
    // validates must also build a tuner.
    if let Ok(cfg) = toml::from_str::<tuner_config::Config>(data)
        && cfg.validate().is_ok()
    {
        let _ = tuner_core::Tuner::from_config(&cfg);
    }
});
