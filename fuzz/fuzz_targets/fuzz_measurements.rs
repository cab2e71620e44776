#![no_main]
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tuner_core::{GainLimits, Gains, Tuner};

#[derive(Debug, Arbitrary)]
struct Input {
    history: u8,
    aggressiveness: f64,
    ticks: Vec<(f64, f64)>,
}

fuzz_target!(|input: Input| {
    let limits = GainLimits::new(0.1, 10.0, 0.0, 5.0, 0.0, 2.0);
    let Ok(mut tuner) = Tuner::builder()
        .with_dt(0.01)
        .with_initial_gains(Gains::new(1.0, 0.5, 0.1))
        .with_limits(limits)
        .start_tuning(true)
        .build()
    else {
        return;
    };
    tuner.set_history_size(usize::from(input.history));
    tuner.set_adaptation_aggressiveness(input.aggressiveness);

    for (setpoint, output) in input.ticks {
        tuner.process_measurement(setpoint, output);
        let g = tuner.adapted_gains();
        assert!(g.is_finite());
        assert!(limits.contains(&g));
    }
});
