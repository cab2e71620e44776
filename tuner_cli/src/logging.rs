//! Tracing subscriber setup: console layer plus optional rolling file sink.

use std::path::Path;

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::cli::FILE_GUARD;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber.
///
/// Console verbosity comes from `level` unless `RUST_LOG` is set. With
/// `json`, console events are JSON lines; either way they go to stderr so
/// stdout stays free for results. `[logging].file` adds a JSON file sink.
pub fn init_logging(json: bool, level: &str, cfg: &tuner_config::Logging) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| eyre::eyre!("invalid log level {level:?}: {e}"))?;

    let console: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(console_filter)
            .boxed()
    };

    let file_layer = match cfg.file.as_deref() {
        Some(path) => {
            let appender = rolling_appender(Path::new(path), cfg.rotation.as_deref())?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let file_level = cfg.level.as_deref().unwrap_or("info");
            let file_filter = EnvFilter::try_new(file_level)
                .map_err(|e| eyre::eyre!("invalid logging.level {file_level:?}: {e}"))?;
            Some(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_filter(file_filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre::eyre!("failed to initialize logging: {e}"))?;
    Ok(())
}

fn rolling_appender(
    path: &Path,
    rotation: Option<&str>,
) -> eyre::Result<tracing_appender::rolling::RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre::eyre!("logging.file {:?} has no file name", path))?;
    std::fs::create_dir_all(dir)
        .map_err(|e| eyre::eyre!("create log directory {:?}: {}", dir, e))?;
    Ok(match rotation.unwrap_or("never") {
        "daily" => tracing_appender::rolling::daily(dir, file_name),
        "hourly" => tracing_appender::rolling::hourly(dir, file_name),
        _ => tracing_appender::rolling::never(dir, file_name),
    })
}
