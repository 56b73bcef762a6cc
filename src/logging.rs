//! Tracing setup driven by `Config`: stdout always, plus a daily-rolled
//! file when a log directory is configured. The returned guard must be held
//! for the process lifetime or buffered file lines are lost on shutdown.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "tutor-backend.log";

pub struct LogGuard {
    _file_writer: Option<WorkerGuard>,
}

pub fn init_tracing(config: &Config) -> LogGuard {
    let (file_layer, guard) = match config.log_dir.as_deref() {
        Some(dir) => match file_writer(dir) {
            Some((writer, guard)) => {
                let layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.log_level))
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    LogGuard {
        _file_writer: guard,
    }
}

fn file_writer(dir: &Path) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Err(err) = std::fs::create_dir_all(dir) {
        eprintln!("cannot create log directory {}: {err}", dir.display());
        return None;
    }
    Some(tracing_appender::non_blocking(rolling::daily(
        dir,
        LOG_FILE_PREFIX,
    )))
}

/// Unparseable directives fall back to `info` instead of silencing output.
fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_directives_fall_back_to_info() {
        let filter = env_filter("not a [valid] directive!!");
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn valid_directives_are_kept() {
        let filter = env_filter("debug");
        assert_eq!(filter.to_string(), "debug");
    }
}
