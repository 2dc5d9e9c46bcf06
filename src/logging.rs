use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Dependencies chatty at info (sqlx logs every statement)
const QUIET_DEPENDENCIES: &[&str] = &["sqlx", "hyper", "tower"];

/// Install the global subscriber: rolling file output plus colored stdout
/// (text mode) or JSON file output only. `RUST_LOG` overrides `log_level`.
///
/// Keep the returned guard alive for the life of the process, dropping it
/// flushes and stops the background writer.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let file_appender = RollingFileAppender::new(
        rotation(&config.rotation),
        &config.log_dir,
        &config.log_file,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    if config.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}

/// `hourly`, `daily`, anything else never rotates
fn rotation(name: &str) -> Rotation {
    match name {
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

fn filter_directives(level: &str) -> String {
    let mut directives = level.to_string();
    for target in QUIET_DEPENDENCIES {
        directives.push_str(&format!(",{}=warn", target));
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_names() {
        assert_eq!(rotation("hourly"), Rotation::HOURLY);
        assert_eq!(rotation("daily"), Rotation::DAILY);
        assert_eq!(rotation("weekly"), Rotation::NEVER);
    }

    #[test]
    fn test_dependencies_capped_at_warn() {
        assert_eq!(
            filter_directives("debug"),
            "debug,sqlx=warn,hyper=warn,tower=warn"
        );
        assert!(EnvFilter::try_new(filter_directives("info")).is_ok());
    }
}
