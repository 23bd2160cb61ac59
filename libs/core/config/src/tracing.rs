use crate::{env_optional, Environment};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in the main() before any fallible operations to ensure
/// colored error output. Safe to call multiple times.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Initialize tracing with environment-aware configuration.
///
/// - **Production** (`APP_ENV=production`): JSON format for log aggregation,
///   module targets hidden.
/// - **Development** (default): pretty-printed, human-readable.
///
/// When `LOG_DIR` is set, events are additionally appended to a daily-rolled
/// plain-text log file under that directory through a non-blocking writer.
/// The returned guard must be held for the lifetime of the process so the
/// writer thread flushes on shutdown; `None` when no file log is configured.
///
/// Environment variables:
/// - `APP_ENV`: "production" for JSON logs (default: "development")
/// - `RUST_LOG`: override log levels (e.g. "debug", "wechat_mcp=trace")
/// - `LOG_DIR`: directory for the append-only event log (optional)
///
/// Safe to call multiple times: if tracing is already initialized the call
/// silently continues (common in tests).
pub fn init_tracing(environment: &Environment) -> Option<WorkerGuard> {
    let is_production = environment.is_production();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("debug")
        }
    });

    let (file_layer, guard) = match env_optional("LOG_DIR") {
        Some(dir) => {
            // The appender expects the directory to exist.
            let _ = std::fs::create_dir_all(&dir);
            let appender = tracing_appender::rolling::daily(dir, "wechat-mcp.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let result = if is_production {
        // Production: JSON format for log aggregation
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(file_layer)
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        // Development: pretty format for readability
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(file_layer)
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => {
            info!(
                "Tracing initialized. Environment: {:?}",
                environment
            );
        }
        Err(_) => {
            // Tracing already initialized, which is fine (common in tests)
            debug!("Tracing already initialized, skipping re-initialization");
        }
    }

    guard
}
