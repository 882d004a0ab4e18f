use crate::cli::TracingFormat;
use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Configure and initialize logging for the application.
///
/// The teacher's custom pretty/JSON event formatters aren't part of this
/// crate, so this uses `tracing_subscriber`'s stock formatters, selected
/// the same way: by CLI flag, with the level coming from config (or
/// `RUST_LOG` if set).
pub fn setup_logging(config: &Config, tracing_format: TracingFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let base_level = &config.log_level;
        EnvFilter::new(format!("warn,course_reg={base_level}"))
    });

    let builder = tracing_subscriber::fmt().with_target(true).with_env_filter(filter);

    match tracing_format {
        TracingFormat::Pretty => builder.pretty().init(),
        TracingFormat::Json => builder.json().init(),
    }
}
