use tracing_subscriber::EnvFilter;

/// Set to `1` to emit JSON log lines instead of plain text.
pub const JSON_ENV: &str = "MARKSIFT_LOG_JSON";

/// Install the global subscriber. Logs go to stderr since stdout carries
/// the launcher items. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var(JSON_ENV).is_ok_and(|v| v == "1");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(false).try_init()
    };
}
