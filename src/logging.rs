//! Structured logging setup
//!
//! The library only emits `tracing` events; the command-line host installs
//! the subscriber. The filter comes from `CURLGENIE_LOG` when it is set.

use crate::cli::LogFormat;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "CURLGENIE_LOG";

/// Install the global subscriber, writing to stderr
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(format: LogFormat, debug: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug);

    let _ = match format {
        LogFormat::Text => builder.without_time().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "curlgenie=debug"
    } else {
        "error"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "error");
        assert_eq!(default_directive(true), "curlgenie=debug");
    }

    #[test]
    fn test_init_twice() {
        init(LogFormat::Text, false);
        init(LogFormat::Json, true);
    }
}
