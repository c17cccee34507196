//! Tracing setup for the tape tools

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or blank.
pub const DEFAULT_FILTER: &str = "info";

/// Directives from `rust_log` when present and parseable, otherwise
/// `default_filter`.
pub fn env_filter(rust_log: Option<&str>, default_filter: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter))
}

/// Install the global subscriber, logging to stderr.
pub fn init_tracing(default_filter: &str) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref(), default_filter))
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_overrides_default_level() {
        assert_eq!(env_filter(Some("debug"), DEFAULT_FILTER).to_string(), "debug");
        let targeted = env_filter(Some("simulation=trace"), DEFAULT_FILTER).to_string();
        assert!(targeted.contains("simulation=trace"));
        assert!(!targeted.contains("info"));
    }

    #[test]
    fn test_default_when_unset_or_blank() {
        assert_eq!(env_filter(None, DEFAULT_FILTER).to_string(), "info");
        assert_eq!(env_filter(Some("  "), DEFAULT_FILTER).to_string(), "info");
    }
}
