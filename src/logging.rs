//! Diagnostic logging to stderr.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `ROSTER_LOG` is set, or the
/// given directive does not parse.
pub const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive: the flag wins over `ROSTER_LOG`.
#[must_use]
pub fn directive(flag: Option<&str>, env: Option<String>) -> String {
    flag.map(str::to_string).or(env).unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Installs the global subscriber. A second call is a no-op, which keeps
/// in-process callers such as tests from panicking.
pub fn init(flag: Option<&str>) {
    let directive = directive(flag, std::env::var("ROSTER_LOG").ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        assert_eq!(directive(Some("debug"), Some("info".into())), "debug");
        assert_eq!(directive(None, Some("info".into())), "info");
        assert_eq!(directive(None, None), DEFAULT_FILTER);
    }

    #[test]
    fn repeated_init_is_harmless() {
        init(Some("roster=debug"));
        init(Some("not a [valid filter"));
    }
}
