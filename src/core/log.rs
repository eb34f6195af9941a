use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Only this crate's events pass; dependencies such as reqwest stay quiet.
fn crate_targets(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::OFF
    };
    Targets::new().with_target(CRATE_TARGET, level)
}

/// `RUST_LOG` wins when set and parseable.
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "off" }))
}

/// Installs the global subscriber, writing pretty events to stderr so that
/// tables and CSV on stdout stay clean.
pub fn init_logging(verbose: bool) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(crate_targets(verbose))
        .with(env_filter(verbose))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_verbose_enables_crate_debug_only() {
        let targets = crate_targets(true);
        assert!(targets.would_enable("covecon::providers::pomber", &Level::DEBUG));
        assert!(!targets.would_enable("covecon::core", &Level::TRACE));
        assert!(!targets.would_enable("reqwest::connect", &Level::DEBUG));
    }

    #[test]
    fn test_quiet_disables_crate_events() {
        let targets = crate_targets(false);
        assert!(!targets.would_enable("covecon::core::fallback", &Level::ERROR));
    }
}
