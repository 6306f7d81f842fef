//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, writing to stderr
///
/// `RUST_LOG` takes precedence over `level`. An unparsable `level` falls back
/// to `warn`. Returns `false` if a subscriber was already installed, which is
/// not an error: `setup` may run more than once per process.
pub fn init(level: &str) -> bool {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init("debug");
        assert!(!init("info"));
    }

    #[test]
    fn test_init_with_garbage_level_does_not_panic() {
        init("this is not a [directive");
    }
}
