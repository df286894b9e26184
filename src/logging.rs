//! `tracing` subscriber setup

use tracing_subscriber::EnvFilter;

use crate::{LinkError, Result};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (for example
/// [`LinkConfig::log_filter`](crate::LinkConfig::log_filter)) is used.
/// Fails if a global subscriber is already installed.
pub fn init(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| LinkError::config_error("log_filter", e.to_string()))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| LinkError::config_error("logging", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails_cleanly() {
        // Other tests may have installed a subscriber already; either way the
        // second call in this test must fail without panicking.
        let _ = init("debug");
        assert!(matches!(init("debug"), Err(LinkError::Config { .. })));
    }
}
