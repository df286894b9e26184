//! Link configuration
//!
//! Loaded from YAML; every key is optional and falls back to its default.
//!
//! ```yaml
//! control_rate_hz: 20.0
//! video_rate: !Max 30
//! max_transport_errors: 10
//! first_frame_timeout_ms: 5000
//! log_filter: "rotorlink=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::types::UpdateRate;
use crate::{LinkError, Result};

/// Slowest accepted control rate
pub const MIN_CONTROL_RATE_HZ: f64 = 0.001;

/// Fastest accepted control rate
pub const MAX_CONTROL_RATE_HZ: f64 = 1000.0;

/// Runtime settings for the video and control tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Control ticks per second
    pub control_rate_hz: f64,

    /// Default delivery rate for frame subscriptions
    pub video_rate: UpdateRate,

    /// Consecutive inbound transport errors before the video task gives up
    pub max_transport_errors: u32,

    /// How long opening a video link waits for the first frame; 0 skips the wait
    pub first_frame_timeout_ms: u64,

    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            control_rate_hz: 20.0,
            video_rate: UpdateRate::Native,
            max_transport_errors: 10,
            first_frame_timeout_ms: 5000,
            log_filter: "info".to_string(),
        }
    }
}

impl LinkConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| LinkError::file_error(path.to_path_buf(), e))?;
        debug!("Loaded link config from {}", path.display());
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_CONTROL_RATE_HZ..=MAX_CONTROL_RATE_HZ).contains(&self.control_rate_hz) {
            return Err(LinkError::config_error(
                "control_rate_hz",
                format!(
                    "must be between {MIN_CONTROL_RATE_HZ} and {MAX_CONTROL_RATE_HZ} Hz, got {}",
                    self.control_rate_hz
                ),
            ));
        }
        if self.max_transport_errors == 0 {
            return Err(LinkError::config_error("max_transport_errors", "must be at least 1"));
        }
        Ok(())
    }

    /// Period between control ticks.
    ///
    /// Out-of-range rates are pulled into the accepted range and NaN falls
    /// back to the default, so the result is always a usable non-zero period.
    pub fn control_interval(&self) -> Duration {
        let rate = if self.control_rate_hz.is_nan() {
            Self::default().control_rate_hz
        } else {
            self.control_rate_hz.clamp(MIN_CONTROL_RATE_HZ, MAX_CONTROL_RATE_HZ)
        };
        Duration::from_secs_f64(1.0 / rate)
    }

    pub fn first_frame_timeout(&self) -> Option<Duration> {
        match self.first_frame_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result, ensure};

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let config = LinkConfig::default();
        config.validate().context("default config should validate")?;
        ensure!(config.control_interval() == Duration::from_millis(50));
        ensure!(config.first_frame_timeout() == Some(Duration::from_secs(5)));
        Ok(())
    }

    #[test]
    fn partial_yaml_falls_back_to_defaults() -> Result<()> {
        let config = LinkConfig::from_yaml_str("control_rate_hz: 50.0\nvideo_rate: !Max 15\n")?;
        ensure!(config.control_rate_hz == 50.0);
        ensure!(config.video_rate == UpdateRate::Max(15));
        ensure!(config.max_transport_errors == 10);
        ensure!(config.log_filter == "info");
        Ok(())
    }

    #[test]
    fn empty_document_is_default() -> Result<()> {
        let config = LinkConfig::from_yaml_str("{}")?;
        ensure!(config == LinkConfig::default());
        Ok(())
    }

    #[test]
    fn zero_timeout_disables_wait() {
        let config = LinkConfig { first_frame_timeout_ms: 0, ..LinkConfig::default() };
        assert_eq!(config.first_frame_timeout(), None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for yaml in ["control_rate_hz: 0.0", "control_rate_hz: -5.0", "control_rate_hz: .nan"] {
            let err = LinkConfig::from_yaml_str(yaml).expect_err(yaml);
            assert!(matches!(err, LinkError::Config { ref context, .. } if context == "control_rate_hz"));
        }

        let err = LinkConfig::from_yaml_str("max_transport_errors: 0").expect_err("zero budget");
        assert!(matches!(err, LinkError::Config { .. }));
    }

    #[test]
    fn extreme_control_rates_are_rejected() {
        for rate in [1e-300, 0.0005, 1000.5, 1e12, f64::INFINITY] {
            let config = LinkConfig { control_rate_hz: rate, ..LinkConfig::default() };
            let err = config.validate().expect_err("rate outside accepted range");
            assert!(matches!(err, LinkError::Config { ref context, .. } if context == "control_rate_hz"));
        }

        for rate in [MIN_CONTROL_RATE_HZ, MAX_CONTROL_RATE_HZ] {
            let config = LinkConfig { control_rate_hz: rate, ..LinkConfig::default() };
            assert!(config.validate().is_ok(), "{rate} Hz is accepted");
        }
    }

    #[test]
    fn control_interval_is_total() {
        let interval = |rate: f64| LinkConfig { control_rate_hz: rate, ..LinkConfig::default() }.control_interval();

        assert_eq!(interval(1e-300), Duration::from_secs(1000));
        assert_eq!(interval(1e12), Duration::from_millis(1));
        assert_eq!(interval(f64::INFINITY), Duration::from_millis(1));
        assert_eq!(interval(-3.0), Duration::from_secs(1000));
        assert_eq!(interval(f64::NAN), Duration::from_millis(50));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = LinkConfig::from_yaml_str("control_hz: 10").expect_err("typo in key");
        assert!(matches!(err, LinkError::Config { ref context, .. } if context == "YAML"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = LinkConfig::from_file("/definitely/not/here.yaml").expect_err("missing file");
        match err {
            LinkError::Io { path, .. } => assert!(path.ends_with("here.yaml")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn yaml_round_trip() -> Result<()> {
        let config = LinkConfig { video_rate: UpdateRate::Max(24), ..LinkConfig::default() };
        let yaml = serde_yaml_ng::to_string(&config)?;
        ensure!(LinkConfig::from_yaml_str(&yaml)? == config, "round trip changed config: {yaml}");
        Ok(())
    }
}
