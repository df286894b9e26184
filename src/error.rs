//! Error types for the link core and its runtime plumbing.
//!
//! The reassembler and the stick encoder never fail: lossy video fragments are
//! dropped silently and the encoder is total over its input. Everything in this
//! module therefore originates at the edges of the crate, where raw datagrams
//! are parsed, transports are driven, and configuration is loaded.
//!
//! ## Error Categories
//!
//! - **Transport Errors**: inbound or outbound collaborator failures
//! - **Datagram Errors**: raw video datagrams too short to carry a header
//! - **Config Errors**: invalid or unparsable link configuration
//! - **I/O Errors**: configuration files that cannot be read
//! - **Channel Errors**: a task on the other end of a channel went away
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use rotorlink::LinkError;
//!
//! let error = LinkError::transport_failed("socket reset by peer");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for link operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Main error type for link operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Transport failure: {reason}")]
    Transport {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Malformed video datagram ({len} bytes): {details}")]
    Datagram { len: usize, details: String },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Config file error: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Channel closed: {channel}")]
    ChannelClosed { channel: String },
}

impl LinkError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinkError::Transport { .. } => true,
            LinkError::Timeout { .. } => true,
            LinkError::Datagram { .. } => false,
            LinkError::Config { .. } => false,
            LinkError::Io { .. } => false,
            LinkError::ChannelClosed { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LinkError::Transport { .. } => vec![
                "Check that the drone's access point is still joined",
                "Verify the video and command ports are not blocked",
                "Let the transport layer reconnect and resume",
            ],
            LinkError::Datagram { .. } => vec![
                "Confirm the transport strips only the outer packet header",
                "Check that video datagrams are routed to the video port",
            ],
            LinkError::Config { .. } => vec![
                "Check the configuration values against their documented ranges",
                "Remove unknown keys from the configuration file",
            ],
            LinkError::Io { .. } => vec![
                "Check the configuration file exists and is readable",
                "Check file permissions",
            ],
            LinkError::Timeout { .. } => vec![
                "Increase the first-frame timeout",
                "Verify the drone is streaming video",
            ],
            LinkError::ChannelClosed { .. } => vec![
                "Keep the owning handle alive while the link is in use",
                "Restart the link",
            ],
        }
    }

    /// Helper constructor for transport errors.
    pub fn transport_failed(reason: impl Into<String>) -> Self {
        LinkError::Transport { reason: reason.into(), source: None }
    }

    /// Helper constructor for transport errors with source.
    pub fn transport_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        LinkError::Transport { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for datagrams missing the two-byte video header.
    pub fn datagram_too_short(len: usize) -> Self {
        LinkError::Datagram {
            len,
            details: "expected a sequence byte and a fragment-index byte".to_string(),
        }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        LinkError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        LinkError::Io { path, source }
    }

    /// Helper constructor for closed channels.
    pub fn channel_closed(channel: impl Into<String>) -> Self {
        LinkError::ChannelClosed { channel: channel.into() }
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        LinkError::Io { path: PathBuf::from("<unknown>"), source: err }
    }
}

impl From<serde_yaml_ng::Error> for LinkError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        LinkError::Config { context: "YAML".to_string(), details: err.to_string() }
    }
}
