//! Boundary traits for the transport collaborators
//!
//! The link core never touches sockets. An inbound transport hands it decoded
//! video fragments in receive order; an outbound transport takes the 6-byte
//! stick payload and owns everything around it (packet header, command id,
//! packet sequence counter, checksum trailer, the send itself).

use tokio::sync::mpsc;

use crate::command::STICK_PAYLOAD_LEN;
use crate::types::Fragment;
use crate::{LinkError, Result};

/// Inbound source of video fragments
#[async_trait::async_trait]
pub trait FragmentSource: Send + 'static {
    /// Get the next fragment in receive order
    ///
    /// Returns:
    /// - `Ok(Some(fragment))` - Fragment received
    /// - `Ok(None)` - Transport closed (normal termination)
    /// - `Err(e)` - Transport error; the caller may keep polling
    async fn next_fragment(&mut self) -> Result<Option<Fragment>>;
}

/// Outbound sink for encoded stick commands
#[async_trait::async_trait]
pub trait CommandSink: Send + 'static {
    /// Frame and transmit one stick payload
    async fn send_stick(&mut self, payload: &[u8; STICK_PAYLOAD_LEN]) -> Result<()>;
}

/// Fragments pushed by a receive loop running elsewhere.
#[async_trait::async_trait]
impl FragmentSource for mpsc::Receiver<Fragment> {
    async fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        Ok(self.recv().await)
    }
}

/// Raw video datagrams (header included) pushed by a receive loop running elsewhere.
///
/// A datagram too short to carry the video header is reported as an error.
#[async_trait::async_trait]
impl FragmentSource for mpsc::Receiver<Vec<u8>> {
    async fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        match self.recv().await {
            Some(datagram) => Fragment::parse(&datagram).map(Some),
            None => Ok(None),
        }
    }
}

/// Payloads forwarded to a framing task running elsewhere.
#[async_trait::async_trait]
impl CommandSink for mpsc::Sender<[u8; STICK_PAYLOAD_LEN]> {
    async fn send_stick(&mut self, payload: &[u8; STICK_PAYLOAD_LEN]) -> Result<()> {
        self.send(*payload).await.map_err(|_| LinkError::channel_closed("stick payloads"))
    }
}
