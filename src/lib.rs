//! Wire-protocol core for a UDP link to a small camera drone.
//!
//! Two independent paths make up the core:
//!
//! - **Video**: datagram fragments tagged with an 8-bit sequence id and a
//!   7-bit index are reassembled into complete compressed frames, each with a
//!   frame id that keeps increasing across sequence wraps.
//! - **Control**: four stick axes and a fast-mode flag are packed into the
//!   6-byte stick payload the flight firmware expects, once per control tick.
//!
//! Sockets, outer packet framing, checksums and video decoding live outside
//! this crate, behind the [`FragmentSource`] and [`CommandSink`] traits.
//!
//! # Features
//!
//! - **Silent loss handling**: incomplete frames are dropped when superseded,
//!   never reported as errors
//! - **Bit-exact commands**: 11-bit axis fields centered on 1024
//! - **Latest-wins delivery**: slow consumers see the newest frame, not a queue
//!
//! ## Example
//!
//! ```rust,no_run
//! use rotorlink::{
//!     Fragment, LinkConfig, VideoLink,
//!     control::{ControlLoop, stick_channel},
//! };
//! use futures::StreamExt;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> rotorlink::Result<()> {
//!     let config = LinkConfig::default();
//!
//!     // The socket layer pushes raw video datagrams here.
//!     let (datagram_tx, datagram_rx) = mpsc::channel::<Vec<u8>>(256);
//!     let video = VideoLink::open_with(datagram_rx, config.clone()).await?;
//!
//!     // ...and frames outbound stick payloads from here.
//!     let (payload_tx, _payload_rx) = mpsc::channel::<[u8; 6]>(8);
//!     let (sticks, reader) = stick_channel();
//!     let control = ControlLoop::spawn(reader, payload_tx, &config);
//!
//!     sticks.set_throttle(0.3);
//!
//!     let mut frames = Box::pin(video.subscribe());
//!     while let Some(frame) = frames.next().await {
//!         println!("frame {} ({} bytes)", frame.frame_id, frame.len());
//!     }
//!
//!     control.shutdown().await;
//!     # let _ = (datagram_tx, Fragment::new(0, 0, true, Vec::new()));
//!     Ok(())
//! }
//! ```

mod error;

pub mod command;
pub mod config;
pub mod logging;
pub mod reassembly;
pub mod transport;
pub mod types;

// Runtime tasks and handles
pub mod connection;
pub mod control;
pub mod driver;
pub mod stream;

#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

pub use command::{STICK_PAYLOAD_LEN, StickFields, decode_stick, encode_stick};
pub use config::LinkConfig;
pub use connection::VideoLink;
pub use driver::{VideoChannels, VideoDriver};
pub use control::{ControlHandle, ControlLoop, StickReader, StickWriter, stick_channel};
pub use error::*;
pub use reassembly::{FrameReassembler, ReassemblyStats};
pub use transport::{CommandSink, FragmentSource};
pub use types::*;
