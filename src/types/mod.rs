//! Core types shared by the reassembly and command paths.
//!
//! - [`Fragment`] is one video datagram decoded into sequence id, index,
//!   last-fragment flag and payload
//! - [`CompletedFrame`] is a reassembled compressed frame with its global id
//! - [`StickCommandState`] holds the four stick axes and the fast-mode flag
//! - [`VelocityCommand`] is the control intent mapped onto the sticks
//! - [`UpdateRate`] controls how often subscribers receive frames

mod fragment;
mod frame;
mod stick;
mod update_rate;

pub use fragment::{Fragment, LAST_FRAGMENT_FLAG, MAX_FRAGMENTS, VIDEO_HEADER_LEN};
pub use frame::CompletedFrame;
pub use stick::{StickCommandState, VelocityCommand, clamp_axis};
pub use update_rate::UpdateRate;
