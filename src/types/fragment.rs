//! Video fragment decoded from one received datagram

use crate::{LinkError, Result};

/// Maximum number of fragments a single video frame can be split into.
pub const MAX_FRAGMENTS: usize = 128;

/// Bit 7 of the raw fragment-index byte marks the final fragment of a frame.
pub const LAST_FRAGMENT_FLAG: u8 = 0x80;

const INDEX_MASK: u8 = 0x7F;

/// Length of the video header in front of each datagram's payload.
pub const VIDEO_HEADER_LEN: usize = 2;

/// One datagram's contribution to a compressed video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Video frame this fragment belongs to (wraps modulo 256)
    pub sequence_id: u8,

    /// Position within the frame, 0..=127
    pub index: u8,

    /// Final fragment of the frame
    pub is_last: bool,

    /// Fragment data with the video header stripped
    pub payload: Vec<u8>,
}

impl Fragment {
    /// Create a fragment from already-decoded fields.
    ///
    /// Only the low 7 bits of `index` are kept.
    pub fn new(sequence_id: u8, index: u8, is_last: bool, payload: impl Into<Vec<u8>>) -> Self {
        Self { sequence_id, index: index & INDEX_MASK, is_last, payload: payload.into() }
    }

    /// Decode a fragment from the transport's `(sequence, index byte, payload)` tuple.
    ///
    /// A raw index byte of 128 or more carries the last-fragment flag and the
    /// effective index is `byte - 128`.
    pub fn from_wire(sequence_byte: u8, index_byte: u8, payload: impl Into<Vec<u8>>) -> Self {
        let is_last = index_byte & LAST_FRAGMENT_FLAG != 0;
        Self::new(sequence_byte, index_byte & INDEX_MASK, is_last, payload)
    }

    /// Parse a raw video datagram: sequence byte, index byte, then payload.
    pub fn parse(datagram: &[u8]) -> Result<Self> {
        match datagram {
            [sequence, index, payload @ ..] => Ok(Self::from_wire(*sequence, *index, payload)),
            _ => Err(LinkError::datagram_too_short(datagram.len())),
        }
    }

    /// The raw index byte as it appears on the wire.
    pub fn index_byte(&self) -> u8 {
        let flag = if self.is_last { LAST_FRAGMENT_FLAG } else { 0 };
        (self.index & INDEX_MASK) | flag
    }

    /// Serialize back into a video datagram.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(VIDEO_HEADER_LEN + self.payload.len());
        out.push(self.sequence_id);
        out.push(self.index_byte());
        out.extend_from_slice(&self.payload);
        out
    }
}
