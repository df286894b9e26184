//! Completed video frame emitted by the reassembler

use std::sync::Arc;
use std::time::SystemTime;

/// Fully reassembled compressed video frame.
///
/// The bytes are still encoded; decoding belongs to the video consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFrame {
    /// Concatenated fragment payloads in index order (zero-copy via Arc)
    pub data: Arc<[u8]>,

    /// `wrap_blocks * 256 + sequence_id`, monotonic across sequence wraps
    pub frame_id: u64,

    /// Wall-clock time the first fragment of this sequence id was observed
    pub timestamp: SystemTime,
}

impl CompletedFrame {
    /// Create a new completed frame
    pub fn new(data: Vec<u8>, frame_id: u64, timestamp: SystemTime) -> Self {
        Self { data: data.into(), frame_id, timestamp }
    }

    /// The 8-bit sequence id the frame was carried under.
    pub fn sequence_id(&self) -> u8 {
        (self.frame_id % 256) as u8
    }

    /// How many sequence wraps had been counted when the frame completed.
    pub fn wrap_block(&self) -> u64 {
        self.frame_id / 256
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_id_splits_into_sequence_and_wrap_block() {
        let frame = CompletedFrame::new(vec![1, 2, 3], 3 * 256 + 17, SystemTime::UNIX_EPOCH);
        assert_eq!(frame.sequence_id(), 17);
        assert_eq!(frame.wrap_block(), 3);
        assert_eq!(frame.len(), 3);
        assert!(!frame.is_empty());
    }
}
