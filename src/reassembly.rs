//! Video frame reassembly from sequence-tagged fragments.
//!
//! Fragments arrive one datagram at a time, each tagged with an 8-bit sequence
//! id and a 7-bit index. Exactly one frame is assembled at a time: a fragment
//! carrying a different sequence id abandons whatever was in progress. A frame
//! is emitted when its last-flagged fragment arrives and every slot up to that
//! index is filled.
//!
//! ## Frame ids
//!
//! The global frame id is `wrap_blocks * 256 + sequence_id`. The wrap counter
//! increments whenever a new sequence id is numerically lower than the one it
//! replaces. That is the only wraparound signal; a reordered or duplicated old
//! sequence id is counted as a wrap too.
//!
//! ## Storage
//!
//! Slot buffers live in a fixed arena of [`MAX_FRAGMENTS`] vectors reused for
//! every frame, and occupancy is a 128-bit mask, so steady-state reassembly
//! does not allocate beyond the emitted frame itself.

use std::time::SystemTime;
use tracing::{debug, trace};

use crate::types::{CompletedFrame, Fragment, MAX_FRAGMENTS};

/// Counters describing reassembly activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReassemblyStats {
    /// Fragments accepted
    pub fragments: u64,
    /// Frames emitted
    pub frames_emitted: u64,
    /// Partially filled frames abandoned when a new sequence id started
    pub frames_superseded: u64,
    /// Sequence wraps counted
    pub wraps: u64,
}

#[derive(Debug, Clone, Copy)]
struct InProgress {
    sequence_id: u8,
    started_at: SystemTime,
    emitted: bool,
}

/// Reassembles fragments into [`CompletedFrame`]s.
///
/// Not thread-safe by itself; feed it from a single task in arrival order.
#[derive(Debug)]
pub struct FrameReassembler {
    slots: Box<[Vec<u8>]>,
    filled: u128,
    current: Option<InProgress>,
    wrap_blocks: u64,
    stats: ReassemblyStats,
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self {
            slots: vec![Vec::new(); MAX_FRAGMENTS].into_boxed_slice(),
            filled: 0,
            current: None,
            wrap_blocks: 0,
            stats: ReassemblyStats::default(),
        }
    }

    /// Feed one fragment, stamping a new frame with the current wall-clock time.
    pub fn on_fragment(&mut self, fragment: &Fragment) -> Option<CompletedFrame> {
        self.on_fragment_at(fragment, SystemTime::now())
    }

    /// Feed one fragment with an explicit observation time.
    ///
    /// `now` is only recorded when the fragment starts a new sequence id.
    pub fn on_fragment_at(&mut self, fragment: &Fragment, now: SystemTime) -> Option<CompletedFrame> {
        self.stats.fragments += 1;
        let sequence_id = fragment.sequence_id;
        let index = usize::from(fragment.index) % MAX_FRAGMENTS;

        let current = match self.current {
            Some(current) if current.sequence_id == sequence_id => current,
            previous => self.begin(previous, sequence_id, now),
        };

        let slot = &mut self.slots[index];
        slot.clear();
        slot.extend_from_slice(&fragment.payload);
        self.filled |= 1u128 << index;

        trace!(
            sequence_id,
            index,
            is_last = fragment.is_last,
            len = fragment.payload.len(),
            "Fragment stored"
        );

        if !fragment.is_last || !self.is_complete_through(index) {
            return None;
        }

        self.current = Some(InProgress { emitted: true, ..current });

        let total: usize = self.slots[..=index].iter().map(Vec::len).sum();
        let mut data = Vec::with_capacity(total);
        for slot in &self.slots[..=index] {
            data.extend_from_slice(slot);
        }

        let frame_id = self.wrap_blocks * 256 + u64::from(sequence_id);
        self.stats.frames_emitted += 1;
        debug!(frame_id, fragments = index + 1, bytes = total, "Frame complete");

        Some(CompletedFrame::new(data, frame_id, current.started_at))
    }

    fn begin(&mut self, previous: Option<InProgress>, sequence_id: u8, now: SystemTime) -> InProgress {
        if let Some(previous) = previous {
            if previous.sequence_id > sequence_id {
                self.wrap_blocks += 1;
                self.stats.wraps += 1;
                debug!(
                    from = previous.sequence_id,
                    to = sequence_id,
                    wrap_blocks = self.wrap_blocks,
                    "Sequence id wrapped"
                );
            }

            if !previous.emitted && self.filled != 0 {
                self.stats.frames_superseded += 1;
                debug!(
                    sequence_id = previous.sequence_id,
                    fragments = self.filled.count_ones(),
                    "Dropping incomplete frame"
                );
            }
        }

        self.filled = 0;
        let started = InProgress { sequence_id, started_at: now, emitted: false };
        self.current = Some(started);
        started
    }

    fn is_complete_through(&self, index: usize) -> bool {
        let needed = if index + 1 >= MAX_FRAGMENTS { u128::MAX } else { (1u128 << (index + 1)) - 1 };
        self.filled & needed == needed
    }

    /// Sequence id currently being assembled.
    pub fn current_sequence(&self) -> Option<u8> {
        self.current.map(|current| current.sequence_id)
    }

    /// Number of sequence wraps counted so far.
    pub fn wrap_blocks(&self) -> u64 {
        self.wrap_blocks
    }

    /// Number of fragment slots filled for the current sequence id.
    pub fn pending_fragments(&self) -> u32 {
        self.filled.count_ones()
    }

    pub fn stats(&self) -> ReassemblyStats {
        self.stats
    }

    /// Forget the in-progress frame, the wrap counter and all statistics.
    pub fn reset(&mut self) {
        self.filled = 0;
        self.current = None;
        self.wrap_blocks = 0;
        self.stats = ReassemblyStats::default();
    }
}
