//! Test utilities for building fragment streams and fake transports
//!
//! Shared by unit tests and the benches; not part of the stable API.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::Result;
use crate::command::STICK_PAYLOAD_LEN;
use crate::transport::{CommandSink, FragmentSource};
use crate::types::Fragment;

/// One fragment per payload, in index order, with the last one flagged.
pub fn frame_fragments<P: AsRef<[u8]>>(sequence_id: u8, payloads: &[P]) -> Vec<Fragment> {
    let count = payloads.len();
    payloads
        .iter()
        .enumerate()
        .map(|(index, payload)| {
            Fragment::new(sequence_id, index as u8, index + 1 == count, payload.as_ref())
        })
        .collect()
}

/// Split a frame into fragments of at most `chunk` bytes.
///
/// An empty frame becomes a single empty last fragment.
pub fn split_frame(sequence_id: u8, data: &[u8], chunk: usize) -> Vec<Fragment> {
    if data.is_empty() {
        return vec![Fragment::new(sequence_id, 0, true, Vec::new())];
    }
    let chunks: Vec<&[u8]> = data.chunks(chunk.max(1)).collect();
    frame_fragments(sequence_id, &chunks[..])
}

/// Keeps a [`ScriptedSource`] open after its script runs out; drop to close it.
pub type HoldOpen = oneshot::Sender<()>;

/// Fragment source replaying a fixed script of results.
///
/// After the script it returns `Ok(None)`, or, when held open, waits until the
/// [`HoldOpen`] handle is dropped.
#[derive(Debug)]
pub struct ScriptedSource {
    script: VecDeque<Result<Option<Fragment>>>,
    hold: Option<oneshot::Receiver<()>>,
}

impl ScriptedSource {
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self::from_script(fragments.into_iter().map(|f| Ok(Some(f))).collect())
    }

    pub fn from_script(script: Vec<Result<Option<Fragment>>>) -> Self {
        Self { script: script.into(), hold: None }
    }

    pub fn hold_open(mut self) -> (Self, HoldOpen) {
        let (tx, rx) = oneshot::channel();
        self.hold = Some(rx);
        (self, tx)
    }
}

#[async_trait::async_trait]
impl FragmentSource for ScriptedSource {
    async fn next_fragment(&mut self) -> Result<Option<Fragment>> {
        if let Some(next) = self.script.pop_front() {
            return next;
        }
        if let Some(hold) = self.hold.as_mut() {
            let _ = hold.await;
            self.hold = None;
        }
        Ok(None)
    }
}

/// Command sink recording every payload it is handed.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<[u8; STICK_PAYLOAD_LEN]>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the recorded payloads.
    pub fn sent(&self) -> Arc<Mutex<Vec<[u8; STICK_PAYLOAD_LEN]>>> {
        Arc::clone(&self.sent)
    }
}

#[async_trait::async_trait]
impl CommandSink for RecordingSink {
    async fn send_stick(&mut self, payload: &[u8; STICK_PAYLOAD_LEN]) -> Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(*payload);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_frame_flags_only_the_last_chunk() {
        let fragments = split_frame(4, b"abcdefg", 3);
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[2].payload, b"g");
        assert!(fragments[2].is_last);
        assert!(fragments[..2].iter().all(|f| !f.is_last));
        assert!(fragments.iter().enumerate().all(|(i, f)| usize::from(f.index) == i));
    }

    #[test]
    fn empty_frame_is_one_empty_fragment() {
        let fragments = split_frame(0, b"", 8);
        assert_eq!(fragments, vec![Fragment::new(0, 0, true, Vec::new())]);
    }

    #[tokio::test]
    async fn held_source_closes_when_handle_drops() {
        let (mut source, hold) = ScriptedSource::new(Vec::new()).hold_open();
        drop(hold);
        assert_eq!(source.next_fragment().await.expect("no error"), None);
    }
}
