//! Driver spawns and manages the video reassembly task

use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::{LinkConfig, LinkError};
use crate::reassembly::{FrameReassembler, ReassemblyStats};
use crate::transport::FragmentSource;
use crate::types::CompletedFrame;

/// Result of spawning the video task
pub struct VideoChannels {
    /// Latest completed frame; `None` before the first frame and after the source ends
    pub frames: watch::Receiver<Option<Arc<CompletedFrame>>>,
    /// Reassembly counters, refreshed after every fragment
    pub stats: watch::Receiver<ReassemblyStats>,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
}

/// Driver spawns and manages the video reassembly task
///
/// The spawned task owns both the [`FragmentSource`] and the
/// [`FrameReassembler`], so fragments are processed strictly in the order the
/// source yields them. Completed frames are published on a watch channel: a
/// consumer that falls behind sees the newest frame, never a queue.
pub struct VideoDriver;

impl VideoDriver {
    /// Spawn the reassembly task for the given source
    pub fn spawn<S>(source: S, config: &LinkConfig) -> VideoChannels
    where
        S: FragmentSource,
    {
        let (frame_tx, frame_rx) = watch::channel(None);
        let (stats_tx, stats_rx) = watch::channel(ReassemblyStats::default());
        let cancel = CancellationToken::new();

        let cancel_task = cancel.clone();
        let max_errors = config.max_transport_errors.max(1);

        tokio::spawn(async move {
            Self::reassembly_task(source, frame_tx, stats_tx, max_errors, cancel_task).await;
        });

        VideoChannels { frames: frame_rx, stats: stats_rx, cancel }
    }

    async fn reassembly_task<S>(
        mut source: S,
        frame_tx: watch::Sender<Option<Arc<CompletedFrame>>>,
        stats_tx: watch::Sender<ReassemblyStats>,
        max_errors: u32,
        cancel: CancellationToken,
    ) where
        S: FragmentSource,
    {
        info!("Video reassembly task started");
        let mut reassembler = FrameReassembler::new();
        let mut error_count = 0u32;

        loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Video reassembly cancelled");
                    break;
                }
                result = source.next_fragment() => result,
            };

            match result {
                Ok(Some(fragment)) => {
                    error_count = 0;
                    let completed = reassembler.on_fragment(&fragment);
                    stats_tx.send_replace(reassembler.stats());

                    if let Some(frame) = completed {
                        trace!(frame_id = frame.frame_id, bytes = frame.len(), "Publishing frame");
                        if frame_tx.send(Some(Arc::new(frame))).is_err() {
                            debug!("Frame receiver dropped, shutting down");
                            break;
                        }
                    }
                }
                Ok(None) => {
                    info!("Fragment source closed");
                    frame_tx.send_replace(None);
                    break;
                }
                Err(LinkError::Datagram { len, details }) => {
                    // Malformed input is dropped without stalling or spending the error budget.
                    debug!(len, %details, "Dropping malformed video datagram");
                }
                Err(e) => {
                    error_count += 1;
                    error!("Fragment source error ({}/{}): {}", error_count, max_errors, e);

                    if error_count >= max_errors {
                        error!("Too many consecutive fragment source errors, shutting down");
                        frame_tx.send_replace(None);
                        break;
                    }

                    if e.is_retryable() {
                        // Exponential backoff: 50ms, 100ms, 200ms, ...
                        let backoff =
                            std::time::Duration::from_millis(50 * (1 << error_count.min(5)));
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(backoff) => {}
                        }
                    }
                }
            }
        }

        let stats = reassembler.stats();
        info!(
            fragments = stats.fragments,
            frames = stats.frames_emitted,
            superseded = stats.frames_superseded,
            wraps = stats.wraps,
            "Video reassembly task ended"
        );
    }
}
