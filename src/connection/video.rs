//! Video link over an inbound fragment source

use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::driver::VideoDriver;
use crate::reassembly::ReassemblyStats;
use crate::stream::ThrottleExt;
use crate::transport::FragmentSource;
use crate::types::{CompletedFrame, UpdateRate};
use crate::{LinkConfig, Result};

/// Reassembled video from one fragment source
pub struct VideoLink {
    /// Frame watch receiver
    frames: watch::Receiver<Option<Arc<CompletedFrame>>>,

    /// Stats watch receiver
    stats: watch::Receiver<ReassemblyStats>,

    /// Rate used by [`VideoLink::subscribe`]
    default_rate: UpdateRate,

    /// Cancellation token for stopping the task
    cancel: CancellationToken,
}

impl VideoLink {
    /// Start reassembling with default settings.
    pub async fn open<S: FragmentSource>(source: S) -> Result<Self> {
        Self::open_with(source, LinkConfig::default()).await
    }

    /// Start reassembling.
    ///
    /// Waits up to the configured first-frame timeout for a frame before
    /// returning; a timeout is logged and the link is returned anyway, since
    /// video may simply not have started yet.
    pub async fn open_with<S: FragmentSource>(source: S, config: LinkConfig) -> Result<Self> {
        config.validate()?;

        let channels = VideoDriver::spawn(source, &config);

        if let Some(timeout) = config.first_frame_timeout() {
            let mut frame_rx = channels.frames.clone();
            let wait_result = tokio::time::timeout(timeout, async {
                while frame_rx.borrow_and_update().is_none() {
                    if frame_rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await;

            if wait_result.is_err() {
                warn!("Timeout waiting for first video frame after {:?}", timeout);
            }
        }

        info!("Video link opened");

        Ok(Self {
            frames: channels.frames,
            stats: channels.stats,
            default_rate: config.video_rate,
            cancel: channels.cancel,
        })
    }

    /// Frames at the configured default rate.
    pub fn subscribe(&self) -> impl Stream<Item = Arc<CompletedFrame>> + Send + 'static {
        self.frames(self.default_rate)
    }

    /// Frames at an explicit rate.
    ///
    /// The stream starts with the most recent frame, if any, and ends when
    /// the fragment source closes or the link is dropped.
    pub fn frames(&self, rate: UpdateRate) -> impl Stream<Item = Arc<CompletedFrame>> + Send + 'static {
        let frames = WatchStream::new(self.frames.clone()).filter_map(|opt| async move { opt });

        match rate.throttle_interval() {
            None => frames.boxed(),
            Some(interval) => frames.throttle(interval).boxed(),
        }
    }

    /// Most recent completed frame, if any.
    pub fn latest_frame(&self) -> Option<Arc<CompletedFrame>> {
        self.frames.borrow().clone()
    }

    pub fn stats(&self) -> ReassemblyStats {
        *self.stats.borrow()
    }

    /// Whether the reassembly task is still running.
    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && self.frames.has_changed().is_ok()
    }

    /// Stop the reassembly task.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for VideoLink {
    fn drop(&mut self) {
        debug!("Dropping video link");
        self.cancel.cancel();
    }
}
