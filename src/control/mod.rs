//! Periodic stick command transmission.
//!
//! The control loop runs on its own task: every tick it snapshots the stick
//! state, encodes the 6-byte payload and hands it to the outbound
//! [`CommandSink`]. The loop never blocks on the writer side of the stick
//! state, and a failed send is logged and counted rather than ending the loop;
//! the next tick simply sends the then-current sticks.
//!
//! ```rust,no_run
//! use rotorlink::{LinkConfig, control::{ControlLoop, stick_channel}};
//! use tokio::sync::mpsc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (writer, reader) = stick_channel();
//! let (payload_tx, mut payload_rx) = mpsc::channel::<[u8; 6]>(8);
//!
//! let control = ControlLoop::spawn(reader, payload_tx, &LinkConfig::default());
//! writer.set_throttle(0.4);
//!
//! while let Some(payload) = payload_rx.recv().await {
//!     // wrap in the outer packet and transmit
//!     # let _ = payload;
//!     # break;
//! }
//! control.shutdown().await;
//! # }
//! ```

mod stick;

pub use stick::{StickReader, StickWriter, stick_channel};

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::LinkConfig;
use crate::command::encode_stick;
use crate::transport::CommandSink;

#[derive(Debug, Default)]
struct ControlCounters {
    ticks: AtomicU64,
    send_failures: AtomicU64,
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Spawns the periodic control task
pub struct ControlLoop;

impl ControlLoop {
    /// Start ticking at `config.control_rate_hz`.
    ///
    /// Rates outside the range [`LinkConfig::validate`] accepts are pulled
    /// into it rather than rejected here.
    pub fn spawn<S>(reader: StickReader, sink: S, config: &LinkConfig) -> ControlHandle
    where
        S: CommandSink,
    {
        Self::spawn_with_interval(reader, sink, config.control_interval())
    }

    /// Start ticking at an explicit period.
    ///
    /// A zero period is raised to one millisecond.
    pub fn spawn_with_interval<S>(reader: StickReader, sink: S, period: Duration) -> ControlHandle
    where
        S: CommandSink,
    {
        let period = period.max(MIN_PERIOD);
        let cancel = CancellationToken::new();
        let counters = Arc::new(ControlCounters::default());

        let task = tokio::spawn(Self::control_task(
            reader,
            sink,
            period,
            Arc::clone(&counters),
            cancel.clone(),
        ));

        ControlHandle { cancel, counters, task: Some(task) }
    }

    async fn control_task<S>(
        reader: StickReader,
        mut sink: S,
        period: Duration,
        counters: Arc<ControlCounters>,
        cancel: CancellationToken,
    ) where
        S: CommandSink,
    {
        info!("Control task started ({:?} period)", period);
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Control task cancelled");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let state = reader.snapshot();
            let payload = encode_stick(&state);
            let tick = counters.ticks.fetch_add(1, Ordering::Relaxed) + 1;
            trace!(tick, ?payload, "Sending stick command");

            if let Err(e) = sink.send_stick(&payload).await {
                let failures = counters.send_failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Stick command send failed ({} total): {}", failures, e);
            }
        }

        info!("Control task ended after {} ticks", counters.ticks.load(Ordering::Relaxed));
    }
}

/// Handle to a running control task; dropping it stops the task.
pub struct ControlHandle {
    cancel: CancellationToken,
    counters: Arc<ControlCounters>,
    task: Option<JoinHandle<()>>,
}

impl ControlHandle {
    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.counters.ticks.load(Ordering::Relaxed)
    }

    /// Payloads the sink rejected.
    pub fn send_failures(&self) -> u64 {
        self.counters.send_failures.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop ticking and wait for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Control task did not shut down cleanly: {}", e);
            }
        }
    }
}

impl Drop for ControlHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
