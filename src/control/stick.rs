//! Single-writer stick state shared with the control loop

use tokio::sync::watch;
use tracing::trace;

use crate::types::{StickCommandState, VelocityCommand};

/// Create the stick state channel, starting from neutral sticks.
pub fn stick_channel() -> (StickWriter, StickReader) {
    let (tx, rx) = watch::channel(StickCommandState::neutral());
    (StickWriter { tx }, StickReader { rx })
}

/// The only handle allowed to mutate stick state.
///
/// Every axis written through it is clamped into `[-1.0, 1.0]`, with
/// non-finite values treated as centered.
#[derive(Debug)]
pub struct StickWriter {
    tx: watch::Sender<StickCommandState>,
}

impl StickWriter {
    fn update(&self, f: impl FnOnce(&mut StickCommandState)) {
        self.tx.send_modify(|state| {
            f(state);
            *state = state.clamped();
            trace!(?state, "Stick state updated");
        });
    }

    pub fn set_roll(&self, value: f64) {
        self.update(|s| s.roll = value);
    }

    pub fn set_pitch(&self, value: f64) {
        self.update(|s| s.pitch = value);
    }

    pub fn set_throttle(&self, value: f64) {
        self.update(|s| s.throttle = value);
    }

    pub fn set_yaw(&self, value: f64) {
        self.update(|s| s.yaw = value);
    }

    /// Set all four axes at once, leaving fast mode untouched.
    pub fn set_axes(&self, roll: f64, pitch: f64, throttle: f64, yaw: f64) {
        self.update(|s| {
            s.roll = roll;
            s.pitch = pitch;
            s.throttle = throttle;
            s.yaw = yaw;
        });
    }

    /// Map a velocity intent onto the sticks, leaving fast mode untouched.
    pub fn apply_velocity(&self, command: &VelocityCommand) {
        self.update(|s| *s = StickCommandState::from_velocity(command, s.fast_mode));
    }

    pub fn set_fast_mode(&self, enabled: bool) {
        self.update(|s| s.fast_mode = enabled);
    }

    /// Flip fast mode and return the new setting.
    pub fn toggle_fast_mode(&self) -> bool {
        let mut enabled = false;
        self.update(|s| {
            s.fast_mode = !s.fast_mode;
            enabled = s.fast_mode;
        });
        enabled
    }

    /// Center every axis, leaving fast mode untouched.
    pub fn center(&self) {
        self.set_axes(0.0, 0.0, 0.0, 0.0);
    }

    /// Current state as last written.
    pub fn current(&self) -> StickCommandState {
        *self.tx.borrow()
    }

    /// Another reader for the same state.
    pub fn subscribe(&self) -> StickReader {
        StickReader { rx: self.tx.subscribe() }
    }
}

/// Read-only view of the stick state.
#[derive(Debug, Clone)]
pub struct StickReader {
    rx: watch::Receiver<StickCommandState>,
}

impl StickReader {
    /// Latest state, without waiting.
    pub fn snapshot(&self) -> StickCommandState {
        *self.rx.borrow()
    }

    /// Whether the writer is gone; the last state stays readable.
    pub fn is_closed(&self) -> bool {
        self.rx.has_changed().is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_neutral() {
        let (_writer, reader) = stick_channel();
        assert_eq!(reader.snapshot(), StickCommandState::neutral());
    }

    #[test]
    fn writes_are_clamped() {
        let (writer, reader) = stick_channel();
        writer.set_roll(2.0);
        writer.set_pitch(-4.0);
        writer.set_throttle(f64::NAN);
        writer.set_yaw(0.5);

        assert_eq!(reader.snapshot(), StickCommandState::new(1.0, -1.0, 0.0, 0.5, false));
    }

    #[test]
    fn velocity_and_axes_keep_fast_mode() {
        let (writer, reader) = stick_channel();
        writer.set_fast_mode(true);
        writer.apply_velocity(&VelocityCommand { linear_x: 0.2, ..Default::default() });
        assert!(reader.snapshot().fast_mode);
        assert_eq!(reader.snapshot().pitch, 0.2);

        writer.set_axes(0.1, 0.2, 0.3, 0.4);
        writer.center();
        let state = reader.snapshot();
        assert!(state.is_neutral());
        assert!(state.fast_mode);
    }

    #[test]
    fn toggle_fast_mode_flips() {
        let (writer, reader) = stick_channel();
        assert!(writer.toggle_fast_mode());
        assert!(reader.snapshot().fast_mode);
        assert!(!writer.toggle_fast_mode());
        assert!(!writer.current().fast_mode);
    }

    #[test]
    fn readers_see_last_state_after_writer_drops() {
        let (writer, reader) = stick_channel();
        let second = writer.subscribe();
        writer.set_yaw(-0.75);
        drop(writer);

        assert!(reader.is_closed());
        assert_eq!(reader.snapshot().yaw, -0.75);
        assert_eq!(second.snapshot().yaw, -0.75);
    }
}
