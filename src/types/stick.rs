//! Stick command state and control intents

use serde::{Deserialize, Serialize};

/// Clamp an axis into `[-1.0, 1.0]`; non-finite input becomes neutral.
pub fn clamp_axis(value: f64) -> f64 {
    if value.is_finite() { value.clamp(-1.0, 1.0) } else { 0.0 }
}

/// Four analog stick axes plus the fast-mode flag.
///
/// Axis naming follows the two-stick layout of the remote:
/// roll is right-x, pitch is right-y, throttle is left-y, yaw is left-x.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StickCommandState {
    pub roll: f64,
    pub pitch: f64,
    pub throttle: f64,
    pub yaw: f64,
    pub fast_mode: bool,
}

impl StickCommandState {
    /// All axes centered, fast mode off.
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn new(roll: f64, pitch: f64, throttle: f64, yaw: f64, fast_mode: bool) -> Self {
        Self { roll, pitch, throttle, yaw, fast_mode }
    }

    /// Copy with every axis clamped into range.
    pub fn clamped(self) -> Self {
        Self {
            roll: clamp_axis(self.roll),
            pitch: clamp_axis(self.pitch),
            throttle: clamp_axis(self.throttle),
            yaw: clamp_axis(self.yaw),
            fast_mode: self.fast_mode,
        }
    }

    /// Map a body-frame velocity command onto the sticks, keeping `fast_mode`.
    pub fn from_velocity(command: &VelocityCommand, fast_mode: bool) -> Self {
        Self {
            roll: -command.linear_y,
            pitch: command.linear_x,
            throttle: command.linear_z,
            yaw: -command.angular_z,
            fast_mode,
        }
        .clamped()
    }

    pub fn is_neutral(&self) -> bool {
        self.roll == 0.0 && self.pitch == 0.0 && self.throttle == 0.0 && self.yaw == 0.0
    }
}

/// Normalized body-frame velocity intent.
///
/// x is forward, y is left, z is up; `angular_z` is counter-clockwise yaw.
/// Values are fractions of full stick deflection.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VelocityCommand {
    pub linear_x: f64,
    pub linear_y: f64,
    pub linear_z: f64,
    pub angular_z: f64,
}
