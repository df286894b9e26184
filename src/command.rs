//! Stick command payload encoding.
//!
//! The firmware expects the four stick axes as 11-bit unsigned fields centered
//! on 1024, followed by a single fast-mode bit, packed little-endian:
//!
//! ```text
//! bit  0..11  roll      (right-x)
//! bit 11..22  pitch     (right-y)
//! bit 22..33  throttle  (left-y)
//! bit 33..44  yaw       (left-x)
//! bit 44      fast mode
//! ```
//!
//! The low 48 bits of the packed value are written least-significant byte
//! first, giving the 6-byte payload that the outer packet framing embeds.
//!
//! ```rust
//! use rotorlink::{StickCommandState, command};
//!
//! let payload = command::encode_stick(&StickCommandState::neutral());
//! let fields = command::decode_stick(&payload);
//! assert_eq!(fields.roll, 1024);
//! assert!(!fields.fast_mode);
//! ```

use crate::types::{StickCommandState, clamp_axis};

/// Length of the encoded stick payload.
pub const STICK_PAYLOAD_LEN: usize = 6;

/// Raw field value of a centered axis.
pub const AXIS_CENTER: u16 = 1024;

/// Raw counts per unit of stick deflection.
pub const AXIS_SCALE: f64 = 660.0;

const AXIS_BITS: u32 = 11;
const AXIS_MASK: u64 = 0x7FF;

/// Bit position of the fast-mode flag in the packed value.
pub const FAST_MODE_BIT: u32 = 44;

/// Raw field values of one stick command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StickFields {
    pub roll: u16,
    pub pitch: u16,
    pub throttle: u16,
    pub yaw: u16,
    pub fast_mode: bool,
}

impl StickFields {
    /// Raw fields for a stick state.
    pub fn from_state(state: &StickCommandState) -> Self {
        Self {
            roll: axis_field(state.roll),
            pitch: axis_field(state.pitch),
            throttle: axis_field(state.throttle),
            yaw: axis_field(state.yaw),
            fast_mode: state.fast_mode,
        }
    }

    /// Inverse of [`axis_field`], up to rounding.
    pub fn axis_value(field: u16) -> f64 {
        (f64::from(field & AXIS_MASK as u16) - f64::from(AXIS_CENTER)) / AXIS_SCALE
    }

    /// Approximate stick state these fields were encoded from.
    pub fn to_state(&self) -> StickCommandState {
        StickCommandState::new(
            Self::axis_value(self.roll),
            Self::axis_value(self.pitch),
            Self::axis_value(self.throttle),
            Self::axis_value(self.yaw),
            self.fast_mode,
        )
    }
}

/// Map a stick deflection onto its 11-bit field.
///
/// Rounds half to even. Out-of-range input is clamped first and non-finite
/// input is centered.
pub fn axis_field(value: f64) -> u16 {
    let raw = (f64::from(AXIS_CENTER) + AXIS_SCALE * clamp_axis(value)).round_ties_even() as i64;
    (raw as u64 & AXIS_MASK) as u16
}

/// Pack raw fields into the 45-bit command value.
pub fn pack(fields: &StickFields) -> u64 {
    let axis = |raw: u16| u64::from(raw) & AXIS_MASK;
    axis(fields.roll)
        | axis(fields.pitch) << AXIS_BITS
        | axis(fields.throttle) << (2 * AXIS_BITS)
        | axis(fields.yaw) << (3 * AXIS_BITS)
        | u64::from(fields.fast_mode) << FAST_MODE_BIT
}

/// Split a packed command value back into its fields.
pub fn unpack(packed: u64) -> StickFields {
    let axis = |shift: u32| ((packed >> shift) & AXIS_MASK) as u16;
    StickFields {
        roll: axis(0),
        pitch: axis(AXIS_BITS),
        throttle: axis(2 * AXIS_BITS),
        yaw: axis(3 * AXIS_BITS),
        fast_mode: (packed >> FAST_MODE_BIT) & 1 == 1,
    }
}

/// Encode a stick state into the 6-byte command payload.
pub fn encode_stick(state: &StickCommandState) -> [u8; STICK_PAYLOAD_LEN] {
    let packed = pack(&StickFields::from_state(state));
    let mut payload = [0u8; STICK_PAYLOAD_LEN];
    payload.copy_from_slice(&packed.to_le_bytes()[..STICK_PAYLOAD_LEN]);
    payload
}

/// Decode a 6-byte command payload into its raw fields.
pub fn decode_stick(payload: &[u8; STICK_PAYLOAD_LEN]) -> StickFields {
    let mut bytes = [0u8; 8];
    bytes[..STICK_PAYLOAD_LEN].copy_from_slice(payload);
    unpack(u64::from_le_bytes(bytes))
}
