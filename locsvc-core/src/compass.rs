//! Magnetometer counts to compass heading
//!
//! Heading is taken from the horizontal X/Y components only, with the
//! device assumed level:
//!
//! ```text
//! Y > 0          :  90 - atan(X/Y) * 180/π
//! Y < 0          : 270 - atan(X/Y) * 180/π
//! Y = 0, X < 0   : 180
//! Y = 0, X >= 0  :   0
//! ```

use core::f32::consts::PI;

/// AK09916 sensitivity in µT per LSB
pub const MICROTESLA_PER_COUNT: f32 = 0.15;

const RAD_TO_DEG: f32 = 180.0 / PI;

/// One raw 3-axis reading in sensor counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawSample {
    /// Decode the HXL..HZH register block (little-endian pairs)
    pub fn from_le_bytes(bytes: [u8; 6]) -> Self {
        Self {
            x: i16::from_le_bytes([bytes[0], bytes[1]]),
            y: i16::from_le_bytes([bytes[2], bytes[3]]),
            z: i16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }

    /// Field strength in µT
    pub fn to_field(self) -> MagneticField {
        MagneticField {
            x: f32::from(self.x) * MICROTESLA_PER_COUNT,
            y: f32::from(self.y) * MICROTESLA_PER_COUNT,
            z: f32::from(self.z) * MICROTESLA_PER_COUNT,
        }
    }
}

/// Magnetic field in µT
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagneticField {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl MagneticField {
    /// Heading in whole degrees, `0..360`
    pub fn heading(&self) -> i16 {
        heading(self.x, self.y)
    }
}

/// Heading of a horizontal field vector in fractional degrees
pub fn heading_degrees(x: f32, y: f32) -> f32 {
    if y > 0.0 {
        90.0 - libm::atanf(x / y) * RAD_TO_DEG
    } else if y < 0.0 {
        270.0 - libm::atanf(x / y) * RAD_TO_DEG
    } else if x < 0.0 {
        180.0
    } else {
        0.0
    }
}

/// Heading truncated to whole degrees and wrapped into `0..360`
pub fn heading(x: f32, y: f32) -> i16 {
    let degrees = heading_degrees(x, y) as i32;
    degrees.rem_euclid(360) as i16
}
