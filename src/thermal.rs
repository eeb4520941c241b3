//! Thermal camera frame decoding.
//!
//! The oven's temperature comes from an 8×8 infrared array sensor read
//! over I2C. The sensor driver itself lives outside this crate; these
//! helpers turn its raw register dump into Celsius and pick the reading
//! that feeds [`CookSession::set_temperature`](crate::CookSession::set_temperature).

use crate::error::{Error, Result};

/// Pixels per side.
pub const FRAME_SIZE: usize = 8;

/// Bytes in a full pixel register dump (two per pixel).
pub const FRAME_BYTES: usize = FRAME_SIZE * FRAME_SIZE * 2;

/// Celsius per pixel LSB.
const PIXEL_RESOLUTION: f64 = 0.25;

/// Celsius per thermistor LSB.
const THERMISTOR_RESOLUTION: f64 = 0.0625;

/// One 8×8 frame of pixel temperatures in Celsius.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThermalFrame {
    pixels: [[f64; FRAME_SIZE]; FRAME_SIZE],
}

impl ThermalFrame {
    /// Build a frame from Celsius values, row by row.
    pub fn new(pixels: [[f64; FRAME_SIZE]; FRAME_SIZE]) -> Self {
        Self { pixels }
    }

    /// Decode the pixel registers.
    ///
    /// Each pixel is two little-endian bytes holding a 12-bit two's
    /// complement value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] unless exactly [`FRAME_BYTES`] bytes
    /// are given.
    pub fn from_registers(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FRAME_BYTES {
            return Err(Error::InvalidData {
                context: format!(
                    "thermal frame needs {} bytes, got {}",
                    FRAME_BYTES,
                    bytes.len()
                ),
            });
        }

        let mut pixels = [[0.0; FRAME_SIZE]; FRAME_SIZE];
        for (i, pair) in bytes.chunks_exact(2).enumerate() {
            let raw = u16::from_le_bytes([pair[0], pair[1]]);
            pixels[i / FRAME_SIZE][i % FRAME_SIZE] = twelve_bit_signed(raw) as f64 * PIXEL_RESOLUTION;
        }

        Ok(Self { pixels })
    }

    /// A fixed gradient for running without a sensor.
    pub fn simulated() -> Self {
        let mut pixels = [[0.0; FRAME_SIZE]; FRAME_SIZE];
        for (row, line) in pixels.iter_mut().enumerate() {
            for (col, pixel) in line.iter_mut().enumerate() {
                *pixel = 30.0 + (row * col) as f64;
            }
        }
        Self { pixels }
    }

    /// The grid, row by row.
    pub fn rows(&self) -> &[[f64; FRAME_SIZE]; FRAME_SIZE] {
        &self.pixels
    }

    /// The hottest pixel.
    pub fn hottest(&self) -> f64 {
        self.pixels
            .iter()
            .flatten()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// The coolest pixel.
    pub fn coolest(&self) -> f64 {
        self.pixels
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }
}

impl std::fmt::Display for ThermalFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.pixels {
            let cells: Vec<String> = row.iter().map(|c| format!("{:.2}", c)).collect();
            writeln!(f, "{}", cells.join("  "))?;
        }
        Ok(())
    }
}

/// Decode the on-board thermistor register pair (low byte first).
///
/// The value is 12-bit sign-magnitude at 0.0625 °C per LSB.
pub fn thermistor_celsius(bytes: [u8; 2]) -> f64 {
    let raw = u16::from_le_bytes(bytes);
    let magnitude = (raw & 0x07FF) as f64 * THERMISTOR_RESOLUTION;
    if raw & 0x0800 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

fn twelve_bit_signed(raw: u16) -> i16 {
    // Shift the sign bit up to bit 15, then arithmetic-shift back
    ((raw << 4) as i16) >> 4
}
