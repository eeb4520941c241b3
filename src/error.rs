//! Error types for the microwave-control crate.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// An attribute value was outside its allowed range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// The name of the attribute.
        name: &'static str,
        /// The rejected value.
        value: f64,
        /// Lowest accepted value.
        min: f64,
        /// Highest accepted value.
        max: f64,
    },

    /// An unrecognised run state was requested.
    #[error("Invalid run state: {value:?}")]
    InvalidState {
        /// The state name that was supplied.
        value: String,
    },

    /// Writing a digital output line failed.
    #[error("GPIO failure on {line}: {reason}")]
    Gpio {
        /// The logical name of the line.
        line: String,
        /// Description of the failure.
        reason: String,
    },

    /// Invalid data was received from a sensor.
    #[error("Invalid data received: {context}")]
    InvalidData {
        /// Description of what was invalid about the data.
        context: String,
    },

    /// The configuration cannot be applied.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected.
        reason: String,
    },

    /// The waveform generator thread is no longer running.
    #[error("Waveform generator stopped")]
    WaveformStopped,

    /// Operating system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build an [`Error::Gpio`] from any line error.
    pub(crate) fn gpio(line: &str, err: impl std::fmt::Debug) -> Self {
        Self::Gpio {
            line: line.to_string(),
            reason: format!("{:?}", err),
        }
    }

    /// Check `value` against an inclusive range.
    pub(crate) fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64> {
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(Self::OutOfRange {
                name,
                value,
                min,
                max,
            })
        }
    }

    /// Whether this error was caused by a bad caller-supplied value.
    ///
    /// Validation errors leave all session state untouched. Anything else
    /// indicates the hardware interface can no longer be trusted.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::InvalidState { .. })
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
