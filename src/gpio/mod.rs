//! Digital output lines.
//!
//! Every line implements [`embedded_hal::digital::OutputPin`]. Two
//! backends are provided: [`SysfsLine`] drives real GPIO through the Linux
//! sysfs interface, and [`SimulatedLine`] keeps the level in memory for
//! tests and bench runs without hardware.

pub mod relay;
pub mod simulated;
pub mod sysfs;

pub use relay::Relay;
pub use simulated::{LineProbe, SimulatedLine};
pub use sysfs::SysfsLine;

use embedded_hal::digital::ErrorKind;
use thiserror::Error;

/// Error raised by a GPIO backend.
#[derive(Error, Debug)]
pub enum GpioError {
    /// The underlying device file could not be accessed.
    #[error("GPIO I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The line is no longer reachable.
    #[error("GPIO line disconnected")]
    Disconnected,
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}
