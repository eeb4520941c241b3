//! Relay outputs.
//!
//! A relay is a named binary output driven through a GPIO line, optionally
//! active-low for boards whose relay modules pull in on a low level.

use embedded_hal::digital::OutputPin;
use tracing::debug;

use crate::error::{Error, Result};

/// A relay on a digital output line.
pub struct Relay<P> {
    name: &'static str,
    pin: P,
    /// If true, energized = pin LOW
    inverted: bool,
    energized: bool,
}

impl<P: OutputPin> Relay<P> {
    /// Create a relay and drive it de-energized.
    ///
    /// # Arguments
    ///
    /// * `name` - Logical name used in logs and errors
    /// * `pin` - The output line controlling the relay coil
    /// * `inverted` - If true, the relay is energized when the line is LOW
    pub fn new(name: &'static str, pin: P, inverted: bool) -> Result<Self> {
        let mut relay = Self {
            name,
            pin,
            inverted,
            energized: true,
        };
        relay.set_energized(false)?;
        Ok(relay)
    }

    /// Create an active-high relay.
    pub fn active_high(name: &'static str, pin: P) -> Result<Self> {
        Self::new(name, pin, false)
    }

    /// Create an active-low relay.
    pub fn active_low(name: &'static str, pin: P) -> Result<Self> {
        Self::new(name, pin, true)
    }

    /// Energize or release the relay.
    pub fn set_energized(&mut self, on: bool) -> Result<()> {
        let write = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        write.map_err(|e| Error::gpio(self.name, e))?;

        if self.energized != on {
            debug!("Relay {} {}", self.name, if on { "on" } else { "off" });
        }
        self.energized = on;
        Ok(())
    }

    /// Whether the relay was last commanded on.
    pub fn is_energized(&self) -> bool {
        self.energized
    }

    /// The relay's logical name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::SimulatedLine;

    #[test]
    fn test_active_high_relay() {
        let (line, probe) = SimulatedLine::new("relay");
        let mut relay = Relay::active_high("magnetron", line).unwrap();

        assert!(!relay.is_energized());
        assert!(!probe.is_high());

        relay.set_energized(true).unwrap();
        assert!(relay.is_energized());
        assert!(probe.is_high());

        relay.set_energized(false).unwrap();
        assert!(!relay.is_energized());
        assert!(!probe.is_high());
    }

    #[test]
    fn test_active_low_relay() {
        let (line, probe) = SimulatedLine::new("relay");
        let mut relay = Relay::active_low("auxiliary", line).unwrap();

        // Released relay holds an active-low line high
        assert!(!relay.is_energized());
        assert!(probe.is_high());

        relay.set_energized(true).unwrap();
        assert!(!probe.is_high());
    }

    #[test]
    fn test_relay_write_failure() {
        let (line, probe) = SimulatedLine::new("relay");
        let mut relay = Relay::active_high("magnetron", line).unwrap();

        probe.disconnect();
        let err = relay.set_energized(true).unwrap_err();
        assert!(matches!(err, Error::Gpio { ref line, .. } if line == "magnetron"));
        assert!(!relay.is_energized());
    }
}
