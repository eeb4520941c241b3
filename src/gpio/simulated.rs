//! In-memory output lines.
//!
//! A [`SimulatedLine`] stands in for a real GPIO. Its paired [`LineProbe`]
//! observes the level from another thread and can inject a disconnect.

use embedded_hal::digital::{ErrorType, OutputPin};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

use super::GpioError;

#[derive(Debug, Default)]
struct LineShared {
    high: AtomicBool,
    writes: AtomicU64,
    transitions: AtomicU64,
    disconnected: AtomicBool,
}

/// An output line that only exists in memory.
#[derive(Debug)]
pub struct SimulatedLine {
    name: String,
    shared: Arc<LineShared>,
}

/// Observer for a [`SimulatedLine`].
#[derive(Debug, Clone)]
pub struct LineProbe {
    shared: Arc<LineShared>,
}

impl SimulatedLine {
    /// Create a line starting low, together with its probe.
    pub fn new(name: impl Into<String>) -> (Self, LineProbe) {
        let shared = Arc::new(LineShared::default());
        let line = Self {
            name: name.into(),
            shared: shared.clone(),
        };
        (line, LineProbe { shared })
    }

    /// The line's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn write(&mut self, high: bool) -> Result<(), GpioError> {
        if self.shared.disconnected.load(Ordering::SeqCst) {
            return Err(GpioError::Disconnected);
        }

        self.shared.writes.fetch_add(1, Ordering::SeqCst);
        let previous = self.shared.high.swap(high, Ordering::SeqCst);
        if previous != high {
            self.shared.transitions.fetch_add(1, Ordering::SeqCst);
            trace!("{} -> {}", self.name, if high { "HIGH" } else { "LOW" });
        }
        Ok(())
    }
}

impl ErrorType for SimulatedLine {
    type Error = GpioError;
}

impl OutputPin for SimulatedLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

impl LineProbe {
    /// Current level of the line.
    pub fn is_high(&self) -> bool {
        self.shared.high.load(Ordering::SeqCst)
    }

    /// Number of successful writes, including ones that kept the level.
    pub fn writes(&self) -> u64 {
        self.shared.writes.load(Ordering::SeqCst)
    }

    /// Number of level changes.
    pub fn transitions(&self) -> u64 {
        self.shared.transitions.load(Ordering::SeqCst)
    }

    /// Make every following write fail with [`GpioError::Disconnected`].
    pub fn disconnect(&self) {
        self.shared.disconnected.store(true, Ordering::SeqCst);
    }

    /// Undo [`disconnect`](Self::disconnect).
    pub fn reconnect(&self) {
        self.shared.disconnected.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_line_levels() {
        let (mut line, probe) = SimulatedLine::new("pwm");
        assert_eq!(line.name(), "pwm");
        assert!(!probe.is_high());

        line.set_high().unwrap();
        line.set_high().unwrap();
        line.set_low().unwrap();

        assert!(!probe.is_high());
        assert_eq!(probe.writes(), 3);
        assert_eq!(probe.transitions(), 2);
    }

    #[test]
    fn test_simulated_line_disconnect() {
        let (mut line, probe) = SimulatedLine::new("pwm");
        probe.disconnect();
        assert!(matches!(line.set_high(), Err(GpioError::Disconnected)));
        assert_eq!(probe.writes(), 0);

        probe.reconnect();
        assert!(line.set_high().is_ok());
        assert!(probe.is_high());
    }
}
