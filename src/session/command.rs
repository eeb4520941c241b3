//! Batched attribute changes from a control surface.

use embedded_hal::digital::OutputPin;
use tracing::warn;

use super::cook::CookSession;
use super::snapshot::SessionSnapshot;
use crate::clock::Clock;
use crate::error::Error;

/// A set of attribute changes received together.
///
/// Absent fields are left alone. Field names match the status keys
/// reported to clients.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlCommand {
    /// Cook duration in seconds.
    pub time: Option<f64>,
    /// Stop temperature in Celsius.
    pub target_temperature: Option<f64>,
    /// Magnetron power in percent.
    pub power: Option<f64>,
    /// Run state name.
    pub state: Option<String>,
}

impl ControlCommand {
    /// An empty command.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cook duration.
    pub fn time(mut self, seconds: f64) -> Self {
        self.time = Some(seconds);
        self
    }

    /// Set the stop temperature.
    pub fn target_temperature(mut self, celsius: f64) -> Self {
        self.target_temperature = Some(celsius);
        self
    }

    /// Set the power.
    pub fn power(mut self, percent: f64) -> Self {
        self.power = Some(percent);
        self
    }

    /// Set the run state by name.
    pub fn state(mut self, name: impl Into<String>) -> Self {
        self.state = Some(name.into());
        self
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.target_temperature.is_none()
            && self.power.is_none()
            && self.state.is_none()
    }
}

/// A field of a [`ControlCommand`] that could not be applied.
#[derive(Debug)]
pub struct Rejection {
    /// The command field name.
    pub field: &'static str,
    /// Why it was rejected.
    pub error: Error,
}

/// Outcome of applying a [`ControlCommand`].
#[derive(Debug)]
pub struct ApplyReport {
    /// Session state after the command.
    pub snapshot: SessionSnapshot,
    /// Fields that failed, in the order they were tried.
    pub rejected: Vec<Rejection>,
}

impl ApplyReport {
    /// Whether every field was applied.
    pub fn is_ok(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Whether any failure came from the hardware rather than the caller.
    pub fn has_hardware_fault(&self) -> bool {
        self.rejected.iter().any(|r| !r.error.is_validation())
    }
}

impl<P: OutputPin, C: Clock> CookSession<P, C> {
    /// Apply a batch of changes.
    ///
    /// Fields are applied in the order time, target temperature, power,
    /// state, so a start request sees the other values from the same
    /// command. A failing field does not stop the others.
    pub fn apply(&mut self, command: &ControlCommand) -> ApplyReport {
        let mut rejected = Vec::new();
        let mut record = |field: &'static str, result: crate::error::Result<()>| {
            if let Err(error) = result {
                warn!("Rejected {}: {}", field, error);
                rejected.push(Rejection { field, error });
            }
        };

        if let Some(time) = command.time {
            record("time", self.set_elapsed_target(time));
        }
        if let Some(target) = command.target_temperature {
            record("target_temperature", self.set_target_temperature(target));
        }
        if let Some(power) = command.power {
            record("power", self.set_power(power));
        }
        if let Some(state) = command.state.as_deref() {
            record("state", self.set_run_state_named(state));
        }

        ApplyReport {
            snapshot: self.snapshot(),
            rejected,
        }
    }
}
