//! Point-in-time view of a cook session.

use super::state::RunState;
use crate::utils::celsius_to_fahrenheit;

/// Immutable copy of every session attribute.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSnapshot {
    /// Commanded cook duration in seconds.
    pub elapsed_target_seconds: f64,
    /// Whole seconds left, only while cooking in time mode.
    pub time_remaining_seconds: Option<u64>,
    /// Last reported sensor temperature in Celsius.
    pub temperature_c: f64,
    /// Temperature at which a temperature-mode cook stops.
    pub target_temperature_c: f64,
    /// Commanded magnetron power in percent.
    pub power_percent: f64,
    /// Current run state.
    pub run_state: RunState,
}

impl SessionSnapshot {
    /// Whether the oven was cooking when the snapshot was taken.
    pub fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    /// Sensor temperature in Fahrenheit.
    pub fn temperature_f(&self) -> f64 {
        celsius_to_fahrenheit(self.temperature_c)
    }
}

impl std::fmt::Display for SessionSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {:.1}°C (target {:.1}°C) | power {:.0}% | time {:.0}s",
            self.run_state,
            self.temperature_c,
            self.target_temperature_c,
            self.power_percent,
            self.elapsed_target_seconds
        )?;
        if let Some(remaining) = self.time_remaining_seconds {
            write!(f, " ({}s left)", remaining)?;
        }
        Ok(())
    }
}
