//! Run states.

use std::str::FromStr;

use crate::error::Error;

/// Which stop condition is active, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RunState {
    /// Magnetron and auxiliary relays off.
    #[default]
    Stopped,
    /// Cooking until the deadline passes.
    Time,
    /// Cooking until the sensor reaches the target temperature.
    Temperature,
}

impl RunState {
    /// All run states.
    pub const ALL: [RunState; 3] = [RunState::Stopped, RunState::Time, RunState::Temperature];

    /// The state's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Time => "time",
            Self::Temperature => "temperature",
        }
    }

    /// Whether the oven is cooking.
    pub fn is_running(&self) -> bool {
        !matches!(self, Self::Stopped)
    }

    /// Relay level for this state. Both relays follow it.
    pub fn relays_energized(&self) -> bool {
        self.is_running()
    }
}

impl FromStr for RunState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stopped" => Ok(Self::Stopped),
            "time" => Ok(Self::Time),
            "temperature" => Ok(Self::Temperature),
            other => Err(Error::InvalidState {
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for state in RunState::ALL {
            assert_eq!(state.as_str().parse::<RunState>().unwrap(), state);
            assert_eq!(state.to_string(), state.as_str());
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        for bad in ["", "Stopped", "TIME", "defrost", " time"] {
            let err = bad.parse::<RunState>().unwrap_err();
            assert!(matches!(err, Error::InvalidState { ref value } if value == bad));
        }
    }

    #[test]
    fn test_relays_follow_state() {
        assert!(!RunState::Stopped.relays_energized());
        assert!(RunState::Time.relays_energized());
        assert!(RunState::Temperature.relays_energized());
        assert_eq!(RunState::default(), RunState::Stopped);
    }
}
