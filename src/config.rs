//! Controller configuration.
//!
//! Defaults describe the reference build: an Allwinner A20 board driving
//! the PWM from port PI19, the magnetron relay from PH21 and the
//! light/mixer relay from PI11.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::session::{
    DEFAULT_POWER_PERCENT, DEFAULT_TARGET_TEMPERATURE_C, POWER_RANGE, TARGET_TEMPERATURE_RANGE,
};
use crate::waveform::generator::period_for;
use crate::waveform::DEFAULT_FREQUENCY_HZ;

/// sysfs number of a pin on an Allwinner port (`A` = 0, `B` = 1, ...).
pub const fn sunxi_gpio(port: u32, pin: u32) -> u32 {
    port * 32 + pin
}

/// One digital output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineConfig {
    /// sysfs GPIO number.
    pub gpio: u32,
    /// Whether the load is on when the line is low.
    #[cfg_attr(feature = "serde", serde(default))]
    pub active_low: bool,
}

impl LineConfig {
    /// An active-high line.
    pub const fn active_high(gpio: u32) -> Self {
        Self {
            gpio,
            active_low: false,
        }
    }
}

/// Everything needed to wire up a controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerConfig {
    /// Software PWM frequency.
    pub pwm_frequency_hz: f64,
    /// Line carrying the PWM waveform.
    pub pwm_line: LineConfig,
    /// Magnetron power relay.
    pub magnetron_line: LineConfig,
    /// Light and mixer relay.
    pub auxiliary_line: LineConfig,
    /// Interval between session ticks and status broadcasts.
    pub tick_interval_ms: u64,
    /// Stop temperature at startup.
    pub target_temperature_c: f64,
    /// Power at startup.
    pub power_percent: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            pwm_frequency_hz: DEFAULT_FREQUENCY_HZ,
            pwm_line: LineConfig::active_high(sunxi_gpio(8, 19)),
            magnetron_line: LineConfig::active_high(sunxi_gpio(7, 21)),
            auxiliary_line: LineConfig::active_high(sunxi_gpio(8, 11)),
            tick_interval_ms: 1000,
            target_temperature_c: DEFAULT_TARGET_TEMPERATURE_C,
            power_percent: DEFAULT_POWER_PERCENT,
        }
    }
}

impl ControllerConfig {
    /// Tick interval as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Check the configuration for mistakes.
    pub fn validate(&self) -> Result<()> {
        if period_for(self.pwm_frequency_hz).is_err() {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "pwm_frequency_hz {} does not give a usable period",
                    self.pwm_frequency_hz
                ),
            });
        }

        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig {
                reason: "tick_interval_ms must be non-zero".to_string(),
            });
        }

        let lines = [
            ("pwm_line", self.pwm_line.gpio),
            ("magnetron_line", self.magnetron_line.gpio),
            ("auxiliary_line", self.auxiliary_line.gpio),
        ];
        for (i, (name, gpio)) in lines.iter().enumerate() {
            if let Some((other, _)) = lines[i + 1..].iter().find(|(_, g)| g == gpio) {
                return Err(Error::InvalidConfig {
                    reason: format!("{} and {} both use GPIO {}", name, other, gpio),
                });
            }
        }

        if !TARGET_TEMPERATURE_RANGE.contains(&self.target_temperature_c) {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "target_temperature_c {} outside {:?}",
                    self.target_temperature_c, TARGET_TEMPERATURE_RANGE
                ),
            });
        }

        if !POWER_RANGE.contains(&self.power_percent) {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "power_percent {} outside {:?}",
                    self.power_percent, POWER_RANGE
                ),
            });
        }

        Ok(())
    }

    /// Parse a TOML document. Missing keys take their default values.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}
