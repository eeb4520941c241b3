//! The cook session.

use chrono::{DateTime, Utc};
use embedded_hal::digital::OutputPin;
use std::ops::RangeInclusive;
use tracing::{debug, info};

use super::snapshot::SessionSnapshot;
use super::state::RunState;
use crate::clock::{self, Clock, SystemClock};
use crate::error::{Error, Result};
use crate::gpio::Relay;
use crate::utils::power_to_duty_cycle;
use crate::waveform::DutyCycleSender;

/// Accepted cook durations in seconds.
pub const ELAPSED_TARGET_RANGE: RangeInclusive<f64> = 0.0..=3600.0;

/// Accepted stop temperatures in Celsius.
pub const TARGET_TEMPERATURE_RANGE: RangeInclusive<f64> = 20.0..=150.0;

/// Accepted magnetron power in percent.
pub const POWER_RANGE: RangeInclusive<f64> = 0.0..=100.0;

/// Stop temperature of a fresh session.
pub const DEFAULT_TARGET_TEMPERATURE_C: f64 = 80.0;

/// Power of a fresh session.
pub const DEFAULT_POWER_PERCENT: f64 = 100.0;

fn check(name: &'static str, value: f64, range: &RangeInclusive<f64>) -> Result<f64> {
    Error::check_range(name, value, *range.start(), *range.end())
}

/// Oven state and the outputs derived from it.
///
/// All mutation goes through the `set_*` methods. A validation error
/// leaves every attribute as it was. A hardware error means a relay could
/// not be written and the outputs may no longer match the run state.
pub struct CookSession<P, C = SystemClock> {
    magnetron: Relay<P>,
    auxiliary: Relay<P>,
    duty: DutyCycleSender,
    clock: C,
    elapsed_target_seconds: f64,
    stop_deadline: DateTime<Utc>,
    temperature_c: f64,
    target_temperature_c: f64,
    power_percent: f64,
    run_state: RunState,
}

impl<P: OutputPin, C: Clock> CookSession<P, C> {
    /// Create a stopped session with default attributes.
    ///
    /// # Arguments
    ///
    /// * `magnetron` - Relay switching magnetron power
    /// * `auxiliary` - Relay switching the light and turntable/mixer
    /// * `duty` - Command channel to the waveform generator
    /// * `clock` - Wall-clock source for deadlines
    pub fn new(magnetron: Relay<P>, auxiliary: Relay<P>, duty: DutyCycleSender, clock: C) -> Self {
        let stop_deadline = clock.now();
        info!("Initialising cook session");

        Self {
            magnetron,
            auxiliary,
            duty,
            clock,
            elapsed_target_seconds: 0.0,
            stop_deadline,
            temperature_c: 0.0,
            target_temperature_c: DEFAULT_TARGET_TEMPERATURE_C,
            power_percent: DEFAULT_POWER_PERCENT,
            run_state: RunState::Stopped,
        }
    }

    /// Create a stopped session with a custom initial target and power.
    ///
    /// The power is stored but not sent to the waveform generator; the
    /// line stays idle until the session starts or power is set again.
    pub fn with_initial(
        magnetron: Relay<P>,
        auxiliary: Relay<P>,
        duty: DutyCycleSender,
        clock: C,
        target_temperature_c: f64,
        power_percent: f64,
    ) -> Result<Self> {
        let target_temperature_c = check(
            "target_temperature",
            target_temperature_c,
            &TARGET_TEMPERATURE_RANGE,
        )?;
        let power_percent = check("power", power_percent, &POWER_RANGE)?;

        let mut session = Self::new(magnetron, auxiliary, duty, clock);
        session.target_temperature_c = target_temperature_c;
        session.power_percent = power_percent;
        Ok(session)
    }

    // === Attributes ===

    /// Commanded cook duration in seconds.
    pub fn elapsed_target_seconds(&self) -> f64 {
        self.elapsed_target_seconds
    }

    /// Wall-clock time at which a time-mode cook ends.
    ///
    /// Only meaningful while in [`RunState::Time`].
    pub fn stop_deadline(&self) -> DateTime<Utc> {
        self.stop_deadline
    }

    /// Last reported sensor temperature.
    pub fn temperature_c(&self) -> f64 {
        self.temperature_c
    }

    /// Temperature at which a temperature-mode cook stops.
    pub fn target_temperature_c(&self) -> f64 {
        self.target_temperature_c
    }

    /// Commanded magnetron power.
    pub fn power_percent(&self) -> f64 {
        self.power_percent
    }

    /// Current run state.
    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Whether the magnetron relay is on.
    pub fn magnetron_energized(&self) -> bool {
        self.magnetron.is_energized()
    }

    /// Whether the auxiliary relay is on.
    pub fn auxiliary_energized(&self) -> bool {
        self.auxiliary.is_energized()
    }

    /// Whether both relays are on, as they are while cooking.
    pub fn relays_energized(&self) -> bool {
        self.magnetron_energized() && self.auxiliary_energized()
    }

    /// Duty cycle most recently sent to the waveform generator.
    pub fn commanded_duty_cycle(&self) -> f64 {
        self.duty.commanded()
    }

    /// Whole seconds until the deadline, or `None` outside time mode.
    pub fn time_remaining_seconds(&self) -> Option<u64> {
        if self.run_state != RunState::Time {
            return None;
        }

        let remaining = self.stop_deadline - self.clock.now();
        Some(remaining.num_seconds().max(0) as u64)
    }

    /// Copy of every attribute.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            elapsed_target_seconds: self.elapsed_target_seconds,
            time_remaining_seconds: self.time_remaining_seconds(),
            temperature_c: self.temperature_c,
            target_temperature_c: self.target_temperature_c,
            power_percent: self.power_percent,
            run_state: self.run_state,
        }
    }

    // === Setters ===

    /// Set the cook duration.
    ///
    /// While cooking in time mode the deadline moves by the same amount,
    /// and the session stops at once if the new deadline has already passed.
    pub fn set_elapsed_target(&mut self, value: f64) -> Result<()> {
        let value = check("time", value, &ELAPSED_TARGET_RANGE)?;
        info!("Time set to {}", value);

        let previous = self.elapsed_target_seconds;
        if self.run_state == RunState::Time {
            self.stop_deadline += clock::seconds(value - previous);
        }
        self.elapsed_target_seconds = value;

        if self.run_state == RunState::Time {
            self.tick()?;
        }
        Ok(())
    }

    /// Set the stop temperature for temperature mode.
    pub fn set_target_temperature(&mut self, value: f64) -> Result<()> {
        let value = check("target_temperature", value, &TARGET_TEMPERATURE_RANGE)?;
        info!("Target temperature set to {}", value);
        self.target_temperature_c = value;
        Ok(())
    }

    /// Record a sensor reading.
    ///
    /// In temperature mode, reaching the target stops the session.
    pub fn set_temperature(&mut self, value: f64) -> Result<()> {
        debug!("Temperature set to {}", value);
        self.temperature_c = value;

        if self.run_state == RunState::Temperature && value >= self.target_temperature_c {
            info!(
                "Target temperature {} reached ({})",
                self.target_temperature_c, value
            );
            self.set_run_state(RunState::Stopped)?;
        }
        Ok(())
    }

    /// Set magnetron power.
    ///
    /// The matching duty cycle is sent to the generator in every run state;
    /// the relays decide whether the magnetron is actually fed.
    pub fn set_power(&mut self, value: f64) -> Result<()> {
        let value = check("power", value, &POWER_RANGE)?;
        info!("Power set to {}", value);
        self.power_percent = value;
        self.duty.set_duty_cycle(power_to_duty_cycle(value));
        Ok(())
    }

    /// Change the run state and run its entry action.
    ///
    /// Setting the current state again repeats the entry action; in time
    /// mode that restarts the countdown from the full duration.
    pub fn set_run_state(&mut self, state: RunState) -> Result<()> {
        info!("State set to {}", state);
        self.run_state = state;

        match state {
            RunState::Stopped => self.enter_stopped(),
            RunState::Time => {
                self.stop_deadline = self.clock.now() + clock::seconds(self.elapsed_target_seconds);
                self.start()
            }
            RunState::Temperature => self.start(),
        }
    }

    /// Change the run state by name (`"stopped"`, `"time"` or `"temperature"`).
    pub fn set_run_state_named(&mut self, name: &str) -> Result<()> {
        let state = name.parse()?;
        self.set_run_state(state)
    }

    /// Advance the countdown. Call roughly once a second.
    ///
    /// Stops a time-mode cook once the deadline has passed. Does nothing in
    /// any other state.
    pub fn tick(&mut self) -> Result<()> {
        if self.run_state == RunState::Time && self.clock.now() >= self.stop_deadline {
            info!("Cook time elapsed");
            self.set_run_state(RunState::Stopped)?;
        }
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        self.magnetron.set_energized(true)?;
        self.auxiliary.set_energized(true)?;
        self.duty
            .set_duty_cycle(power_to_duty_cycle(self.power_percent));
        Ok(())
    }

    fn enter_stopped(&mut self) -> Result<()> {
        // Release everything even if one relay write fails
        let magnetron = self.magnetron.set_energized(false);
        let auxiliary = self.auxiliary.set_energized(false);
        self.duty.set_duty_cycle(0.0);
        magnetron.and(auxiliary)
    }
}
