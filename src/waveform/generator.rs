//! The square-wave generator loop.

use embedded_hal::digital::OutputPin;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info};

use super::channel::{DutyCycleReceiver, DutyPoll};
use crate::error::{Error, Result};
use crate::utils::clamp_duty_cycle;

/// Default PWM frequency, matching the ripple of the inverter board.
pub const DEFAULT_FREQUENCY_HZ: f64 = 222.0;

/// Period of a `frequency_hz` waveform.
///
/// The period must fit in a [`Duration`] and must not round down to zero,
/// which would turn the idle loop into a busy spin.
pub(crate) fn period_for(frequency_hz: f64) -> Result<Duration> {
    let out_of_range = || Error::OutOfRange {
        name: "frequency_hz",
        value: frequency_hz,
        min: f64::MIN_POSITIVE,
        max: 1e9,
    };

    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return Err(out_of_range());
    }

    match Duration::try_from_secs_f64(1.0 / frequency_hz) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(out_of_range()),
    }
}

/// Low and high portions of one waveform period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulsePhases {
    /// Time spent low at the start of the period.
    pub low: Duration,
    /// Time spent high at the end of the period.
    pub high: Duration,
}

impl PulsePhases {
    /// Split `period` according to `duty` (clamped to `[0, 1]`).
    pub fn new(period: Duration, duty: f64) -> Self {
        let high = period.mul_f64(clamp_duty_cycle(duty));
        Self {
            low: period.saturating_sub(high),
            high,
        }
    }

    /// Total length of the period.
    pub fn period(&self) -> Duration {
        self.low + self.high
    }
}

/// Emits a fixed-frequency square wave on one output line.
pub struct WaveformGenerator<P> {
    line: P,
    period: Duration,
    duty: f64,
    commands: DutyCycleReceiver,
    /// Last level written, `None` until the first write.
    level: Option<bool>,
}

impl<P: OutputPin> WaveformGenerator<P> {
    /// Create a generator.
    ///
    /// The starting duty cycle is whatever the channel currently holds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `frequency_hz` does not give a
    /// representable, non-zero period.
    pub fn new(line: P, frequency_hz: f64, commands: DutyCycleReceiver) -> Result<Self> {
        let period = period_for(frequency_hz)?;
        let duty = clamp_duty_cycle(commands.latest());
        Ok(Self {
            line,
            period,
            duty,
            commands,
            level: None,
        })
    }

    /// Length of one waveform period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Duty cycle currently being emitted.
    pub fn duty_cycle(&self) -> f64 {
        self.duty
    }

    /// Phase split for the current duty cycle.
    pub fn phases(&self) -> PulsePhases {
        PulsePhases::new(self.period, self.duty)
    }

    /// Emit exactly one waveform period.
    ///
    /// A pending duty cycle is applied first, so changes never land in the
    /// middle of a phase. `pause` is called for each phase and is expected to
    /// block for the given duration.
    ///
    /// Returns `Ok(false)` once the command channel has closed; the line is
    /// left low in that case.
    pub fn run_period<F>(&mut self, mut pause: F) -> Result<bool>
    where
        F: FnMut(Duration),
    {
        match self.commands.poll() {
            DutyPoll::Updated(duty) => {
                self.duty = clamp_duty_cycle(duty);
                debug!("Waveform duty cycle now {:.3}", self.duty);
            }
            DutyPoll::Unchanged => {}
            DutyPoll::Closed => {
                self.drive(false)?;
                return Ok(false);
            }
        }

        let phases = self.phases();
        if self.duty > 0.0 && !phases.high.is_zero() {
            // A zero-length low phase would be a spurious edge at full duty
            if !phases.low.is_zero() {
                self.drive(false)?;
                pause(phases.low);
            }
            self.drive(true)?;
            pause(phases.high);
        } else {
            // Idle, or a high phase too short to emit: hold low and recheck
            // once per period
            self.drive(false)?;
            pause(self.period);
        }

        Ok(true)
    }

    /// Run until the command channel closes or the line fails.
    pub fn run(mut self) -> Result<()> {
        info!(
            "Waveform generator running at {:.1} Hz",
            1.0 / self.period.as_secs_f64()
        );

        loop {
            match self.run_period(thread::sleep) {
                Ok(true) => {}
                Ok(false) => {
                    info!("Duty cycle channel closed, waveform generator exiting");
                    return Ok(());
                }
                Err(e) => {
                    error!("Waveform generator stopped: {}", e);
                    return Err(e);
                }
            }
        }
    }

    /// Start the generator on its own thread.
    pub fn spawn(self) -> Result<WaveformHandle>
    where
        P: Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("waveform".to_string())
            .spawn(move || self.run())?;

        Ok(WaveformHandle { handle })
    }

    fn drive(&mut self, high: bool) -> Result<()> {
        if self.level == Some(high) {
            return Ok(());
        }

        let write = if high {
            self.line.set_high()
        } else {
            self.line.set_low()
        };
        write.map_err(|e| Error::gpio("pwm", e))?;

        self.level = Some(high);
        Ok(())
    }
}

/// Handle to a generator running on its own thread.
pub struct WaveformHandle {
    handle: JoinHandle<Result<()>>,
}

impl WaveformHandle {
    /// Whether the generator thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the generator thread to exit and return its outcome.
    pub fn join(self) -> Result<()> {
        self.handle
            .join()
            .map_err(|_| Error::Internal("waveform thread panicked".to_string()))?
    }
}
