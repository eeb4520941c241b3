//! Software PWM for magnetron power control.
//!
//! A [`WaveformGenerator`] owns one output line and emits a fixed-frequency
//! square wave on its own thread. Duty cycle changes arrive over a
//! single-slot channel created by [`duty_channel`]; only the latest value
//! matters and it is picked up at the start of the next period.

pub mod channel;
pub mod generator;

pub use channel::{duty_channel, DutyCycleReceiver, DutyCycleSender, DutyPoll};
pub use generator::{PulsePhases, WaveformGenerator, WaveformHandle, DEFAULT_FREQUENCY_HZ};
