//! Cook session state machine.
//!
//! A [`CookSession`] owns the oven's attributes, validates every change to
//! them, and turns its [`RunState`] into relay levels and a duty cycle for
//! the waveform generator.

pub mod command;
pub mod cook;
pub mod snapshot;
pub mod state;

pub use command::{ApplyReport, ControlCommand, Rejection};
pub use cook::{
    CookSession, DEFAULT_POWER_PERCENT, DEFAULT_TARGET_TEMPERATURE_C, ELAPSED_TARGET_RANGE,
    POWER_RANGE, TARGET_TEMPERATURE_RANGE,
};
pub use snapshot::SessionSnapshot;
pub use state::RunState;
