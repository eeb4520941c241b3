//! # microwave-control
//!
//! Control logic for a microwave oven converted into a programmable
//! cooker. The magnetron is switched by a relay and throttled by a
//! software PWM signal; a second relay runs the light and mixer.
//!
//! ## Features
//!
//! - **Cook sessions**: Time-limited or temperature-limited cooking with
//!   validated attribute changes
//! - **Software PWM**: A fixed-frequency square wave on a dedicated thread,
//!   with glitch-free duty cycle changes
//! - **Relays**: Active-high or active-low outputs over any
//!   `embedded-hal` output pin
//! - **Linux GPIO**: sysfs backend, plus an in-memory backend for running
//!   without hardware
//! - **Status broadcast**: A background ticker that publishes snapshots,
//!   plus a separate stream of thermal images
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use microwave_control::{
//!     duty_channel, Controller, ControlCommand, CookSession, Relay, Result, SimulatedLine,
//!     SystemClock, WaveformGenerator, DEFAULT_FREQUENCY_HZ,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let (pwm, _) = SimulatedLine::new("pwm");
//!     let (magnetron, _) = SimulatedLine::new("magnetron");
//!     let (auxiliary, _) = SimulatedLine::new("auxiliary");
//!
//!     // The generator runs on its own thread until the session is dropped
//!     let (duty_tx, duty_rx) = duty_channel();
//!     let waveform = WaveformGenerator::new(pwm, DEFAULT_FREQUENCY_HZ, duty_rx)?.spawn()?;
//!
//!     let session = CookSession::new(
//!         Relay::active_high("magnetron", magnetron)?,
//!         Relay::active_high("auxiliary", auxiliary)?,
//!         duty_tx,
//!         SystemClock,
//!     );
//!
//!     let controller = Controller::new(session, Duration::from_secs(1));
//!     controller.start()?;
//!
//!     // Cook for ten seconds at half power
//!     let report = controller.apply(&ControlCommand::new().time(10.0).power(50.0).state("time"));
//!     assert!(report.is_ok());
//!
//!     let mut status = controller.subscribe();
//!     while let Ok(snapshot) = status.recv().await {
//!         println!("{}", snapshot);
//!         if !snapshot.is_running() {
//!             break;
//!         }
//!     }
//!
//!     controller.stop().await;
//!     drop(controller);
//!     waveform.join()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization for snapshots, commands and
//!   configuration, and TOML config loading

// Public modules
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod gpio;
pub mod session;
pub mod thermal;
pub mod utils;
pub mod waveform;

// Re-exports for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ControllerConfig, LineConfig};
pub use controller::Controller;
pub use error::{Error, Result};
pub use gpio::{GpioError, LineProbe, Relay, SimulatedLine, SysfsLine};
pub use session::{
    ApplyReport, ControlCommand, CookSession, Rejection, RunState, SessionSnapshot,
};
pub use thermal::{thermistor_celsius, ThermalFrame};
pub use utils::{celsius_to_fahrenheit, clamp_duty_cycle, power_to_duty_cycle};
pub use waveform::{
    duty_channel, DutyCycleReceiver, DutyCycleSender, PulsePhases, WaveformGenerator,
    WaveformHandle, DEFAULT_FREQUENCY_HZ,
};
