//! Cook on real hardware through sysfs GPIO
//!
//! Run with: cargo run --example sysfs_cook -- [seconds] [power]
//!
//! Uses the default wiring from `ControllerConfig`. Needs write access to
//! /sys/class/gpio.

use microwave_control::{
    duty_channel, ControlCommand, Controller, ControllerConfig, CookSession, Error, LineConfig,
    Relay, Result, SysfsLine, SystemClock, WaveformGenerator,
};
use std::time::Duration;

fn export(line: &LineConfig) -> Result<SysfsLine> {
    SysfsLine::export(line.gpio).map_err(|e| Error::Gpio {
        line: format!("GPIO {}", line.gpio),
        reason: e.to_string(),
    })
}

fn relay(name: &'static str, line: &LineConfig) -> Result<Relay<SysfsLine>> {
    Relay::new(name, export(line)?, line.active_low)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let mut args = std::env::args().skip(1);
    let seconds: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
    let power: f64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(100.0);

    let config = ControllerConfig::default();
    config.validate()?;

    let (duty_tx, duty_rx) = duty_channel();
    let waveform =
        WaveformGenerator::new(export(&config.pwm_line)?, config.pwm_frequency_hz, duty_rx)?
            .spawn()?;

    let session = CookSession::with_initial(
        relay("magnetron", &config.magnetron_line)?,
        relay("auxiliary", &config.auxiliary_line)?,
        duty_tx,
        SystemClock,
        config.target_temperature_c,
        config.power_percent,
    )?;

    let controller = Controller::new(session, config.tick_interval());
    let mut status = controller.subscribe();
    controller.start()?;

    let report = controller.apply(
        &ControlCommand::new()
            .time(seconds)
            .power(power)
            .state("time"),
    );
    if !report.is_ok() {
        for rejection in report.rejected {
            eprintln!("Rejected {}: {}", rejection.field, rejection.error);
        }
        controller.apply(&ControlCommand::new().state("stopped"));
        return Ok(());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping");
                controller.apply(&ControlCommand::new().state("stopped"));
                break;
            }
            received = status.recv() => {
                let Ok(snapshot) = received else { break };
                println!("{}", snapshot);

                if !snapshot.is_running() {
                    break;
                }
            }
            _ = tokio::time::sleep(Duration::from_secs(3)) => {}
        }

        if waveform.is_finished() {
            controller.apply(&ControlCommand::new().state("stopped"));
            return Err(Error::WaveformStopped);
        }
        if controller.is_faulted() {
            eprintln!("Controller stopped after a hardware fault");
            break;
        }
    }

    controller.stop().await;
    drop(controller);
    waveform.join()
}
