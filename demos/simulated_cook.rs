//! Run a short cook on simulated hardware
//!
//! Run with: cargo run --example simulated_cook

use microwave_control::{
    duty_channel, ControlCommand, Controller, ControllerConfig, CookSession, Relay, Result,
    SimulatedLine, SystemClock, ThermalFrame, WaveformGenerator,
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = ControllerConfig::default();
    config.validate()?;

    let (pwm, pwm_probe) = SimulatedLine::new("pwm");
    let (magnetron, magnetron_probe) = SimulatedLine::new("magnetron");
    let (auxiliary, _) = SimulatedLine::new("auxiliary");

    let (duty_tx, duty_rx) = duty_channel();
    let waveform = WaveformGenerator::new(pwm, config.pwm_frequency_hz, duty_rx)?.spawn()?;

    let session = CookSession::with_initial(
        Relay::active_high("magnetron", magnetron)?,
        Relay::active_high("auxiliary", auxiliary)?,
        duty_tx,
        SystemClock,
        config.target_temperature_c,
        config.power_percent,
    )?;

    let controller = Controller::new(session, config.tick_interval());
    let mut status = controller.subscribe();
    controller.start()?;

    println!("Simulated Cook");
    println!("==============\n");

    let report = controller.apply(&ControlCommand::new().time(5.0).power(60.0).state("time"));
    for rejection in &report.rejected {
        println!("Rejected {}: {}", rejection.field, rejection.error);
    }

    let frame = ThermalFrame::simulated();
    println!("Thermal frame:\n{}", frame);

    let mut frames = controller.subscribe_frames();
    let mut sensor = tokio::time::interval(config.tick_interval());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nInterrupted");
                break;
            }
            _ = sensor.tick() => {
                controller.update_from_frame(&frame)?;
            }
            received = frames.recv() => {
                if let Ok(image) = received {
                    println!(
                        "Thermal image: {:.2} .. {:.2} °C",
                        image.coolest(),
                        image.hottest()
                    );
                }
            }
            received = status.recv() => {
                let Ok(snapshot) = received else { break };

                println!(
                    "{}  [magnetron {}, pwm edges {}]",
                    snapshot,
                    if magnetron_probe.is_high() { "on" } else { "off" },
                    pwm_probe.transitions()
                );

                if !snapshot.is_running() {
                    break;
                }
            }
        }
    }

    controller.stop().await;
    drop(controller);

    // Dropping the session closes the duty channel and ends the generator
    waveform.join()?;
    println!("Done. PWM line is {}", if pwm_probe.is_high() { "high" } else { "low" });
    Ok(())
}
