//! Periodic driver for a cook session.
//!
//! The [`Controller`] owns the session behind a lock, ticks it on a
//! background task, and broadcasts a [`SessionSnapshot`] after every tick
//! and every change so observers can stay in sync.

use embedded_hal::digital::OutputPin;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::session::{ApplyReport, ControlCommand, CookSession, SessionSnapshot};
use crate::thermal::ThermalFrame;

/// Capacity of the status broadcast channel.
const STATUS_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the thermal image broadcast channel.
const FRAME_CHANNEL_CAPACITY: usize = 8;

/// Runs a [`CookSession`] and publishes its status.
pub struct Controller<P, C> {
    /// The session, shared with the tick task.
    session: Arc<Mutex<CookSession<P, C>>>,
    /// Status broadcast channel.
    status_tx: broadcast::Sender<SessionSnapshot>,
    /// Thermal image broadcast channel.
    frame_tx: broadcast::Sender<Arc<ThermalFrame>>,
    /// Time between ticks.
    tick_interval: Duration,
    /// Background task handle.
    background_handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
    /// Running flag.
    is_running: Arc<AtomicBool>,
    /// Set once a tick failed on the hardware.
    faulted: Arc<AtomicBool>,
}

impl<P, C> Controller<P, C>
where
    P: OutputPin + Send + 'static,
    C: Clock + 'static,
{
    /// Wrap a session. Call [`start`](Self::start) to begin ticking.
    pub fn new(session: CookSession<P, C>, tick_interval: Duration) -> Self {
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);
        let (frame_tx, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);

        Self {
            session: Arc::new(Mutex::new(session)),
            status_tx,
            frame_tx,
            tick_interval,
            background_handle: RwLock::new(None),
            is_running: Arc::new(AtomicBool::new(false)),
            faulted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start ticking the session in the background.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if an earlier tick failed on the hardware.
    pub fn start(&self) -> Result<()> {
        if self.faulted.load(Ordering::SeqCst) {
            return Err(Error::Internal(
                "controller stopped after a hardware fault".to_string(),
            ));
        }

        if self.is_running.swap(true, Ordering::SeqCst) {
            debug!("Controller already running");
            return Ok(());
        }

        info!("Starting controller, ticking every {:?}", self.tick_interval);

        let session = self.session.clone();
        let status_tx = self.status_tx.clone();
        let is_running = self.is_running.clone();
        let faulted = self.faulted.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            while is_running.load(Ordering::SeqCst) {
                ticker.tick().await;

                let outcome = {
                    let mut session = session.lock();
                    session.tick().map(|_| session.snapshot())
                };

                match outcome {
                    Ok(snapshot) => {
                        let _ = status_tx.send(snapshot);
                    }
                    Err(e) => {
                        error!("Tick failed, stopping controller: {}", e);
                        faulted.store(true, Ordering::SeqCst);
                        is_running.store(false, Ordering::SeqCst);
                        break;
                    }
                }
            }

            debug!("Controller background task ended");
        });

        *self.background_handle.write() = Some(handle);

        Ok(())
    }

    /// Stop the background task.
    pub async fn stop(&self) {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            return;
        }

        info!("Stopping controller");

        let handle = self.background_handle.write().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// Whether the tick task is active.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Whether a tick failed on the hardware.
    pub fn is_faulted(&self) -> bool {
        self.faulted.load(Ordering::SeqCst)
    }

    /// Subscribe to status snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSnapshot> {
        self.status_tx.subscribe()
    }

    /// Subscribe to thermal images passed to
    /// [`update_from_frame`](Self::update_from_frame).
    pub fn subscribe_frames(&self) -> broadcast::Receiver<Arc<ThermalFrame>> {
        self.frame_tx.subscribe()
    }

    /// Current status.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().snapshot()
    }

    /// Apply a batch of changes and broadcast the result.
    pub fn apply(&self, command: &ControlCommand) -> ApplyReport {
        let report = self.session.lock().apply(command);
        let _ = self.status_tx.send(report.snapshot.clone());
        report
    }

    /// Feed a sensor reading and broadcast the result.
    pub fn update_temperature(&self, celsius: f64) -> Result<()> {
        let snapshot = {
            let mut session = self.session.lock();
            session.set_temperature(celsius)?;
            session.snapshot()
        };
        let _ = self.status_tx.send(snapshot);
        Ok(())
    }

    /// Feed the hottest pixel of a thermal frame, then publish the whole
    /// image to frame subscribers.
    pub fn update_from_frame(&self, frame: &ThermalFrame) -> Result<()> {
        self.update_temperature(frame.hottest())?;
        let _ = self.frame_tx.send(Arc::new(frame.clone()));
        Ok(())
    }

    /// Run a closure with exclusive access to the session.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut CookSession<P, C>) -> R) -> R {
        f(&mut self.session.lock())
    }
}

impl<P, C> Drop for Controller<P, C> {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.background_handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::gpio::{LineProbe, Relay, SimulatedLine};
    use crate::session::RunState;
    use crate::waveform::{duty_channel, DutyCycleReceiver};
    use tokio_test::{assert_err, assert_ok};

    struct Rig {
        controller: Controller<SimulatedLine, Arc<ManualClock>>,
        clock: Arc<ManualClock>,
        magnetron: LineProbe,
        _duty_rx: DutyCycleReceiver,
    }

    fn rig(tick_interval: Duration) -> Rig {
        let (m, magnetron) = SimulatedLine::new("magnetron");
        let (a, _) = SimulatedLine::new("auxiliary");
        let (tx, rx) = duty_channel();
        let clock = Arc::new(ManualClock::starting_now());
        let session = CookSession::new(
            Relay::active_high("magnetron", m).unwrap(),
            Relay::active_high("auxiliary", a).unwrap(),
            tx,
            clock.clone(),
        );

        Rig {
            controller: Controller::new(session, tick_interval),
            clock,
            magnetron,
            _duty_rx: rx,
        }
    }

    #[tokio::test]
    async fn test_apply_broadcasts() {
        let rig = rig(Duration::from_secs(1));
        let mut rx = rig.controller.subscribe();

        let report = rig
            .controller
            .apply(&ControlCommand::new().power(50.0).state("temperature"));
        assert!(report.is_ok());

        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.run_state, RunState::Temperature);
        assert_eq!(snapshot.power_percent, 50.0);
        assert!(rig.magnetron.is_high());
    }

    #[tokio::test]
    async fn test_frame_stops_temperature_cook() {
        let rig = rig(Duration::from_secs(1));
        rig.controller
            .apply(&ControlCommand::new().target_temperature(70.0).state("temperature"));

        assert_ok!(rig.controller.update_from_frame(&ThermalFrame::simulated()));
        assert_eq!(rig.controller.snapshot().run_state, RunState::Stopped);
        assert_eq!(rig.controller.snapshot().temperature_c, 79.0);
        assert!(!rig.magnetron.is_high());
    }

    #[tokio::test]
    async fn test_frame_reaches_image_subscribers() {
        let rig = rig(Duration::from_secs(1));
        let mut frames = rig.controller.subscribe_frames();
        let mut status = rig.controller.subscribe();

        let frame = ThermalFrame::simulated();
        assert_ok!(rig.controller.update_from_frame(&frame));

        let received = frames.recv().await.unwrap();
        assert_eq!(*received, frame);
        assert_eq!(status.recv().await.unwrap().temperature_c, frame.hottest());

        // Only frames go out on the image channel
        rig.controller.update_temperature(20.0).unwrap();
        assert!(frames.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_paced_by_ticks_and_frames() {
        let rig = rig(Duration::from_secs(1));
        rig.controller
            .apply(&ControlCommand::new().time(60.0).state("time"));
        let mut status = rig.controller.subscribe();
        assert_ok!(rig.controller.start());

        let mut sensor = tokio::time::interval(Duration::from_secs(1));
        sensor.tick().await;
        for _ in 0..5 {
            sensor.tick().await;
            rig.controller
                .update_from_frame(&ThermalFrame::simulated())
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;

        let mut received = 0;
        while status.try_recv().is_ok() {
            received += 1;
        }
        // Five ticks plus five frames, nothing more
        assert_eq!(received, 10);

        rig.controller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_stop_time_cook() {
        let rig = rig(Duration::from_secs(1));
        rig.controller
            .apply(&ControlCommand::new().time(3.0).state("time"));

        let mut rx = rig.controller.subscribe();
        assert_ok!(rig.controller.start());
        assert!(rig.controller.is_running());

        for _ in 0..2 {
            rig.clock.advance_secs(1);
            let snapshot = rx.recv().await.unwrap();
            assert_eq!(snapshot.run_state, RunState::Time);
        }

        rig.clock.advance_secs(1);
        let snapshot = rx.recv().await.unwrap();
        assert_eq!(snapshot.run_state, RunState::Stopped);
        assert_eq!(snapshot.time_remaining_seconds, None);

        rig.controller.stop().await;
        assert!(!rig.controller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hardware_fault_stops_controller() {
        let rig = rig(Duration::from_millis(100));
        rig.controller
            .apply(&ControlCommand::new().time(1.0).state("time"));
        assert_ok!(rig.controller.start());

        rig.magnetron.disconnect();
        rig.clock.advance_secs(5);

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert!(rig.controller.is_faulted());
        assert!(!rig.controller.is_running());
        assert_err!(rig.controller.start());
    }

    #[tokio::test]
    async fn test_start_twice_is_harmless() {
        let rig = rig(Duration::from_secs(1));
        assert_ok!(rig.controller.start());
        assert_ok!(rig.controller.start());
        rig.controller.stop().await;
        rig.controller.stop().await;
        assert!(!rig.controller.is_running());
    }

    #[tokio::test]
    async fn test_with_session() {
        let rig = rig(Duration::from_secs(1));
        let power = rig.controller.with_session(|s| {
            s.set_power(30.0).unwrap();
            s.power_percent()
        });
        assert_eq!(power, 30.0);
    }
}
