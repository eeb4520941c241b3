//! Duty-cycle handoff between the cook session and the generator.

use tokio::sync::watch;

use crate::utils::clamp_duty_cycle;

/// Result of a non-blocking poll on a [`DutyCycleReceiver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DutyPoll {
    /// A new duty cycle was posted since the last poll.
    Updated(f64),
    /// Nothing new.
    Unchanged,
    /// The sender is gone.
    Closed,
}

/// Sending half of the duty-cycle channel.
#[derive(Debug)]
pub struct DutyCycleSender {
    tx: watch::Sender<f64>,
}

/// Receiving half of the duty-cycle channel.
#[derive(Debug)]
pub struct DutyCycleReceiver {
    rx: watch::Receiver<f64>,
}

/// Create a duty-cycle channel. The initial duty cycle is 0.
pub fn duty_channel() -> (DutyCycleSender, DutyCycleReceiver) {
    let (tx, rx) = watch::channel(0.0);
    (DutyCycleSender { tx }, DutyCycleReceiver { rx })
}

impl DutyCycleSender {
    /// Post a new duty cycle, replacing any value not yet picked up.
    ///
    /// Values are clamped to `[0, 1]`. Posting never blocks and never fails,
    /// even if the generator has already exited.
    pub fn set_duty_cycle(&self, duty: f64) {
        self.tx.send_replace(clamp_duty_cycle(duty));
    }

    /// The most recently posted duty cycle.
    pub fn commanded(&self) -> f64 {
        *self.tx.borrow()
    }

    /// Whether the receiving generator has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl DutyCycleReceiver {
    /// Check for a new duty cycle without blocking.
    pub fn poll(&mut self) -> DutyPoll {
        match self.rx.has_changed() {
            Ok(true) => DutyPoll::Updated(*self.rx.borrow_and_update()),
            Ok(false) => DutyPoll::Unchanged,
            Err(_) => DutyPoll::Closed,
        }
    }

    /// The latest posted value, without marking it seen.
    pub fn latest(&self) -> f64 {
        *self.rx.borrow()
    }
}
