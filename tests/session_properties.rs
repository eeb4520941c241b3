use microwave_control::{
    duty_channel, CookSession, DutyCycleReceiver, Error, LineProbe, ManualClock, Relay, RunState,
    SimulatedLine,
};
use proptest::prelude::*;
use std::sync::Arc;

struct Rig {
    session: CookSession<SimulatedLine, Arc<ManualClock>>,
    clock: Arc<ManualClock>,
    magnetron: LineProbe,
    auxiliary: LineProbe,
    _duty_rx: DutyCycleReceiver,
}

fn rig() -> Rig {
    let (m, magnetron) = SimulatedLine::new("magnetron");
    let (a, auxiliary) = SimulatedLine::new("auxiliary");
    let (tx, rx) = duty_channel();
    let clock = Arc::new(ManualClock::starting_now());
    let session = CookSession::new(
        Relay::active_high("magnetron", m).unwrap(),
        Relay::active_high("auxiliary", a).unwrap(),
        tx,
        clock.clone(),
    );

    Rig {
        session,
        clock,
        magnetron,
        auxiliary,
        _duty_rx: rx,
    }
}

fn run_state() -> impl Strategy<Value = RunState> {
    prop_oneof![
        Just(RunState::Stopped),
        Just(RunState::Time),
        Just(RunState::Temperature),
    ]
}

proptest! {
    #[test]
    fn elapsed_target_in_range_is_accepted(value in 0.0f64..=3600.0) {
        let mut rig = rig();
        prop_assert!(rig.session.set_elapsed_target(value).is_ok());
        prop_assert_eq!(rig.session.snapshot().elapsed_target_seconds, value);
    }

    #[test]
    fn elapsed_target_out_of_range_is_rejected(
        value in prop_oneof![-1.0e6f64..-1.0e-9, 3600.000_001f64..1.0e6]
    ) {
        let mut rig = rig();
        rig.session.set_elapsed_target(42.0).unwrap();
        let before = rig.session.snapshot();

        let err = rig.session.set_elapsed_target(value).unwrap_err();
        let is_time_range = matches!(err, Error::OutOfRange { name: "time", .. });
        prop_assert!(is_time_range);
        prop_assert_eq!(rig.session.snapshot(), before);
    }

    #[test]
    fn target_temperature_range(value in -500.0f64..500.0) {
        let mut rig = rig();
        let before = rig.session.snapshot();
        let result = rig.session.set_target_temperature(value);

        if (20.0..=150.0).contains(&value) {
            prop_assert!(result.is_ok());
            prop_assert_eq!(rig.session.target_temperature_c(), value);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(rig.session.snapshot(), before);
        }
    }

    #[test]
    fn power_maps_to_half_duty(value in 0.0f64..=100.0) {
        let mut rig = rig();
        rig.session.set_power(value).unwrap();
        prop_assert!((rig.session.commanded_duty_cycle() - value / 200.0).abs() < 1e-12);
    }

    #[test]
    fn relays_follow_run_state(states in proptest::collection::vec(run_state(), 1..20)) {
        let mut rig = rig();
        rig.session.set_elapsed_target(600.0).unwrap();

        for state in states {
            rig.session.set_run_state(state).unwrap();
            prop_assert_eq!(rig.magnetron.is_high(), state.relays_energized());
            prop_assert_eq!(rig.auxiliary.is_high(), state.relays_energized());
            prop_assert_eq!(rig.session.time_remaining_seconds().is_some(), state == RunState::Time);
        }
    }

    #[test]
    fn time_mode_stops_exactly_at_deadline(duration in 1u32..120) {
        let mut rig = rig();
        rig.session.set_elapsed_target(duration as f64).unwrap();
        rig.session.set_run_state(RunState::Time).unwrap();

        for _ in 1..duration {
            rig.clock.advance_secs(1);
            rig.session.tick().unwrap();
            prop_assert_eq!(rig.session.run_state(), RunState::Time);
        }

        rig.clock.advance_secs(1);
        rig.session.tick().unwrap();
        prop_assert_eq!(rig.session.run_state(), RunState::Stopped);
        prop_assert!(!rig.magnetron.is_high());
    }

    #[test]
    fn shortening_below_elapsed_stops_synchronously(
        initial in 10u32..600,
        elapsed_fraction in 0.5f64..0.9,
    ) {
        let mut rig = rig();
        rig.session.set_elapsed_target(initial as f64).unwrap();
        rig.session.set_run_state(RunState::Time).unwrap();

        let elapsed = (initial as f64 * elapsed_fraction).floor() as i64;
        rig.clock.advance_secs(elapsed);
        rig.session.set_elapsed_target((elapsed / 2) as f64).unwrap();

        prop_assert_eq!(rig.session.run_state(), RunState::Stopped);
        prop_assert_eq!(rig.session.commanded_duty_cycle(), 0.0);
    }
}

#[test]
fn snapshot_twice_is_identical() {
    let mut rig = rig();
    rig.session.set_elapsed_target(30.0).unwrap();
    rig.session.set_run_state(RunState::Time).unwrap();
    rig.session.set_temperature(41.5).unwrap();

    let first = rig.session.snapshot();
    let second = rig.session.snapshot();
    pretty_assertions::assert_eq!(first, second);
}
