mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::{
    Cue, ManualInputs, MotorCall, RecordingIndicator, ScriptedEdges, ScriptedRange, rig, rig_full,
    rig_with,
};
use proptest::prelude::*;
use rover_core::{BehaviorCfg, BehaviorState, Command, CommandQueue, InputBindings, Rover, TrimState};
use rover_traits::{InputId, PlayMode, SimClock};
use rstest::rstest;

fn idle_rig() -> common::Rig {
    rig(ScriptedRange::new([], 100.0), ScriptedEdges::clear())
}

#[rstest]
fn empty_queue_is_a_no_op() {
    let mut r = idle_rig();
    assert!(!r.rover.maybe_enter_calibration());
    assert!(r.motors.calls().is_empty());
    assert_eq!(r.clock.elapsed(), Duration::ZERO);
}

#[rstest]
fn repeated_presses_are_applied_one_by_one() {
    let mut r = idle_rig();
    for _ in 0..3 {
        r.queue.push(Command::TrimRightUp);
    }
    assert!(r.rover.maybe_enter_calibration());

    assert_eq!(r.rover.trim(), TrimState { left: 0, right: 6 });
    assert_eq!(r.indicator.numbers(), vec![62, 60, 58]);
    assert!(r.queue.is_empty());
}

#[rstest]
fn entry_stops_everything_and_exit_confirms() {
    let mut r = idle_rig();
    r.queue.push(Command::TrimLeftUp);
    r.rover.maybe_enter_calibration();

    assert_eq!(r.motors.calls(), vec![MotorCall::Stop]);
    assert_eq!(
        r.indicator.shown.lock().unwrap()[0],
        common::Shown::Clear
    );
    assert_eq!(
        r.sounder.cues(),
        vec![Cue::Stop, Cue::Play("C5:1 E5:1 G5:2".into(), PlayMode::Once)]
    );
    // Idle window from the only action, then the exit pause.
    assert_eq!(r.clock.elapsed(), Duration::from_millis(3000 + 500));
    assert_eq!(r.rover.state(), BehaviorState::Idle);
}

#[rstest]
fn reset_wins_over_increments_in_the_same_drain() {
    let mut r = idle_rig();
    r.queue.push(Command::TrimLeftUp);
    r.queue.push(Command::TrimLeftUp);
    r.rover.maybe_enter_calibration();
    assert_eq!(r.rover.trim(), TrimState { left: 4, right: 0 });

    r.queue.push(Command::TrimLeftUp);
    r.queue.push(Command::TrimRightUp);
    r.queue.push(Command::ResetTrim);
    r.rover.maybe_enter_calibration();

    assert_eq!(r.rover.trim(), TrimState::default());
    assert_eq!(r.indicator.resets(), 1);
    assert_eq!(r.indicator.numbers(), vec![62, 60]);
}

#[rstest]
fn right_beats_left_and_left_is_dropped() {
    let mut r = idle_rig();
    r.queue.push(Command::TrimLeftUp);
    r.queue.push(Command::TrimRightUp);
    r.rover.maybe_enter_calibration();
    assert_eq!(r.rover.trim(), TrimState { left: 0, right: 2 });
}

#[rstest]
fn command_queued_mid_drain_is_honored_next_poll() {
    let queue = Arc::new(CommandQueue::new());
    let once = Arc::new(AtomicBool::new(false));
    let hook_queue = Arc::clone(&queue);
    let indicator = RecordingIndicator::with_number_hook(move |_| {
        if !once.swap(true, Ordering::SeqCst) {
            hook_queue.push(Command::TrimLeftUp);
        }
    });
    let mut r = rig_full(
        ScriptedRange::new([], 100.0),
        ScriptedEdges::clear(),
        BehaviorCfg::default(),
        indicator,
        queue,
    );
    r.queue.push(Command::TrimRightUp);
    r.rover.maybe_enter_calibration();

    assert_eq!(r.rover.trim(), TrimState { left: 2, right: 2 });
    assert_eq!(r.indicator.numbers(), vec![62, 62]);
    // Second action lands one poll later and restarts the idle window.
    assert_eq!(r.clock.elapsed(), Duration::from_millis(100 + 3000 + 500));
}

#[rstest]
fn calibration_returns_to_the_calling_state() {
    let mut r = rig(
        ScriptedRange::batches(&[(10.0, 5)], 35.0),
        ScriptedEdges::clear(),
    );
    r.queue.push(Command::ResetTrim);
    r.rover.scan();
    assert_eq!(r.rover.state(), BehaviorState::Scan);
    assert_eq!(r.rover.stats().calibrations, 1);
}

#[rstest]
fn bound_inputs_feed_the_queue() {
    let clock = SimClock::new();
    let inputs = ManualInputs::default();
    let mut rover = Rover::builder()
        .with_range(ScriptedRange::new([], 100.0))
        .with_edges(ScriptedEdges::clear())
        .with_motors(common::RecordingMotors::new(&clock))
        .with_clock(Arc::new(clock.clone()))
        .with_inputs(inputs.clone(), InputBindings::default())
        .build()
        .unwrap();

    inputs.press(InputId::ButtonB);
    inputs.press(InputId::ButtonB);
    inputs.press(InputId::ButtonA);
    assert!(rover.maybe_enter_calibration());
    assert_eq!(rover.trim(), TrimState { left: 0, right: 4 });

    inputs.press(InputId::ButtonA);
    rover.maybe_enter_calibration();
    assert_eq!(rover.trim(), TrimState { left: 2, right: 4 });

    inputs.press(InputId::Shake);
    rover.maybe_enter_calibration();
    assert_eq!(rover.trim(), TrimState::default());
}

#[rstest]
fn custom_step_and_speed_are_respected() {
    let mut cfg = BehaviorCfg::default();
    cfg.drive.max_speed = 10;
    cfg.drive.slow_speed = 5;
    cfg.calibration.trim_step = 4;
    let mut r = rig_with(
        ScriptedRange::new([], 100.0),
        ScriptedEdges::clear(),
        cfg,
        RecordingIndicator::default(),
    );
    for _ in 0..3 {
        r.queue.push(Command::TrimLeftUp);
    }
    r.rover.maybe_enter_calibration();
    assert_eq!(r.rover.trim().left, 10);
    assert_eq!(r.indicator.numbers(), vec![6, 2, 0]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn trims_never_exceed_max_speed(presses in 0usize..200, step in 1u8..=16, right in any::<bool>()) {
        let mut cfg = BehaviorCfg::default();
        cfg.calibration.trim_step = step;
        let mut r = rig_with(
            ScriptedRange::new([], 100.0),
            ScriptedEdges::clear(),
            cfg,
            RecordingIndicator::default(),
        );
        let cmd = if right { Command::TrimRightUp } else { Command::TrimLeftUp };
        for _ in 0..presses {
            r.queue.push(cmd);
        }
        r.rover.maybe_enter_calibration();

        let t = r.rover.trim();
        let expected = (presses * usize::from(step)).min(64);
        let got = if right { t.right } else { t.left };
        prop_assert_eq!(usize::from(got), expected);
        prop_assert!(t.left <= 64 && t.right <= 64);
    }
}
