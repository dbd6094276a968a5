use std::sync::Arc;
use std::time::Duration;

use rover_hardware::sim::{Pose, SimWorld, WorldCfg};
use rover_hardware::SimInputs;
use rover_traits::{
    Direction, EdgeSensors, InputEdges, InputId, MotorDriver, MotorSelect, RangeSensor, Side,
    SimClock,
};
use rstest::rstest;

fn world(cfg: WorldCfg) -> (SimWorld, SimClock) {
    let clock = SimClock::new();
    (SimWorld::new(cfg, Arc::new(clock.clone())), clock)
}

fn no_hole() -> WorldCfg {
    WorldCfg {
        hole: None,
        ..WorldCfg::default()
    }
}

#[rstest]
fn straight_drive_covers_speed_times_time() {
    let (w, clock) = world(no_hole());
    let mut motors = w.motors();
    motors.drive(MotorSelect::Both, Direction::Forward, 64).unwrap();
    clock.advance(Duration::from_secs(1));
    let Pose { x, y, .. } = w.pose();
    assert!((x - 72.0).abs() < 0.01, "x = {x}");
    assert!((y - 75.0).abs() < 0.01);

    motors.stop_all().unwrap();
    clock.advance(Duration::from_secs(1));
    assert!((w.pose().x - 72.0).abs() < 0.01);
}

#[rstest]
fn opposite_wheels_spin_in_place() {
    let (w, clock) = world(no_hole());
    let mut motors = w.motors();
    motors.drive(MotorSelect::Right, Direction::Forward, 64).unwrap();
    motors.drive(MotorSelect::Left, Direction::Reverse, 64).unwrap();
    clock.advance(Duration::from_millis(500));
    let p = w.pose();
    assert!((p.x - 40.0).abs() < 0.01 && (p.y - 75.0).abs() < 0.01);
    // 64 cm/s differential over a 10 cm base: 6.4 rad/s, counter-clockwise.
    assert!((p.heading - 3.2).abs() < 0.01, "heading = {}", p.heading);
}

#[rstest]
fn range_measures_to_the_facing_wall_and_costs_echo_time() {
    let (w, clock) = world(no_hole());
    let mut range = w.range();
    let cm = range.ping_cm().unwrap();
    // Wall at x = 200, nose 5 cm ahead of the centre at x = 40.
    assert!((cm - 155.0).abs() < 0.01);
    assert!(clock.elapsed() >= Duration::from_millis(2));
}

#[rstest]
fn walls_stop_the_chassis() {
    let (w, clock) = world(no_hole());
    w.motors().drive(MotorSelect::Both, Direction::Forward, 255).unwrap();
    clock.advance(Duration::from_secs(10));
    assert!(w.pose().x <= 200.0);
    assert!((w.range().ping_cm().unwrap() - 2.0).abs() < 0.01);
}

#[rstest]
#[case::left_over_hole([20.0, 70.0, 0.0], (0, 1))]
#[case::right_over_hole([20.0, 80.0, 0.0], (1, 0))]
#[case::both_over_hole([20.0, 75.0, 0.0], (0, 0))]
#[case::clear([60.0, 75.0, 0.0], (1, 1))]
fn edge_sensors_see_the_hole(#[case] start: [f32; 3], #[case] expected: (u8, u8)) {
    // Hole spans x 22..26, y 72..78; sensors sit 4 cm ahead, 3 cm either side.
    let cfg = WorldCfg {
        hole: Some([22.0, 72.0, 4.0, 6.0]),
        start,
        ..WorldCfg::default()
    };
    let (w, _) = world(cfg);
    let mut edges = w.edges();
    let got = (
        edges.read_edge(Side::Left).unwrap(),
        edges.read_edge(Side::Right).unwrap(),
    );
    assert_eq!(got, expected);
}

#[rstest]
fn empty_hole_is_disabled() {
    let cfg = WorldCfg {
        hole: Some([0.0; 4]),
        start: [10.0, 10.0, 0.0],
        ..WorldCfg::default()
    };
    let (w, _) = world(cfg);
    assert_eq!(w.edges().read_edge(Side::Left).unwrap(), 1);
}

#[rstest]
fn stdin_lines_fire_bound_inputs() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let hits = Arc::new(AtomicUsize::new(0));
    let mut inputs = SimInputs::default();
    let h = Arc::clone(&hits);
    inputs
        .on_edge(InputId::ButtonA, Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();

    let fired = inputs.feed("a\n\nb\nzzz\nA\n".as_bytes());
    assert_eq!(fired, 2);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
