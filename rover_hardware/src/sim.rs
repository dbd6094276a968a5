//! Simulated rover: a walled rectangular arena with an optional drop-off
//! hole, and a differential-drive chassis whose pose is integrated on the
//! shared clock.
//!
//! All peripherals created from one [`SimWorld`] see the same world. Pose
//! is brought up to date lazily, whenever a peripheral is touched.

use std::cell::RefCell;
use std::collections::HashMap;
use std::f32::consts::TAU;
use std::io::BufRead;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rover_traits::clock::Clock;
use rover_traits::{
    Direction, EdgeHandler, EdgeSensors, HalResult, Indicator, InputEdges, InputId, MotorDriver,
    MotorSelect, RangeSensor, Rgb, Side,
};

use crate::util::echo_time;

/// Distance from the chassis centre to the range sensor.
const NOSE_CM: f32 = 5.0;
/// Edge sensors sit this far ahead of the centre...
const EDGE_AHEAD_CM: f32 = 4.0;
/// ...and this far either side of the centre line.
const EDGE_SPREAD_CM: f32 = 3.0;
/// The chassis centre never gets closer than this to a wall.
const BODY_RADIUS_CM: f32 = 6.0;
const MIN_RANGE_CM: f32 = 2.0;
const MAX_RANGE_CM: f32 = 400.0;
const MIN_ECHO: Duration = Duration::from_millis(2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldCfg {
    pub arena_cm: [f32; 2],
    /// `[x, y, w, h]`; `None` or an empty rectangle means no hole.
    pub hole: Option<[f32; 4]>,
    /// `[x, y, heading_deg]`, heading 0 along +x, counter-clockwise.
    pub start: [f32; 3],
    pub cm_per_s_per_speed: f32,
    pub wheel_base_cm: f32,
}

impl Default for WorldCfg {
    fn default() -> Self {
        Self {
            arena_cm: [200.0, 150.0],
            hole: Some([120.0, 40.0, 40.0, 30.0]),
            start: [40.0, 75.0, 0.0],
            cm_per_s_per_speed: 0.5,
            wheel_base_cm: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    /// Radians in `[0, TAU)`.
    pub heading: f32,
}

struct World {
    cfg: WorldCfg,
    pose: Pose,
    /// Signed wheel commands, left then right.
    wheels: [f32; 2],
    last: Instant,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl World {
    fn integrate(&mut self) {
        let now = self.clock.now();
        let dt = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        if dt <= 0.0 {
            return;
        }
        let k = self.cfg.cm_per_s_per_speed;
        let (vl, vr) = (self.wheels[0] * k, self.wheels[1] * k);
        let v = (vl + vr) / 2.0;
        let w = (vr - vl) / self.cfg.wheel_base_cm.max(f32::EPSILON);
        let mid = self.pose.heading + w * dt / 2.0;
        let [aw, ah] = self.cfg.arena_cm;
        let p = &mut self.pose;
        p.x = (p.x + v * mid.cos() * dt).clamp(BODY_RADIUS_CM, aw - BODY_RADIUS_CM);
        p.y = (p.y + v * mid.sin() * dt).clamp(BODY_RADIUS_CM, ah - BODY_RADIUS_CM);
        p.heading = (p.heading + w * dt).rem_euclid(TAU);
    }

    /// Ray from the nose to the first wall. The hole is a drop, not an
    /// obstacle, so it never echoes.
    fn range_cm(&self) -> f32 {
        let Pose { x, y, heading } = self.pose;
        let (dx, dy) = (heading.cos(), heading.sin());
        let [aw, ah] = self.cfg.arena_cm;
        let hit = |pos: f32, dir: f32, far: f32| {
            if dir > 1e-6 {
                (far - pos) / dir
            } else if dir < -1e-6 {
                -pos / dir
            } else {
                f32::INFINITY
            }
        };
        let t = hit(x, dx, aw).min(hit(y, dy, ah));
        (t - NOSE_CM).clamp(MIN_RANGE_CM, MAX_RANGE_CM)
    }

    fn ground_at(&self, px: f32, py: f32) -> bool {
        let [aw, ah] = self.cfg.arena_cm;
        if px < 0.0 || py < 0.0 || px > aw || py > ah {
            return false;
        }
        match self.cfg.hole {
            Some([hx, hy, hw, hh]) if hw > 0.0 && hh > 0.0 => {
                !(px >= hx && px <= hx + hw && py >= hy && py <= hy + hh)
            }
            _ => true,
        }
    }

    fn edge(&self, side: Side) -> u8 {
        let Pose { x, y, heading } = self.pose;
        let lateral = match side {
            Side::Left => EDGE_SPREAD_CM,
            Side::Right => -EDGE_SPREAD_CM,
        };
        let (c, s) = (heading.cos(), heading.sin());
        let px = x + EDGE_AHEAD_CM * c - lateral * s;
        let py = y + EDGE_AHEAD_CM * s + lateral * c;
        u8::from(self.ground_at(px, py))
    }
}

/// Handle on a shared simulated world.
#[derive(Clone)]
pub struct SimWorld(Rc<RefCell<World>>);

impl SimWorld {
    pub fn new(cfg: WorldCfg, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        let [x, y, deg] = cfg.start;
        let world = World {
            cfg,
            pose: Pose {
                x,
                y,
                heading: deg.to_radians().rem_euclid(TAU),
            },
            wheels: [0.0; 2],
            last: clock.now(),
            clock,
        };
        Self(Rc::new(RefCell::new(world)))
    }

    /// Current pose, integrated up to now.
    pub fn pose(&self) -> Pose {
        let mut w = self.0.borrow_mut();
        w.integrate();
        w.pose
    }

    pub fn range(&self) -> SimRange {
        SimRange(self.clone())
    }

    pub fn edges(&self) -> SimEdges {
        SimEdges(self.clone())
    }

    pub fn motors(&self) -> SimMotors {
        SimMotors(self.clone())
    }
}

/// Ultrasonic sensor model. Each ping costs the round-trip echo time (at
/// least 2 ms) on the world clock.
pub struct SimRange(SimWorld);

impl RangeSensor for SimRange {
    fn ping_cm(&mut self) -> HalResult<f32> {
        let (cm, clock) = {
            let mut w = self.0.0.borrow_mut();
            w.integrate();
            (w.range_cm(), Arc::clone(&w.clock))
        };
        clock.sleep(echo_time(cm).max(MIN_ECHO));
        Ok(cm)
    }
}

pub struct SimEdges(SimWorld);

impl EdgeSensors for SimEdges {
    fn read_edge(&mut self, side: Side) -> HalResult<u8> {
        let mut w = self.0.0.borrow_mut();
        w.integrate();
        Ok(w.edge(side))
    }
}

pub struct SimMotors(SimWorld);

impl MotorDriver for SimMotors {
    fn drive(&mut self, motors: MotorSelect, direction: Direction, speed: u8) -> HalResult<()> {
        let mut w = self.0.0.borrow_mut();
        w.integrate();
        let v = match direction {
            Direction::Forward => f32::from(speed),
            Direction::Reverse => -f32::from(speed),
        };
        match motors {
            MotorSelect::Left => w.wheels[0] = v,
            MotorSelect::Right => w.wheels[1] = v,
            MotorSelect::Both => w.wheels = [v, v],
        }
        Ok(())
    }

    fn stop_all(&mut self) -> HalResult<()> {
        let mut w = self.0.0.borrow_mut();
        w.integrate();
        w.wheels = [0.0; 2];
        Ok(())
    }
}

/// Indicator that renders into the log.
#[derive(Debug, Default)]
pub struct LogIndicator;

const BAR_CELLS: usize = 5;

fn bar(value: f32, max: f32) -> String {
    let frac = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lit = ((frac * BAR_CELLS as f32).ceil() as usize).min(BAR_CELLS);
    format!("{}{}", "#".repeat(lit), ".".repeat(BAR_CELLS - lit))
}

impl Indicator for LogIndicator {
    fn show_proximity(&mut self, value_cm: f32, max_cm: f32) -> HalResult<()> {
        tracing::debug!(value_cm, bar = %bar(value_cm, max_cm), "proximity");
        Ok(())
    }

    fn show_number(&mut self, n: i32) -> HalResult<()> {
        tracing::info!(n, "display");
        Ok(())
    }

    fn show_reset(&mut self) -> HalResult<()> {
        tracing::info!("display: trim reset");
        Ok(())
    }

    fn show_color(&mut self, rgb: Rgb) -> HalResult<()> {
        tracing::trace!(r = rgb.r, g = rgb.g, b = rgb.b, "pixel");
        Ok(())
    }

    fn clear(&mut self) -> HalResult<()> {
        tracing::trace!("display cleared");
        Ok(())
    }
}

/// Operator inputs typed on a terminal: `a`, `b` and `s` (shake), one per
/// line.
#[derive(Clone, Default)]
pub struct SimInputs {
    handlers: Arc<Mutex<HashMap<InputId, EdgeHandler>>>,
}

impl SimInputs {
    pub fn parse_line(line: &str) -> Option<InputId> {
        match line.trim().to_ascii_lowercase().as_str() {
            "a" => Some(InputId::ButtonA),
            "b" => Some(InputId::ButtonB),
            "s" | "shake" => Some(InputId::Shake),
            _ => None,
        }
    }

    /// Fire the handler registered for `input`. Returns whether one ran.
    pub fn trigger(&self, input: InputId) -> bool {
        let handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        handlers.get(&input).map(|h| h()).is_some()
    }

    /// Trigger an input for every recognised line of `reader`. Returns the
    /// number of inputs fired.
    pub fn feed(&self, reader: impl BufRead) -> usize {
        let mut fired = 0;
        for line in reader.lines() {
            let Ok(line) = line else { break };
            match Self::parse_line(&line) {
                Some(input) if self.trigger(input) => fired += 1,
                Some(input) => tracing::debug!(?input, "input not bound"),
                None if line.trim().is_empty() => {}
                None => tracing::warn!(%line, "unknown input (use a, b or s)"),
            }
        }
        fired
    }

    /// Read inputs from stdin on a background thread for the life of the
    /// process.
    pub fn spawn_stdin_reader(&self) -> std::io::Result<JoinHandle<()>> {
        let inputs = self.clone();
        std::thread::Builder::new()
            .name("sim-inputs".into())
            .spawn(move || {
                let n = inputs.feed(std::io::stdin().lock());
                tracing::debug!(fired = n, "stdin closed");
            })
    }
}

impl InputEdges for SimInputs {
    fn on_edge(&mut self, input: InputId, handler: EdgeHandler) -> HalResult<()> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(input, handler);
        Ok(())
    }
}
