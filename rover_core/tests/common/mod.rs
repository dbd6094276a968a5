//! Scripted and recording peripherals for driving a `Rover` on simulated
//! time.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rover_core::{BehaviorCfg, CommandQueue, Rover};
use rover_traits::{
    Direction, EdgeHandler, EdgeSensors, HalResult, Indicator, InputEdges, InputId, Melody,
    MotorDriver, MotorSelect, PlayMode, RangeSensor, Rgb, Side, SimClock, Sounder,
};

type Shared<T> = Arc<Mutex<T>>;

/// Range sensor replaying a script; `None` entries fail the ping. Once the
/// script runs out every ping returns `fallback`.
pub struct ScriptedRange {
    script: VecDeque<Option<f32>>,
    fallback: f32,
}

impl ScriptedRange {
    pub fn new(script: impl IntoIterator<Item = Option<f32>>, fallback: f32) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback,
        }
    }

    /// `n` copies of `cm`, repeated for each `(cm, n)` batch.
    pub fn batches(batches: &[(f32, usize)], fallback: f32) -> Self {
        let script = batches
            .iter()
            .flat_map(|&(cm, n)| std::iter::repeat_n(Some(cm), n));
        Self::new(script, fallback)
    }
}

impl RangeSensor for ScriptedRange {
    fn ping_cm(&mut self) -> HalResult<f32> {
        match self.script.pop_front() {
            Some(Some(v)) => Ok(v),
            Some(None) => Err(Box::new(std::io::Error::other("echo timeout"))),
            None => Ok(self.fallback),
        }
    }
}

/// Edge sensors replaying `(left, right)` pairs. A left read advances the
/// script; the following right read returns the same pair's right value.
pub struct ScriptedEdges {
    script: VecDeque<(u8, u8)>,
    current: (u8, u8),
    fallback: (u8, u8),
    fail: bool,
}

impl ScriptedEdges {
    pub fn new(script: impl IntoIterator<Item = (u8, u8)>, fallback: (u8, u8)) -> Self {
        Self {
            script: script.into_iter().collect(),
            current: fallback,
            fallback,
            fail: false,
        }
    }

    pub fn clear() -> Self {
        Self::new([], (1, 1))
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::clear()
        }
    }
}

impl EdgeSensors for ScriptedEdges {
    fn read_edge(&mut self, side: Side) -> HalResult<u8> {
        if self.fail {
            return Err(Box::new(std::io::Error::other("line sensor bus error")));
        }
        match side {
            Side::Left => {
                self.current = self.script.pop_front().unwrap_or(self.fallback);
                Ok(self.current.0)
            }
            Side::Right => Ok(self.current.1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCall {
    Drive(MotorSelect, Direction, u8),
    Stop,
}

/// Motor driver recording every call with the simulated time it happened.
#[derive(Clone)]
pub struct RecordingMotors {
    pub calls: Shared<Vec<(Duration, MotorCall)>>,
    clock: SimClock,
}

impl RecordingMotors {
    pub fn new(clock: &SimClock) -> Self {
        Self {
            calls: Arc::default(),
            clock: clock.clone(),
        }
    }

    pub fn calls(&self) -> Vec<MotorCall> {
        self.calls.lock().unwrap().iter().map(|(_, c)| *c).collect()
    }

    pub fn timed(&self) -> Vec<(Duration, MotorCall)> {
        self.calls.lock().unwrap().clone()
    }
}

impl MotorDriver for RecordingMotors {
    fn drive(&mut self, motors: MotorSelect, direction: Direction, speed: u8) -> HalResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((self.clock.elapsed(), MotorCall::Drive(motors, direction, speed)));
        Ok(())
    }

    fn stop_all(&mut self) -> HalResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((self.clock.elapsed(), MotorCall::Stop));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Proximity(f32),
    Number(i32),
    Reset,
    Color,
    Clear,
}

/// Indicator recording what was drawn. An optional hook runs on every
/// `show_number`, which lets a test queue commands mid-calibration.
#[derive(Clone, Default)]
pub struct RecordingIndicator {
    pub shown: Shared<Vec<Shown>>,
    on_number: Option<Arc<dyn Fn(i32) + Send + Sync>>,
}

impl RecordingIndicator {
    pub fn with_number_hook(hook: impl Fn(i32) + Send + Sync + 'static) -> Self {
        Self {
            shown: Arc::default(),
            on_number: Some(Arc::new(hook)),
        }
    }

    pub fn numbers(&self) -> Vec<i32> {
        self.shown
            .lock()
            .unwrap()
            .iter()
            .filter_map(|s| match s {
                Shown::Number(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn resets(&self) -> usize {
        self.shown
            .lock()
            .unwrap()
            .iter()
            .filter(|s| **s == Shown::Reset)
            .count()
    }
}

impl Indicator for RecordingIndicator {
    fn show_proximity(&mut self, value_cm: f32, _max_cm: f32) -> HalResult<()> {
        self.shown.lock().unwrap().push(Shown::Proximity(value_cm));
        Ok(())
    }
    fn show_number(&mut self, n: i32) -> HalResult<()> {
        self.shown.lock().unwrap().push(Shown::Number(n));
        if let Some(hook) = &self.on_number {
            hook(n);
        }
        Ok(())
    }
    fn show_reset(&mut self) -> HalResult<()> {
        self.shown.lock().unwrap().push(Shown::Reset);
        Ok(())
    }
    fn show_color(&mut self, _rgb: Rgb) -> HalResult<()> {
        self.shown.lock().unwrap().push(Shown::Color);
        Ok(())
    }
    fn clear(&mut self) -> HalResult<()> {
        self.shown.lock().unwrap().push(Shown::Clear);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    Play(String, PlayMode),
    Stop,
}

#[derive(Clone, Default)]
pub struct RecordingSounder {
    pub cues: Shared<Vec<Cue>>,
}

impl RecordingSounder {
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().unwrap().clone()
    }
}

impl Sounder for RecordingSounder {
    fn play(&mut self, melody: &Melody, mode: PlayMode) -> HalResult<()> {
        self.cues
            .lock()
            .unwrap()
            .push(Cue::Play(melody.to_string(), mode));
        Ok(())
    }
    fn stop(&mut self) -> HalResult<()> {
        self.cues.lock().unwrap().push(Cue::Stop);
        Ok(())
    }
}

/// Input backend that hands registered handlers back to the test.
#[derive(Clone, Default)]
pub struct ManualInputs {
    pub handlers: Shared<HashMap<InputId, EdgeHandler>>,
}

impl ManualInputs {
    pub fn press(&self, input: InputId) {
        if let Some(h) = self.handlers.lock().unwrap().get(&input) {
            h();
        }
    }
}

impl InputEdges for ManualInputs {
    fn on_edge(&mut self, input: InputId, handler: EdgeHandler) -> HalResult<()> {
        self.handlers.lock().unwrap().insert(input, handler);
        Ok(())
    }
}

/// A rover wired to recording doubles on a shared simulated clock.
pub struct Rig {
    pub rover: Rover,
    pub clock: SimClock,
    pub motors: RecordingMotors,
    pub indicator: RecordingIndicator,
    pub sounder: RecordingSounder,
    pub queue: Arc<CommandQueue>,
}

pub fn rig(range: ScriptedRange, edges: ScriptedEdges) -> Rig {
    rig_with(range, edges, BehaviorCfg::default(), RecordingIndicator::default())
}

pub fn rig_with(
    range: ScriptedRange,
    edges: ScriptedEdges,
    cfg: BehaviorCfg,
    indicator: RecordingIndicator,
) -> Rig {
    rig_full(range, edges, cfg, indicator, Arc::new(CommandQueue::new()))
}

pub fn rig_full(
    range: ScriptedRange,
    edges: ScriptedEdges,
    cfg: BehaviorCfg,
    indicator: RecordingIndicator,
    queue: Arc<CommandQueue>,
) -> Rig {
    let clock = SimClock::new();
    let motors = RecordingMotors::new(&clock);
    let sounder = RecordingSounder::default();
    let rover = Rover::builder()
        .with_range(range)
        .with_edges(edges)
        .with_motors(motors.clone())
        .with_indicator(indicator.clone())
        .with_sounder(sounder.clone())
        .with_clock(Arc::new(clock.clone()))
        .with_command_queue(Arc::clone(&queue))
        .with_config(cfg)
        .with_seed(7)
        .build()
        .expect("rig builds");
    Rig {
        rover,
        clock,
        motors,
        indicator,
        sounder,
        queue,
    }
}

/// Motor calls after the `n`th recorded one.
pub fn calls_after(motors: &RecordingMotors, n: usize) -> Vec<MotorCall> {
    motors.calls().into_iter().skip(n).collect()
}

/// Lengths of in-place rotations: time from a drive that follows a stop (or
/// starts the log) to the next stop.
pub fn sweep_lengths(timed: &[(Duration, MotorCall)]) -> Vec<Duration> {
    let mut out = Vec::new();
    let mut started: Option<Duration> = None;
    let mut prev_was_stop = true;
    for (t, call) in timed {
        match call {
            MotorCall::Drive(..) => {
                if prev_was_stop {
                    started = Some(*t);
                }
                prev_was_stop = false;
            }
            MotorCall::Stop => {
                if let Some(s) = started.take() {
                    out.push(*t - s);
                }
                prev_was_stop = true;
            }
        }
    }
    out
}
