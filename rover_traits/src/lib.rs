//! Hardware abstraction seams for the rover.
//!
//! The controller in `rover_core` only talks to peripherals through these
//! traits. Every fallible call returns a boxed error so backends can surface
//! whatever their driver produces; `rover_core::hw_error` maps it back to a
//! typed error.

pub mod clock;
pub mod melody;

pub use clock::{Clock, MonotonicClock, SimClock};
pub use melody::{Melody, MelodyParseError, Note, Pitch, PlayMode};

pub type HalError = Box<dyn std::error::Error + Send + Sync>;
pub type HalResult<T> = Result<T, HalError>;

/// One side of the chassis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Which motor(s) a drive command addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorSelect {
    Left,
    Right,
    Both,
}

impl From<Side> for MotorSelect {
    fn from(side: Side) -> Self {
        match side {
            Side::Left => MotorSelect::Left,
            Side::Right => MotorSelect::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Operator inputs that can produce calibration commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputId {
    ButtonA,
    ButtonB,
    Shake,
}

/// Callback run on an input edge. Runs on whatever thread the backend
/// delivers edges on, so it must be quick and must not block.
pub type EdgeHandler = Box<dyn Fn() + Send + Sync + 'static>;

/// Forward-facing range sensor.
pub trait RangeSensor {
    /// One raw distance sample in centimeters. Timeouts may show up as
    /// implausible values rather than errors.
    fn ping_cm(&mut self) -> HalResult<f32>;
}

/// Pair of ground-facing edge/line sensors.
pub trait EdgeSensors {
    /// `0` means no ground (edge or obstacle), anything else means ground.
    fn read_edge(&mut self, side: Side) -> HalResult<u8>;
}

pub trait MotorDriver {
    fn drive(&mut self, motors: MotorSelect, direction: Direction, speed: u8) -> HalResult<()>;
    fn stop_all(&mut self) -> HalResult<()>;
}

/// Visual feedback: a proximity bar, short numbers, a reset glyph and a
/// single colour pixel.
pub trait Indicator {
    fn show_proximity(&mut self, value_cm: f32, max_cm: f32) -> HalResult<()>;
    fn show_number(&mut self, n: i32) -> HalResult<()>;
    fn show_reset(&mut self) -> HalResult<()>;
    fn show_color(&mut self, rgb: Rgb) -> HalResult<()>;
    fn clear(&mut self) -> HalResult<()>;
}

pub trait Sounder {
    fn play(&mut self, melody: &Melody, mode: PlayMode) -> HalResult<()>;
    fn stop(&mut self) -> HalResult<()>;
}

/// Registers asynchronous producers for operator inputs.
pub trait InputEdges {
    fn on_edge(&mut self, input: InputId, handler: EdgeHandler) -> HalResult<()>;
}
