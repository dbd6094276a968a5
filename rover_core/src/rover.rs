//! The controller: every piece of mutable behavior state lives here.

use std::sync::Arc;

use rover_traits::clock::Clock;
use rover_traits::{
    Direction, EdgeSensors, Indicator, InputEdges, Melody, MotorSelect, PlayMode, Side, Sounder,
};

use crate::builder::{Missing, RoverBuilder};
use crate::command::CommandQueue;
use crate::config::BehaviorCfg;
use crate::hw_error::map_hal;
use crate::motion::MotorOutput;
use crate::sampler::DistanceSampler;
use crate::status::{BehaviorState, RunStats};
use crate::trim::TrimState;
use crate::types::{EdgePair, HeadingSign};

/// Reactive rover controller.
///
/// Owns the peripherals, the trim store, the heading sign and a handle to
/// the command queue that input handlers write into. The behavior states
/// (`advance`, `scan`, `retreat`) and the calibration sub-mode are methods on
/// this type; see `behavior` and `calibration`.
pub struct Rover {
    pub(crate) sampler: DistanceSampler,
    pub(crate) edges: Box<dyn EdgeSensors>,
    pub(crate) motors: MotorOutput,
    pub(crate) indicator: Box<dyn Indicator>,
    pub(crate) sounder: Box<dyn Sounder>,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) commands: Arc<CommandQueue>,
    /// Edge producers stay registered only while their backend handle lives.
    pub(crate) inputs: Option<Box<dyn InputEdges>>,
    pub(crate) cfg: BehaviorCfg,
    pub(crate) trim: TrimState,
    pub(crate) heading: HeadingSign,
    pub(crate) state: BehaviorState,
    pub(crate) stats: RunStats,
}

impl core::fmt::Debug for Rover {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rover")
            .field("state", &self.state)
            .field("trim", &self.trim)
            .field("heading", &self.heading)
            .field("pending", &self.commands.snapshot())
            .field("inputs_bound", &self.inputs.is_some())
            .finish_non_exhaustive()
    }
}

impl Rover {
    /// Start building a Rover.
    pub fn builder() -> RoverBuilder<Missing, Missing, Missing> {
        RoverBuilder::default()
    }

    pub fn trim(&self) -> TrimState {
        self.trim
    }

    pub fn heading(&self) -> HeadingSign {
        self.heading
    }

    pub fn state(&self) -> BehaviorState {
        self.state
    }

    /// Handle producers use to queue commands.
    pub fn command_queue(&self) -> Arc<CommandQueue> {
        Arc::clone(&self.commands)
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            samples: self.sampler.pings(),
            sensor_faults: self.sampler.faults(),
            motor_faults: self.motors.faults(),
            ..self.stats
        }
    }

    /// Best-effort stop of motors and audio.
    pub fn halt(&mut self) {
        self.motors.stop();
        self.stop_cue();
    }

    pub(crate) fn set_state(&mut self, next: BehaviorState) {
        if self.state != next {
            tracing::info!(from = ?self.state, to = ?next, "state");
            self.state = next;
        }
    }

    /// Read both ground sensors. A failed read counts as "no ground".
    pub(crate) fn read_edges(&mut self) -> EdgePair {
        let left = self.read_edge(Side::Left);
        let right = self.read_edge(Side::Right);
        let pair = EdgePair { left, right };
        tracing::debug!(left, right, "edges");
        pair
    }

    fn read_edge(&mut self, side: Side) -> u8 {
        self.edges.read_edge(side).unwrap_or_else(|e| {
            tracing::warn!(?side, error = %map_hal(&e), "edge read failed");
            0
        })
    }

    pub(crate) fn drive(&mut self, motors: MotorSelect, direction: Direction, speed: u8) {
        self.motors.drive(motors, direction, speed, &self.trim);
    }

    pub(crate) fn play_cue(&mut self, melody: &Melody, mode: PlayMode) {
        if let Err(e) = self.sounder.play(melody, mode) {
            tracing::warn!(error = %map_hal(&e), "cue failed");
        }
    }

    pub(crate) fn stop_cue(&mut self) {
        if let Err(e) = self.sounder.stop() {
            tracing::warn!(error = %map_hal(&e), "cue stop failed");
        }
    }

    pub(crate) fn show_number(&mut self, n: i32) {
        if let Err(e) = self.indicator.show_number(n) {
            tracing::warn!(error = %map_hal(&e), "display failed");
        }
    }

    pub(crate) fn show_reset(&mut self) {
        if let Err(e) = self.indicator.show_reset() {
            tracing::warn!(error = %map_hal(&e), "display failed");
        }
    }

    pub(crate) fn clear_display(&mut self) {
        if let Err(e) = self.indicator.clear() {
            tracing::warn!(error = %map_hal(&e), "display clear failed");
        }
    }

    pub(crate) fn sample(&mut self, count: u32, delay_ms: u64) -> f32 {
        self.sampler
            .sample(count, delay_ms, &*self.clock, &mut *self.indicator)
    }

    pub(crate) fn pause_ms(&self, ms: u64) {
        self.clock.pause_ms(ms);
    }
}
