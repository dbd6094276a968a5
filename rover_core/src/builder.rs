//! Type-state builder for `Rover`.
//!
//! The builder enforces at compile time that a range sensor, edge sensors and
//! a motor driver are provided before `build()` is available. `try_build()`
//! is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use rover_traits::clock::{Clock, MonotonicClock};
use rover_traits::{EdgeSensors, Indicator, InputEdges, MotorDriver, RangeSensor, Sounder};

use crate::command::{CommandQueue, bind_inputs};
use crate::config::{BehaviorCfg, InputBindings};
use crate::error::{BuildError, Result};
use crate::mocks::{NoopIndicator, NoopSounder};
use crate::motion::MotorOutput;
use crate::rover::Rover;
use crate::sampler::DistanceSampler;
use crate::status::{BehaviorState, RunStats};
use crate::trim::TrimState;
use crate::types::HeadingSign;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

#[derive(Default)]
struct Parts {
    range: Option<Box<dyn RangeSensor>>,
    edges: Option<Box<dyn EdgeSensors>>,
    motors: Option<Box<dyn MotorDriver>>,
    indicator: Option<Box<dyn Indicator>>,
    sounder: Option<Box<dyn Sounder>>,
    inputs: Option<(Box<dyn InputEdges>, InputBindings)>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    commands: Option<Arc<CommandQueue>>,
    cfg: Option<BehaviorCfg>,
    seed: Option<u64>,
}

/// Builder for `Rover`. Configuration is validated on `build()`.
pub struct RoverBuilder<R, E, M> {
    parts: Parts,
    _r: PhantomData<R>,
    _e: PhantomData<E>,
    _m: PhantomData<M>,
}

impl Default for RoverBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            parts: Parts::default(),
            _r: PhantomData,
            _e: PhantomData,
            _m: PhantomData,
        }
    }
}

impl<R, E, M> RoverBuilder<R, E, M> {
    fn retag<R2, E2, M2>(self) -> RoverBuilder<R2, E2, M2> {
        RoverBuilder {
            parts: self.parts,
            _r: PhantomData,
            _e: PhantomData,
            _m: PhantomData,
        }
    }

    /// Fallible build available in any type-state; returns detailed error for missing pieces.
    pub fn try_build(self) -> Result<Rover> {
        let p = self.parts;
        let range = p
            .range
            .ok_or_else(|| eyre::Report::new(BuildError::MissingRange))?;
        let edges = p
            .edges
            .ok_or_else(|| eyre::Report::new(BuildError::MissingEdges))?;
        let motors = p
            .motors
            .ok_or_else(|| eyre::Report::new(BuildError::MissingMotors))?;

        let cfg = p.cfg.unwrap_or_default();
        cfg.validate()
            .map_err(|msg| eyre::Report::new(BuildError::InvalidConfig(msg)))?;

        let commands = p.commands.unwrap_or_default();
        let inputs = match p.inputs {
            Some((mut inputs, bindings)) => {
                bind_inputs(&mut *inputs, &commands, bindings.as_slice())?;
                Some(inputs)
            }
            None => None,
        };

        let clock: Arc<dyn Clock + Send + Sync> = match p.clock {
            Some(c) => c,
            None => Arc::new(MonotonicClock::new()),
        };

        Ok(Rover {
            sampler: DistanceSampler::new(range, cfg.range, p.seed),
            edges,
            motors: MotorOutput::new(motors),
            indicator: p.indicator.unwrap_or_else(|| Box::new(NoopIndicator)),
            sounder: p.sounder.unwrap_or_else(|| Box::new(NoopSounder)),
            clock,
            commands,
            inputs,
            cfg,
            trim: TrimState::default(),
            heading: HeadingSign::default(),
            state: BehaviorState::Idle,
            stats: RunStats::default(),
        })
    }
}

/// Chainable setters that do not affect type-state.
impl<R, E, M> RoverBuilder<R, E, M> {
    pub fn with_indicator(mut self, indicator: impl Indicator + 'static) -> Self {
        self.parts.indicator = Some(Box::new(indicator));
        self
    }
    pub fn with_sounder(mut self, sounder: impl Sounder + 'static) -> Self {
        self.parts.sounder = Some(Box::new(sounder));
        self
    }
    /// Register input-edge producers; each bound input pushes its command
    /// into the rover's queue.
    pub fn with_inputs(mut self, inputs: impl InputEdges + 'static, bindings: InputBindings) -> Self {
        self.parts.inputs = Some((Box::new(inputs), bindings));
        self
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.parts.clock = Some(clock);
        self
    }
    pub fn with_config(mut self, cfg: BehaviorCfg) -> Self {
        self.parts.cfg = Some(cfg);
        self
    }
    /// Share an existing queue instead of creating a fresh one.
    pub fn with_command_queue(mut self, queue: Arc<CommandQueue>) -> Self {
        self.parts.commands = Some(queue);
        self
    }
    /// Seed the liveness-colour generator for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.parts.seed = Some(seed);
        self
    }
}

// Setters that advance type-state
impl<E, M> RoverBuilder<Missing, E, M> {
    pub fn with_range(mut self, range: impl RangeSensor + 'static) -> RoverBuilder<Set, E, M> {
        self.parts.range = Some(Box::new(range));
        self.retag()
    }
}

impl<R, M> RoverBuilder<R, Missing, M> {
    pub fn with_edges(mut self, edges: impl EdgeSensors + 'static) -> RoverBuilder<R, Set, M> {
        self.parts.edges = Some(Box::new(edges));
        self.retag()
    }
}

impl<R, E> RoverBuilder<R, E, Missing> {
    pub fn with_motors(mut self, motors: impl MotorDriver + 'static) -> RoverBuilder<R, E, Set> {
        self.parts.motors = Some(Box::new(motors));
        self.retag()
    }
}

impl RoverBuilder<Set, Set, Set> {
    /// Infallible by type-state except for config validation.
    pub fn build(self) -> Result<Rover> {
        self.try_build()
    }
}
