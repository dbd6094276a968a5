#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Reactive behavior engine for a small two-wheeled rover (hardware-agnostic).
//!
//! All peripheral access goes through the traits in `rover_traits`.
//!
//! ## Architecture
//!
//! - **Sampling**: mean-of-N distance pings (`sampler`)
//! - **Commands**: lock-free queue written by input handlers (`command`)
//! - **Trims**: per-side speed reductions (`trim`), applied by `motion`
//! - **Calibration**: queue drain sub-mode, entered from any state
//! - **Behavior**: Advance, Scan and Retreat plus the dispatch loop
//!
//! Everything mutable lives in one [`Rover`]; nothing is global.

pub mod behavior;
pub mod builder;
pub mod calibration;
pub mod command;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod motion;
pub mod rover;
pub mod sampler;
pub mod status;
pub mod trim;
pub mod types;

pub use behavior::SweepDurations;
pub use builder::{Missing, RoverBuilder, Set};
pub use command::{Command, CommandQueue, PendingCommands, bind_inputs};
pub use config::{BehaviorCfg, InputBindings};
pub use error::{BuildError, Result, RoverError};
pub use motion::{DrivePlan, MotorOutput, plan_drive};
pub use rover::Rover;
pub use sampler::{DistanceSampler, mean_cm};
pub use status::{BehaviorState, ForwardExit, RunStats};
pub use trim::TrimState;
pub use types::{EdgePair, HeadingSign, ReverseSide, choose_reverse_side};
