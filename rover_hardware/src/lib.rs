//! Peripheral backends for the rover.
//!
//! The simulator is always available and is what the CLI uses unless the
//! `hardware` feature is enabled. The Raspberry Pi drivers live in [`gpio`].

pub mod buzzer;
pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;
pub mod sim;
pub mod util;

pub use buzzer::{BuzzerSounder, LogTone, ToneOutput};
pub use error::HwError;
pub use sim::{LogIndicator, SimEdges, SimInputs, SimMotors, SimRange, SimWorld, WorldCfg};

/// Stops every motor from outside the control thread. Used by the Ctrl-C
/// handler while the controller is blocked in a pause.
pub type KillSwitch = Box<dyn Fn() + Send + Sync + 'static>;
