//! Maps `Box<dyn Error>` from trait boundaries to typed `RoverError`.
//!
//! The traits in `rover_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `rover_hardware::HwError`
//! downcasting.

use crate::error::RoverError;

/// Map a trait-boundary error to a typed `RoverError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> RoverError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<rover_hardware::error::HwError>() {
            return match hw {
                rover_hardware::error::HwError::EchoTimeout => RoverError::Timeout,
                other => RoverError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        RoverError::Timeout
    } else {
        RoverError::Hardware(s)
    }
}

/// Same as [`map_hw_error`] for the boxed form every HAL call returns.
pub(crate) fn map_hal(e: &rover_traits::HalError) -> RoverError {
    map_hw_error(&**e)
}
