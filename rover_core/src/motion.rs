//! Motor output with trim compensation.

use rover_traits::{Direction, MotorDriver, MotorSelect};

use crate::hw_error::map_hal;
use crate::trim::TrimState;

/// What actually reaches the motor driver for one drive request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrivePlan {
    /// One command, speed unchanged.
    Uniform {
        motors: MotorSelect,
        direction: Direction,
        speed: u8,
    },
    /// Both motors forward, each with its own trimmed speed.
    Split { left: u8, right: u8 },
}

/// Apply trims to a drive request.
///
/// Only both-motors-forward with at least one non-zero trim is compensated;
/// each side gets `speed - trim`, floored at zero. Everything else passes
/// through.
pub fn plan_drive(motors: MotorSelect, direction: Direction, speed: u8, trim: &TrimState) -> DrivePlan {
    if motors == MotorSelect::Both && direction == Direction::Forward && trim.is_active() {
        DrivePlan::Split {
            left: speed.saturating_sub(trim.left),
            right: speed.saturating_sub(trim.right),
        }
    } else {
        DrivePlan::Uniform {
            motors,
            direction,
            speed,
        }
    }
}

/// Owns the motor driver. Failures are logged and counted, never raised, so
/// the behavior loop keeps running.
pub struct MotorOutput {
    driver: Box<dyn MotorDriver>,
    faults: u64,
}

impl core::fmt::Debug for MotorOutput {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MotorOutput")
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}

impl MotorOutput {
    pub fn new(driver: Box<dyn MotorDriver>) -> Self {
        Self { driver, faults: 0 }
    }

    pub fn drive(&mut self, motors: MotorSelect, direction: Direction, speed: u8, trim: &TrimState) {
        match plan_drive(motors, direction, speed, trim) {
            DrivePlan::Uniform {
                motors,
                direction,
                speed,
            } => self.send(motors, direction, speed),
            DrivePlan::Split { left, right } => {
                self.send(MotorSelect::Left, Direction::Forward, left);
                self.send(MotorSelect::Right, Direction::Forward, right);
            }
        }
    }

    pub fn stop(&mut self) {
        tracing::trace!("motors stop");
        if let Err(e) = self.driver.stop_all() {
            self.faults += 1;
            tracing::warn!(error = %map_hal(&e), "motor stop failed");
        }
    }

    /// Driver calls that failed since construction.
    pub fn faults(&self) -> u64 {
        self.faults
    }

    fn send(&mut self, motors: MotorSelect, direction: Direction, speed: u8) {
        tracing::trace!(?motors, ?direction, speed, "motor drive");
        if let Err(e) = self.driver.drive(motors, direction, speed) {
            self.faults += 1;
            tracing::warn!(?motors, error = %map_hal(&e), "motor drive failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_trim_passes_through() {
        let plan = plan_drive(
            MotorSelect::Both,
            Direction::Forward,
            64,
            &TrimState::default(),
        );
        assert_eq!(
            plan,
            DrivePlan::Uniform {
                motors: MotorSelect::Both,
                direction: Direction::Forward,
                speed: 64
            }
        );
    }

    #[test]
    fn reverse_and_single_motor_ignore_trim() {
        let t = TrimState { left: 6, right: 2 };
        assert!(matches!(
            plan_drive(MotorSelect::Both, Direction::Reverse, 32, &t),
            DrivePlan::Uniform { speed: 32, .. }
        ));
        assert!(matches!(
            plan_drive(MotorSelect::Left, Direction::Forward, 32, &t),
            DrivePlan::Uniform { speed: 32, .. }
        ));
    }

    proptest! {
        #[test]
        fn coordinated_forward_subtracts_each_trim(speed in any::<u8>(), l in any::<u8>(), r in any::<u8>()) {
            prop_assume!(l > 0 || r > 0);
            let t = TrimState { left: l, right: r };
            let plan = plan_drive(MotorSelect::Both, Direction::Forward, speed, &t);
            prop_assert_eq!(plan, DrivePlan::Split {
                left: speed.saturating_sub(l),
                right: speed.saturating_sub(r),
            });
        }
    }
}
