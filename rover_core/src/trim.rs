//! Per-motor speed trims.

use rover_traits::Side;

/// Speed subtracted from each motor when both drive forward together.
///
/// Each side stays in `[0, max_speed]`. The values are volatile and start at
/// zero on every process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimState {
    pub left: u8,
    pub right: u8,
}

impl TrimState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Raise one side by `step`, saturating at `max_speed`. Returns the new
    /// value for that side.
    pub fn raise(&mut self, side: Side, step: u8, max_speed: u8) -> u8 {
        let slot = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *slot = slot.saturating_add(step).min(max_speed);
        *slot
    }

    pub fn is_active(&self) -> bool {
        self.left > 0 || self.right > 0
    }
}
