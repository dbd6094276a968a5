//! Stand-ins for the optional peripherals of a `Rover`.

use rover_traits::{HalResult, Indicator, Melody, PlayMode, Rgb, Sounder};

/// Indicator that draws nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl Indicator for NoopIndicator {
    fn show_proximity(&mut self, _value_cm: f32, _max_cm: f32) -> HalResult<()> {
        Ok(())
    }
    fn show_number(&mut self, _n: i32) -> HalResult<()> {
        Ok(())
    }
    fn show_reset(&mut self) -> HalResult<()> {
        Ok(())
    }
    fn show_color(&mut self, _rgb: Rgb) -> HalResult<()> {
        Ok(())
    }
    fn clear(&mut self) -> HalResult<()> {
        Ok(())
    }
}

/// Sounder with no speaker attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSounder;

impl Sounder for NoopSounder {
    fn play(&mut self, _melody: &Melody, _mode: PlayMode) -> HalResult<()> {
        Ok(())
    }
    fn stop(&mut self) -> HalResult<()> {
        Ok(())
    }
}
