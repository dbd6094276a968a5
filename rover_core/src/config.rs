//! Runtime configuration for the behavior engine.
//!
//! These are the structs the controller reads. They are separate from the
//! TOML-deserialized config in `rover_config`; see `conversions` for the
//! mapping.

use rover_traits::{InputId, Melody};

use crate::command::Command;

#[derive(Debug, Clone, Copy)]
pub struct DriveCfg {
    pub max_speed: u8,
    pub slow_speed: u8,
}

impl Default for DriveCfg {
    fn default() -> Self {
        Self {
            max_speed: 64,
            slow_speed: 32,
        }
    }
}

/// Distance thresholds and sampling policy.
#[derive(Debug, Clone, Copy)]
pub struct RangeCfg {
    pub safety_cm: f32,
    pub clear_cm: f32,
    pub max_display_cm: f32,
    pub advance_samples: u32,
    pub advance_interval_ms: u64,
    pub scan_samples: u32,
    pub scan_interval_ms: u64,
    /// Stands in for a ping the driver failed to deliver.
    pub fault_value_cm: f32,
    pub liveness_color: bool,
}

impl Default for RangeCfg {
    fn default() -> Self {
        Self {
            safety_cm: 15.0,
            clear_cm: 30.0,
            max_display_cm: 30.0,
            advance_samples: 5,
            advance_interval_ms: 0,
            scan_samples: 10,
            scan_interval_ms: 50,
            fault_value_cm: 0.0,
            liveness_color: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ScanCfg {
    /// Added to the sweep length after every sweep that found no clear path.
    pub rotation_increment_ms: u64,
}

impl Default for ScanCfg {
    fn default() -> Self {
        Self {
            rotation_increment_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetreatCfg {
    pub extra_backup_ms: u64,
    pub poll_ms: u64,
}

impl Default for RetreatCfg {
    fn default() -> Self {
        Self {
            extra_backup_ms: 1000,
            poll_ms: 20,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CalibrationCfg {
    pub trim_step: u8,
    pub idle_ms: u64,
    pub poll_ms: u64,
    pub exit_pause_ms: u64,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            trim_step: 2,
            idle_ms: 3000,
            poll_ms: 100,
            exit_pause_ms: 500,
        }
    }
}

/// Audio cues.
#[derive(Debug, Clone)]
pub struct CueCfg {
    pub scan: Melody,
    pub backup: Melody,
    pub confirm: Melody,
}

impl Default for CueCfg {
    fn default() -> Self {
        Self {
            scan: stock("C3:1 R:1 C3:1 R:1"),
            backup: stock("C6:3 R:3"),
            confirm: stock("C5:1 E5:1 G5:2"),
        }
    }
}

#[allow(clippy::expect_used)]
fn stock(s: &str) -> Melody {
    s.parse().expect("stock cue parses")
}

/// Everything the behavior states read, in one place.
#[derive(Debug, Clone, Default)]
pub struct BehaviorCfg {
    pub drive: DriveCfg,
    pub range: RangeCfg,
    pub scan: ScanCfg,
    pub retreat: RetreatCfg,
    pub calibration: CalibrationCfg,
    pub cues: CueCfg,
}

impl BehaviorCfg {
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.drive.max_speed == 0 {
            return Err("max_speed must be > 0");
        }
        if self.drive.slow_speed > self.drive.max_speed {
            return Err("slow_speed must be <= max_speed");
        }
        if self.range.safety_cm.is_nan() || self.range.clear_cm.is_nan() {
            return Err("range thresholds must not be NaN");
        }
        if self.range.safety_cm >= self.range.clear_cm {
            return Err("safety_cm must be < clear_cm");
        }
        if self.range.max_display_cm.is_nan() || self.range.max_display_cm <= 0.0 {
            return Err("max_display_cm must be > 0");
        }
        if self.scan.rotation_increment_ms == 0 {
            return Err("rotation_increment_ms must be >= 1");
        }
        if self.retreat.poll_ms == 0 {
            return Err("retreat poll_ms must be >= 1");
        }
        let c = &self.calibration;
        if c.trim_step == 0 || c.trim_step > self.drive.max_speed {
            return Err("trim_step must be in [1, max_speed]");
        }
        if c.poll_ms == 0 || c.poll_ms >= c.idle_ms {
            return Err("calibration poll_ms must be in [1, idle_ms)");
        }
        Ok(())
    }
}

/// Which command each operator input produces. Unbound inputs are absent.
#[derive(Debug, Clone)]
pub struct InputBindings(pub Vec<(InputId, Command)>);

impl Default for InputBindings {
    fn default() -> Self {
        Self(vec![
            (InputId::ButtonA, Command::TrimLeftUp),
            (InputId::ButtonB, Command::TrimRightUp),
            (InputId::Shake, Command::ResetTrim),
        ])
    }
}

impl InputBindings {
    pub fn as_slice(&self) -> &[(InputId, Command)] {
        &self.0
    }
}
