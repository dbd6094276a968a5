//! `From` implementations bridging `rover_config` types to `rover_core` types.

use rover_traits::InputId;

use crate::command::Command;
use crate::config::{
    BehaviorCfg, CalibrationCfg, CueCfg, DriveCfg, InputBindings, RangeCfg, RetreatCfg, ScanCfg,
};

// ── DriveCfg ─────────────────────────────────────────────────────────────────

impl From<&rover_config::DriveCfg> for DriveCfg {
    fn from(c: &rover_config::DriveCfg) -> Self {
        Self {
            max_speed: c.max_speed,
            slow_speed: c.slow_speed,
        }
    }
}

// ── RangeCfg ─────────────────────────────────────────────────────────────────

impl From<&rover_config::RangeCfg> for RangeCfg {
    fn from(c: &rover_config::RangeCfg) -> Self {
        Self {
            safety_cm: c.safety_cm,
            clear_cm: c.clear_cm,
            max_display_cm: c.max_display_cm,
            advance_samples: c.advance_samples,
            advance_interval_ms: c.advance_interval_ms,
            scan_samples: c.scan_samples,
            scan_interval_ms: c.scan_interval_ms,
            fault_value_cm: c.fault_value_cm,
            liveness_color: c.liveness_color,
        }
    }
}

// ── Scan / Retreat ───────────────────────────────────────────────────────────

impl From<&rover_config::ScanCfg> for ScanCfg {
    fn from(c: &rover_config::ScanCfg) -> Self {
        Self {
            rotation_increment_ms: c.rotation_increment_ms,
        }
    }
}

impl From<&rover_config::RetreatCfg> for RetreatCfg {
    fn from(c: &rover_config::RetreatCfg) -> Self {
        Self {
            extra_backup_ms: c.extra_backup_ms,
            poll_ms: c.poll_ms,
        }
    }
}

// ── CalibrationCfg ───────────────────────────────────────────────────────────

impl From<&rover_config::CalibrationCfg> for CalibrationCfg {
    fn from(c: &rover_config::CalibrationCfg) -> Self {
        Self {
            trim_step: c.trim_step,
            idle_ms: c.idle_ms,
            poll_ms: c.poll_ms,
            exit_pause_ms: c.exit_pause_ms,
        }
    }
}

// ── Cues ─────────────────────────────────────────────────────────────────────

impl From<&rover_config::SoundCfg> for CueCfg {
    fn from(c: &rover_config::SoundCfg) -> Self {
        Self {
            scan: c.scan.clone(),
            backup: c.backup.clone(),
            confirm: c.confirm.clone(),
        }
    }
}

// ── Whole config ─────────────────────────────────────────────────────────────

impl From<&rover_config::Config> for BehaviorCfg {
    fn from(c: &rover_config::Config) -> Self {
        Self {
            drive: (&c.drive).into(),
            range: (&c.range).into(),
            scan: (&c.scan).into(),
            retreat: (&c.retreat).into(),
            calibration: (&c.calibration).into(),
            cues: (&c.sound).into(),
        }
    }
}

// ── Commands and bindings ────────────────────────────────────────────────────

/// Command produced by a configured input, `None` when it is unbound.
pub fn bound_command(c: rover_config::CommandName) -> Option<Command> {
    match c {
        rover_config::CommandName::None => None,
        rover_config::CommandName::ResetTrim => Some(Command::ResetTrim),
        rover_config::CommandName::TrimLeftUp => Some(Command::TrimLeftUp),
        rover_config::CommandName::TrimRightUp => Some(Command::TrimRightUp),
    }
}

impl From<&rover_config::InputsCfg> for InputBindings {
    fn from(c: &rover_config::InputsCfg) -> Self {
        let pairs = [
            (InputId::ButtonA, c.button_a),
            (InputId::ButtonB, c.button_b),
            (InputId::Shake, c.shake),
        ];
        Self(
            pairs
                .into_iter()
                .filter_map(|(input, name)| bound_command(name).map(|cmd| (input, cmd)))
                .collect(),
        )
    }
}
