#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the rover.
//!
//! - `Config` and its sections are deserialized from TOML; every section and
//!   field is optional and falls back to the stock robot's values.
//! - Melodies are parsed while deserializing, so a bad cue fails at load time.
//! - `Config::validate` enforces cross-field rules before anything touches
//!   hardware.
use std::collections::HashSet;
use std::path::Path;

use rover_traits::Melody;
use serde::Deserialize;
use serde::de::{Deserializer, Error as _};

/// BCM pin numbers, only read by the GPIO backend.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Pins {
    pub trig: u8,
    pub echo: u8,
    pub edge_left: u8,
    pub edge_right: u8,
    pub motor_left_fwd: u8,
    pub motor_left_rev: u8,
    pub motor_right_fwd: u8,
    pub motor_right_rev: u8,
    pub button_a: u8,
    pub button_b: u8,
    pub button_shake: Option<u8>,
    pub buzzer: Option<u8>,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            trig: 23,
            echo: 24,
            edge_left: 17,
            edge_right: 27,
            motor_left_fwd: 5,
            motor_left_rev: 6,
            motor_right_fwd: 13,
            motor_right_rev: 19,
            button_a: 20,
            button_b: 21,
            button_shake: Some(16),
            buzzer: Some(18),
        }
    }
}

impl Pins {
    fn all(&self) -> Vec<(&'static str, u8)> {
        let mut v = vec![
            ("trig", self.trig),
            ("echo", self.echo),
            ("edge_left", self.edge_left),
            ("edge_right", self.edge_right),
            ("motor_left_fwd", self.motor_left_fwd),
            ("motor_left_rev", self.motor_left_rev),
            ("motor_right_fwd", self.motor_right_fwd),
            ("motor_right_rev", self.motor_right_rev),
            ("button_a", self.button_a),
            ("button_b", self.button_b),
        ];
        if let Some(p) = self.button_shake {
            v.push(("button_shake", p));
        }
        if let Some(p) = self.buzzer {
            v.push(("buzzer", p));
        }
        v
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DriveCfg {
    /// Full speed on the motor driver's 0..=255 scale.
    pub max_speed: u8,
    /// Speed used while backing away from an edge.
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RangeCfg {
    /// Stop and scan when the mean distance drops below this.
    pub safety_cm: f32,
    /// Scanning ends once the mean distance exceeds this.
    pub clear_cm: f32,
    /// Full scale of the proximity bar.
    pub max_display_cm: f32,
    pub advance_samples: u32,
    pub advance_interval_ms: u64,
    pub scan_samples: u32,
    pub scan_interval_ms: u64,
    /// Substituted for a ping the driver failed to deliver.
    pub fault_value_cm: f32,
    /// Echo wait limit for the GPIO ranging driver.
    pub echo_timeout_ms: u64,
    /// Flash a random colour on every sample batch.
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
            echo_timeout_ms: 30,
            liveness_color: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanCfg {
    pub rotation_increment_ms: u64,
}

impl Default for ScanCfg {
    fn default() -> Self {
        Self {
            rotation_increment_ms: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetreatCfg {
    /// Keep reversing this long after both edge sensors see ground again.
    pub extra_backup_ms: u64,
    /// Pause between edge polls while backing away.
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CalibrationCfg {
    pub trim_step: u8,
    /// Leave calibration after this long without a new command.
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

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SoundCfg {
    #[serde(deserialize_with = "de_melody")]
    pub scan: Melody,
    #[serde(deserialize_with = "de_melody")]
    pub backup: Melody,
    #[serde(deserialize_with = "de_melody")]
    pub confirm: Melody,
    pub tempo_bpm: u32,
}

impl Default for SoundCfg {
    fn default() -> Self {
        Self {
            scan: stock_melody("C3:1 R:1 C3:1 R:1"),
            backup: stock_melody("C6:3 R:3"),
            confirm: stock_melody("C5:1 E5:1 G5:2"),
            tempo_bpm: 240,
        }
    }
}

#[allow(clippy::expect_used)]
fn stock_melody(s: &str) -> Melody {
    s.parse().expect("stock melody parses")
}

fn de_melody<'de, D>(deserializer: D) -> Result<Melody, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<Melody>()
        .map_err(|e| D::Error::custom(format!("melody `{s}`: {e}")))
}

/// Calibration command an input produces.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommandName {
    /// Input is not bound.
    None,
    ResetTrim,
    TrimLeftUp,
    TrimRightUp,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputsCfg {
    pub button_a: CommandName,
    pub button_b: CommandName,
    pub shake: CommandName,
}

impl Default for InputsCfg {
    fn default() -> Self {
        Self {
            button_a: CommandName::TrimLeftUp,
            button_b: CommandName::TrimRightUp,
            shake: CommandName::ResetTrim,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Simulator world, used when the GPIO backend is not compiled in.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimCfg {
    /// Arena width and depth.
    pub arena_cm: [f32; 2],
    /// Drop-off rectangle `[x, y, w, h]` inside the arena.
    pub hole: Option<[f32; 4]>,
    /// Start pose `[x, y, heading_deg]`.
    pub start: [f32; 3],
    /// Run against the wall clock; when false the simulation runs as fast as
    /// the host allows.
    pub realtime: bool,
    /// Wheel surface speed per unit of motor speed.
    pub cm_per_s_per_speed: f32,
    pub wheel_base_cm: f32,
}

impl Default for SimCfg {
    fn default() -> Self {
        Self {
            arena_cm: [200.0, 150.0],
            hole: Some([120.0, 40.0, 40.0, 30.0]),
            start: [40.0, 75.0, 0.0],
            realtime: true,
            cm_per_s_per_speed: 0.5,
            wheel_base_cm: 10.0,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub drive: DriveCfg,
    pub range: RangeCfg,
    pub scan: ScanCfg,
    pub retreat: RetreatCfg,
    pub calibration: CalibrationCfg,
    pub sound: SoundCfg,
    pub inputs: InputsCfg,
    pub logging: Logging,
    pub sim: SimCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Drive
        if self.drive.max_speed == 0 {
            eyre::bail!("drive.max_speed must be > 0");
        }
        if self.drive.slow_speed == 0 || self.drive.slow_speed > self.drive.max_speed {
            eyre::bail!("drive.slow_speed must be in [1, drive.max_speed]");
        }

        // Range
        let r = &self.range;
        if !(r.safety_cm.is_finite() && r.clear_cm.is_finite()) {
            eyre::bail!("range thresholds must be finite");
        }
        if r.safety_cm <= 0.0 {
            eyre::bail!("range.safety_cm must be > 0");
        }
        if r.safety_cm >= r.clear_cm {
            eyre::bail!("range.safety_cm must be < range.clear_cm");
        }
        if !(r.max_display_cm.is_finite() && r.max_display_cm > 0.0) {
            eyre::bail!("range.max_display_cm must be > 0");
        }
        if r.advance_samples == 0 || r.scan_samples == 0 {
            eyre::bail!("range sample counts must be >= 1");
        }
        if !r.fault_value_cm.is_finite() || r.fault_value_cm < 0.0 {
            eyre::bail!("range.fault_value_cm must be a finite value >= 0");
        }
        if r.echo_timeout_ms == 0 {
            eyre::bail!("range.echo_timeout_ms must be >= 1");
        }

        // Scan / retreat
        if self.scan.rotation_increment_ms == 0 {
            eyre::bail!("scan.rotation_increment_ms must be >= 1");
        }
        if self.retreat.extra_backup_ms > 60_000 {
            eyre::bail!("retreat.extra_backup_ms is unreasonably large (>60s)");
        }
        if self.retreat.poll_ms == 0 {
            eyre::bail!("retreat.poll_ms must be >= 1");
        }

        // Calibration
        let c = &self.calibration;
        if c.trim_step == 0 || c.trim_step > self.drive.max_speed {
            eyre::bail!("calibration.trim_step must be in [1, drive.max_speed]");
        }
        if c.idle_ms == 0 {
            eyre::bail!("calibration.idle_ms must be >= 1");
        }
        if c.poll_ms == 0 {
            eyre::bail!("calibration.poll_ms must be >= 1");
        }
        if c.poll_ms >= c.idle_ms {
            eyre::bail!("calibration.poll_ms must be < calibration.idle_ms");
        }

        // Sound
        if self.sound.tempo_bpm == 0 {
            eyre::bail!("sound.tempo_bpm must be > 0");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot}");
        }

        // Pins
        let mut seen = HashSet::new();
        for (name, pin) in self.pins.all() {
            if !seen.insert(pin) {
                eyre::bail!("pins.{name} reuses pin {pin}");
            }
        }

        // Simulator
        let [w, h] = self.sim.arena_cm;
        if !(w > 0.0 && h > 0.0) {
            eyre::bail!("sim.arena_cm must be positive");
        }
        if !(self.sim.cm_per_s_per_speed > 0.0 && self.sim.wheel_base_cm > 0.0) {
            eyre::bail!("sim.cm_per_s_per_speed and sim.wheel_base_cm must be > 0");
        }

        Ok(())
    }
}
