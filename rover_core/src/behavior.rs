//! Advance, Scan and Retreat, and the dispatch loop tying them together.
//!
//! Every state runs a blocking cooperative loop. Each iteration first offers
//! calibration a chance to take over, then samples, then drives or leaves.

use rover_traits::{Direction, MotorSelect, PlayMode, Side};

use crate::error::Result;
use crate::hw_error::map_hal;
use crate::rover::Rover;
use crate::status::{BehaviorState, ForwardExit, RunStats};
use crate::types::{EdgePair, ReverseSide, choose_reverse_side};

/// Sweep lengths for one Scan: `base`, `2 * base`, `3 * base`, ...
/// (milliseconds, saturating). Never ends.
#[derive(Debug, Clone)]
pub struct SweepDurations {
    base_ms: u64,
    next_ms: u64,
}

impl SweepDurations {
    pub fn new(base_ms: u64) -> Self {
        Self {
            base_ms,
            next_ms: base_ms,
        }
    }
}

impl Iterator for SweepDurations {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        let current = self.next_ms;
        self.next_ms = self.next_ms.saturating_add(self.base_ms);
        Some(current)
    }
}

impl Rover {
    /// Drive forward at `speed` until something is in the way.
    ///
    /// Distance is checked before the edge sensors: a close obstacle wins
    /// over a lost edge in the same iteration. Motors are stopped before
    /// returning.
    pub fn advance(&mut self, speed: u8, interval_ms: u64) -> ForwardExit {
        self.set_state(BehaviorState::Advance);
        loop {
            self.maybe_enter_calibration();

            let distance = self.sample(self.cfg.range.advance_samples, interval_ms);
            let edges = self.read_edges();

            if distance < self.cfg.range.safety_cm {
                self.motors.stop();
                tracing::info!(distance_cm = distance, "obstacle ahead");
                return ForwardExit::DistanceTriggered;
            }
            if edges.any_blocked() {
                self.motors.stop();
                tracing::info!(left = edges.left, right = edges.right, "edge lost");
                return ForwardExit::ObstacleTriggered;
            }
            self.drive(MotorSelect::Both, Direction::Forward, speed);
        }
    }

    /// Rotate in place with growing sweeps until the way ahead is clear.
    ///
    /// The heading sign flips before every sweep, so consecutive sweeps
    /// alternate direction. Sweep length starts at the base increment on
    /// every entry.
    pub fn scan(&mut self) {
        self.set_state(BehaviorState::Scan);
        self.stats.scans += 1;
        let cue = self.cfg.cues.scan.clone();
        self.play_cue(&cue, PlayMode::Loop);

        let mut sweeps = SweepDurations::new(self.cfg.scan.rotation_increment_ms);
        loop {
            if self.maybe_enter_calibration() {
                self.play_cue(&cue, PlayMode::Loop);
            }
            let duration_ms = sweeps.next().unwrap_or(u64::MAX);

            self.heading.flip();
            self.rotate(duration_ms);
            self.stats.sweeps += 1;

            let distance = self.sample(
                self.cfg.range.scan_samples,
                self.cfg.range.scan_interval_ms,
            );
            tracing::debug!(duration_ms, distance_cm = distance, "sweep");
            if distance > self.cfg.range.clear_cm {
                break;
            }
        }
        self.stop_cue();
    }

    /// Back away from a lost edge on one motor until both sensors see
    /// ground, then keep reversing for `extra_backup_ms`.
    pub fn retreat(&mut self) {
        self.set_state(BehaviorState::Retreat);
        self.stats.retreats += 1;
        let cue = self.cfg.cues.backup.clone();
        self.play_cue(&cue, PlayMode::Loop);

        let slow = self.cfg.drive.slow_speed;
        let mut side = ReverseSide::Undetermined;
        loop {
            if self.maybe_enter_calibration() {
                self.play_cue(&cue, PlayMode::Loop);
            }
            let edges = self.read_edges();

            let chosen = match side {
                ReverseSide::Undetermined => {
                    let s = choose_reverse_side(edges, &mut self.heading);
                    tracing::debug!(side = ?s, heading = self.heading.as_i8(), "reverse side");
                    side = ReverseSide::Side(s);
                    s
                }
                ReverseSide::Side(s) if edges.both_clear() => {
                    self.drive(s.into(), Direction::Reverse, slow);
                    self.pause_ms(self.cfg.retreat.extra_backup_ms);
                    self.motors.stop();
                    break;
                }
                ReverseSide::Side(s) => s,
            };
            self.drive(chosen.into(), Direction::Reverse, slow);
            self.pause_ms(self.cfg.retreat.poll_ms);
        }
        self.stop_cue();
    }

    /// One Advance followed by the state its exit calls for.
    pub fn cycle(&mut self) -> ForwardExit {
        let exit = self.advance(self.cfg.drive.max_speed, self.cfg.range.advance_interval_ms);
        match exit {
            ForwardExit::DistanceTriggered => self.scan(),
            ForwardExit::ObstacleTriggered => self.retreat(),
        }
        self.stats.cycles += 1;
        exit
    }

    /// The rover's whole life.
    pub fn run_forever(&mut self) -> ! {
        tracing::info!("behavior loop started");
        loop {
            self.cycle();
        }
    }

    /// Run `n` cycles and stop the motors.
    pub fn run_cycles(&mut self, n: u64) -> RunStats {
        tracing::info!(cycles = n, "behavior loop started");
        for _ in 0..n {
            self.cycle();
        }
        self.halt();
        self.set_state(BehaviorState::Idle);
        let stats = self.stats();
        tracing::info!(?stats, "behavior loop finished");
        stats
    }

    /// One ping and one edge reading with errors surfaced, for diagnostics.
    pub fn probe(&mut self) -> Result<(f32, EdgePair)> {
        let distance = self
            .sampler
            .probe()
            .map_err(|e| eyre::Report::new(map_hal(&e)).wrap_err("range sensor"))?;
        let left = self
            .edges
            .read_edge(Side::Left)
            .map_err(|e| eyre::Report::new(map_hal(&e)).wrap_err("left edge sensor"))?;
        let right = self
            .edges
            .read_edge(Side::Right)
            .map_err(|e| eyre::Report::new(map_hal(&e)).wrap_err("right edge sensor"))?;
        Ok((distance, EdgePair { left, right }))
    }

    fn rotate(&mut self, duration_ms: u64) {
        let fwd = self.heading.forward_side();
        let max = self.cfg.drive.max_speed;
        self.drive(fwd.into(), Direction::Forward, max);
        self.drive(fwd.opposite().into(), Direction::Reverse, max);
        self.pause_ms(duration_ms);
        self.motors.stop();
    }
}
