//! Trim calibration sub-mode.
//!
//! Any state may hand control to calibration once per loop iteration. While
//! inside, the rover stands still and drains the command queue until no
//! command has been acted on for one idle window.

use rover_traits::{PlayMode, Side};

use crate::command::Command;
use crate::rover::Rover;
use crate::status::BehaviorState;

impl Rover {
    /// Enter calibration if any command is queued. Returns whether it ran.
    ///
    /// Each drain takes the whole queue at once and acts only on the
    /// highest-priority kind present (reset, then right, then left), once
    /// per queued occurrence. Lower-priority kinds from the same drain are
    /// dropped.
    pub fn maybe_enter_calibration(&mut self) -> bool {
        if self.commands.is_empty() {
            return false;
        }

        let resume = self.state;
        self.set_state(BehaviorState::Calibration);
        self.stats.calibrations += 1;
        self.motors.stop();
        self.clear_display();
        self.stop_cue();

        let idle_ms = self.cfg.calibration.idle_ms;
        let poll_ms = self.cfg.calibration.poll_ms;
        let mut last_action = self.clock.now();
        loop {
            let pending = self.commands.take();
            if let Some((cmd, times)) = pending.highest() {
                for _ in 0..times {
                    self.apply(cmd);
                }
                last_action = self.clock.now();
            }
            self.pause_ms(poll_ms);
            if self.clock.ms_since(last_action) >= idle_ms {
                break;
            }
        }

        tracing::info!(left = self.trim.left, right = self.trim.right, "calibration done");
        let confirm = self.cfg.cues.confirm.clone();
        self.play_cue(&confirm, PlayMode::Once);
        self.pause_ms(self.cfg.calibration.exit_pause_ms);
        self.set_state(resume);
        true
    }

    fn apply(&mut self, cmd: Command) {
        let max = self.cfg.drive.max_speed;
        let step = self.cfg.calibration.trim_step;
        match cmd {
            Command::ResetTrim => {
                self.trim.reset();
                tracing::info!("trim reset");
                self.show_reset();
            }
            Command::TrimRightUp => {
                let right = self.trim.raise(Side::Right, step, max);
                tracing::info!(right, "right trim raised");
                self.show_number(i32::from(max.saturating_sub(right)));
            }
            Command::TrimLeftUp => {
                let left = self.trim.raise(Side::Left, step, max);
                tracing::info!(left, "left trim raised");
                self.show_number(i32::from(max.saturating_sub(left)));
            }
        }
    }
}
