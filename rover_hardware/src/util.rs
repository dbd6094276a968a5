use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait while `cond` holds, or until `timeout` expires. Returns how long the
/// wait took.
///
/// A zero `poll` interval busy-waits, which the ranging driver needs for
/// microsecond echo timing; anything else sleeps between checks.
pub fn wait_while(
    mut cond: impl FnMut() -> bool,
    timeout: Duration,
    poll: Duration,
) -> Result<Duration> {
    let start = Instant::now();
    let deadline = start + timeout;
    while cond() {
        if Instant::now() >= deadline {
            return Err(HwError::EchoTimeout);
        }
        if poll.is_zero() {
            std::hint::spin_loop();
        } else {
            std::thread::sleep(poll);
        }
    }
    Ok(start.elapsed())
}

/// Spin for `d`. Only for the microsecond pulses `thread::sleep` cannot
/// resolve.
pub fn busy_wait(d: Duration) {
    let start = Instant::now();
    while start.elapsed() < d {
        std::hint::spin_loop();
    }
}

/// Round-trip echo time for a target `distance_cm` away, at 343 m/s.
pub fn echo_time(distance_cm: f32) -> Duration {
    let secs = (2.0 * distance_cm.max(0.0)) / 34_300.0;
    Duration::from_secs_f32(secs)
}

/// Distance for a measured echo pulse width.
pub fn echo_to_cm(width: Duration) -> f32 {
    width.as_secs_f32() * 34_300.0 / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_time_and_distance_agree() {
        let t = echo_time(100.0);
        assert!((t.as_secs_f32() - 0.005_83).abs() < 1e-4);
        assert!((echo_to_cm(t) - 100.0).abs() < 0.01);
    }
}
