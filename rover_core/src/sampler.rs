//! Distance sampling policy.
//!
//! A sample is the plain arithmetic mean of `count` pings with a pause after
//! each one. There is no outlier rejection: a ping the driver fails to deliver
//! is replaced by `fault_value_cm` and averaged in like any other value.
//! Each batch also redraws the proximity bar and, when enabled, flashes a
//! random liveness colour.

use nanorand::{Rng, WyRand};
use rover_traits::clock::Clock;
use rover_traits::{Indicator, RangeSensor, Rgb};

use crate::config::RangeCfg;
use crate::hw_error::map_hal;

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean_cm(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f32;
    values.iter().sum::<f32>() / n
}

pub struct DistanceSampler {
    sensor: Box<dyn RangeSensor>,
    rng: WyRand,
    cfg: RangeCfg,
    pings: u64,
    faults: u64,
}

impl core::fmt::Debug for DistanceSampler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DistanceSampler")
            .field("pings", &self.pings)
            .field("faults", &self.faults)
            .finish_non_exhaustive()
    }
}

impl DistanceSampler {
    pub fn new(sensor: Box<dyn RangeSensor>, cfg: RangeCfg, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(WyRand::new, WyRand::new_seed);
        Self {
            sensor,
            rng,
            cfg,
            pings: 0,
            faults: 0,
        }
    }

    /// Take `count` pings (at least one), pausing `delay_ms` after each, and
    /// return their mean.
    pub fn sample(
        &mut self,
        count: u32,
        delay_ms: u64,
        clock: &dyn Clock,
        indicator: &mut dyn Indicator,
    ) -> f32 {
        if self.cfg.liveness_color {
            let rgb = Rgb {
                r: self.rng.generate::<u8>(),
                g: self.rng.generate::<u8>(),
                b: self.rng.generate::<u8>(),
            };
            if let Err(e) = indicator.show_color(rgb) {
                tracing::warn!(error = %map_hal(&e), "liveness colour failed");
            }
        }

        let count = count.max(1);
        let mut values = Vec::with_capacity(count as usize);
        for _ in 0..count {
            values.push(self.ping_once());
            clock.pause_ms(delay_ms);
        }
        let mean = mean_cm(&values);
        tracing::debug!(count, mean_cm = mean, "distance sample");

        if let Err(e) = indicator.show_proximity(mean, self.cfg.max_display_cm) {
            tracing::warn!(error = %map_hal(&e), "proximity display failed");
        }
        mean
    }

    /// Raw pings taken so far.
    pub fn pings(&self) -> u64 {
        self.pings
    }

    /// Pings replaced by the fault value so far.
    pub fn faults(&self) -> u64 {
        self.faults
    }

    /// One ping with errors surfaced, for diagnostics.
    pub fn probe(&mut self) -> rover_traits::HalResult<f32> {
        self.sensor.ping_cm()
    }

    fn ping_once(&mut self) -> f32 {
        self.pings += 1;
        match self.sensor.ping_cm() {
            Ok(v) => v,
            Err(e) => {
                self.faults += 1;
                tracing::debug!(error = %map_hal(&e), fallback = self.cfg.fault_value_cm, "ping failed");
                self.cfg.fault_value_cm
            }
        }
    }
}
