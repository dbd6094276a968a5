//! Outcomes reported by the behavior states.

/// Why the Advance state stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardExit {
    /// Mean distance fell below the safety threshold.
    DistanceTriggered,
    /// An edge sensor lost the ground while the path ahead was clear.
    ObstacleTriggered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BehaviorState {
    #[default]
    Idle,
    Advance,
    Scan,
    Retreat,
    Calibration,
}

/// Counters kept across the whole run; logged at exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub cycles: u64,
    pub scans: u64,
    pub retreats: u64,
    pub sweeps: u64,
    pub calibrations: u64,
    pub samples: u64,
    pub sensor_faults: u64,
    pub motor_faults: u64,
}
