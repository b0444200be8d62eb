//! Per-tick counters and timings.

/// Timing and event counts collected during a single tick.
///
/// Durations are in microseconds. Counts cover the tick only; they are
/// not cumulative.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepMetrics {
    /// Wall-clock time for the whole step, observation writing included.
    pub total_us: u64,
    /// Time spent in movement resolution.
    pub resolve_us: u64,
    /// Agents that moved.
    pub moves: u32,
    /// Agents whose move was refused.
    pub blocked_moves: u32,
    /// Movement cycles rotated this tick.
    pub num_cycles: u32,
    /// Shelves delivered.
    pub deliveries: u32,
    /// Load/unload attempts turned into no-ops.
    pub invalid_actions: u32,
}
