//! Runtime engine configuration.

use crate::constants::{
    DEFENSIVE_THRESHOLD, MAXN_DEPTH, OFFENSIVE_DEPTH, OFFENSIVE_THRESHOLD, PARANOID_DEPTH,
    PLAYOUT_TURN_LIMIT,
};

/// Search depths, Mix thresholds and the playout turn cap.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub maxn_depth: u32,
    pub paranoid_depth: u32,
    pub offensive_depth: u32,
    /// Opponent lead over second place at which Mix turns offensive.
    pub offensive_threshold: f64,
    /// Own lead over second place at which Mix turns paranoid.
    pub defensive_threshold: f64,
    pub playout_turn_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            maxn_depth: MAXN_DEPTH,
            paranoid_depth: PARANOID_DEPTH,
            offensive_depth: OFFENSIVE_DEPTH,
            offensive_threshold: OFFENSIVE_THRESHOLD,
            defensive_threshold: DEFENSIVE_THRESHOLD,
            playout_turn_limit: PLAYOUT_TURN_LIMIT,
        }
    }
}
