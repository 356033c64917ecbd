//! Constants for board geometry, house rules, and engine parameters.
//!
//! The board is a cross-shaped track of four 12-cell path quadrants plus one
//! 5-cell home lane per team. Cells are stored in a single flat array:
//! the path quadrants first (`0..48`), then the four home lanes (`48..68`).
//!
//! House rules are fixed; there is no rules configurability.

// =============================================================================
// Board Geometry
// =============================================================================

/// Number of teams (and path quadrants).
pub const TEAM_COUNT: usize = 4;

/// Marbles owned by each team.
pub const TEAM_SIZE: usize = 5;

/// Number of path quadrants.
pub const QUAD_COUNT: usize = TEAM_COUNT;

/// Number of home lanes.
pub const BASE_COUNT: usize = TEAM_COUNT;

/// Cells in one path quadrant.
pub const QUAD_LENGTH: usize = 12;

/// Cells in one home lane.
pub const BASE_LENGTH: usize = 5;

/// Cells on the shared outer track.
pub const PATH_LENGTH: usize = QUAD_COUNT * QUAD_LENGTH;

/// Total number of cells on the board (path + home lanes).
pub const CELL_COUNT: usize = PATH_LENGTH + BASE_COUNT * BASE_LENGTH;

/// Board index (1-based, team frame) of the last path cell before home.
pub const LAST_PATH_INDEX: usize = PATH_LENGTH;

/// Board index (1-based, team frame) of the last home cell.
pub const GOAL_INDEX: usize = PATH_LENGTH + BASE_LENGTH;

// =============================================================================
// Dice
// =============================================================================

/// Faces on one die.
pub const DIE_FACES: u8 = 6;

/// Die values that can take a marble out of the start area.
pub const TAKE_OUT_VALUES: [u8; 2] = [1, 6];

/// Consecutive doubles that trigger the front-marble penalty.
pub const DOUBLES_LIMIT: u8 = 3;

/// Size of the precomputed combined-value probability table.
pub const PROBABILITY_TABLE_SIZE: usize = 36;

/// Deepest doubles chain modelled exactly by the probability recursion.
pub const PROBABILITY_MAX_DEPTH: u32 = 2;

/// Probability that a roll can take a marble out (a 1 or a 6 on either die).
pub const P_GETTING_OUT: f64 = 20.0 / 36.0;

/// Probability of rolling doubles three times in a row.
pub const P_ROLLING_DOUBLES_3X: f64 = 0.0046296296296296285;

/// Probability of a specific face on a single die.
pub const P_ANY_NUM: f64 = 1.0 / 6.0;

// =============================================================================
// Evaluator Weights
// =============================================================================

/// Value of having one marble in play, and the penalty for blocking the start square.
pub const MARBLE_VALUE: f64 = 0.1;

/// Share of opponents' aggregate progress subtracted from a team's score.
pub const ENEMY_PROGRESS_FACTOR: f64 = 0.55;

/// Furthest distance at which an enemy marble is considered a threat.
pub const MAX_THREAT_DISTANCE: usize = 35;

/// Distance covered by a single die; threats this close use the active-marble model.
pub const SINGLE_DIE_REACH: usize = 6;

/// Score assigned to the winner of a finished game.
pub const WIN_SCORE: f64 = f64::MAX;

// =============================================================================
// Search Parameters
// =============================================================================

/// Ply budget for MaxN (two full rounds).
pub const MAXN_DEPTH: u32 = (TEAM_COUNT * 2) as u32;

/// Ply budget for Paranoid.
pub const PARANOID_DEPTH: u32 = (TEAM_COUNT * 2) as u32;

/// Ply budget for Offensive (one full round).
pub const OFFENSIVE_DEPTH: u32 = TEAM_COUNT as u32;

/// Lead over second place at which Mix switches to Paranoid.
pub const DEFENSIVE_THRESHOLD: f64 = 0.5;

/// Opponent lead over second place at which Mix switches to Offensive.
pub const OFFENSIVE_THRESHOLD: f64 = 0.5;

/// Turn cap for a single random playout.
pub const PLAYOUT_TURN_LIMIT: usize = 2000;

/// Budget used when a search is run without an explicit time limit by the Monte-Carlo
/// strategy, which has no natural completion.
pub const MCTS_DEFAULT_MS: u64 = 60_000;

// =============================================================================
// Computer Player Difficulty
// =============================================================================

/// Difficulty presets as `(think_ms, blunder_percent)`, weakest first.
pub const DIFFICULTIES: [(i64, u32); 10] = [
    (0, 100),
    (0, 90),
    (0, 80),
    (0, 70),
    (250, 60),
    (500, 45),
    (1000, 35),
    (1250, 20),
    (1500, 10),
    (2000, 0),
];
