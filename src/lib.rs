//! Marbles: a four-player race game engine with multi-player game-tree search.
//!
//! Four teams of five marbles race around a shared cross-shaped track into
//! their home lanes, moved by two dice. Landing on an enemy marble sends it
//! back to start. The first team to fill its home lane wins.
//!
//! ## Modules
//!
//! - [`square`] - Teams, squares, traversal order and notation
//! - [`dice`] - Dice rolls and the reach probability model
//! - [`position`] - Board snapshot
//! - [`moves`] - Piece moves, moves and move collections
//! - [`movegen`] - Legal move generation and move application
//! - [`evaluator`] - Static evaluation into one score per team
//! - [`search`] - Shared search machinery (turn order, clock, deepening)
//! - [`maxn`], [`paranoid`], [`offensive`], [`mix`], [`mcts`] - Search strategies
//! - [`algorithm`] - The strategies behind one enum
//! - [`playout`] - Random game simulation
//! - [`board`] - Live game with history and think entry points
//! - [`player`] - Computer players with difficulty levels and background thinking
//!
//! ## Example
//!
//! ```
//! use marbles::algorithm::{Algorithm, AlgorithmKind};
//! use marbles::board::Board;
//! use marbles::config::EngineConfig;
//! use marbles::dice::DiceRoll;
//! use marbles::position::Position;
//! use marbles::square::Team;
//!
//! let position = Position::from_setup("g6=g, b6=b").unwrap();
//! let board = Board::with_position(position, Team::Green);
//! let roll = DiceRoll::new(1, 6).unwrap();
//!
//! // Every legal move for green
//! for mv in &board.legal_moves(roll) {
//!     println!("{mv}");
//! }
//!
//! // Let MaxN pick one with a 100 ms budget
//! let maxn = Algorithm::from_kind(AlgorithmKind::Maxn, &EngineConfig::default());
//! let mut rng = fastrand::Rng::with_seed(1);
//! let best = board.think_best(&maxn, roll, Team::Green, 100, None, &mut rng);
//! assert!(best.is_some());
//! ```

pub mod algorithm;
pub mod board;
pub mod config;
pub mod constants;
pub mod dice;
pub mod error;
pub mod evaluator;
pub mod maxn;
pub mod mcts;
pub mod mix;
pub mod movegen;
pub mod moves;
pub mod offensive;
pub mod paranoid;
pub mod player;
pub mod playout;
pub mod position;
pub mod search;
pub mod square;

pub use error::{Error, Result};
