//! Random playouts (full game simulation).
//!
//! A playout rolls the dice and plays a uniformly random legal move for the
//! team to move, turn after turn, until someone wins. The doubles chain and
//! the triple-doubles penalty apply exactly as in a live game.

use crate::dice::DiceRoll;
use crate::movegen::{apply_move, legal_moves};
use crate::moves::{Move, MoveCollection};
use crate::position::Position;
use crate::search::{SearchClock, advance_turn};
use crate::square::Team;

/// How a playout ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayoutOutcome {
    Won(Team),
    /// The turn cap was reached without a winner.
    TurnLimit,
    /// The clock stopped the playout.
    Interrupted,
}

/// Play random moves on `pos` until the game ends.
///
/// `player` is to move, having already rolled `doubles` doubles this turn.
/// Returns the outcome and the number of turns played.
pub fn random_playout(
    pos: &mut Position,
    mut player: Team,
    mut doubles: u8,
    turn_limit: usize,
    clock: &SearchClock,
    rng: &mut fastrand::Rng,
) -> (PlayoutOutcome, usize) {
    let mut turns = 0;
    loop {
        if let Some(winner) = pos.winner() {
            return (PlayoutOutcome::Won(winner), turns);
        }
        if turns >= turn_limit {
            return (PlayoutOutcome::TurnLimit, turns);
        }
        if clock.should_stop() {
            return (PlayoutOutcome::Interrupted, turns);
        }

        let roll = DiceRoll::random(rng);
        let moves = legal_moves(pos, roll, player);
        if let Some(mv) = choose_random_move(&moves, rng) {
            apply_move(pos, &mv);
        }

        let turn = advance_turn(pos, player, doubles, roll.is_doubles());
        player = turn.player;
        doubles = turn.doubles;
        turns += 1;
    }
}

/// A uniformly random move from `moves`, or `None` when there are none.
#[inline]
pub fn choose_random_move(moves: &MoveCollection, rng: &mut fastrand::Rng) -> Option<Move> {
    if moves.is_empty() {
        return None;
    }
    moves.get(rng.usize(..moves.len())).copied()
}
