//! The live game board: authoritative position, turn order, history and the think entry points.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::debug;

use crate::algorithm::Algorithm;
use crate::dice::DiceRoll;
use crate::error::{Error, Result};
use crate::evaluator::{Evaluation, evaluate};
use crate::movegen::{apply_move, captures, legal_moves};
use crate::moves::{Move, MoveCollection};
use crate::playout::choose_random_move;
use crate::position::Position;
use crate::search::{Budget, PositionNode, SearchClock, TurnAdvance, advance_turn};
use crate::square::{Square, Team};

/// The live game: the authoritative position plus whose turn it is.
///
/// Searches never touch the board; they work on copies of its position.
#[derive(Clone, Debug)]
pub struct Board {
    position: Position,
    turn: Team,
    doubles: u8,
    history: Vec<HistoryEntry>,
}

/// One played turn.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryEntry {
    pub team: Team,
    pub roll: DiceRoll,
    /// `None` when no legal move existed.
    pub mv: Option<Move>,
    /// Enemy marbles sent back to start.
    pub captures: Vec<(Square, Team)>,
    /// Marble removed by the triple-doubles penalty.
    pub penalty: Option<Square>,
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: ", self.team, self.roll)?;
        match &self.mv {
            Some(mv) => write!(f, "{mv}")?,
            None => f.write_str("-")?,
        }
        for (square, owner) in &self.captures {
            write!(f, " x{}@{square}", owner.letter())?;
        }
        if let Some(square) = self.penalty {
            write!(f, " (doubles penalty {square})")?;
        }
        Ok(())
    }
}

/// A root move with the evaluation a search gave it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Variation {
    pub mv: Move,
    pub eval: Evaluation,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Empty board, yellow to move.
    pub fn new() -> Self {
        Self::with_position(Position::new(), Team::Yellow)
    }

    pub fn with_position(position: Position, turn: Team) -> Self {
        Board {
            position,
            turn,
            doubles: 0,
            history: Vec::new(),
        }
    }

    #[inline]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline]
    pub fn turn(&self) -> Team {
        self.turn
    }

    /// Doubles rolled so far by the team to move.
    #[inline]
    pub fn doubles(&self) -> u8 {
        self.doubles
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Replace the position, keeping the turn and clearing the doubles chain.
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        self.doubles = 0;
    }

    pub fn random_roll(&self, rng: &mut fastrand::Rng) -> DiceRoll {
        DiceRoll::random(rng)
    }

    /// Legal moves for the team to move.
    pub fn legal_moves(&self, roll: DiceRoll) -> MoveCollection {
        legal_moves(&self.position, roll, self.turn)
    }

    pub fn moves_for(&self, roll: DiceRoll, team: Team) -> MoveCollection {
        legal_moves(&self.position, roll, team)
    }

    /// Apply `mv` without checking it. Returns the captured marbles.
    pub fn perform_move(&mut self, mv: &Move) -> Vec<(Square, Team)> {
        let captured = captures(&self.position, mv);
        apply_move(&mut self.position, mv);
        captured
    }

    /// Hand the turn on after the team to move played with `roll`.
    pub fn end_turn(&mut self, roll: DiceRoll) -> TurnAdvance {
        let turn = advance_turn(&mut self.position, self.turn, self.doubles, roll.is_doubles());
        self.turn = turn.player;
        self.doubles = turn.doubles;
        turn
    }

    /// Play a full turn for the team to move: check `mv` (or that passing is
    /// forced), apply it, record it and advance the turn.
    pub fn play(&mut self, roll: DiceRoll, mv: Option<Move>) -> Result<TurnAdvance> {
        let team = self.turn;
        let legal = self.legal_moves(roll);
        let captured = match &mv {
            Some(mv) => {
                if mv.team() != team || !legal.contains(mv) {
                    return Err(Error::InvalidMove(mv.to_string()));
                }
                self.perform_move(mv)
            }
            None if !legal.is_empty() => {
                return Err(Error::InvalidMove(format!("{team} must move with {roll}")));
            }
            None => Vec::new(),
        };

        let turn = self.end_turn(roll);
        self.history.push(HistoryEntry {
            team,
            roll,
            mv,
            captures: captured,
            penalty: turn.penalty,
        });
        Ok(turn)
    }

    pub fn winner(&self) -> Option<Team> {
        self.position.winner()
    }

    pub fn is_game_over(&self) -> bool {
        self.position.is_won()
    }

    /// Choose a move for `team` with `roll`.
    ///
    /// A negative `ms` picks uniformly at random. A single legal move is
    /// returned without searching. Otherwise the budget is split evenly over
    /// the root moves and the move with the highest magnitude for `team`
    /// wins, earlier moves winning ties.
    pub fn think_best(
        &self,
        algorithm: &Algorithm,
        roll: DiceRoll,
        team: Team,
        ms: i64,
        stop: Option<Arc<AtomicBool>>,
        rng: &mut fastrand::Rng,
    ) -> Option<Move> {
        let moves = self.moves_for(roll, team);
        if moves.len() <= 1 {
            return moves.get(0).copied();
        }
        if ms < 0 {
            return choose_random_move(&moves, rng);
        }

        let share = ms as u64 / moves.len() as u64;
        let mut best: Option<(Move, f64)> = None;
        for mv in &moves {
            let eval = self.search_move(algorithm, mv, roll, share, stop.clone(), rng);
            let score = eval.magnitude(team);
            debug!(team = %team, mv = %mv, score, "root move");
            if best.is_none_or(|(_, current)| score > current) {
                best = Some((*mv, score));
            }
        }
        best.map(|(mv, _)| mv)
    }

    /// Every legal move for `team` with `roll`, best first for `team`.
    ///
    /// The sort is stable, so equally rated moves keep generation order.
    pub fn think_all(
        &self,
        algorithm: &Algorithm,
        roll: DiceRoll,
        team: Team,
        ms: i64,
        stop: Option<Arc<AtomicBool>>,
        rng: &mut fastrand::Rng,
    ) -> Result<Vec<Variation>> {
        if ms < 0 {
            return Err(Error::NegativeBudget(ms));
        }
        let moves = self.moves_for(roll, team);
        if moves.len() == 1 {
            let mv = moves[0];
            let mut child = self.position;
            apply_move(&mut child, &mv);
            let eval = evaluate(&child, roll.is_doubles().then_some(team));
            return Ok(vec![Variation { mv, eval }]);
        }

        let share = ms as u64 / moves.len().max(1) as u64;
        let mut variations: Vec<Variation> = moves
            .iter()
            .map(|mv| Variation {
                mv: *mv,
                eval: self.search_move(algorithm, mv, roll, share, stop.clone(), rng),
            })
            .collect();
        variations.sort_by(|a, b| b.eval.magnitude(team).total_cmp(&a.eval.magnitude(team)));
        Ok(variations)
    }

    fn search_move(
        &self,
        algorithm: &Algorithm,
        mv: &Move,
        roll: DiceRoll,
        ms: u64,
        stop: Option<Arc<AtomicBool>>,
        rng: &mut fastrand::Rng,
    ) -> Evaluation {
        let mut child = self.position;
        apply_move(&mut child, mv);
        let root = PositionNode::new(child, Some(*mv), roll);
        let mut clock = SearchClock::new(Budget::Millis(ms));
        if let Some(flag) = stop {
            clock = clock.with_stop_flag(flag);
        }
        algorithm.go(&root, mv.team(), &clock, rng).eval
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.position)?;
        write!(f, "{} to move", self.turn)?;
        if self.doubles > 0 {
            write!(f, " (doubles x{})", self.doubles)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::AlgorithmKind;
    use crate::config::EngineConfig;

    fn roll(a: u8, b: u8) -> DiceRoll {
        DiceRoll::new(a, b).unwrap()
    }

    fn board(setup: &str, turn: Team) -> Board {
        Board::with_position(Position::from_setup(setup).unwrap(), turn)
    }

    fn maxn() -> Algorithm {
        Algorithm::from_kind(AlgorithmKind::Maxn, &EngineConfig::default())
    }

    #[test]
    fn test_play_records_capture() {
        let mut b = board("y5=y, y9=r", Team::Yellow);
        let mv = Move::parse("y5y9", Team::Yellow).unwrap();
        let turn = b.play(roll(1, 3), Some(mv)).unwrap();
        assert_eq!(turn.player, Team::Red);
        assert_eq!(b.turn(), Team::Red);
        assert_eq!(b.position().on_board_count(Team::Red), 0);
        let entry = &b.history()[0];
        assert_eq!(entry.captures, vec![("y9".parse().unwrap(), Team::Red)]);
        assert_eq!(entry.to_string(), "Yellow 1+3: y5y9 xr@y9");
    }

    #[test]
    fn test_play_rejects_illegal() {
        let mut b = board("y5=y", Team::Yellow);
        let wrong = Move::parse("y5y8", Team::Yellow).unwrap();
        assert!(matches!(b.play(roll(1, 3), Some(wrong)), Err(Error::InvalidMove(_))));
        let other = Move::parse("r1r5", Team::Red).unwrap();
        assert!(b.play(roll(1, 3), Some(other)).is_err());
        assert!(b.play(roll(1, 3), None).is_err());
        assert!(b.history().is_empty());
    }

    #[test]
    fn test_pass_when_no_moves() {
        let mut b = board("", Team::Green);
        assert!(b.legal_moves(roll(2, 3)).is_empty());
        b.play(roll(2, 3), None).unwrap();
        assert_eq!(b.turn(), Team::Blue);
        assert_eq!(b.history()[0].to_string(), "Green 2+3: -");
    }

    #[test]
    fn test_doubles_keep_turn() {
        let mut b = board("", Team::Blue);
        b.play(roll(2, 2), None).unwrap();
        assert_eq!((b.turn(), b.doubles()), (Team::Blue, 1));
        b.play(roll(3, 3), None).unwrap();
        assert_eq!((b.turn(), b.doubles()), (Team::Blue, 2));
        b.play(roll(4, 4), None).unwrap();
        assert_eq!((b.turn(), b.doubles()), (Team::Yellow, 0));
    }

    #[test]
    fn test_think_best_single_move() {
        let b = board("b11=y, b12=y", Team::Yellow);
        let mut rng = fastrand::Rng::with_seed(1);
        let mv = b.think_best(&maxn(), roll(2, 5), Team::Yellow, 1_000, None, &mut rng);
        assert_eq!(mv.unwrap().to_string(), "b11hy1, b12hy5");
    }

    #[test]
    fn test_think_best_random_is_legal() {
        let b = board("y5=y, r3=y", Team::Yellow);
        let mut rng = fastrand::Rng::with_seed(9);
        let moves = b.legal_moves(roll(2, 3));
        let mv = b.think_best(&maxn(), roll(2, 3), Team::Yellow, -1, None, &mut rng).unwrap();
        assert!(moves.contains(&mv));
    }

    #[test]
    fn test_think_best_no_moves() {
        let b = board("", Team::Yellow);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(b.think_best(&maxn(), roll(2, 3), Team::Yellow, 100, None, &mut rng), None);
    }

    #[test]
    fn test_think_all_sorted() {
        let b = board("y5=y, r3=y, r8=g", Team::Yellow);
        let mut rng = fastrand::Rng::with_seed(1);
        let all = b.think_all(&maxn(), roll(2, 3), Team::Yellow, 0, None, &mut rng).unwrap();
        assert_eq!(all.len(), b.legal_moves(roll(2, 3)).len());
        for pair in all.windows(2) {
            assert!(pair[0].eval.magnitude(Team::Yellow) >= pair[1].eval.magnitude(Team::Yellow));
        }
    }

    #[test]
    fn test_think_all_negative_budget() {
        let b = board("y5=y", Team::Yellow);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(
            b.think_all(&maxn(), roll(2, 3), Team::Yellow, -5, None, &mut rng),
            Err(Error::NegativeBudget(-5))
        );
    }
}
