//! Legal move generation and move application.
//!
//! - [`legal_moves`]: every rule-legal move for a position, roll and team
//! - [`is_legal`]: the blocking rule, including the same-turn overtake exception
//! - [`apply_move`]: update a position in place
//! - [`child_nodes`]: successor positions over all rolls, for tree search

use crate::constants::TEAM_SIZE;
use crate::dice::DiceRoll;
use crate::moves::{Move, MoveCollection, PieceMove};
use crate::position::Position;
use crate::search::PositionNode;
use crate::square::{Square, Team};

/// Whether every piece of `mv` has a clear path in `pos`.
///
/// A piece may not pass or land on a friendly marble, unless that marble is
/// the origin of another piece in the same move that ends further along.
/// The check is made against the position before any piece moves.
pub fn is_legal(pos: &Position, mv: &Move) -> bool {
    mv.pieces()
        .iter()
        .all(|piece| is_piece_legal(pos, mv, piece))
}

fn is_piece_legal(pos: &Position, mv: &Move, piece: &PieceMove) -> bool {
    let team = mv.team();
    let target = piece.to.board_index(team);
    piece.path(team).all(|square| {
        !pos.is_team(square, team)
            || mv.pieces().iter().any(|other| {
                other.from == Some(square) && other.to.board_index(team) > target
            })
    })
}

/// All legal moves for `team` with `roll`. Empty when the game is over.
pub fn legal_moves(pos: &Position, roll: DiceRoll, team: Team) -> MoveCollection {
    let mut moves = MoveCollection::new(*pos);
    if pos.is_won() {
        return moves;
    }

    let active: Vec<Square> = pos.marbles(team).into_iter().flatten().collect();
    let start = Square::start(team);
    let start_taken = pos.is_team(start, team);

    if active.len() < TEAM_SIZE {
        if !start_taken {
            for offset in roll.take_out_targets() {
                let to = Square::from_parts(team.index(), offset);
                if !pos.is_team(to, team) {
                    moves.add(Move::single(team, PieceMove::take_out(to)));
                }
            }
        }

        // Put a marble on the start square and spend the other die elsewhere.
        let enter = PieceMove::take_out(start);
        for &marble in &active {
            if start_taken && marble != start {
                continue;
            }
            for value in roll.take_out_combinations() {
                if let Some(to) = marble.add(value, team) {
                    moves.add(Move::pair(team, PieceMove::new(marble, to), enter));
                }
            }
        }
    }

    let sum = roll.sum();
    let splits = roll.piece_values(2).unwrap_or_default();

    for (i, &first) in active.iter().enumerate() {
        if let Some(to) = first.add(sum, team) {
            moves.add(Move::single(team, PieceMove::new(first, to)));
        }

        for &second in &active[i + 1..] {
            for values in &splits {
                let (Some(first_to), Some(second_to)) =
                    (first.add(values[0], team), second.add(values[1], team))
                else {
                    continue;
                };
                let p1 = PieceMove::new(first, first_to);
                let p2 = PieceMove::new(second, second_to);
                // A marble must leave a square before another lands on it.
                let mv = if p2.from == Some(p1.to) {
                    Move::pair(team, p2, p1)
                } else {
                    Move::pair(team, p1, p2)
                };
                moves.add(mv);
            }
        }
    }

    moves
}

/// Apply one piece move. A take-out first clears the start square.
/// Whatever stood on the destination is displaced.
pub fn apply_piece(pos: &mut Position, piece: &PieceMove, team: Team) {
    match piece.from {
        Some(from) => pos.clear(from),
        None => pos.clear(Square::start(team)),
    }
    pos.place(piece.to, team);
}

/// Apply every piece of `mv` in order.
pub fn apply_move(pos: &mut Position, mv: &Move) {
    for piece in mv.pieces() {
        apply_piece(pos, piece, mv.team());
    }
}

/// Enemy marbles `mv` would send back to start, as `(square, owner)`.
pub fn captures(pos: &Position, mv: &Move) -> Vec<(Square, Team)> {
    let team = mv.team();
    let mut captured = Vec::new();
    for piece in mv.pieces() {
        let mut hit = |square: Square| {
            if let Some(owner) = pos.get(square) {
                if owner != team && !captured.contains(&(square, owner)) {
                    captured.push((square, owner));
                }
            }
        };
        if piece.is_take_out() {
            hit(Square::start(team));
        }
        hit(piece.to);
    }
    captured
}

/// Rolls to expand when searching `team`'s turn.
///
/// With no marble on the board only take-outs exist, and the six rolls
/// `1+1..1+6` produce every one of them. Otherwise each unordered roll is
/// enough since both die orders are generated anyway.
pub fn rolls_queue(pos: &Position, team: Team) -> &'static [DiceRoll] {
    if pos.on_board_count(team) == 0 {
        &DiceRoll::ALL_START_NO_REPT
    } else {
        &DiceRoll::ALL_NO_DUPL
    }
}

/// Successor nodes of `pos` for `team` over every roll in [`rolls_queue`].
pub fn child_nodes(pos: &Position, team: Team) -> Vec<PositionNode> {
    if pos.is_won() {
        return Vec::new();
    }
    let mut nodes = Vec::new();
    for &roll in rolls_queue(pos, team) {
        for mv in &legal_moves(pos, roll, team) {
            let mut child = *pos;
            apply_move(&mut child, mv);
            nodes.push(PositionNode::new(child, Some(*mv), roll));
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn roll(a: u8, b: u8) -> DiceRoll {
        DiceRoll::new(a, b).unwrap()
    }

    fn notations(moves: &MoveCollection) -> Vec<String> {
        moves.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_empty_board_take_outs() {
        let pos = Position::new();
        assert_eq!(notations(&legal_moves(&pos, roll(1, 6), Team::Green)), vec!["g2", "g7"]);
        assert_eq!(notations(&legal_moves(&pos, roll(6, 6), Team::Green)), vec!["g7"]);
        assert_eq!(notations(&legal_moves(&pos, roll(1, 3), Team::Red)), vec!["r4"]);
        assert!(legal_moves(&pos, roll(2, 5), Team::Red).is_empty());
    }

    #[test]
    fn test_take_out_blocked_by_own_start() {
        let pos = Position::from_setup("g1=g").unwrap();
        let moves = legal_moves(&pos, roll(1, 4), Team::Green);
        // No plain take-out, but the start marble may step aside for a new one.
        assert!(!moves.iter().any(|m| m.len() == 1 && m.takes_out()));
        assert!(notations(&moves).contains(&"g1g5, g1".to_string()));
    }

    #[test]
    fn test_take_out_combination() {
        let pos = Position::from_setup("r3=g").unwrap();
        let moves = notations(&legal_moves(&pos, roll(6, 2), Team::Green));
        assert!(moves.contains(&"g3".to_string()));
        assert!(moves.contains(&"r3r5, g1".to_string()));
        assert!(moves.contains(&"r3r11".to_string()));
    }

    #[test]
    fn test_two_marble_order() {
        // g2 lands where g4's marble stands; g4 must move first.
        let pos = Position::from_setup("g2=g, g4=g").unwrap();
        let moves = legal_moves(&pos, roll(2, 3), Team::Green);
        let mv = moves
            .iter()
            .find(|m| m.pieces().iter().any(|p| p.to == sq("g4")))
            .unwrap();
        assert_eq!(mv.pieces()[0].from, Some(sq("g4")));
        let mut after = pos;
        apply_move(&mut after, mv);
        assert_eq!(after.on_board_count(Team::Green), 2);
    }

    #[test]
    fn test_self_overtake_exception() {
        let pos = Position::from_setup("g2=g, g4=g").unwrap();
        let jump = Move::pair(
            Team::Green,
            PieceMove::new(sq("g4"), sq("g10")),
            PieceMove::new(sq("g2"), sq("g6")),
        );
        assert!(is_legal(&pos, &jump));

        let short = Move::pair(
            Team::Green,
            PieceMove::new(sq("g4"), sq("g5")),
            PieceMove::new(sq("g2"), sq("g6")),
        );
        assert!(!is_legal(&pos, &short));
    }

    #[test]
    fn test_overshoot_is_dropped() {
        let pos = Position::from_setup("hy4=y").unwrap();
        // The sum runs past hy5; a single die still fits beside a take-out.
        let moves = legal_moves(&pos, roll(1, 1), Team::Yellow);
        assert_eq!(notations(&moves), vec!["y2", "hy4hy5, y1"]);
    }

    #[test]
    fn test_won_position_has_no_moves() {
        let pos = Position::from_setup("hb1=b, hb2=b, hb3=b, hb4=b, hb5=b, g1=g").unwrap();
        assert!(legal_moves(&pos, roll(3, 4), Team::Green).is_empty());
        assert!(child_nodes(&pos, Team::Green).is_empty());
    }

    #[test]
    fn test_apply_take_out_captures_on_start() {
        let mut pos = Position::from_setup("g1=r").unwrap();
        let mv = Move::single(Team::Green, PieceMove::take_out(sq("g7")));
        assert_eq!(captures(&pos, &mv), vec![(sq("g1"), Team::Red)]);
        apply_move(&mut pos, &mv);
        assert_eq!(pos.get(sq("g1")), None);
        assert_eq!(pos.get(sq("g7")), Some(Team::Green));
        assert_eq!(pos.on_board_count(Team::Red), 0);
    }

    #[test]
    fn test_rolls_queue() {
        let empty = Position::new();
        assert_eq!(rolls_queue(&empty, Team::Blue).len(), 6);
        let pos = Position::from_setup("hb1=b").unwrap();
        assert_eq!(rolls_queue(&pos, Team::Blue).len(), 21);
    }

    #[test]
    fn test_child_nodes_carry_move_and_roll() {
        let pos = Position::new();
        let nodes = child_nodes(&pos, Team::Yellow);
        // 1+1..1+6 each take out one marble.
        assert_eq!(nodes.len(), 7);
        for node in &nodes {
            assert_eq!(node.position.on_board_count(Team::Yellow), 1);
            assert!(node.mv.is_some());
        }
    }
}
