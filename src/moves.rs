//! Move representation and notation.
//!
//! - [`PieceMove`]: one marble going from a square (or from start) to a square
//! - [`Move`]: one or two piece moves made by a team with a single roll
//! - [`MoveCollection`]: the legal, de-duplicated moves for one position
//!
//! Notation:
//! - take-out: destination only, `g7`
//! - step: origin then destination, `g6b1`
//! - relative step: origin plus distance, `b3+5` (parsed only)
//! - move: piece moves joined by `", "`

use std::fmt;
use std::ops::Index;

use crate::error::{Error, Result};
use crate::movegen::is_legal;
use crate::position::Position;
use crate::square::{Square, Team};

/// A single marble moving. `from == None` takes a marble out of start.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PieceMove {
    pub from: Option<Square>,
    pub to: Square,
}

impl PieceMove {
    pub const fn new(from: Square, to: Square) -> Self {
        PieceMove { from: Some(from), to }
    }

    pub const fn take_out(to: Square) -> Self {
        PieceMove { from: None, to }
    }

    #[inline]
    pub const fn is_take_out(&self) -> bool {
        self.from.is_none()
    }

    /// The square the marble leaves. For a take-out this is the first cell of
    /// the destination quadrant.
    #[inline]
    pub fn origin(&self) -> Square {
        self.from
            .unwrap_or_else(|| Square::from_parts(self.to.quadrant(), 0))
    }

    /// Squares crossed by the marble in `team`'s frame, origin excluded,
    /// destination included.
    pub fn path(&self, team: Team) -> impl Iterator<Item = Square> {
        let first = self.origin().board_index(team) + 1;
        let last = self.to.board_index(team);
        (first..=last).filter_map(move |index| Square::from_board_index(index, team))
    }

    /// Parse one piece move for `team`. Accepts all three notations.
    pub fn parse(notation: &str, team: Team) -> Result<PieceMove> {
        let invalid = || Error::InvalidMove(notation.to_string());
        let text = notation.trim();

        if let Some((origin, steps)) = text.split_once('+') {
            let from: Square = origin.trim().parse()?;
            let steps: usize = steps.trim().parse().map_err(|_| invalid())?;
            let to = from.add(steps, team).ok_or_else(invalid)?;
            return Ok(PieceMove::new(from, to));
        }

        match split_squares(text) {
            Some((from, to)) => Ok(PieceMove::new(from.parse()?, to.parse()?)),
            None => {
                let to: Square = text.parse()?;
                if to.is_in_base() || to.quadrant_team() != team {
                    return Err(invalid());
                }
                Ok(PieceMove::take_out(to))
            }
        }
    }
}

/// Split `"g6b1"` into `("g6", "b1")`: the second square starts at the first
/// letter that follows a digit.
fn split_squares(text: &str) -> Option<(&str, &str)> {
    let bytes = text.as_bytes();
    (1..bytes.len())
        .find(|&i| bytes[i].is_ascii_alphabetic() && bytes[i - 1].is_ascii_digit())
        .map(|i| text.split_at(i))
}

impl fmt::Display for PieceMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.from {
            Some(from) => write!(f, "{from}{}", self.to),
            None => write!(f, "{}", self.to),
        }
    }
}

/// One or two piece moves made by `team` with a single roll.
///
/// Pieces are applied in order; move generation orders them so that a marble
/// leaves a square before another lands on it. Equality ignores piece order.
#[derive(Copy, Clone, Debug)]
pub struct Move {
    team: Team,
    pieces: [PieceMove; 2],
    count: u8,
}

impl Move {
    pub fn new(team: Team, pieces: &[PieceMove]) -> Result<Move> {
        match *pieces {
            [a] => Ok(Move::single(team, a)),
            [a, b] => Ok(Move::pair(team, a, b)),
            _ => Err(Error::InvalidPieceCount(pieces.len())),
        }
    }

    pub const fn single(team: Team, piece: PieceMove) -> Move {
        Move {
            team,
            pieces: [piece, piece],
            count: 1,
        }
    }

    pub const fn pair(team: Team, first: PieceMove, second: PieceMove) -> Move {
        Move {
            team,
            pieces: [first, second],
            count: 2,
        }
    }

    #[inline]
    pub const fn team(&self) -> Team {
        self.team
    }

    #[inline]
    pub fn pieces(&self) -> &[PieceMove] {
        &self.pieces[..self.count as usize]
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.count as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether any piece takes a marble out of start.
    pub fn takes_out(&self) -> bool {
        self.pieces().iter().any(PieceMove::is_take_out)
    }

    /// Parse a move for `team`: piece moves separated by commas.
    pub fn parse(notation: &str, team: Team) -> Result<Move> {
        let pieces = notation
            .split(',')
            .map(|piece| PieceMove::parse(piece, team))
            .collect::<Result<Vec<_>>>()?;
        Move::new(team, &pieces)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Move) -> bool {
        if self.team != other.team || self.count != other.count {
            return false;
        }
        let (a, b) = (self.pieces(), other.pieces());
        match self.count {
            1 => a[0] == b[0],
            _ => (a[0] == b[0] && a[1] == b[1]) || (a[0] == b[1] && a[1] == b[0]),
        }
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, piece) in self.pieces().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{piece}")?;
        }
        Ok(())
    }
}

/// The legal moves found for one position, in insertion order.
///
/// [`MoveCollection::add`] checks every move against the position and drops
/// illegal moves and duplicates.
#[derive(Clone, Debug)]
pub struct MoveCollection {
    position: Position,
    moves: Vec<Move>,
}

impl MoveCollection {
    pub fn new(position: Position) -> Self {
        MoveCollection {
            position,
            moves: Vec::new(),
        }
    }

    /// Add a move if it is legal and not already present.
    pub fn add(&mut self, mv: Move) -> bool {
        if !is_legal(&self.position, &mv) || self.moves.contains(&mv) {
            return false;
        }
        self.moves.push(mv);
        true
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Move> {
        self.moves.get(index)
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.moves.contains(mv)
    }

    /// The stored move equal to `mv`, carrying the generator's piece order.
    pub fn find(&self, mv: &Move) -> Option<&Move> {
        self.moves.iter().find(|m| *m == mv)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn into_vec(self) -> Vec<Move> {
        self.moves
    }
}

impl Index<usize> for MoveCollection {
    type Output = Move;

    fn index(&self, index: usize) -> &Move {
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveCollection {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}
