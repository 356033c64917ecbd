//! Teams, squares, and the coordinate transforms between them.
//!
//! A square is a `(quadrant, offset)` pair. Quadrants `0..4` are the path
//! quadrants (one per team, in board order), quadrants `4..8` are the home
//! lanes. Each team walks the path starting with its own quadrant and then the
//! following ones cyclically, before turning into its home lane.
//!
//! The *board index* of a square is its 1-based distance along a team's walk:
//! `1..=48` on the path and `49..=53` in the home lane. All distance
//! comparisons go through it.
//!
//! Notation: `g7` is the seventh cell of the green quadrant, `hb3` is the
//! third cell of blue's home lane.

use std::fmt;
use std::str::FromStr;

use crate::constants::{
    BASE_LENGTH, GOAL_INDEX, LAST_PATH_INDEX, PATH_LENGTH, QUAD_COUNT, QUAD_LENGTH, TEAM_COUNT,
};
use crate::error::{Error, Result};

/// One of the four teams. The discriminant is also the team's path quadrant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Team {
    Yellow = 0,
    Red = 1,
    Green = 2,
    Blue = 3,
}

impl Team {
    pub const ALL: [Team; TEAM_COUNT] = [Team::Yellow, Team::Red, Team::Green, Team::Blue];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Result<Team> {
        Team::ALL
            .get(index)
            .copied()
            .ok_or_else(|| Error::InvalidTeam(index.to_string()))
    }

    /// The team that plays after this one.
    #[inline]
    pub const fn next(self) -> Team {
        Team::ALL[(self.index() + 1) % TEAM_COUNT]
    }

    /// Notation letter.
    pub const fn letter(self) -> char {
        match self {
            Team::Yellow => 'y',
            Team::Red => 'r',
            Team::Green => 'g',
            Team::Blue => 'b',
        }
    }

    pub fn from_letter(c: char) -> Option<Team> {
        match c.to_ascii_lowercase() {
            'y' => Some(Team::Yellow),
            'r' => Some(Team::Red),
            'g' => Some(Team::Green),
            'b' => Some(Team::Blue),
            _ => None,
        }
    }

    /// The three opponents, in playing order after this team.
    pub fn opponents(self) -> [Team; TEAM_COUNT - 1] {
        let a = self.next();
        let b = a.next();
        [a, b, b.next()]
    }

    /// Path quadrants in the order this team walks them.
    #[inline]
    pub const fn quadrant_order(self) -> [usize; QUAD_COUNT] {
        let t = self.index();
        [t, (t + 1) % 4, (t + 2) % 4, (t + 3) % 4]
    }

    /// Position (0..4) of a path quadrant in this team's walk.
    #[inline]
    pub const fn quadrant_position(self, quadrant: usize) -> usize {
        (quadrant + QUAD_COUNT - self.index()) % QUAD_COUNT
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Team::Yellow => "Yellow",
            Team::Red => "Red",
            Team::Green => "Green",
            Team::Blue => "Blue",
        };
        f.write_str(name)
    }
}

impl FromStr for Team {
    type Err = Error;

    /// Accepts a letter (`g`), a name (`green`), or an index (`2`).
    fn from_str(s: &str) -> Result<Team> {
        let lower = s.trim().to_ascii_lowercase();
        if let Ok(index) = lower.parse::<usize>() {
            return Team::from_index(index);
        }
        let team = match lower.as_str() {
            "yellow" => Some(Team::Yellow),
            "red" => Some(Team::Red),
            "green" => Some(Team::Green),
            "blue" => Some(Team::Blue),
            _ if lower.len() == 1 => lower.chars().next().and_then(Team::from_letter),
            _ => None,
        };
        team.ok_or_else(|| Error::InvalidTeam(s.to_string()))
    }
}

/// A cell on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    quadrant: u8,
    offset: u8,
}

impl Square {
    /// Create a square, validating both coordinates.
    pub fn new(quadrant: usize, offset: usize) -> Result<Square> {
        if quadrant >= QUAD_COUNT * 2 || offset >= quadrant_length(quadrant) {
            return Err(Error::InvalidSquare(format!("({quadrant}, {offset})")));
        }
        Ok(Square::from_parts(quadrant, offset))
    }

    /// Internal constructor for coordinates already known to be in range.
    #[inline]
    pub(crate) const fn from_parts(quadrant: usize, offset: usize) -> Square {
        Square {
            quadrant: quadrant as u8,
            offset: offset as u8,
        }
    }

    /// The square a team's marbles enter the path on.
    #[inline]
    pub const fn start(team: Team) -> Square {
        Square::from_parts(team.index(), 0)
    }

    /// A cell in `team`'s own path quadrant.
    pub fn path(team: Team, offset: usize) -> Option<Square> {
        (offset < QUAD_LENGTH).then(|| Square::from_parts(team.index(), offset))
    }

    /// A cell in `team`'s home lane.
    pub fn home(team: Team, offset: usize) -> Option<Square> {
        (offset < BASE_LENGTH).then(|| Square::from_parts(QUAD_COUNT + team.index(), offset))
    }

    #[inline]
    pub const fn quadrant(self) -> usize {
        self.quadrant as usize
    }

    #[inline]
    pub const fn offset(self) -> usize {
        self.offset as usize
    }

    #[inline]
    pub const fn is_in_path(self) -> bool {
        (self.quadrant as usize) < QUAD_COUNT
    }

    #[inline]
    pub const fn is_in_base(self) -> bool {
        !self.is_in_path()
    }

    /// The team whose quadrant or home lane this square belongs to.
    #[inline]
    pub const fn quadrant_team(self) -> Team {
        Team::ALL[self.quadrant as usize % QUAD_COUNT]
    }

    /// Index into a position's flat cell array.
    #[inline]
    pub const fn cell(self) -> usize {
        if self.is_in_path() {
            self.quadrant as usize * QUAD_LENGTH + self.offset as usize
        } else {
            PATH_LENGTH + (self.quadrant as usize - QUAD_COUNT) * BASE_LENGTH + self.offset as usize
        }
    }

    /// Inverse of [`Square::cell`].
    #[inline]
    pub const fn from_cell(cell: usize) -> Square {
        if cell < PATH_LENGTH {
            Square::from_parts(cell / QUAD_LENGTH, cell % QUAD_LENGTH)
        } else {
            let base = cell - PATH_LENGTH;
            Square::from_parts(QUAD_COUNT + base / BASE_LENGTH, base % BASE_LENGTH)
        }
    }

    /// Every square on the board, in cell order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..crate::constants::CELL_COUNT).map(Square::from_cell)
    }

    /// 1-based distance of this square along `team`'s walk.
    ///
    /// Home cells always map to `49..=53` in their owner's frame.
    #[inline]
    pub const fn board_index(self, team: Team) -> usize {
        if self.is_in_base() {
            LAST_PATH_INDEX + self.offset as usize + 1
        } else {
            QUAD_LENGTH * team.quadrant_position(self.quadrant as usize) + self.offset as usize + 1
        }
    }

    /// The square at a board index in `team`'s frame, if it exists.
    pub fn from_board_index(index: usize, team: Team) -> Option<Square> {
        match index {
            1..=LAST_PATH_INDEX => {
                let position = (index - 1) / QUAD_LENGTH;
                let quadrant = team.quadrant_order()[position];
                Some(Square::from_parts(quadrant, (index - 1) % QUAD_LENGTH))
            }
            i if i <= GOAL_INDEX && i > LAST_PATH_INDEX => Square::home(team, i - LAST_PATH_INDEX - 1),
            _ => None,
        }
    }

    /// The square `value` steps ahead in `team`'s frame, or `None` when the move
    /// would run past the last home cell.
    pub fn add(self, value: usize, team: Team) -> Option<Square> {
        if self.is_in_base() {
            return Square::home(self.quadrant_team(), self.offset().checked_add(value)?);
        }
        Square::from_board_index(self.board_index(team).checked_add(value)?, team)
    }

    /// Signed distance from this square to `other` in `team`'s frame.
    #[inline]
    pub const fn distance_to(self, other: Square, team: Team) -> isize {
        other.board_index(team) as isize - self.board_index(team) as isize
    }
}

/// Cells in a quadrant (path or home lane). Zero for out-of-range quadrants.
pub const fn quadrant_length(quadrant: usize) -> usize {
    if quadrant < QUAD_COUNT {
        QUAD_LENGTH
    } else if quadrant < QUAD_COUNT * 2 {
        BASE_LENGTH
    } else {
        0
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in_base() {
            write!(f, "h")?;
        }
        write!(f, "{}{}", self.quadrant_team().letter(), self.offset + 1)
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Square> {
        let invalid = || Error::InvalidSquare(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let (home, rest) = match lower.strip_prefix('h') {
            Some(rest) => (true, rest),
            None => (false, lower.as_str()),
        };

        let mut chars = rest.chars();
        let team = chars.next().and_then(Team::from_letter).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: usize = digits.parse().map_err(|_| invalid())?;
        let offset = number.checked_sub(1).ok_or_else(invalid)?;

        let square = if home {
            Square::home(team, offset)
        } else {
            Square::path(team, offset)
        };
        square.ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn test_notation_roundtrip_all_squares() {
        for square in Square::all() {
            let text = square.to_string();
            assert_eq!(text.parse::<Square>().unwrap(), square, "roundtrip {text}");
        }
    }

    #[test]
    fn test_cell_roundtrip() {
        for cell in 0..crate::constants::CELL_COUNT {
            assert_eq!(Square::from_cell(cell).cell(), cell);
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "g", "g0", "g13", "hg6", "hg0", "x3", "h", "hh1", "g1a", "g-1"] {
            assert!(bad.parse::<Square>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_new_validates() {
        assert!(Square::new(3, 11).is_ok());
        assert!(Square::new(3, 12).is_err());
        assert!(Square::new(7, 4).is_ok());
        assert!(Square::new(7, 5).is_err());
        assert!(Square::new(8, 0).is_err());
    }

    #[test]
    fn test_board_index_frames() {
        // Green walks green, blue, yellow, red.
        assert_eq!(sq("g1").board_index(Team::Green), 1);
        assert_eq!(sq("b1").board_index(Team::Green), 13);
        assert_eq!(sq("r12").board_index(Team::Green), 48);
        assert_eq!(sq("r12").board_index(Team::Yellow), 24);
        assert_eq!(sq("hg1").board_index(Team::Green), 49);
        assert_eq!(sq("hg5").board_index(Team::Green), 53);
    }

    #[test]
    fn test_add_crosses_quadrants() {
        assert_eq!(sq("g6").add(7, Team::Green), Some(sq("b1")));
        assert_eq!(sq("y12").add(1, Team::Yellow), Some(sq("r1")));
        assert_eq!(sq("b12").add(1, Team::Yellow), Some(sq("hy1")));
        assert_eq!(sq("b11").add(2, Team::Yellow), Some(sq("hy1")));
        // Red passes yellow's home entrance and keeps going.
        assert_eq!(sq("b12").add(1, Team::Red), Some(sq("y1")));
    }

    #[test]
    fn test_add_overshoot_is_none() {
        assert_eq!(sq("b12").add(5, Team::Yellow), Some(sq("hy5")));
        assert_eq!(sq("b12").add(6, Team::Yellow), None);
        assert_eq!(sq("hy3").add(2, Team::Yellow), Some(sq("hy5")));
        assert_eq!(sq("hy3").add(3, Team::Yellow), None);
        assert_eq!(sq("g4").add(usize::MAX, Team::Green), None);
        assert_eq!(sq("hg2").add(usize::MAX, Team::Green), None);
    }

    #[test]
    fn test_add_is_pure() {
        let from = sq("r4");
        let _ = from.add(5, Team::Red);
        assert_eq!(from, sq("r4"));
        assert_eq!(from.add(0, Team::Red), Some(from));
    }

    #[test]
    fn test_distance_to() {
        assert_eq!(sq("g1").distance_to(sq("g7"), Team::Green), 6);
        assert_eq!(sq("g7").distance_to(sq("g1"), Team::Green), -6);
        assert_eq!(sq("r9").distance_to(sq("hg2"), Team::Green), 5);
    }

    #[test]
    fn test_team_parsing_and_order() {
        assert_eq!("g".parse::<Team>().unwrap(), Team::Green);
        assert_eq!("Blue".parse::<Team>().unwrap(), Team::Blue);
        assert_eq!("1".parse::<Team>().unwrap(), Team::Red);
        assert!("4".parse::<Team>().is_err());
        assert!("purple".parse::<Team>().is_err());
        assert_eq!(Team::Blue.next(), Team::Yellow);
        assert_eq!(Team::Green.quadrant_order(), [2, 3, 0, 1]);
        assert_eq!(Team::Red.opponents(), [Team::Green, Team::Blue, Team::Yellow]);
    }
}
