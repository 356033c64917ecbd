//! Board snapshot representation.
//!
//! A [`Position`] is a flat array with one slot per cell (see
//! [`Square::cell`]): the 48 path cells first, then the four 5-cell home lanes.
//! Each slot holds the team occupying it, or `None`.
//!
//! Marbles that are not on the board are "at start". They are never stored;
//! a team has `TEAM_SIZE - marbles on board` of them.
//!
//! Positions are `Copy`, so search branches clone them freely.

use std::fmt;

use crate::constants::{BASE_LENGTH, CELL_COUNT, QUAD_LENGTH, TEAM_SIZE};
use crate::error::{Error, Result};
use crate::square::{Square, Team};

/// A snapshot of every cell on the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    cells: [Option<Team>; CELL_COUNT],
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// An empty board: every marble at start.
    pub fn new() -> Self {
        Position {
            cells: [None; CELL_COUNT],
        }
    }

    /// Build a position from a setup string such as `"b11=y, b12=y, hg3=g"`.
    ///
    /// Each entry places one marble. A team may not have more than
    /// `TEAM_SIZE` marbles and a square may not be listed twice.
    pub fn from_setup(setup: &str) -> Result<Position> {
        let mut pos = Position::new();
        for entry in setup.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (square, team) = entry
                .split_once('=')
                .ok_or_else(|| Error::InvalidSetup(entry.to_string()))?;
            let square: Square = square.trim().parse()?;
            let team: Team = team.trim().parse()?;

            if pos.get(square).is_some() {
                return Err(Error::InvalidSetup(format!("{square} is listed twice")));
            }
            if pos.on_board_count(team) == TEAM_SIZE {
                return Err(Error::InvalidSetup(format!("{team} has more than {TEAM_SIZE} marbles")));
            }
            if square.is_in_base() && square.quadrant_team() != team {
                return Err(Error::InvalidSetup(format!("{team} cannot stand in {square}")));
            }
            pos.place(square, team);
        }
        Ok(pos)
    }

    #[inline]
    pub fn get(&self, square: Square) -> Option<Team> {
        self.cells[square.cell()]
    }

    #[inline]
    pub fn set(&mut self, square: Square, marble: Option<Team>) {
        self.cells[square.cell()] = marble;
    }

    #[inline]
    pub fn place(&mut self, square: Square, team: Team) {
        self.set(square, Some(team));
    }

    #[inline]
    pub fn clear(&mut self, square: Square) {
        self.set(square, None);
    }

    /// Whether `square` holds a marble of `team`.
    #[inline]
    pub fn is_team(&self, square: Square, team: Team) -> bool {
        self.get(square) == Some(team)
    }

    /// The team's marbles in cell order (path quadrants, then home lanes).
    ///
    /// Occupied entries come first; trailing `None`s are marbles at start.
    pub fn marbles(&self, team: Team) -> [Option<Square>; TEAM_SIZE] {
        let mut marbles = [None; TEAM_SIZE];
        let squares = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == Some(team))
            .map(|(cell, _)| Square::from_cell(cell));
        for (slot, square) in marbles.iter_mut().zip(squares) {
            *slot = Some(square);
        }
        marbles
    }

    /// Marbles of `team` on the board, home lane included.
    pub fn on_board_count(&self, team: Team) -> usize {
        self.cells.iter().filter(|cell| **cell == Some(team)).count()
    }

    /// Marbles of `team` on the shared path.
    pub fn path_count(&self, team: Team) -> usize {
        self.path_marbles(team).count()
    }

    /// Marbles of `team` waiting at start.
    pub fn at_start_count(&self, team: Team) -> usize {
        TEAM_SIZE.saturating_sub(self.on_board_count(team))
    }

    /// Squares of `team`'s marbles on the shared path, in cell order.
    pub fn path_marbles(&self, team: Team) -> impl Iterator<Item = Square> + '_ {
        self.cells[..crate::constants::PATH_LENGTH]
            .iter()
            .enumerate()
            .filter(move |(_, cell)| **cell == Some(team))
            .map(|(cell, _)| Square::from_cell(cell))
    }

    /// The team whose home lane is full, if any.
    pub fn winner(&self) -> Option<Team> {
        Team::ALL.into_iter().find(|&team| {
            (0..BASE_LENGTH)
                .filter_map(|offset| Square::home(team, offset))
                .all(|square| self.get(square).is_some())
        })
    }

    #[inline]
    pub fn is_won(&self) -> bool {
        self.winner().is_some()
    }

    /// Remove `team`'s most advanced path marble, measured along its own walk
    /// (the triple-doubles penalty). Returns the square it was removed from.
    pub fn remove_front_marble(&mut self, team: Team) -> Option<Square> {
        let front = self.path_marbles(team).max_by_key(|square| square.board_index(team))?;
        self.clear(front);
        Some(front)
    }

    /// Setup-string form of this position, accepted by [`Position::from_setup`].
    pub fn to_setup(&self) -> String {
        Square::all()
            .filter_map(|square| self.get(square).map(|team| format!("{square}={}", team.letter())))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

// =============================================================================
// Diagram
// =============================================================================

const GRID: usize = QUAD_LENGTH + 1;

/// Grid coordinates of yellow's quadrant; the others are rotations of it.
const QUADRANT_LAYOUT: [(usize, usize); QUAD_LENGTH] = [
    (0, 7),
    (1, 7),
    (2, 7),
    (3, 7),
    (4, 7),
    (5, 7),
    (5, 8),
    (5, 9),
    (5, 10),
    (5, 11),
    (5, 12),
    (6, 12),
];

/// Rotate a grid coordinate a quarter turn clockwise, `turns` times.
fn rotate((mut r, mut c): (usize, usize), turns: usize) -> (usize, usize) {
    for _ in 0..turns {
        (r, c) = (c, GRID - 1 - r);
    }
    (r, c)
}

fn grid_coord(square: Square) -> (usize, usize) {
    let turns = square.quadrant_team().index();
    if square.is_in_path() {
        rotate(QUADRANT_LAYOUT[square.offset()], turns)
    } else {
        rotate((1 + square.offset(), 6), turns)
    }
}

impl fmt::Display for Position {
    /// Cross-shaped diagram: yellow's arm on top, then clockwise red, green, blue.
    /// Empty path cells are `.`, empty home cells `_`, marbles their team letter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut grid = [[' '; GRID]; GRID];
        for square in Square::all() {
            let (r, c) = grid_coord(square);
            grid[r][c] = match self.get(square) {
                Some(team) => team.letter().to_ascii_uppercase(),
                None if square.is_in_path() => '.',
                None => '_',
            };
        }
        for row in grid.iter() {
            let line: Vec<String> = row.iter().map(char::to_string).collect();
            writeln!(f, "{}", line.join(" ").trim_end())?;
        }
        Ok(())
    }
}
