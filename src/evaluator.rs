//! Static position evaluation.
//!
//! Every team is scored independently in "marbles scored" units (a full home
//! lane is worth about 5). The score combines:
//! - activity: a small bonus per marble on the board
//! - advancement: how far along the path the team's marbles are
//! - danger: chance of being captured by enemy marbles behind us
//! - enemy progress: a damped penalty for the opponents' advancement
//! - home bonus: marbles packed at the back of the home lane
//!
//! A won position scores `f64::MAX` for the winner and zero for everyone else.

use std::fmt;
use std::ops::Index;

use crate::constants::{
    BASE_LENGTH, ENEMY_PROGRESS_FACTOR, GOAL_INDEX, LAST_PATH_INDEX, MARBLE_VALUE,
    MAX_THREAT_DISTANCE, P_ANY_NUM, P_GETTING_OUT, P_ROLLING_DOUBLES_3X, SINGLE_DIE_REACH,
    TEAM_COUNT, TEAM_SIZE, WIN_SCORE,
};
use crate::dice::probability_quick;
use crate::position::Position;
use crate::square::{Square, Team};

/// One score per team, indexed by [`Team`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Evaluation {
    scores: [f64; TEAM_COUNT],
}

impl Evaluation {
    pub const ZERO: Evaluation = Evaluation {
        scores: [0.0; TEAM_COUNT],
    };

    pub const fn new(scores: [f64; TEAM_COUNT]) -> Self {
        Evaluation { scores }
    }

    #[inline]
    pub fn get(&self, team: Team) -> f64 {
        self.scores[team.index()]
    }

    #[inline]
    pub fn set(&mut self, team: Team, score: f64) {
        self.scores[team.index()] = score;
    }

    pub fn scores(&self) -> [f64; TEAM_COUNT] {
        self.scores
    }

    /// The team with a strictly higher score than all others.
    pub fn direction(&self) -> Option<Team> {
        Team::ALL.into_iter().find(|&team| {
            team.opponents()
                .iter()
                .all(|&other| self.get(team) > self.get(other))
        })
    }

    /// `team`'s score relative to the strict leader; its own score if it leads
    /// or nobody does.
    pub fn magnitude(&self, team: Team) -> f64 {
        match self.direction() {
            Some(leader) if leader != team => self.get(team) - self.get(leader),
            _ => self.get(team),
        }
    }

    /// Sum of the magnitudes of every team except `excluding`.
    pub fn length(&self, excluding: Team) -> f64 {
        excluding
            .opponents()
            .iter()
            .map(|&team| self.magnitude(team))
            .sum()
    }

    pub fn is_same(&self) -> bool {
        self.scores.iter().all(|&s| s == self.scores[0])
    }

    /// Scale by a roll weight (see [`crate::dice::DiceRoll::eval_weight`]).
    /// A weight of `1/6` leaves the scores unchanged; likelier rolls amplify them.
    pub fn scaled(&self, weight: f64) -> Evaluation {
        let revised = P_ANY_NUM - weight;
        Evaluation {
            scores: self.scores.map(|s| s - s * revised),
        }
    }

    /// Teams ordered by descending score; ties keep team order.
    pub fn ranking(&self) -> [(Team, f64); TEAM_COUNT] {
        let mut ranked = Team::ALL.map(|team| (team, self.get(team)));
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }
}

impl Index<Team> for Evaluation {
    type Output = f64;

    fn index(&self, team: Team) -> &f64 {
        &self.scores[team.index()]
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Team::ALL
            .iter()
            .map(|&team| format!("{}={:.4}", team.letter(), self.get(team)))
            .collect();
        write!(f, "[{}]", parts.join(" "))
    }
}

/// Evaluate every team. `rolled_doubles` is the team holding an extra turn
/// from doubles; its danger term is skipped.
pub fn evaluate(pos: &Position, rolled_doubles: Option<Team>) -> Evaluation {
    let mut evaluation = Evaluation::ZERO;
    if let Some(winner) = pos.winner() {
        evaluation.set(winner, WIN_SCORE);
        return evaluation;
    }
    for team in Team::ALL {
        evaluation.set(team, evaluate_team(pos, team, rolled_doubles == Some(team)));
    }
    evaluation
}

/// The deepest home cell `team` has not filled yet.
fn end_goal(pos: &Position, team: Team) -> Option<Square> {
    (0..BASE_LENGTH)
        .rev()
        .filter_map(|offset| Square::home(team, offset))
        .find(|&square| !pos.is_team(square, team))
}

fn end_index(pos: &Position, team: Team) -> f64 {
    end_goal(pos, team).map_or(GOAL_INDEX, |goal| goal.board_index(team)) as f64
}

/// Four marbles on home cells 2..=5, the fifth on the last path cell: only
/// three doubles in a row (forfeiting that marble) can change the position.
fn must_roll_doubles_3x(marbles: &[Option<Square>; TEAM_SIZE], team: Team) -> bool {
    let homed = (1..TEAM_SIZE).all(|i| {
        marbles[i].is_some_and(|square| square.is_in_base() && square.offset() == i)
    });
    homed && marbles[0].is_some_and(|square| square.is_in_path() && square.board_index(team) == LAST_PATH_INDEX)
}

/// Score a single team.
pub fn evaluate_team(pos: &Position, team: Team, rolled_doubles: bool) -> f64 {
    let marbles = pos.marbles(team);
    let active = marbles.iter().flatten().count();

    if active == TEAM_SIZE && must_roll_doubles_3x(&marbles, team) {
        return P_ROLLING_DOUBLES_3X;
    }

    let end_index = end_index(pos, team);
    let mut score = 0.0;

    // Advancement along the path.
    let mut distance = 0.0;
    for square in marbles.iter().flatten().filter(|s| s.is_in_path()) {
        let index = square.board_index(team);
        if index == 1 {
            score -= MARBLE_VALUE;
        }
        distance += index as f64;
    }
    score += active as f64 * MARBLE_VALUE;
    if active > 0 {
        score += (distance - 1.0) / (end_index * active as f64);
    }

    if !rolled_doubles {
        score -= danger(pos, team, &marbles, end_index);
    }

    score -= enemy_progress(pos, team);
    score += home_bonus(pos, team);
    score
}

fn danger(pos: &Position, team: Team, marbles: &[Option<Square>; TEAM_SIZE], end_index: f64) -> f64 {
    let mut danger = 0.0;

    // Sitting on the start square of an enemy that still has marbles to bring out.
    for square in marbles.iter().flatten() {
        let weight = 2.0 * square.board_index(team) as f64 / end_index;
        for enemy in team.opponents() {
            if *square == Square::start(enemy) && pos.at_start_count(enemy) > 0 {
                danger += weight * P_GETTING_OUT;
            }
        }
    }

    // Enemy path marbles behind ours, measured along the attacker's walk.
    for enemy in team.opponents() {
        let attackers = pos.path_count(enemy);
        for attacker in pos.path_marbles(enemy) {
            for target in marbles.iter().flatten().filter(|s| s.is_in_path()) {
                let gap = target.board_index(enemy) as isize - attacker.board_index(enemy) as isize;
                if gap <= 0 || gap as usize > MAX_THREAT_DISTANCE {
                    continue;
                }
                let gap = gap as usize;
                let weight = target.board_index(team) as f64 / end_index;
                let probability = if gap <= SINGLE_DIE_REACH {
                    match attackers {
                        n if n >= 2 => P_ANY_NUM,
                        1 => P_ANY_NUM * P_GETTING_OUT,
                        _ => probability_quick(gap),
                    }
                } else {
                    probability_quick(gap)
                };
                danger += weight * probability;
            }
        }
    }
    danger
}

fn enemy_progress(pos: &Position, team: Team) -> f64 {
    let mut travelled = 0.0;
    let mut total = 0.0;
    for enemy in team.opponents() {
        let goal = end_index(pos, enemy);
        for square in pos.path_marbles(enemy) {
            travelled += square.board_index(enemy) as f64;
            total += goal;
        }
    }
    if total > 0.0 {
        ENEMY_PROGRESS_FACTOR * (travelled / total)
    } else {
        0.0
    }
}

/// One point per home marble packed against the back of the lane, a smaller
/// share for marbles sitting behind a gap.
fn home_bonus(pos: &Position, team: Team) -> f64 {
    let mut in_a_row = true;
    let mut bonus = 0.0;
    for offset in (0..BASE_LENGTH).rev() {
        let filled = Square::home(team, offset).is_some_and(|square| pos.is_team(square, team));
        if !filled {
            in_a_row = false;
        } else if in_a_row {
            bonus += 1.0;
        } else {
            bonus += 0.5 + 0.5 / (BASE_LENGTH - offset) as f64;
        }
    }
    bonus
}
