//! Monte-Carlo playout estimation.
//!
//! There is no tree policy here: for each team in turn, random playouts are
//! run from the root position within a quarter of the budget, and that team's
//! score is the share of completed playouts it won.
//!
//! The best move is left unset; callers that need one evaluate each root move
//! separately (see [`crate::board::Board::think_best`]).

use std::time::Duration;

use tracing::{debug, trace};

use crate::constants::{MCTS_DEFAULT_MS, PLAYOUT_TURN_LIMIT, TEAM_COUNT};
use crate::evaluator::Evaluation;
use crate::playout::{PlayoutOutcome, random_playout};
use crate::search::{Budget, PlyContext, PositionNode, SearchClock, SearchOutcome};
use crate::square::Team;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MonteCarlo {
    /// Playouts longer than this many turns count as not won.
    pub turn_limit: usize,
}

impl Default for MonteCarlo {
    fn default() -> Self {
        MonteCarlo {
            turn_limit: PLAYOUT_TURN_LIMIT,
        }
    }
}

/// Win counts for one team.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Tally {
    wins: u64,
    completed: u64,
}

impl Tally {
    fn ratio(&self) -> f64 {
        if self.completed == 0 {
            0.0
        } else {
            self.wins as f64 / self.completed as f64
        }
    }
}

impl MonteCarlo {
    pub fn new(turn_limit: usize) -> Self {
        MonteCarlo { turn_limit }
    }

    pub fn go(
        &self,
        root: &PositionNode,
        player: Team,
        clock: &SearchClock,
        rng: &mut fastrand::Rng,
    ) -> SearchOutcome {
        let start = PlyContext::root(root, player, 0);
        let total = clock
            .remaining()
            .unwrap_or(Duration::from_millis(MCTS_DEFAULT_MS));
        let share = (total / TEAM_COUNT as u32).as_millis() as u64;

        let mut eval = Evaluation::ZERO;
        let mut playouts = 0;
        for team in Team::ALL {
            let team_clock = clock.restart(Budget::Millis(share));
            let tally = self.tally(root, team, start, &team_clock, rng);
            trace!(team = %team, wins = tally.wins, completed = tally.completed, "playouts");
            eval.set(team, tally.ratio());
            playouts += tally.completed;
        }

        let mut outcome = SearchOutcome::fallback(root, player);
        outcome.eval = eval;
        outcome.finish(playouts, clock.elapsed());
        debug!(
            algorithm = "montecarlo",
            player = %player,
            playouts,
            eval = %eval,
            "search finished"
        );
        outcome
    }

    /// Run playouts until `clock` stops, counting how many `team` wins.
    fn tally(
        &self,
        root: &PositionNode,
        team: Team,
        start: PlyContext,
        clock: &SearchClock,
        rng: &mut fastrand::Rng,
    ) -> Tally {
        let mut tally = Tally::default();
        if root.position.is_won() {
            tally.completed = 1;
            tally.wins = u64::from(root.position.winner() == Some(team));
            return tally;
        }

        while !clock.should_stop() {
            let mut pos = root.position;
            let (outcome, _) = random_playout(&mut pos, start.player, start.doubles, self.turn_limit, clock, rng);
            match outcome {
                PlayoutOutcome::Interrupted => break,
                PlayoutOutcome::Won(winner) => {
                    tally.completed += 1;
                    if winner == team {
                        tally.wins += 1;
                    }
                }
                PlayoutOutcome::TurnLimit => tally.completed += 1,
            }
        }
        tally
    }
}
