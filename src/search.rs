//! Shared search machinery.
//!
//! - [`PositionNode`]: a position with the move and roll that produced it
//! - [`advance_turn`]: the doubles-chain rule, used by search, playouts and the live board
//! - [`PlyContext`]: per-ply bookkeeping (player to move, ply budget, doubles chain)
//! - [`SearchClock`]: wall-clock budget plus an optional cooperative stop flag
//! - [`deepen`]: iterative deepening driver used by the tree searches
//!
//! A search never fails for lack of time. Recursion returns the zero vector
//! once the clock runs out, the interrupted iteration is discarded, and the
//! last completed iteration (or the root's static evaluation) is reported.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::constants::DOUBLES_LIMIT;
use crate::dice::DiceRoll;
use crate::evaluator::{Evaluation, evaluate};
use crate::movegen::child_nodes;
use crate::moves::Move;
use crate::position::Position;
use crate::square::{Square, Team};

/// A position reached by `mv` with `roll`.
#[derive(Copy, Clone, Debug)]
pub struct PositionNode {
    pub position: Position,
    pub mv: Option<Move>,
    pub roll: DiceRoll,
}

impl PositionNode {
    pub fn new(position: Position, mv: Option<Move>, roll: DiceRoll) -> Self {
        PositionNode { position, mv, roll }
    }

    #[inline]
    pub fn rolled_doubles(&self) -> bool {
        self.roll.is_doubles()
    }

    #[inline]
    pub fn eval_weight(&self) -> f64 {
        self.roll.eval_weight()
    }
}

// =============================================================================
// Turn order
// =============================================================================

/// Who moves after a finished move, and what happened to the doubles chain.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TurnAdvance {
    /// The team to move next.
    pub player: Team,
    /// Consecutive doubles rolled by `player` so far this turn.
    pub doubles: u8,
    /// The mover rolled doubles and keeps the turn.
    pub extra_turn: bool,
    /// Square of the marble removed by the triple-doubles penalty.
    pub penalty: Option<Square>,
}

/// Advance the turn after `mover` moved with a roll that was (or was not)
/// doubles, having already rolled `doubles` doubles in a row this turn.
///
/// Doubles keep the turn. The third consecutive doubles removes the mover's
/// front path marble from `pos` and passes the turn.
pub fn advance_turn(pos: &mut Position, mover: Team, doubles: u8, rolled_doubles: bool) -> TurnAdvance {
    if !rolled_doubles {
        return TurnAdvance {
            player: mover.next(),
            doubles: 0,
            extra_turn: false,
            penalty: None,
        };
    }

    let chain = doubles + 1;
    if chain >= DOUBLES_LIMIT {
        let penalty = pos.remove_front_marble(mover);
        TurnAdvance {
            player: mover.next(),
            doubles: 0,
            extra_turn: false,
            penalty,
        }
    } else {
        TurnAdvance {
            player: mover,
            doubles: chain,
            extra_turn: true,
            penalty: None,
        }
    }
}

/// Bookkeeping for one ply of a tree search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlyContext {
    /// Team to move at this node.
    pub player: Team,
    /// Team the search is run for.
    pub root_player: Team,
    /// Plies left before the static evaluator takes over.
    pub depth: u32,
    /// Consecutive doubles rolled by `player` this turn.
    pub doubles: u8,
    /// Team holding an extra turn from doubles at this node.
    pub doubles_team: Option<Team>,
}

impl PlyContext {
    /// Context for the root node, which `root_player` just reached with `node.roll`.
    pub fn root(node: &PositionNode, root_player: Team, depth: u32) -> Self {
        let extra = node.rolled_doubles();
        PlyContext {
            player: if extra { root_player } else { root_player.next() },
            root_player,
            depth,
            doubles: u8::from(extra),
            doubles_team: extra.then_some(root_player),
        }
    }

    /// Context for `child`, reached by this node's player. Applies the
    /// triple-doubles penalty to the child's position when it triggers.
    pub fn next(&self, child: &mut PositionNode) -> Self {
        let rolled = child.rolled_doubles();
        let turn = advance_turn(&mut child.position, self.player, self.doubles, rolled);
        PlyContext {
            player: turn.player,
            root_player: self.root_player,
            depth: if turn.extra_turn {
                self.depth
            } else {
                self.depth.saturating_sub(1)
            },
            doubles: turn.doubles,
            doubles_team: turn.extra_turn.then_some(self.player),
        }
    }

    /// Whether the root player is to move.
    #[inline]
    pub fn is_root_turn(&self) -> bool {
        self.player == self.root_player
    }
}

/// Static value of a leaf, weighted by the roll that reached it.
pub fn leaf_value(node: &PositionNode, ctx: &PlyContext) -> Evaluation {
    evaluate(&node.position, ctx.doubles_team).scaled(node.eval_weight())
}

// =============================================================================
// Clock
// =============================================================================

/// Time allowed for a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Budget {
    Millis(u64),
    /// Run until the search completes (or the stop flag is raised).
    Unlimited,
}

/// Cooperative stop condition, polled at every expansion.
#[derive(Clone, Debug)]
pub struct SearchClock {
    started: Instant,
    deadline: Option<Instant>,
    stop: Option<Arc<AtomicBool>>,
}

impl SearchClock {
    pub fn new(budget: Budget) -> Self {
        let started = Instant::now();
        let deadline = match budget {
            Budget::Millis(ms) => Some(started + Duration::from_millis(ms)),
            Budget::Unlimited => None,
        };
        SearchClock {
            started,
            deadline,
            stop: None,
        }
    }

    pub fn millis(ms: u64) -> Self {
        Self::new(Budget::Millis(ms))
    }

    /// Also stop when `flag` is raised.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = Some(flag);
        self
    }

    /// A clock with the same stop flag and a fresh budget.
    pub fn restart(&self, budget: Budget) -> Self {
        SearchClock {
            stop: self.stop.clone(),
            ..Self::new(budget)
        }
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        if let Some(flag) = &self.stop {
            if flag.load(Ordering::Relaxed) {
                return true;
            }
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    pub fn has_deadline(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Time left before the deadline; `None` without one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

// =============================================================================
// Results
// =============================================================================

/// Counters shared by one search iteration.
#[derive(Copy, Clone, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    /// The clock stopped the iteration.
    pub aborted: bool,
    /// Some leaf was cut off by the ply budget rather than the end of the tree.
    pub depth_limited: bool,
}

impl SearchStats {
    /// Poll the clock, latching the result.
    #[inline]
    pub fn out_of_time(&mut self, clock: &SearchClock) -> bool {
        if !self.aborted && clock.should_stop() {
            self.aborted = true;
        }
        self.aborted
    }
}

/// Result of a search.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub eval: Evaluation,
    /// The root-level child on the principal line.
    pub best: Option<PositionNode>,
    pub nodes: u64,
    pub nodes_per_second: f64,
    /// Deepest completed ply budget.
    pub depth: u32,
}

impl SearchOutcome {
    /// Outcome carrying only the root's static evaluation.
    pub fn fallback(root: &PositionNode, player: Team) -> Self {
        let doubles_team = root.rolled_doubles().then_some(player);
        SearchOutcome {
            eval: evaluate(&root.position, doubles_team),
            best: None,
            nodes: 0,
            nodes_per_second: 0.0,
            depth: 0,
        }
    }

    pub(crate) fn finish(&mut self, nodes: u64, elapsed: Duration) {
        self.nodes = nodes;
        let secs = elapsed.as_secs_f64();
        self.nodes_per_second = if secs > 0.0 {
            nodes as f64 / secs
        } else {
            nodes as f64
        };
    }
}

/// Expand `node` for the player in `ctx`. `None` marks a leaf.
pub fn expand(node: &PositionNode, ctx: &PlyContext, stats: &mut SearchStats) -> Option<Vec<PositionNode>> {
    if ctx.depth == 0 {
        stats.depth_limited = true;
        return None;
    }
    let children = child_nodes(&node.position, ctx.player);
    if children.is_empty() {
        return None;
    }
    stats.nodes += children.len() as u64;
    Some(children)
}

/// Iterative deepening up to `max_depth`.
///
/// `iteration(depth, stats)` runs one depth-limited search from the root and
/// returns its value and the chosen root-level child. An iteration the clock
/// interrupted is discarded. Deepening stops early once an iteration reaches
/// the end of the tree everywhere.
pub fn deepen<F>(name: &str, root: &PositionNode, player: Team, max_depth: u32, clock: &SearchClock, mut iteration: F) -> SearchOutcome
where
    F: FnMut(u32, &mut SearchStats) -> (Evaluation, Option<PositionNode>),
{
    let mut outcome = SearchOutcome::fallback(root, player);
    let mut nodes = 0;
    let mut aborted = false;

    for depth in 1..=max_depth {
        let mut stats = SearchStats::default();
        let (eval, best) = iteration(depth, &mut stats);
        nodes += stats.nodes;
        if stats.aborted {
            aborted = true;
            trace!(algorithm = name, depth, nodes = stats.nodes, "iteration interrupted");
            break;
        }

        outcome.eval = eval;
        outcome.best = best;
        outcome.depth = depth;
        trace!(algorithm = name, depth, nodes = stats.nodes, eval = %eval, "iteration complete");

        if !stats.depth_limited {
            break;
        }
    }

    outcome.finish(nodes, clock.elapsed());
    debug!(
        algorithm = name,
        player = %player,
        depth = outcome.depth,
        nodes = outcome.nodes,
        nps = outcome.nodes_per_second as u64,
        aborted,
        "search finished"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roll(a: u8, b: u8) -> DiceRoll {
        DiceRoll::new(a, b).unwrap()
    }

    fn node(setup: &str, r: DiceRoll) -> PositionNode {
        PositionNode::new(Position::from_setup(setup).unwrap(), None, r)
    }

    #[test]
    fn test_plain_roll_passes_turn() {
        let mut pos = Position::new();
        let turn = advance_turn(&mut pos, Team::Blue, 0, false);
        assert_eq!(turn.player, Team::Yellow);
        assert_eq!(turn.doubles, 0);
        assert!(!turn.extra_turn);
    }

    #[test]
    fn test_doubles_chain() {
        let mut pos = Position::from_setup("r5=r, g2=r").unwrap();

        let first = advance_turn(&mut pos, Team::Red, 0, true);
        assert_eq!((first.player, first.doubles), (Team::Red, 1));
        let second = advance_turn(&mut pos, Team::Red, first.doubles, true);
        assert_eq!((second.player, second.doubles), (Team::Red, 2));
        assert_eq!(pos.on_board_count(Team::Red), 2);

        let third = advance_turn(&mut pos, Team::Red, second.doubles, true);
        assert_eq!(third.player, Team::Green);
        assert_eq!(third.doubles, 0);
        assert_eq!(third.penalty, Some("g2".parse().unwrap()));
        assert_eq!(pos.on_board_count(Team::Red), 1);
    }

    #[test]
    fn test_penalty_removes_most_advanced_in_own_frame() {
        // In green's walk r3 (index 39) is ahead of g5 (index 5).
        let mut pos = Position::from_setup("g5=g, r3=g").unwrap();
        let turn = advance_turn(&mut pos, Team::Green, 2, true);
        assert_eq!(turn.player, Team::Blue);
        assert_eq!(turn.penalty, Some("r3".parse().unwrap()));
        assert_eq!(pos.get("g5".parse().unwrap()), Some(Team::Green));
    }

    #[test]
    fn test_root_context() {
        let plain = PlyContext::root(&node("", roll(2, 3)), Team::Green, 4);
        assert_eq!(plain.player, Team::Blue);
        assert_eq!(plain.doubles_team, None);

        let doubles = PlyContext::root(&node("", roll(3, 3)), Team::Green, 4);
        assert_eq!(doubles.player, Team::Green);
        assert_eq!(doubles.doubles, 1);
        assert_eq!(doubles.doubles_team, Some(Team::Green));
    }

    #[test]
    fn test_next_keeps_depth_on_doubles() {
        let ctx = PlyContext::root(&node("", roll(2, 3)), Team::Green, 4);
        let mut child = node("b1=b", roll(5, 5));
        let next = ctx.next(&mut child);
        assert_eq!(next.player, Team::Blue);
        assert_eq!(next.depth, 4);
        assert_eq!(next.doubles_team, Some(Team::Blue));

        let mut plain = node("b1=b", roll(5, 4));
        let after = next.next(&mut plain);
        assert_eq!(after.player, Team::Yellow);
        assert_eq!(after.depth, 3);
        assert_eq!(after.doubles, 0);
    }

    #[test]
    fn test_next_applies_penalty() {
        let mut ctx = PlyContext::root(&node("", roll(1, 1)), Team::Yellow, 3);
        ctx.doubles = 2;
        let mut child = node("y9=y, r4=y", roll(6, 6));
        let next = ctx.next(&mut child);
        assert_eq!(next.player, Team::Red);
        assert_eq!(next.depth, 2);
        assert_eq!(child.position.on_board_count(Team::Yellow), 1);
        assert_eq!(child.position.get("y9".parse().unwrap()), Some(Team::Yellow));
    }

    #[test]
    fn test_clock() {
        let clock = SearchClock::millis(0);
        assert!(clock.should_stop());
        let unlimited = SearchClock::new(Budget::Unlimited);
        assert!(!unlimited.should_stop());
        let flag = Arc::new(AtomicBool::new(false));
        let flagged = unlimited.with_stop_flag(flag.clone());
        assert!(!flagged.should_stop());
        flag.store(true, Ordering::Relaxed);
        assert!(flagged.should_stop());
        assert!(flagged.restart(Budget::Millis(10_000)).should_stop());
    }

    #[test]
    fn test_deepen_discards_interrupted_iteration() {
        let root = node("y5=y", roll(2, 3));
        let clock = SearchClock::new(Budget::Unlimited);
        let outcome = deepen("test", &root, Team::Yellow, 5, &clock, |depth, stats| {
            stats.depth_limited = true;
            stats.nodes += 1;
            if depth == 3 {
                stats.aborted = true;
            }
            (Evaluation::new([depth as f64; 4]), None)
        });
        assert_eq!(outcome.depth, 2);
        assert_eq!(outcome.eval, Evaluation::new([2.0; 4]));
        assert_eq!(outcome.nodes, 3);
    }
}
