//! Paranoid search.
//!
//! Assumes the three opponents play as one coalition against the root player.
//! Plies where the root player moves maximise its magnitude. Every other ply
//! minimises the root's deficit against the coalition: its magnitude minus
//! the summed magnitudes of the three opponents.

use crate::constants::PARANOID_DEPTH;
use crate::evaluator::Evaluation;
use crate::search::{
    PlyContext, PositionNode, SearchClock, SearchOutcome, SearchStats, deepen, expand, leaf_value,
};
use crate::square::Team;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Paranoid {
    pub depth: u32,
}

impl Default for Paranoid {
    fn default() -> Self {
        Paranoid { depth: PARANOID_DEPTH }
    }
}

impl Paranoid {
    pub fn new(depth: u32) -> Self {
        Paranoid { depth }
    }

    pub fn go(&self, root: &PositionNode, player: Team, clock: &SearchClock) -> SearchOutcome {
        deepen("paranoid", root, player, self.depth, clock, |depth, stats| {
            let ctx = PlyContext::root(root, player, depth);
            alpha_beta(root, ctx, f64::NEG_INFINITY, f64::INFINITY, clock, stats)
        })
    }
}

fn alpha_beta(
    node: &PositionNode,
    ctx: PlyContext,
    mut alpha: f64,
    mut beta: f64,
    clock: &SearchClock,
    stats: &mut SearchStats,
) -> (Evaluation, Option<PositionNode>) {
    if stats.out_of_time(clock) {
        return (Evaluation::ZERO, None);
    }
    let Some(children) = expand(node, &ctx, stats) else {
        return (leaf_value(node, &ctx), None);
    };

    let root = ctx.root_player;
    let maximizing = ctx.is_root_turn();
    let mut best: Option<(Evaluation, f64, PositionNode)> = None;

    for child in children {
        let mut expanded = child;
        let next = ctx.next(&mut expanded);
        let (value, _) = alpha_beta(&expanded, next, alpha, beta, clock, stats);
        if stats.aborted {
            return (Evaluation::ZERO, None);
        }

        let score = ply_score(&value, root, maximizing);
        let improves = match &best {
            None => true,
            Some((_, current, _)) if maximizing => score > *current,
            Some((_, current, _)) => score < *current,
        };
        if improves {
            best = Some((value, score, child));
        }

        if maximizing {
            alpha = alpha.max(score);
        } else {
            beta = beta.min(score);
        }
        if alpha >= beta {
            break;
        }
    }

    match best {
        Some((value, _, child)) => (value, Some(child)),
        None => (leaf_value(node, &ctx), None),
    }
}

/// Value compared at a ply: the root's magnitude where it moves, its deficit
/// against the other three elsewhere.
fn ply_score(value: &Evaluation, root: Team, maximizing: bool) -> f64 {
    let magnitude = value.magnitude(root);
    if maximizing {
        magnitude
    } else {
        magnitude - value.length(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DiceRoll;
    use crate::maxn::MaxN;
    use crate::position::Position;
    use crate::search::Budget;

    fn root(setup: &str, a: u8, b: u8) -> PositionNode {
        PositionNode::new(Position::from_setup(setup).unwrap(), None, DiceRoll::new(a, b).unwrap())
    }

    fn lowest(values: &[Evaluation], score: impl Fn(&Evaluation) -> f64) -> usize {
        (0..values.len())
            .min_by(|&a, &b| score(&values[a]).total_cmp(&score(&values[b])))
            .unwrap()
    }

    #[test]
    fn test_minimising_ply_uses_coalition_deficit() {
        let close = Evaluation::new([1.0, 0.9, 0.9, 0.9]);
        let alone = Evaluation::new([0.5, 0.0, 0.0, 0.0]);
        assert_eq!(ply_score(&close, Team::Yellow, true), 1.0);
        assert!((ply_score(&close, Team::Yellow, false) - 1.3).abs() < 1e-9);
        assert!((ply_score(&alone, Team::Yellow, false) - 2.0).abs() < 1e-9);

        // Yellow's own magnitude is lowest when it stands alone, but the
        // coalition prefers the line where all three opponents stay close.
        let children = [alone, close];
        assert_eq!(lowest(&children, |v| v.magnitude(Team::Yellow)), 0);
        assert_eq!(lowest(&children, |v| ply_score(v, Team::Yellow, false)), 1);
    }

    #[test]
    fn test_opponent_ply_minimises_root() {
        let node = root("g5=g, r3=r, y9=y", 2, 3);
        let clock = SearchClock::new(Budget::Unlimited);
        let paranoid = Paranoid::new(1).go(&node, Team::Green, &clock);
        let maxn = MaxN::new(1).go(&node, Team::Green, &clock);
        // Blue replies to hurt green rather than to help itself.
        let deficit = |v: &Evaluation| ply_score(v, Team::Green, false);
        assert!(deficit(&paranoid.eval) <= deficit(&maxn.eval));
    }

    #[test]
    fn test_doubles_root_is_maximising() {
        let node = root("g5=g, r3=r", 3, 3);
        let outcome = Paranoid::new(1).go(&node, Team::Green, &SearchClock::new(Budget::Unlimited));
        let best = outcome.best.unwrap();
        assert_eq!(best.mv.unwrap().team(), Team::Green);
    }

    #[test]
    fn test_pruning_visits_fewer_nodes() {
        let node = root("g5=g, r3=r, y9=y, b2=b", 2, 3);
        let clock = SearchClock::new(Budget::Unlimited);
        let paranoid = Paranoid::new(2).go(&node, Team::Green, &clock);
        let maxn = MaxN::new(2).go(&node, Team::Green, &clock);
        assert!(paranoid.nodes <= maxn.nodes);
    }
}
