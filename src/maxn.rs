//! MaxN search.
//!
//! The n-player generalisation of minimax: on its own ply every team picks the
//! child that maximises its own magnitude, with no assumption about the
//! others. No pruning is possible.

use crate::constants::MAXN_DEPTH;
use crate::evaluator::Evaluation;
use crate::search::{
    PlyContext, PositionNode, SearchClock, SearchOutcome, SearchStats, deepen, expand, leaf_value,
};
use crate::square::Team;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaxN {
    /// Ply budget of the deepest iteration.
    pub depth: u32,
}

impl Default for MaxN {
    fn default() -> Self {
        MaxN { depth: MAXN_DEPTH }
    }
}

impl MaxN {
    pub fn new(depth: u32) -> Self {
        MaxN { depth }
    }

    pub fn go(&self, root: &PositionNode, player: Team, clock: &SearchClock) -> SearchOutcome {
        deepen("maxn", root, player, self.depth, clock, |depth, stats| {
            let ctx = PlyContext::root(root, player, depth);
            maxn(root, ctx, clock, stats)
        })
    }
}

fn maxn(
    node: &PositionNode,
    ctx: PlyContext,
    clock: &SearchClock,
    stats: &mut SearchStats,
) -> (Evaluation, Option<PositionNode>) {
    if stats.out_of_time(clock) {
        return (Evaluation::ZERO, None);
    }
    let Some(children) = expand(node, &ctx, stats) else {
        return (leaf_value(node, &ctx), None);
    };

    let mut best: Option<(Evaluation, PositionNode)> = None;
    for child in children {
        let mut expanded = child;
        let next = ctx.next(&mut expanded);
        let (value, _) = maxn(&expanded, next, clock, stats);
        if stats.aborted {
            return (Evaluation::ZERO, None);
        }

        let improves = match &best {
            None => true,
            Some((current, _)) => value.magnitude(ctx.player) > current.magnitude(ctx.player),
        };
        if improves {
            best = Some((value, child));
        }
    }

    match best {
        Some((value, child)) => (value, Some(child)),
        None => (leaf_value(node, &ctx), None),
    }
}
