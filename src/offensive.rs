//! Offensive search.
//!
//! A spoiler strategy: pick one opponent and steer every ply towards the
//! lowest magnitude for that opponent, ignoring everyone else.

use crate::constants::OFFENSIVE_DEPTH;
use crate::evaluator::Evaluation;
use crate::search::{
    PlyContext, PositionNode, SearchClock, SearchOutcome, SearchStats, deepen, expand, leaf_value,
};
use crate::square::Team;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Offensive {
    pub depth: u32,
    /// Fixed target. When unset, a target is chosen on every search.
    pub target: Option<Team>,
}

impl Default for Offensive {
    fn default() -> Self {
        Offensive {
            depth: OFFENSIVE_DEPTH,
            target: None,
        }
    }
}

impl Offensive {
    pub fn new(depth: u32) -> Self {
        Offensive { depth, target: None }
    }

    pub fn targeting(mut self, target: Team) -> Self {
        self.target = Some(target);
        self
    }

    /// The preset target, else the strict leader of the root position when it
    /// is not `player`, else a random opponent.
    pub fn choose_target(&self, root: &PositionNode, player: Team, rng: &mut fastrand::Rng) -> Team {
        if let Some(target) = self.target {
            return target;
        }
        let eval = SearchOutcome::fallback(root, player).eval;
        match eval.direction() {
            Some(leader) if leader != player => leader,
            _ => player.opponents()[rng.usize(..3)],
        }
    }

    pub fn go(
        &self,
        root: &PositionNode,
        player: Team,
        clock: &SearchClock,
        rng: &mut fastrand::Rng,
    ) -> SearchOutcome {
        let target = self.choose_target(root, player, rng);
        tracing::trace!(player = %player, target = %target, "offensive target");
        deepen("offensive", root, player, self.depth, clock, |depth, stats| {
            let ctx = PlyContext::root(root, player, depth);
            minimize(root, ctx, target, clock, stats)
        })
    }
}

fn minimize(
    node: &PositionNode,
    ctx: PlyContext,
    target: Team,
    clock: &SearchClock,
    stats: &mut SearchStats,
) -> (Evaluation, Option<PositionNode>) {
    if stats.out_of_time(clock) {
        return (Evaluation::ZERO, None);
    }
    let Some(children) = expand(node, &ctx, stats) else {
        return (leaf_value(node, &ctx), None);
    };

    let mut worst: Option<(Evaluation, PositionNode)> = None;
    for child in children {
        let mut expanded = child;
        let next = ctx.next(&mut expanded);
        let (value, _) = minimize(&expanded, next, target, clock, stats);
        if stats.aborted {
            return (Evaluation::ZERO, None);
        }

        let improves = match &worst {
            None => true,
            Some((current, _)) => value.magnitude(target) < current.magnitude(target),
        };
        if improves {
            worst = Some((value, child));
        }
    }

    match worst {
        Some((value, child)) => (value, Some(child)),
        None => (leaf_value(node, &ctx), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DiceRoll;
    use crate::position::Position;
    use crate::search::Budget;

    fn root(setup: &str) -> PositionNode {
        PositionNode::new(Position::from_setup(setup).unwrap(), None, DiceRoll::new(2, 3).unwrap())
    }

    #[test]
    fn test_target_is_leader() {
        let node = root("hb5=b, hb4=b, g5=g");
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(Offensive::default().choose_target(&node, Team::Green, &mut rng), Team::Blue);
    }

    #[test]
    fn test_target_random_when_leading() {
        let node = root("hg5=g, hg4=g");
        let mut rng = fastrand::Rng::with_seed(1);
        for _ in 0..20 {
            let target = Offensive::default().choose_target(&node, Team::Green, &mut rng);
            assert_ne!(target, Team::Green);
        }
    }

    #[test]
    fn test_preset_target() {
        let node = root("hb5=b, hb4=b");
        let mut rng = fastrand::Rng::with_seed(1);
        let offensive = Offensive::default().targeting(Team::Yellow);
        assert_eq!(offensive.choose_target(&node, Team::Green, &mut rng), Team::Yellow);
    }

    #[test]
    fn test_search_hurts_target() {
        // Red can capture blue's marble on r9 with a five.
        let node = root("r4=r, r9=b");
        let mut rng = fastrand::Rng::with_seed(3);
        let offensive = Offensive::new(1).targeting(Team::Blue);
        let outcome = offensive.go(&node, Team::Yellow, &SearchClock::new(Budget::Unlimited), &mut rng);
        assert!(outcome.best.is_some());
        // Only lines where blue's marble is taken leave blue below zero.
        assert!(outcome.eval.get(Team::Blue) < 0.0);
    }
}
