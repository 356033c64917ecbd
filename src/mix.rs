//! MP-Mix: pick a search strategy per turn from the shape of the game.
//!
//! The root is evaluated statically and the leader's margin over second place
//! decides the delegate:
//!
//! - we lead by more than the defensive threshold: [`Paranoid`]
//! - an opponent leads by more than the offensive threshold: [`Offensive`] against it
//! - otherwise: [`MaxN`]

use tracing::debug;

use crate::constants::{DEFENSIVE_THRESHOLD, OFFENSIVE_THRESHOLD};
use crate::maxn::MaxN;
use crate::offensive::Offensive;
use crate::paranoid::Paranoid;
use crate::search::{PositionNode, SearchClock, SearchOutcome};
use crate::square::Team;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Mix {
    pub maxn: MaxN,
    pub paranoid: Paranoid,
    pub offensive: Offensive,
    pub offensive_threshold: f64,
    pub defensive_threshold: f64,
}

impl Default for Mix {
    fn default() -> Self {
        Mix {
            maxn: MaxN::default(),
            paranoid: Paranoid::default(),
            offensive: Offensive::default(),
            offensive_threshold: OFFENSIVE_THRESHOLD,
            defensive_threshold: DEFENSIVE_THRESHOLD,
        }
    }
}

/// Strategy chosen by [`Mix::choose`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MixChoice {
    MaxN,
    Paranoid,
    Offensive(Team),
}

impl Mix {
    pub fn choose(&self, root: &PositionNode, player: Team) -> MixChoice {
        let eval = SearchOutcome::fallback(root, player).eval;
        let Some(leader) = eval.direction() else {
            return MixChoice::MaxN;
        };
        let ranking = eval.ranking();
        let edge = ranking[0].1 - ranking[1].1;

        if leader == player {
            if edge > self.defensive_threshold {
                return MixChoice::Paranoid;
            }
        } else if edge > self.offensive_threshold {
            return MixChoice::Offensive(leader);
        }
        MixChoice::MaxN
    }

    pub fn go(
        &self,
        root: &PositionNode,
        player: Team,
        clock: &SearchClock,
        rng: &mut fastrand::Rng,
    ) -> SearchOutcome {
        let choice = self.choose(root, player);
        debug!(player = %player, ?choice, "mix strategy");
        match choice {
            MixChoice::MaxN => self.maxn.go(root, player, clock),
            MixChoice::Paranoid => self.paranoid.go(root, player, clock),
            MixChoice::Offensive(target) => self.offensive.targeting(target).go(root, player, clock, rng),
        }
    }
}
