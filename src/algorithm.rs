//! The closed set of search strategies behind one `go` entry point.

use std::fmt;

use clap::ValueEnum;

use crate::config::EngineConfig;
use crate::maxn::MaxN;
use crate::mcts::MonteCarlo;
use crate::mix::Mix;
use crate::offensive::Offensive;
use crate::paranoid::Paranoid;
use crate::search::{PositionNode, SearchClock, SearchOutcome};
use crate::square::Team;

/// Strategy names, as selected on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum AlgorithmKind {
    Maxn,
    Paranoid,
    Offensive,
    Mix,
    Montecarlo,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmKind::Maxn => "maxn",
            AlgorithmKind::Paranoid => "paranoid",
            AlgorithmKind::Offensive => "offensive",
            AlgorithmKind::Mix => "mix",
            AlgorithmKind::Montecarlo => "montecarlo",
        };
        f.pad(name)
    }
}

/// A configured search strategy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Algorithm {
    MaxN(MaxN),
    Paranoid(Paranoid),
    Offensive(Offensive),
    Mix(Mix),
    MonteCarlo(MonteCarlo),
}

impl Algorithm {
    pub fn from_kind(kind: AlgorithmKind, config: &EngineConfig) -> Self {
        let maxn = MaxN::new(config.maxn_depth);
        let paranoid = Paranoid::new(config.paranoid_depth);
        let offensive = Offensive::new(config.offensive_depth);
        match kind {
            AlgorithmKind::Maxn => Algorithm::MaxN(maxn),
            AlgorithmKind::Paranoid => Algorithm::Paranoid(paranoid),
            AlgorithmKind::Offensive => Algorithm::Offensive(offensive),
            AlgorithmKind::Mix => Algorithm::Mix(Mix {
                maxn,
                paranoid,
                offensive,
                offensive_threshold: config.offensive_threshold,
                defensive_threshold: config.defensive_threshold,
            }),
            AlgorithmKind::Montecarlo => Algorithm::MonteCarlo(MonteCarlo::new(config.playout_turn_limit)),
        }
    }

    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Algorithm::MaxN(_) => AlgorithmKind::Maxn,
            Algorithm::Paranoid(_) => AlgorithmKind::Paranoid,
            Algorithm::Offensive(_) => AlgorithmKind::Offensive,
            Algorithm::Mix(_) => AlgorithmKind::Mix,
            Algorithm::MonteCarlo(_) => AlgorithmKind::Montecarlo,
        }
    }

    /// Search from `root`, which `player` just reached.
    pub fn go(
        &self,
        root: &PositionNode,
        player: Team,
        clock: &SearchClock,
        rng: &mut fastrand::Rng,
    ) -> SearchOutcome {
        match self {
            Algorithm::MaxN(maxn) => maxn.go(root, player, clock),
            Algorithm::Paranoid(paranoid) => paranoid.go(root, player, clock),
            Algorithm::Offensive(offensive) => offensive.go(root, player, clock, rng),
            Algorithm::Mix(mix) => mix.go(root, player, clock, rng),
            Algorithm::MonteCarlo(mcts) => mcts.go(root, player, clock, rng),
        }
    }
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::from_kind(AlgorithmKind::Mix, &EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        let config = EngineConfig::default();
        for kind in AlgorithmKind::value_variants() {
            assert_eq!(Algorithm::from_kind(*kind, &config).kind(), *kind);
        }
    }

    #[test]
    fn test_config_reaches_strategies() {
        let config = EngineConfig {
            maxn_depth: 3,
            offensive_threshold: 0.25,
            ..EngineConfig::default()
        };
        assert_eq!(Algorithm::from_kind(AlgorithmKind::Maxn, &config), Algorithm::MaxN(MaxN::new(3)));
        let Algorithm::Mix(mix) = Algorithm::from_kind(AlgorithmKind::Mix, &config) else {
            panic!("expected mix");
        };
        assert_eq!(mix.maxn.depth, 3);
        assert_eq!(mix.offensive_threshold, 0.25);
    }

    #[test]
    fn test_display_matches_cli_names() {
        assert_eq!(AlgorithmKind::Montecarlo.to_string(), "montecarlo");
        assert_eq!(AlgorithmKind::Maxn.to_string(), "maxn");
    }
}
