//! Computer players.
//!
//! A [`ComputerPlayer`] maps a [`Personality`] to a search strategy and a
//! [`Difficulty`] to a think budget plus a chance of deliberately playing the
//! worst move. Thinking runs either inline ([`ComputerPlayer::think`]) or on
//! a background worker whose result is collected with
//! [`ComputerPlayer::try_take_move`] or [`ComputerPlayer::wait_move`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use clap::ValueEnum;
use tracing::{debug, warn};

use crate::algorithm::{Algorithm, AlgorithmKind};
use crate::board::{Board, Variation};
use crate::config::EngineConfig;
use crate::constants::DIFFICULTIES;
use crate::dice::DiceRoll;
use crate::error::{Error, Result};
use crate::moves::Move;
use crate::square::Team;

/// Playing style, one per search strategy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, ValueEnum)]
pub enum Personality {
    /// Paranoid: assume everyone is out to get us.
    Passive,
    /// Offensive: go after the leader.
    Aggressive,
    /// MaxN.
    Active,
    /// Mix.
    Balanced,
    /// Monte-Carlo playouts.
    Adaptive,
}

impl Personality {
    pub fn algorithm_kind(self) -> AlgorithmKind {
        match self {
            Personality::Passive => AlgorithmKind::Paranoid,
            Personality::Aggressive => AlgorithmKind::Offensive,
            Personality::Active => AlgorithmKind::Maxn,
            Personality::Balanced => AlgorithmKind::Mix,
            Personality::Adaptive => AlgorithmKind::Montecarlo,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Difficulty {
    /// Think budget. Negative means play at random.
    pub think_ms: i64,
    /// Chance, in percent, of playing the worst move found.
    pub blunder_percent: u32,
}

impl Difficulty {
    pub const STRONGEST: Difficulty = Difficulty {
        think_ms: DIFFICULTIES[DIFFICULTIES.len() - 1].0,
        blunder_percent: DIFFICULTIES[DIFFICULTIES.len() - 1].1,
    };

    /// Preset `level`, from 1 (weakest) to 10.
    pub fn preset(level: u8) -> Result<Difficulty> {
        let (think_ms, blunder_percent) = level
            .checked_sub(1)
            .and_then(|i| DIFFICULTIES.get(usize::from(i)))
            .copied()
            .ok_or(Error::InvalidDifficulty(level))?;
        Ok(Difficulty {
            think_ms,
            blunder_percent,
        })
    }
}

/// The move a think request settled on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Decision {
    /// `None` when there was no legal move.
    pub mv: Option<Move>,
    /// The worst rated move was played on purpose.
    pub blundered: bool,
}

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    receiver: Receiver<(Decision, Vec<Variation>)>,
}

pub struct ComputerPlayer {
    team: Team,
    personality: Personality,
    difficulty: Difficulty,
    algorithm: Algorithm,
    rng: fastrand::Rng,
    last_evaluation: Vec<Variation>,
    worker: Option<Worker>,
}

impl ComputerPlayer {
    pub fn new(team: Team, personality: Personality, difficulty: Difficulty, config: &EngineConfig, seed: u64) -> Self {
        ComputerPlayer {
            team,
            personality,
            difficulty,
            algorithm: Algorithm::from_kind(personality.algorithm_kind(), config),
            rng: fastrand::Rng::with_seed(seed),
            last_evaluation: Vec::new(),
            worker: None,
        }
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Rated root moves from the last finished think, best first.
    pub fn last_evaluation(&self) -> &[Variation] {
        &self.last_evaluation
    }

    /// Think on the calling thread.
    pub fn think(&mut self, board: &Board, roll: DiceRoll) -> Decision {
        self.stop_think();
        let (decision, variations) = decide(board, &self.algorithm, self.difficulty, roll, self.team, None, &mut self.rng);
        self.last_evaluation = variations;
        decision
    }

    /// Start thinking on a background worker, cancelling any think still running.
    pub fn start_think(&mut self, board: &Board, roll: DiceRoll) -> Result<()> {
        self.stop_think();

        let board = board.clone();
        let algorithm = self.algorithm;
        let difficulty = self.difficulty;
        let team = self.team;
        let seed = self.rng.u64(..);
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let (sender, receiver) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(format!("think-{}", team.letter()))
            .spawn(move || {
                let mut rng = fastrand::Rng::with_seed(seed);
                let result = decide(&board, &algorithm, difficulty, roll, team, Some(flag), &mut rng);
                // The receiver is gone when the think was cancelled.
                let _ = sender.send(result);
            })
            .map_err(|e| Error::WorkerSpawn(e.to_string()))?;

        debug!(team = %team, roll = %roll, "think started");
        self.worker = Some(Worker {
            stop,
            handle,
            receiver,
        });
        Ok(())
    }

    pub fn is_thinking(&self) -> bool {
        self.worker.is_some()
    }

    /// The worker's decision if it is ready. Never blocks.
    pub fn try_take_move(&mut self) -> Option<Decision> {
        let worker = self.worker.as_ref()?;
        match worker.receiver.try_recv() {
            Ok(result) => Some(self.finish(result)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.abandon();
                None
            }
        }
    }

    /// Block until the worker's decision is ready. `None` without a worker.
    pub fn wait_move(&mut self) -> Option<Decision> {
        let worker = self.worker.as_ref()?;
        match worker.receiver.recv() {
            Ok(result) => Some(self.finish(result)),
            Err(_) => {
                self.abandon();
                None
            }
        }
    }

    /// Ask the worker to stop and wait for it to exit.
    pub fn stop_think(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop.store(true, Ordering::Relaxed);
            if worker.handle.join().is_err() {
                warn!(team = %self.team, "think worker panicked");
            }
        }
    }

    fn finish(&mut self, (decision, variations): (Decision, Vec<Variation>)) -> Decision {
        if let Some(worker) = self.worker.take() {
            let _ = worker.handle.join();
        }
        self.last_evaluation = variations;
        decision
    }

    fn abandon(&mut self) {
        warn!(team = %self.team, "think worker exited without a move");
        self.stop_think();
    }
}

impl Drop for ComputerPlayer {
    fn drop(&mut self) {
        self.stop_think();
    }
}

/// Pick a move for `team`, blundering as often as `difficulty` says.
fn decide(
    board: &Board,
    algorithm: &Algorithm,
    difficulty: Difficulty,
    roll: DiceRoll,
    team: Team,
    stop: Option<Arc<AtomicBool>>,
    rng: &mut fastrand::Rng,
) -> (Decision, Vec<Variation>) {
    if difficulty.think_ms < 0 {
        let mv = board.think_best(algorithm, roll, team, difficulty.think_ms, stop, rng);
        return (Decision { mv, blundered: false }, Vec::new());
    }

    let blundered = rng.u32(..100) < difficulty.blunder_percent;
    let ms = if blundered {
        Difficulty::STRONGEST.think_ms
    } else {
        difficulty.think_ms
    };
    let variations = match board.think_all(algorithm, roll, team, ms, stop, rng) {
        Ok(variations) => variations,
        Err(e) => {
            warn!(team = %team, error = %e, "think failed");
            Vec::new()
        }
    };
    let pick = if blundered {
        variations.last()
    } else {
        variations.first()
    };
    let decision = Decision {
        mv: pick.map(|v| v.mv),
        blundered,
    };
    debug!(team = %team, algorithm = %algorithm.kind(), blundered, moves = variations.len(), "think finished");
    (decision, variations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn roll(a: u8, b: u8) -> DiceRoll {
        DiceRoll::new(a, b).unwrap()
    }

    fn board(setup: &str, turn: Team) -> Board {
        Board::with_position(Position::from_setup(setup).unwrap(), turn)
    }

    fn player(team: Team, personality: Personality, difficulty: Difficulty) -> ComputerPlayer {
        ComputerPlayer::new(team, personality, difficulty, &EngineConfig::default(), 42)
    }

    const QUICK: Difficulty = Difficulty {
        think_ms: 60,
        blunder_percent: 0,
    };

    #[test]
    fn test_presets() {
        assert_eq!(
            Difficulty::preset(1).unwrap(),
            Difficulty {
                think_ms: 0,
                blunder_percent: 100
            }
        );
        assert_eq!(Difficulty::preset(10).unwrap(), Difficulty::STRONGEST);
        assert_eq!(Difficulty::STRONGEST.think_ms, 2000);
        assert_eq!(Difficulty::preset(0), Err(Error::InvalidDifficulty(0)));
        assert_eq!(Difficulty::preset(11), Err(Error::InvalidDifficulty(11)));
    }

    #[test]
    fn test_personality_algorithms() {
        assert_eq!(Personality::Passive.algorithm_kind(), AlgorithmKind::Paranoid);
        assert_eq!(Personality::Aggressive.algorithm_kind(), AlgorithmKind::Offensive);
        assert_eq!(Personality::Active.algorithm_kind(), AlgorithmKind::Maxn);
        assert_eq!(Personality::Balanced.algorithm_kind(), AlgorithmKind::Mix);
        assert_eq!(Personality::Adaptive.algorithm_kind(), AlgorithmKind::Montecarlo);
    }

    #[test]
    fn test_think_plays_best_rated() {
        let b = board("y5=y, r3=y, r8=g", Team::Yellow);
        let mut p = player(Team::Yellow, Personality::Active, QUICK);
        let decision = p.think(&b, roll(2, 3));
        assert!(!decision.blundered);
        assert_eq!(decision.mv, Some(p.last_evaluation()[0].mv));
        assert!(b.legal_moves(roll(2, 3)).contains(&decision.mv.unwrap()));
    }

    #[test]
    fn test_random_difficulty() {
        let b = board("y5=y, r3=y", Team::Yellow);
        let random = Difficulty {
            think_ms: -1,
            blunder_percent: 0,
        };
        let mut p = player(Team::Yellow, Personality::Active, random);
        let decision = p.think(&b, roll(2, 3));
        assert!(b.legal_moves(roll(2, 3)).contains(&decision.mv.unwrap()));
        assert!(p.last_evaluation().is_empty());
    }

    #[test]
    fn test_blunder_plays_worst() {
        let b = board("y5=y, r3=y", Team::Yellow);
        let always = Difficulty {
            think_ms: 0,
            blunder_percent: 100,
        };
        let mut p = player(Team::Yellow, Personality::Active, always);
        let decision = p.think(&b, roll(2, 3));
        assert!(decision.blundered);
        assert_eq!(decision.mv, p.last_evaluation().last().map(|v| v.mv));
    }

    #[test]
    fn test_background_think() {
        let b = board("g5=g, g9=g", Team::Green);
        let mut p = player(Team::Green, Personality::Balanced, QUICK);
        p.start_think(&b, roll(3, 4)).unwrap();
        assert!(p.is_thinking());
        let decision = p.wait_move().unwrap();
        assert!(!p.is_thinking());
        assert!(b.legal_moves(roll(3, 4)).contains(&decision.mv.unwrap()));
        assert_eq!(p.try_take_move(), None);
    }

    #[test]
    fn test_new_think_supersedes_old() {
        let b = board("b5=b, b9=b", Team::Blue);
        let slow = Difficulty {
            think_ms: 60_000,
            blunder_percent: 0,
        };
        let mut p = player(Team::Blue, Personality::Active, slow);
        p.start_think(&b, roll(2, 3)).unwrap();
        let started = std::time::Instant::now();
        p.stop_think();
        assert!(started.elapsed().as_secs() < 5);
        assert!(!p.is_thinking());
        assert_eq!(p.wait_move(), None);
    }
}
