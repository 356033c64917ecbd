//! Marbles: four-player race game engine.
//!
//! ## Usage
//!
//! - `marbles` - Show a demo
//! - `marbles moves --setup "g6=g, b6=b" --roll 1+6 --team g` - List legal moves
//! - `marbles think --setup "g6=g, b6=b" --roll 1+6 --team g --algorithm maxn` - Search for a move
//! - `marbles selfplay --difficulty 6` - Four computer players play a full game

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use marbles::algorithm::{Algorithm, AlgorithmKind};
use marbles::board::Board;
use marbles::config::EngineConfig;
use marbles::dice::DiceRoll;
use marbles::evaluator::evaluate;
use marbles::player::{ComputerPlayer, Decision, Difficulty, Personality};
use marbles::position::Position;
use marbles::square::Team;

/// Marbles: four-player race game engine with multi-player search
#[derive(Parser)]
#[command(name = "marbles")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Seed for dice and search randomness
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a short demo of the engine
    Demo,
    /// List the legal moves for a position and roll
    Moves {
        /// Marbles on the board, e.g. "g6=g, b6=b, hy5=y"
        #[arg(long, default_value = "")]
        setup: String,
        /// Dice roll, e.g. 1+6
        #[arg(long)]
        roll: DiceRoll,
        /// Team to move (letter, name or index)
        #[arg(long)]
        team: Team,
    },
    /// Search for the best move
    Think {
        #[arg(long, default_value = "")]
        setup: String,
        #[arg(long)]
        roll: DiceRoll,
        #[arg(long)]
        team: Team,
        #[arg(long, value_enum, default_value_t = AlgorithmKind::Mix)]
        algorithm: AlgorithmKind,
        /// Think budget in milliseconds; negative picks a random move
        #[arg(long, default_value_t = 2000, allow_negative_numbers = true)]
        ms: i64,
        /// Rate every legal move instead of picking one
        #[arg(long)]
        all: bool,
    },
    /// Let four computer players play a full game
    Selfplay {
        /// Difficulty level, 1 (weakest) to 10
        #[arg(long, default_value_t = 5)]
        difficulty: u8,
        #[arg(long, value_enum, default_value_t = Personality::Balanced)]
        personality: Personality,
        /// Stop after this many turns
        #[arg(long, default_value_t = 5000)]
        max_turns: usize,
    },
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let config = EngineConfig::default();

    match cli.command {
        Some(Commands::Moves { setup, roll, team }) => run_moves(&setup, roll, team),
        Some(Commands::Think {
            setup,
            roll,
            team,
            algorithm,
            ms,
            all,
        }) => run_think(&setup, roll, team, algorithm, ms, all, &config, &mut rng),
        Some(Commands::Selfplay {
            difficulty,
            personality,
            max_turns,
        }) => run_selfplay(difficulty, personality, max_turns, &config, &mut rng),
        Some(Commands::Demo) | None => run_demo(&config, &mut rng),
    }
}

fn parse_position(setup: &str) -> Result<Position> {
    Position::from_setup(setup).with_context(|| format!("bad setup {setup:?}"))
}

fn run_moves(setup: &str, roll: DiceRoll, team: Team) -> Result<()> {
    let position = parse_position(setup)?;
    let board = Board::with_position(position, team);
    print!("{board}");

    let moves = board.legal_moves(roll);
    println!("{} legal moves for {team} with {roll}:", moves.len());
    for mv in &moves {
        println!("  {mv}");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_think(
    setup: &str,
    roll: DiceRoll,
    team: Team,
    kind: AlgorithmKind,
    ms: i64,
    all: bool,
    config: &EngineConfig,
    rng: &mut fastrand::Rng,
) -> Result<()> {
    let position = parse_position(setup)?;
    let board = Board::with_position(position, team);
    let algorithm = Algorithm::from_kind(kind, config);
    print!("{board}");

    if all {
        let variations = board.think_all(&algorithm, roll, team, ms, None, rng)?;
        println!("{kind} rated {} moves for {team} with {roll}:", variations.len());
        for variation in &variations {
            println!(
                "  {:<20} {:>10.4}  {}",
                variation.mv.to_string(),
                variation.eval.magnitude(team),
                variation.eval
            );
        }
    } else {
        match board.think_best(&algorithm, roll, team, ms, None, rng) {
            Some(mv) => println!("{kind} plays {mv}"),
            None => println!("no legal move for {team} with {roll}"),
        }
    }
    Ok(())
}

fn run_selfplay(
    level: u8,
    personality: Personality,
    max_turns: usize,
    config: &EngineConfig,
    rng: &mut fastrand::Rng,
) -> Result<()> {
    let difficulty = Difficulty::preset(level)?;
    let mut players: Vec<ComputerPlayer> = Team::ALL
        .iter()
        .map(|&team| ComputerPlayer::new(team, personality, difficulty, config, rng.u64(..)))
        .collect();
    let mut board = Board::new();

    info!(?personality, level, "self-play started");
    for _ in 0..max_turns {
        if board.is_game_over() {
            break;
        }
        let team = board.turn();
        let roll = board.random_roll(rng);
        let player = &mut players[team.index()];
        player.start_think(&board, roll)?;
        let decision = wait_for_move(player)?;

        board.play(roll, decision.mv)?;
        if let Some(entry) = board.history().last() {
            if decision.blundered {
                info!("{entry} (blunder)");
            } else {
                info!("{entry}");
            }
        }
    }

    print!("{board}");
    match board.winner() {
        Some(winner) => info!(turns = board.history().len(), "{winner} wins"),
        None => info!(turns = board.history().len(), "no winner after {max_turns} turns"),
    }
    Ok(())
}

/// Poll the player's worker until its move is ready.
fn wait_for_move(player: &mut ComputerPlayer) -> Result<Decision> {
    loop {
        if let Some(decision) = player.try_take_move() {
            return Ok(decision);
        }
        if !player.is_thinking() {
            bail!("think worker for {} stopped without a move", player.team());
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn run_demo(config: &EngineConfig, rng: &mut fastrand::Rng) -> Result<()> {
    println!("Marbles: four-player race game engine\n");

    println!("=== Position ===");
    let position = parse_position("g6=g, b6=b, r9=y, hy5=y")?;
    let board = Board::with_position(position, Team::Green);
    print!("{board}");
    println!("Static evaluation: {}\n", evaluate(board.position(), None));

    let roll = DiceRoll::new(1, 6)?;
    println!("=== Legal moves for Green with {roll} ===");
    let moves = board.legal_moves(roll);
    for mv in &moves {
        println!("  {mv}");
    }
    println!();

    println!("=== Search (200 ms each) ===");
    for kind in [
        AlgorithmKind::Maxn,
        AlgorithmKind::Paranoid,
        AlgorithmKind::Offensive,
        AlgorithmKind::Mix,
        AlgorithmKind::Montecarlo,
    ] {
        let algorithm = Algorithm::from_kind(kind, config);
        let best = board.think_best(&algorithm, roll, Team::Green, 200, None, rng);
        debug!(algorithm = %kind, "demo search done");
        match best {
            Some(mv) => println!("  {kind:<10} plays {mv}"),
            None => println!("  {kind:<10} has no move"),
        }
    }
    Ok(())
}
