//! Fanorona engine binary.
//!
//! ## Usage
//!
//! - `fanorona` - Show a demo
//! - `fanorona play --white human --black mcts-better` - Play a match
//! - `fanorona protocol` - Start the text protocol on stdin/stdout
//! - `fanorona demo` - Watch two engines play

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fanorona::agent::PlayerMode;
use fanorona::board::Diagonals;
use fanorona::config::GameConfig;
use fanorona::constants::{DEFAULT_HEIGHT, DEFAULT_MAX_PLIES, DEFAULT_WIDTH};
use fanorona::game::Game;
use fanorona::moves::Notation;
use fanorona::protocol::ProtocolEngine;
use fanorona::state::State;

/// Fanorona rule engine with minimax and MCTS players
#[derive(Parser)]
#[command(name = "fanorona")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a match between two player modes
    Play {
        #[command(flatten)]
        board: BoardArgs,
        /// Who plays White (moves first)
        #[arg(long, value_enum, default_value_t = PlayerMode::Human)]
        white: PlayerMode,
        /// Who plays Black
        #[arg(long, value_enum, default_value_t = PlayerMode::MctsQuick)]
        black: PlayerMode,
    },
    /// Start the line-oriented text protocol
    Protocol {
        #[command(flatten)]
        board: BoardArgs,
        /// Player mode used by `genmove`
        #[arg(long, value_enum, default_value_t = PlayerMode::MctsQuick)]
        mode: PlayerMode,
    },
    /// Run a short engine-versus-engine demo
    Demo {
        #[command(flatten)]
        board: BoardArgs,
    },
}

#[derive(Args, Clone)]
struct BoardArgs {
    /// Board width
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: usize,
    /// Board height
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: usize,
    /// Seed for the agents' random number generators (random if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Move applications before the game is declared a draw
    #[arg(long, default_value_t = DEFAULT_MAX_PLIES)]
    max_plies: usize,
    /// Only allow diagonal moves through strong points
    #[arg(long)]
    strong_points: bool,
}

impl BoardArgs {
    fn config(&self) -> Result<GameConfig> {
        let seed = self.seed.unwrap_or_else(|| fastrand::u64(..));
        let diagonals = if self.strong_points {
            Diagonals::StrongPoints
        } else {
            Diagonals::All
        };
        let config = GameConfig::new(self.width, self.height)
            .context("invalid board size")?
            .with_diagonals(diagonals)
            .with_max_plies(self.max_plies)
            .with_seed(seed);
        info!(width = config.width, height = config.height, seed, "game configured");
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        _ => EnvFilter::new(default),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Play { board, white, black }) => play(&board.config()?, white, black),
        Some(Commands::Protocol { board, mode }) => {
            let mut engine = ProtocolEngine::with_mode(board.config()?, mode);
            engine.run().context("protocol I/O failed")
        }
        Some(Commands::Demo { board }) => run_demo(&board.config()?),
        None => {
            let board = BoardArgs {
                width: DEFAULT_WIDTH,
                height: DEFAULT_HEIGHT,
                seed: None,
                max_plies: DEFAULT_MAX_PLIES,
                strong_points: false,
            };
            run_demo(&board.config()?)
        }
    }
}

fn play(config: &GameConfig, white: PlayerMode, black: PlayerMode) -> Result<()> {
    let mut game = Game::from_modes(config, white, black);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = io::stdout();

    while game.result().is_none() {
        if !game.awaiting_human() {
            let player = game.state().to_move();
            if let Some(mv) = game.step()? {
                println!("{player}: {mv}");
            }
            continue;
        }

        show(game.state());
        let legal = game.state().available_moves();
        let listed: Vec<String> = legal.iter().map(|mv| mv.to_string()).collect();
        println!("legal: {}", listed.join(" "));
        print!("{} > ", game.state().to_move());
        stdout.flush()?;

        let Some(line) = lines.next() else {
            bail!("input closed before the game ended");
        };
        let line = line.context("failed to read move")?;
        let notation: Notation = match line.parse() {
            Ok(n) => n,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        match notation.resolve(&legal) {
            Ok(mv) => game.play(mv)?,
            Err(err) => println!("{err}"),
        }
    }

    show(game.state());
    if let Some(result) = game.result() {
        println!("{result} after {} plies", game.plies());
    }
    Ok(())
}

fn show(state: &State) {
    println!("\n{}", state.board());
}

fn run_demo(config: &GameConfig) -> Result<()> {
    println!("Fanorona: minimax and MCTS engines\n");

    println!("=== Initial Layout ===");
    show(&State::from_config(config));

    println!("=== minimax-easy vs mcts-quick ===");
    let mut game = Game::from_modes(config, PlayerMode::MinimaxEasy, PlayerMode::MctsQuick);
    let result = game.run()?;
    show(game.state());
    println!("{result} after {} plies", game.plies());
    Ok(())
}
