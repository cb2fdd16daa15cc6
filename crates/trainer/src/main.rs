//! Puzzle trainer shell
//!
//! Usage: trainer [daily | puzzle <id> | random | file <path> | endless | play [difficulty]]

use std::io;

use anyhow::Context;
use puzzle_core::{PreparedPuzzle, PuzzlePayload, Standard};
use tracing::info;
use uci_engine::{Difficulty, Engine};

use trainer::clients::lichess::LichessClient;
use trainer::config::Config;
use trainer::console::Console;
use trainer::modes::endless::run_endless;
use trainer::modes::play::{run_play, PlaySettings};
use trainer::modes::solve::solve_puzzle;

enum Mode {
    Daily,
    Puzzle(String),
    Random,
    File(String),
    Endless,
    Play(Option<Difficulty>),
}

fn parse_mode(args: &[String]) -> anyhow::Result<Mode> {
    let mode = match args.first().map(String::as_str) {
        None | Some("daily") => Mode::Daily,
        Some("puzzle") => Mode::Puzzle(args.get(1).cloned().context("usage: trainer puzzle <id>")?),
        Some("random") => Mode::Random,
        Some("file") => Mode::File(args.get(1).cloned().context("usage: trainer file <path>")?),
        Some("endless") => Mode::Endless,
        Some("play") => Mode::Play(args.get(1).map(|d| d.parse::<Difficulty>()).transpose()?),
        Some(other) => anyhow::bail!(
            "unknown command '{other}' (expected daily, puzzle, random, file, endless or play)"
        ),
    };
    Ok(mode)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the board
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Load .env file for local dev
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_mode(&args)?;
    let config = Config::from_env()?;
    let client = LichessClient::new(&config)?;
    let mut console = Console::new(io::stdin().lock(), io::stdout());

    match mode {
        Mode::Daily => {
            let payload = client.daily().await?;
            solve(&mut console, payload)?;
        }
        Mode::Puzzle(id) => {
            let payload = client.by_id(&id).await?;
            solve(&mut console, payload)?;
        }
        Mode::Random => {
            let payload = client.random(&mut rand::thread_rng()).await?;
            solve(&mut console, payload)?;
        }
        Mode::File(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            solve(&mut console, PuzzlePayload::from_json(&json)?)?;
        }
        Mode::Endless => {
            let mut client = client;
            let score = run_endless(&mut console, &mut client).await?;
            info!(solved = score.solved, attempts = score.attempts, "Endless session finished");
        }
        Mode::Play(difficulty) => {
            let difficulty = difficulty.unwrap_or(config.difficulty);
            let mut engine = Engine::start(config.engine.clone()).await;
            let settings = PlaySettings {
                opponent_depth: difficulty.depth(),
                review_budget: engine.default_budget(),
                hint_count: 3,
                show_evaluation: true,
            };
            info!(%difficulty, available = puzzle_core::Search::is_available(&engine), "Starting supervised play");
            run_play(&mut console, &mut engine, settings).await?;
            engine.shutdown().await;
        }
    }

    Ok(())
}

fn solve<I: io::BufRead, O: io::Write>(console: &mut Console<I, O>, payload: PuzzlePayload) -> anyhow::Result<()> {
    let puzzle = PreparedPuzzle::from_payload(Standard, payload);
    let outcome = solve_puzzle(console, &puzzle)?;
    info!(puzzle_id = %puzzle.id, ?outcome, "Puzzle finished");
    Ok(())
}
