//! Endless mode: random puzzles back to back with a running score

use std::fmt;
use std::io::{self, BufRead, Write};

use puzzle_core::input::{Command, Input};
use puzzle_core::{PreparedPuzzle, PuzzlePayload, Standard};
use tracing::warn;

use super::solve::solve_puzzle;
use super::Outcome;
use crate::clients::lichess::LichessClient;
use crate::console::Console;
use crate::error::ClientError;

/// Where the next puzzle comes from
#[allow(async_fn_in_trait)]
pub trait PuzzleSource {
    async fn next_puzzle(&mut self) -> Result<PuzzlePayload, ClientError>;
}

impl PuzzleSource for LichessClient {
    async fn next_puzzle(&mut self) -> Result<PuzzlePayload, ClientError> {
        self.random(&mut rand::thread_rng()).await
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub solved: u32,
    pub attempts: u32,
}

impl Scoreboard {
    pub fn record(&mut self, solved: bool) {
        self.attempts += 1;
        if solved {
            self.solved += 1;
        }
    }

    /// Percentage of attempts solved, 0 before the first attempt
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        f64::from(self.solved) / f64::from(self.attempts) * 100.0
    }
}

impl fmt::Display for Scoreboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:.1}%)", self.solved, self.attempts, self.accuracy())
    }
}

pub async fn run_endless<S: PuzzleSource, I: BufRead, O: Write>(
    console: &mut Console<I, O>,
    source: &mut S,
) -> io::Result<Scoreboard> {
    console.say("ENDLESS PUZZLE MODE")?;
    console.say("Solve puzzles back to back. Type 'quit' to stop.")?;

    let mut score = Scoreboard::default();
    loop {
        console.say("Fetching puzzle...")?;
        let payload = match source.next_puzzle().await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Endless mode fetch failed");
                console.say(format!("Could not fetch a puzzle: {e}"))?;
                match console.prompt("Press Enter to retry or type 'quit': ")? {
                    Some(line) if !is_quit(&line) => continue,
                    _ => break,
                }
            }
        };

        let puzzle = PreparedPuzzle::from_payload(Standard, payload);
        match solve_puzzle(console, &puzzle)? {
            Outcome::Quit => break,
            Outcome::Broken => continue,
            Outcome::Solved => score.record(true),
            Outcome::Assisted => score.record(false),
        }

        console.say(format!("Score: {score}"))?;
        match console.prompt("Press Enter for the next puzzle: ")? {
            Some(line) if !is_quit(&line) => {}
            _ => break,
        }
    }

    console.say(format!("Final score: {}/{}", score.solved, score.attempts))?;
    Ok(score)
}

fn is_quit(line: &str) -> bool {
    matches!(Input::parse(line), Input::Command(Command::Quit | Command::Menu))
}
