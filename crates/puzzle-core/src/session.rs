//! Puzzle solving state machine.
//!
//! A session holds the current position and a cursor into the solution. Each
//! submission either advances the cursor (solver move plus the scripted
//! opponent reply) or leaves the session exactly as it was.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::{Rules, Side};

/// A move that was played on the board, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedMove {
    pub uci: String,
    pub san: String,
}

/// What an accepted submission did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub solver_move: PlayedMove,
    /// Scripted reply applied right after the solver move
    pub reply: Option<PlayedMove>,
}

/// Legal moves from a queried square
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SquareInfo {
    pub square: String,
    /// Short-form notation of each legal move from the square
    pub moves: Vec<String>,
    pub destinations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepError {
    /// Neither short-form nor long-form notation
    Unparseable(String),
    /// The expected solution move or its reply cannot be played here
    BrokenSolution(String),
    /// The puzzle is already solved
    Finished,
}

/// Result of one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "detail", rename_all = "snake_case")]
pub enum Step {
    Correct(Advance),
    Complete(Advance),
    /// Understood, but not the solution move. Carries the attempt in long form.
    Incorrect { attempted: String },
    Error(StepError),
    /// The input named an occupied square; informational only
    Square(SquareInfo),
}

impl Step {
    pub fn tag(&self) -> &'static str {
        match self {
            Step::Correct(_) => "correct",
            Step::Complete(_) => "complete",
            Step::Incorrect { .. } => "incorrect",
            Step::Error(_) => "error",
            Step::Square(_) => "square",
        }
    }
}

/// One attempt at a puzzle
pub struct PuzzleSession<R: Rules> {
    rules: R,
    start: R::Position,
    position: R::Position,
    solution: Vec<String>,
    cursor: usize,
    completed: bool,
}

impl<R: Rules> PuzzleSession<R> {
    pub fn new(rules: R, start: R::Position, solution: Vec<String>) -> Self {
        let completed = solution.is_empty();
        Self {
            rules,
            position: start.clone(),
            start,
            solution,
            cursor: 0,
            completed,
        }
    }

    pub fn position(&self) -> &R::Position {
        &self.position
    }

    pub fn rules(&self) -> &R {
        &self.rules
    }

    pub fn solution(&self) -> &[String] {
        &self.solution
    }

    /// Index of the next expected solution move
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }

    /// Side to move on the current position
    pub fn turn(&self) -> Side {
        self.rules.side_to_move(&self.position)
    }

    pub fn fen(&self) -> String {
        self.rules.to_canonical(&self.position)
    }

    /// Validate a solver move against the solution and advance on a match.
    pub fn submit(&mut self, text: &str) -> Step {
        if self.completed {
            return Step::Error(StepError::Finished);
        }
        if let Some(info) = self.moves_from_square(text) {
            return Step::Square(info);
        }

        let attempted = match self.rules.parse_short_form(text, &self.position) {
            Some(mv) => self.rules.to_long_form(&mv),
            None => match self.rules.parse_long_form(text) {
                Some(long) => long,
                None => return Step::Error(StepError::Unparseable(text.trim().to_string())),
            },
        };

        let expected_text = &self.solution[self.cursor];
        let Some(expected) = self.rules.parse_long_form(expected_text) else {
            return Step::Error(StepError::BrokenSolution(expected_text.clone()));
        };
        if attempted != expected {
            debug!(attempted = %attempted, cursor = self.cursor, "Incorrect solution move");
            return Step::Incorrect {
                attempted: attempted.to_string(),
            };
        }

        // Work on copies so a broken reply leaves the session untouched
        let (after_solver, solver_move) = match self.play_solution_move(self.cursor, &self.position) {
            Some(played) => played,
            None => return Step::Error(StepError::BrokenSolution(expected_text.clone())),
        };
        let mut cursor = self.cursor + 1;
        let mut position = after_solver;
        let mut reply = None;
        if cursor < self.solution.len() {
            match self.play_solution_move(cursor, &position) {
                Some((after_reply, played)) => {
                    position = after_reply;
                    reply = Some(played);
                    cursor += 1;
                }
                None => return Step::Error(StepError::BrokenSolution(self.solution[cursor].clone())),
            }
        }

        self.position = position;
        self.cursor = cursor;
        let advance = Advance { solver_move, reply };
        if self.cursor == self.solution.len() {
            self.completed = true;
            Step::Complete(advance)
        } else {
            Step::Correct(advance)
        }
    }

    /// Short-form notation of the next expected move; `None` once solved.
    pub fn hint(&self) -> Option<String> {
        if self.completed {
            return None;
        }
        let expected = &self.solution[self.cursor];
        let hint = self
            .rules
            .parse_long_form(expected)
            .and_then(|long| self.rules.resolve(&long, &self.position))
            .map(|mv| self.rules.to_short_form(&mv, &self.position))
            .unwrap_or_else(|| expected.clone());
        Some(hint)
    }

    /// Whole solution as numbered short-form text from the starting position.
    ///
    /// Entries that cannot be replayed, and everything after them, are shown
    /// in their original long form.
    pub fn reveal_solution(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(self.solution.len() + 1);
        let mut position = self.start.clone();
        let mut replayable = true;

        for (i, entry) in self.solution.iter().enumerate() {
            if replayable {
                if let Some((next, played)) = self.play_solution_move(i, &position) {
                    let number = self.rules.fullmove_number(&position);
                    match self.rules.side_to_move(&position) {
                        Side::White => parts.push(format!("{number}.")),
                        Side::Black if i == 0 => parts.push(format!("{number}...")),
                        Side::Black => {}
                    }
                    parts.push(played.san);
                    position = next;
                    continue;
                }
                replayable = false;
            }
            parts.push(entry.clone());
        }

        parts.join(" ")
    }

    /// Legal moves from the square named by `text`, if it holds a piece.
    pub fn moves_from_square(&self, text: &str) -> Option<SquareInfo> {
        let (square, moves) = self.rules.moves_from_square(text, &self.position)?;
        Some(SquareInfo {
            square,
            moves: moves
                .iter()
                .map(|mv| self.rules.to_short_form(mv, &self.position))
                .collect(),
            destinations: moves.iter().map(|mv| self.rules.destination(mv)).collect(),
        })
    }

    fn play_solution_move(&self, index: usize, position: &R::Position) -> Option<(R::Position, PlayedMove)> {
        let long = self.rules.parse_long_form(&self.solution[index])?;
        let mv = self.rules.resolve(&long, position)?;
        let played = PlayedMove {
            uci: long.to_string(),
            san: self.rules.to_short_form(&mv, position),
        };
        let next = self.rules.apply(&mv, position).ok()?;
        Some((next, played))
    }
}
