//! Puzzle payload as delivered by the puzzle provider, and its prepared form.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::derivation::{derive_position, Derivation, LastMoveInfo};
use crate::error::TrainerError;
use crate::rules::Rules;
use crate::session::PuzzleSession;

fn default_id() -> String {
    "unknown".to_string()
}

fn default_rating() -> u32 {
    1500
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamePayload {
    #[serde(default)]
    pub id: Option<String>,
    /// Move list text leading to the puzzle
    #[serde(default)]
    pub pgn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleMeta {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_rating")]
    pub rating: u32,
    #[serde(default)]
    pub plays: Option<u64>,
    #[serde(default)]
    pub themes: Vec<String>,
    /// Long-form moves, solver first
    #[serde(default)]
    pub solution: Vec<String>,
    #[serde(default)]
    pub initial_ply: i64,
}

impl Default for PuzzleMeta {
    fn default() -> Self {
        Self {
            id: default_id(),
            rating: default_rating(),
            plays: None,
            themes: Vec::new(),
            solution: Vec::new(),
            initial_ply: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PuzzlePayload {
    #[serde(default)]
    pub game: GamePayload,
    #[serde(default)]
    pub puzzle: PuzzleMeta,
}

impl PuzzlePayload {
    pub fn from_json(json: &str) -> Result<Self, TrainerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Ply to derive the starting position at; negative values clamp to 0
    pub fn target_ply(&self) -> usize {
        usize::try_from(self.puzzle.initial_ply).unwrap_or(0)
    }
}

/// A puzzle ready to be solved: starting position derived, solution attached
pub struct PreparedPuzzle<R: Rules> {
    rules: R,
    pub id: String,
    pub rating: u32,
    pub themes: Vec<String>,
    pub start: Derivation<R::Position>,
    pub solution: Vec<String>,
}

impl<R: Rules + Clone> PreparedPuzzle<R> {
    pub fn from_payload(rules: R, payload: PuzzlePayload) -> Self {
        let target_ply = payload.target_ply();
        let start = derive_position(&rules, &payload.game.pgn, target_ply);
        if start.applied < target_ply {
            debug!(
                puzzle_id = %payload.puzzle.id,
                target_ply,
                applied = start.applied,
                "Move list shorter than the puzzle's initial ply"
            );
        }
        info!(
            puzzle_id = %payload.puzzle.id,
            rating = payload.puzzle.rating,
            used_fallback = start.used_fallback,
            "Puzzle prepared"
        );

        Self {
            rules,
            id: payload.puzzle.id,
            rating: payload.puzzle.rating,
            themes: payload.puzzle.themes,
            start,
            solution: payload.puzzle.solution,
        }
    }

    /// The move that led to the puzzle position, for highlighting
    pub fn last_move(&self) -> Option<&LastMoveInfo> {
        self.start.last_move.as_ref()
    }

    /// Fresh solving session from the starting position
    pub fn session(&self) -> PuzzleSession<R> {
        PuzzleSession::new(
            self.rules.clone(),
            self.start.position.clone(),
            self.solution.clone(),
        )
    }
}
