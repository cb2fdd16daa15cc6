//! Search capability boundary: evaluation requests to an external engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::TrainerError;
use crate::eval::{EvaluationSample, Score};

/// How much work a single search may do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchBudget {
    Depth(u32),
    Nodes(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// Position in canonical (FEN) form
    pub fen: String,
    pub budget: SearchBudget,
    /// Number of ranked lines wanted; `None` means just the best one
    pub multipv: Option<u32>,
}

impl SearchRequest {
    pub fn new(fen: impl Into<String>, budget: SearchBudget) -> Self {
        Self {
            fen: fen.into(),
            budget,
            multipv: None,
        }
    }

    pub fn with_multipv(mut self, lines: u32) -> Self {
        self.multipv = Some(lines);
        self
    }
}

/// A single ranked line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMove {
    /// First move of the line in long form
    pub mv: String,
    pub score: Score,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// Score of the best line, relative to the side to move
    pub score: Score,
    /// Best move in long form
    pub best_move: Option<String>,
    /// Ranked lines, best first; empty unless multipv was requested
    pub lines: Vec<RankedMove>,
}

/// An engine that can search positions.
///
/// Calls are made one at a time; the implementation enforces its own time
/// bound and reports `TrainerError::SearchUnavailable` on any failure.
#[allow(async_fn_in_trait)]
pub trait Search {
    /// False when the engine never started or has died
    fn is_available(&self) -> bool;

    async fn search(&mut self, request: &SearchRequest) -> Result<SearchResponse, TrainerError>;
}

/// Evaluate a position, degrading to the neutral sample on any failure.
pub async fn evaluate<S: Search>(search: &mut S, fen: &str, budget: SearchBudget) -> EvaluationSample {
    if !search.is_available() {
        return EvaluationSample::neutral();
    }
    match search.search(&SearchRequest::new(fen, budget)).await {
        Ok(response) => EvaluationSample::new(response.score, response.best_move),
        Err(e) => {
            warn!(error = %e, "Evaluation failed, using neutral score");
            EvaluationSample::neutral()
        }
    }
}

/// Best move in long form, `None` when the engine is unavailable or finds nothing.
pub async fn best_move<S: Search>(search: &mut S, fen: &str, budget: SearchBudget) -> Option<String> {
    if !search.is_available() {
        return None;
    }
    match search.search(&SearchRequest::new(fen, budget)).await {
        Ok(response) => response.best_move,
        Err(e) => {
            warn!(error = %e, "Best move search failed");
            None
        }
    }
}

/// Top `count` moves with their scores, empty on failure.
pub async fn top_moves<S: Search>(
    search: &mut S,
    fen: &str,
    budget: SearchBudget,
    count: u32,
) -> Vec<RankedMove> {
    if !search.is_available() || count == 0 {
        return Vec::new();
    }
    let request = SearchRequest::new(fen, budget).with_multipv(count);
    match search.search(&request).await {
        Ok(response) => response.lines,
        Err(e) => {
            warn!(error = %e, "Multi-PV search failed");
            Vec::new()
        }
    }
}

/// Scripted search used by tests across the workspace.
#[doc(hidden)]
pub mod scripted {
    use std::collections::HashMap;

    use super::*;

    /// Answers from a FEN → response table; unknown positions fail.
    #[derive(Debug, Default)]
    pub struct ScriptedSearch {
        pub available: bool,
        pub responses: HashMap<String, SearchResponse>,
        pub requests: Vec<SearchRequest>,
    }

    impl ScriptedSearch {
        pub fn new() -> Self {
            Self {
                available: true,
                ..Self::default()
            }
        }

        pub fn unavailable() -> Self {
            Self::default()
        }

        pub fn answer(&mut self, fen: &str, score: Score, best_move: Option<&str>) {
            self.responses.insert(
                fen.to_string(),
                SearchResponse {
                    score,
                    best_move: best_move.map(String::from),
                    lines: Vec::new(),
                },
            );
        }
    }

    impl Search for ScriptedSearch {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn search(&mut self, request: &SearchRequest) -> Result<SearchResponse, TrainerError> {
            self.requests.push(request.clone());
            self.responses
                .get(&request.fen)
                .cloned()
                .ok_or_else(|| TrainerError::SearchUnavailable(format!("no answer for {}", request.fen)))
        }
    }
}
