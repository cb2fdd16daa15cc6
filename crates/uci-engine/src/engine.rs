//! Search capability backed by a UCI engine process.
//!
//! An [`Engine`] is either running or unavailable. Starting never fails; a
//! broken binary simply leaves the trainer without engine features.

use puzzle_core::search::{self, RankedMove};
use puzzle_core::{Score, Search, SearchBudget, SearchRequest, SearchResponse, TrainerError};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::stockfish::{Analysis, PvLine, StockfishEngine};

pub struct Engine {
    config: EngineConfig,
    process: Option<StockfishEngine>,
}

impl Engine {
    /// Spawn and handshake; on failure the engine is unavailable
    pub async fn start(config: EngineConfig) -> Self {
        match StockfishEngine::new(&config).await {
            Ok(process) => {
                info!(path = %config.path, depth = config.depth, "Engine ready");
                Self {
                    config,
                    process: Some(process),
                }
            }
            Err(e) => {
                warn!(path = %config.path, error = %e, "Engine unavailable, continuing without analysis");
                Self::unavailable(config)
            }
        }
    }

    pub fn unavailable(config: EngineConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Budget for evaluations at the configured depth
    pub fn default_budget(&self) -> SearchBudget {
        SearchBudget::Depth(self.config.depth)
    }

    /// Best move in long form at the given depth
    pub async fn best_move(&mut self, fen: &str, depth: u32) -> Option<String> {
        search::best_move(self, fen, SearchBudget::Depth(depth)).await
    }

    /// Top `count` moves at the configured depth
    pub async fn top_moves(&mut self, fen: &str, count: u32) -> Vec<RankedMove> {
        let budget = self.default_budget();
        search::top_moves(self, fen, budget, count).await
    }

    pub async fn shutdown(&mut self) {
        if let Some(mut process) = self.process.take() {
            process.quit().await;
        }
    }
}

impl Search for Engine {
    fn is_available(&self) -> bool {
        self.process.is_some()
    }

    async fn search(&mut self, request: &SearchRequest) -> Result<SearchResponse, TrainerError> {
        let Some(process) = self.process.as_mut() else {
            return Err(TrainerError::SearchUnavailable("engine is not running".into()));
        };

        let multipv = request.multipv.unwrap_or(1);
        match process.analyse(&request.fen, request.budget, multipv).await {
            Ok(analysis) => Ok(to_response(analysis, request.multipv.is_some())?),
            Err(e) => {
                // A timed-out search leaves the process usable; anything else does not
                if !matches!(e, EngineError::Timeout(_)) {
                    warn!(error = %e, "Engine failed, disabling analysis");
                    self.process = None;
                }
                Err(e.into())
            }
        }
    }
}

fn line_score(line: &PvLine) -> Option<Score> {
    match (line.mate, line.cp) {
        (Some(mate), _) => Some(Score::Mate(mate)),
        (None, Some(cp)) => Some(Score::Centipawns(cp)),
        (None, None) => None,
    }
}

fn to_response(analysis: Analysis, ranked: bool) -> Result<SearchResponse, EngineError> {
    let score = analysis
        .lines
        .first()
        .and_then(line_score)
        .ok_or_else(|| EngineError::Protocol("search finished without a score".into()))?;

    let lines = if ranked {
        analysis
            .lines
            .iter()
            .filter_map(|line| {
                Some(RankedMove {
                    mv: line.pv.first()?.clone(),
                    score: line_score(line)?,
                })
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(SearchResponse {
        score,
        best_move: analysis.best_move,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn pv(moves: &[&str], cp: Option<i32>, mate: Option<i32>) -> PvLine {
        PvLine {
            pv: moves.iter().map(|m| m.to_string()).collect(),
            cp,
            mate,
        }
    }

    #[test]
    fn test_to_response_single_line() {
        let analysis = Analysis {
            lines: vec![pv(&["e2e4", "e7e5"], Some(35), None)],
            best_move: Some("e2e4".into()),
        };
        let response = to_response(analysis, false).unwrap();
        assert_eq!(response.score, Score::Centipawns(35));
        assert_eq!(response.best_move.as_deref(), Some("e2e4"));
        assert!(response.lines.is_empty());
    }

    #[test]
    fn test_to_response_ranked_skips_empty_lines() {
        let analysis = Analysis {
            lines: vec![
                pv(&["d1h5"], None, Some(2)),
                pv(&["g1f3"], Some(-40), None),
                PvLine::default(),
            ],
            best_move: Some("d1h5".into()),
        };
        let response = to_response(analysis, true).unwrap();
        assert_eq!(response.score, Score::Mate(2));
        assert_eq!(
            response.lines,
            vec![
                RankedMove {
                    mv: "d1h5".into(),
                    score: Score::Mate(2)
                },
                RankedMove {
                    mv: "g1f3".into(),
                    score: Score::Centipawns(-40)
                },
            ]
        );
    }

    #[test]
    fn test_to_response_without_score_is_protocol_error() {
        let analysis = Analysis {
            lines: vec![PvLine::default()],
            best_move: Some("e2e4".into()),
        };
        assert!(matches!(
            to_response(analysis, false),
            Err(EngineError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_binary_gives_unavailable_engine() {
        let config = EngineConfig {
            path: "/nonexistent/stockfish-binary".into(),
            ..EngineConfig::default()
        };
        let mut engine = Engine::start(config).await;
        assert!(!engine.is_available());

        let request = SearchRequest::new("8/8/8/8/8/8/8/K6k w - - 0 1", SearchBudget::Depth(5));
        assert!(matches!(
            engine.search(&request).await,
            Err(TrainerError::SearchUnavailable(_))
        ));
        assert_eq!(engine.best_move("8/8/8/8/8/8/8/K6k w - - 0 1", 5).await, None);
        assert!(engine.top_moves("8/8/8/8/8/8/8/K6k w - - 0 1", 3).await.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_survives_timeout() {
        use crate::fake_uci;

        let mut engine = Engine::start(fake_uci::engine_config("survive", fake_uci::ANSWERS_ON_STOP)).await;
        assert!(engine.is_available());

        let slow = SearchRequest::new(START, SearchBudget::Depth(20));
        assert!(matches!(
            engine.search(&slow).await,
            Err(TrainerError::SearchUnavailable(_))
        ));
        assert!(engine.is_available());

        let response = engine.search(&SearchRequest::new(START, SearchBudget::Depth(1))).await.unwrap();
        assert_eq!(response.score, Score::Centipawns(10));
        assert_eq!(response.best_move.as_deref(), Some("e2e4"));
        engine.shutdown().await;
        assert!(!engine.is_available());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_disabled_after_protocol_error() {
        use crate::fake_uci;

        let mut engine = Engine::start(fake_uci::engine_config("exits", fake_uci::EXITS_ON_GO)).await;
        assert!(engine.is_available());

        let request = SearchRequest::new(START, SearchBudget::Depth(1));
        assert!(matches!(
            engine.search(&request).await,
            Err(TrainerError::SearchUnavailable(_))
        ));
        assert!(!engine.is_available());
        assert_eq!(engine.best_move(START, 1).await, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_engine_disabled_when_stop_goes_unanswered() {
        use crate::fake_uci;

        let mut engine = Engine::start(fake_uci::engine_config("silent", fake_uci::SILENT)).await;
        let request = SearchRequest::new(START, SearchBudget::Depth(20));
        assert!(engine.search(&request).await.is_err());
        assert!(!engine.is_available());
    }
}

