//! Move review: two sequential evaluations around a played move, then classification.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::eval::EvaluationSample;
use crate::quality::{classify, Classification, QualityLabel};
use crate::rules::Rules;
use crate::search::{evaluate, Search, SearchBudget};

/// Feedback for one played move
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveReview {
    pub label: QualityLabel,
    /// Mover's evaluation before the move, in pawns
    pub eval_before: f64,
    /// Mover's evaluation after the move, in pawns
    pub eval_after: f64,
    pub eval_change: f64,
    /// Engine recommendation in short form
    pub best_move: Option<String>,
    /// The move as played, in short form
    pub played: Option<String>,
}

impl MoveReview {
    fn without_scores(label: QualityLabel, played: Option<String>) -> Self {
        Self {
            label,
            eval_before: 0.0,
            eval_after: 0.0,
            eval_change: 0.0,
            best_move: None,
            played,
        }
    }
}

/// Review `move_text` played from `position`.
///
/// An unavailable engine yields `unknown` without looking at the move.
pub async fn review_move<R: Rules, S: Search>(
    rules: &R,
    search: &mut S,
    position: &R::Position,
    move_text: &str,
    budget: SearchBudget,
) -> MoveReview {
    if !search.is_available() {
        return MoveReview::without_scores(QualityLabel::Unknown, None);
    }

    let Some(mv) = rules.parse_move(move_text, position) else {
        return MoveReview::without_scores(QualityLabel::Illegal, None);
    };
    let played = rules.to_short_form(&mv, position);
    let Ok(after_position) = rules.apply(&mv, position) else {
        return MoveReview::without_scores(QualityLabel::Illegal, None);
    };

    let before = evaluate(search, &rules.to_canonical(position), budget).await;
    let after = evaluate(search, &rules.to_canonical(&after_position), budget).await;

    let played_long = rules.to_long_form(&mv).to_string();
    let is_recommended = before.best_move.as_deref() == Some(played_long.as_str());
    let Classification { label, eval_change } = classify(&before, &after, true, is_recommended);
    debug!(played = played.as_str(), %label, eval_change, "Move reviewed");

    if label == QualityLabel::Unknown {
        return MoveReview::without_scores(label, Some(played));
    }

    MoveReview {
        label,
        eval_before: before.pawns(),
        eval_after: -after.pawns(),
        eval_change,
        best_move: recommended_short_form(rules, position, &before),
        played: Some(played),
    }
}

fn recommended_short_form<R: Rules>(rules: &R, position: &R::Position, sample: &EvaluationSample) -> Option<String> {
    let long = sample.best_move.as_deref()?;
    let mv = rules.parse_move(long, position)?;
    Some(rules.to_short_form(&mv, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Score;
    use crate::rules::Standard;
    use crate::search::scripted::ScriptedSearch;

    fn fen_after(rules: &Standard, moves: &[&str]) -> String {
        let mut pos = rules.initial_position();
        for m in moves {
            let mv = rules.parse_move(m, &pos).unwrap();
            pos = rules.apply(&mv, &pos).unwrap();
        }
        rules.to_canonical(&pos)
    }

    #[tokio::test]
    async fn test_review_recommended_move() {
        let rules = Standard;
        let start = rules.initial_position();
        let mut search = ScriptedSearch::new();
        search.answer(&fen_after(&rules, &[]), Score::Centipawns(30), Some("e2e4"));
        search.answer(&fen_after(&rules, &["e4"]), Score::Centipawns(-30), Some("e7e5"));

        let review = review_move(&rules, &mut search, &start, "e4", SearchBudget::Depth(10)).await;
        assert_eq!(review.label, QualityLabel::Best);
        assert_eq!(review.best_move.as_deref(), Some("e4"));
        assert_eq!(review.played.as_deref(), Some("e4"));
        assert_eq!(review.eval_change, 0.0);
        assert_eq!(search.requests.len(), 2);
    }

    #[tokio::test]
    async fn test_review_blunder() {
        let rules = Standard;
        let start = rules.initial_position();
        let mut search = ScriptedSearch::new();
        search.answer(&fen_after(&rules, &[]), Score::Centipawns(30), Some("e2e4"));
        search.answer(&fen_after(&rules, &["f3"]), Score::Centipawns(250), Some("e7e5"));

        let review = review_move(&rules, &mut search, &start, "f3", SearchBudget::Depth(10)).await;
        assert_eq!(review.label, QualityLabel::Blunder);
        assert_eq!(review.eval_before, 0.3);
        assert_eq!(review.eval_after, -2.5);
        assert_eq!(review.eval_change, -2.8);
    }

    #[tokio::test]
    async fn test_review_illegal_move() {
        let rules = Standard;
        let start = rules.initial_position();
        let mut search = ScriptedSearch::new();
        let review = review_move(&rules, &mut search, &start, "Ke2", SearchBudget::Depth(10)).await;
        assert_eq!(review.label, QualityLabel::Illegal);
        assert!(search.requests.is_empty());
    }

    #[tokio::test]
    async fn test_review_without_engine_is_unknown() {
        let rules = Standard;
        let start = rules.initial_position();
        let mut search = ScriptedSearch::unavailable();
        for text in ["e4", "f3", "Ke2"] {
            let review = review_move(&rules, &mut search, &start, text, SearchBudget::Depth(10)).await;
            assert_eq!(review.label, QualityLabel::Unknown);
        }
    }

    #[tokio::test]
    async fn test_review_failed_evaluation_is_unknown() {
        let rules = Standard;
        let start = rules.initial_position();
        let mut search = ScriptedSearch::new();
        search.answer(&fen_after(&rules, &[]), Score::Centipawns(30), Some("e2e4"));

        let review = review_move(&rules, &mut search, &start, "d4", SearchBudget::Depth(10)).await;
        assert_eq!(review.label, QualityLabel::Unknown);
        assert_eq!(review.played.as_deref(), Some("d4"));
    }
}
