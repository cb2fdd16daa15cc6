//! Integration tests: move review against a scripted search.

mod common;

use common::fen_after;
use puzzle_core::search::scripted::ScriptedSearch;
use puzzle_core::{review_move, QualityLabel, Rules, Score, SearchBudget, Standard};

const BUDGET: SearchBudget = SearchBudget::Depth(15);

#[tokio::test]
async fn test_unavailable_search_is_always_unknown() {
    let rules = Standard;
    let start = rules.initial_position();
    let mut search = ScriptedSearch::unavailable();
    for text in ["e4", "g4", "Qh5", "e2e5", "nonsense"] {
        let review = review_move(&rules, &mut search, &start, text, BUDGET).await;
        assert_eq!(review.label, QualityLabel::Unknown, "{text}");
    }
}

#[tokio::test]
async fn test_labels_follow_eval_change() {
    let rules = Standard;
    let start = rules.initial_position();
    let cases = [
        // Mover starts at +0.30; the opponent's view after the move decides
        ("d4", -20, QualityLabel::Good),
        ("c4", 10, QualityLabel::Inaccuracy),
        ("a4", 120, QualityLabel::Mistake),
        ("g4", 121, QualityLabel::Blunder),
    ];
    for (mv, opponent_cp, expected) in cases {
        let mut search = ScriptedSearch::new();
        search.answer(&fen_after(&[]), Score::Centipawns(30), Some("e2e4"));
        search.answer(&fen_after(&[mv]), Score::Centipawns(opponent_cp), Some("e7e5"));
        let review = review_move(&rules, &mut search, &start, mv, BUDGET).await;
        assert_eq!(review.label, expected, "{mv}");
    }
}

#[tokio::test]
async fn test_recommended_move_is_best_even_when_eval_drops() {
    let rules = Standard;
    let start = rules.initial_position();
    let mut search = ScriptedSearch::new();
    search.answer(&fen_after(&[]), Score::Centipawns(30), Some("g1f3"));
    search.answer(&fen_after(&["Nf3"]), Score::Centipawns(400), None);

    let review = review_move(&rules, &mut search, &start, "g1f3", BUDGET).await;
    assert_eq!(review.label, QualityLabel::Best);
    assert_eq!(review.best_move.as_deref(), Some("Nf3"));
}

#[tokio::test]
async fn test_mate_scores_saturate() {
    let rules = Standard;
    let start = rules.initial_position();
    let mut search = ScriptedSearch::new();
    search.answer(&fen_after(&[]), Score::Centipawns(30), Some("e2e4"));
    search.answer(&fen_after(&["f3"]), Score::Mate(3), Some("e7e5"));

    let review = review_move(&rules, &mut search, &start, "f3", BUDGET).await;
    assert_eq!(review.label, QualityLabel::Blunder);
    assert_eq!(review.eval_after, -100.0);
}
