//! Position derivation: replay a puzzle's move list up to a ply.
//!
//! The move list is first read as PGN movetext (numbering, comments, NAGs and
//! variations are understood). If that reader produces no moves, or one of
//! its mainline moves up to the target ply is illegal or unreadable, the
//! text is re-tokenized on whitespace and every token that applies is played,
//! skipping the rest. Derivation never fails; worst case it returns the
//! initial position.

use std::ops::ControlFlow;
use std::sync::LazyLock;

use pgn_reader::{Reader, SanPlus, Skip, Visitor};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rules::Rules;

/// Leading move number marker: `12.`, `12...`
static MOVE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.+").unwrap());

/// The move that produced a derived position, for highlighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMoveInfo {
    pub uci: String,
    pub san: String,
}

/// Result of a derivation
#[derive(Debug, Clone)]
pub struct Derivation<P> {
    pub position: P,
    pub last_move: Option<LastMoveInfo>,
    /// Moves actually applied (equals the target ply unless the list ran out)
    pub applied: usize,
    /// True when the structured reader failed and naive tokenizing was used
    pub used_fallback: bool,
}

/// Derive the position after `target_ply` half-moves of `move_list`.
///
/// `target_ply = k` means k moves are applied; the k-th move is reported as
/// the last move. If the list holds fewer applicable moves, the position
/// after all of them is returned together with the final one applied.
///
/// The PGN mainline is replayed first. When it yields no moves, or any of
/// its moves up to `target_ply` does not apply to the position reached so
/// far, the whole list is replayed again from whitespace tokens, skipping
/// tokens that do not apply (`used_fallback` is set).
pub fn derive_position<R: Rules>(rules: &R, move_list: &str, target_ply: usize) -> Derivation<R::Position> {
    if target_ply == 0 || move_list.trim().is_empty() {
        return Derivation {
            position: rules.initial_position(),
            last_move: None,
            applied: 0,
            used_fallback: false,
        };
    }

    if let Some(tokens) = read_mainline(move_list) {
        if let Some(derivation) = replay_strict(rules, &tokens, target_ply) {
            return derivation;
        }
    }

    debug!(target_ply, "Structured move list reading failed, tokenizing");
    replay_lenient(rules, move_list, target_ply)
}

/// Collects mainline SAN tokens, skipping variations.
struct MainlineCollector;

impl Visitor for MainlineCollector {
    type Tags = ();
    type Movetext = Vec<String>;
    type Output = Vec<String>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        ControlFlow::Continue(Vec::new())
    }

    fn san(&mut self, movetext: &mut Self::Movetext, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        movetext.push(san_plus.to_string());
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, _movetext: &mut Self::Movetext) -> ControlFlow<Self::Output, Skip> {
        ControlFlow::Continue(Skip(true))
    }

    fn end_game(&mut self, movetext: Self::Movetext) -> Self::Output {
        movetext
    }
}

/// Mainline tokens, or `None` if the reader found no game.
fn read_mainline(move_list: &str) -> Option<Vec<String>> {
    let mut reader = Reader::new(move_list.as_bytes());
    match reader.read_game(&mut MainlineCollector) {
        Ok(Some(tokens)) if !tokens.is_empty() => Some(tokens),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "PGN reader error");
            None
        }
    }
}

/// Running replay state
struct Walk<P> {
    position: P,
    last_move: Option<LastMoveInfo>,
    applied: usize,
}

impl<P: Clone> Walk<P> {
    fn new(position: P) -> Self {
        Self {
            position,
            last_move: None,
            applied: 0,
        }
    }

    /// Apply `token` if it is a legal move; false otherwise.
    fn step<R: Rules<Position = P>>(&mut self, rules: &R, token: &str) -> bool {
        let Some(mv) = rules.parse_move(token, &self.position) else {
            return false;
        };
        let info = LastMoveInfo {
            uci: rules.to_long_form(&mv).to_string(),
            san: rules.to_short_form(&mv, &self.position),
        };
        match rules.apply(&mv, &self.position) {
            Ok(next) => {
                self.position = next;
                self.last_move = Some(info);
                self.applied += 1;
                true
            }
            Err(_) => false,
        }
    }

    fn finish(self, used_fallback: bool) -> Derivation<P> {
        Derivation {
            position: self.position,
            last_move: self.last_move,
            applied: self.applied,
            used_fallback,
        }
    }
}

/// Replay structured tokens; any token that does not apply before the target
/// is reached counts as a failure of the structured path.
fn replay_strict<R: Rules>(rules: &R, tokens: &[String], target_ply: usize) -> Option<Derivation<R::Position>> {
    let mut walk = Walk::new(rules.initial_position());
    for token in tokens {
        if walk.applied == target_ply {
            break;
        }
        if !walk.step(rules, token) {
            debug!(token = token.as_str(), ply = walk.applied + 1, "Move does not apply");
            return None;
        }
    }
    Some(walk.finish(false))
}

/// Whitespace tokens with leading move numbers removed; pure markers vanish.
fn naive_tokens(move_list: &str) -> impl Iterator<Item = &str> {
    move_list
        .split_whitespace()
        .map(|token| match MOVE_NUMBER.find(token) {
            Some(marker) => &token[marker.end()..],
            None => token,
        })
        .filter(|token| !token.is_empty())
}

fn replay_lenient<R: Rules>(rules: &R, move_list: &str, target_ply: usize) -> Derivation<R::Position> {
    let mut walk = Walk::new(rules.initial_position());
    for token in naive_tokens(move_list) {
        if walk.applied == target_ply {
            break;
        }
        if !walk.step(rules, token) {
            debug!(token, "Skipping token that does not apply");
        }
    }
    walk.finish(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Side, Standard};

    fn fen_after(moves: &[&str]) -> String {
        let rules = Standard;
        let mut pos = rules.initial_position();
        for token in moves {
            let mv = rules.parse_move(token, &pos).unwrap();
            pos = rules.apply(&mv, &pos).unwrap();
        }
        rules.to_canonical(&pos)
    }

    #[test]
    fn test_plain_move_list() {
        let rules = Standard;
        let d = derive_position(&rules, "e4 e6 d4 d5", 4);
        assert_eq!(rules.side_to_move(&d.position), Side::White);
        assert_eq!(d.applied, 4);
        assert!(!d.used_fallback);
        let last = d.last_move.unwrap();
        assert_eq!(last.san, "d5");
        assert_eq!(last.uci, "d7d5");
    }

    #[test]
    fn test_numbered_move_list() {
        let rules = Standard;
        let d = derive_position(&rules, "1. e4 e6 2. d4 d5 3. Nc3", 3);
        assert_eq!(rules.to_canonical(&d.position), fen_after(&["e4", "e6", "d4"]));
        assert_eq!(d.last_move.unwrap().san, "d4");
        assert!(!d.used_fallback);
    }

    #[test]
    fn test_zero_ply_and_empty_list() {
        let rules = Standard;
        let start = rules.to_canonical(&rules.initial_position());

        let d = derive_position(&rules, "e4 e5", 0);
        assert_eq!(rules.to_canonical(&d.position), start);
        assert!(d.last_move.is_none());

        let d = derive_position(&rules, "   ", 5);
        assert_eq!(rules.to_canonical(&d.position), start);
        assert!(d.last_move.is_none());
        assert_eq!(d.applied, 0);
    }

    #[test]
    fn test_ply_past_end_returns_longest_prefix() {
        let rules = Standard;
        let d = derive_position(&rules, "e4 e6 d4 d5", 40);
        assert_eq!(d.applied, 4);
        assert_eq!(rules.to_canonical(&d.position), fen_after(&["e4", "e6", "d4", "d5"]));
        assert_eq!(d.last_move.unwrap().san, "d5");
    }

    #[test]
    fn test_fallback_skips_bad_tokens() {
        let rules = Standard;
        // White cannot play Nf6 here, so the structured replay gives up
        let d = derive_position(&rules, "1. e4 e6 2. Nf6 d4 d5", 4);
        assert!(d.used_fallback);
        assert_eq!(d.applied, 4);
        assert_eq!(rules.to_canonical(&d.position), fen_after(&["e4", "e6", "d4", "d5"]));
        assert_eq!(d.last_move.unwrap().san, "d5");
    }

    #[test]
    fn test_fallback_counts_only_applied_moves() {
        let rules = Standard;
        let d = replay_lenient(&rules, "1. e4 e6 2. d4 d5", 4);
        assert_eq!(d.applied, 4);
        assert_eq!(d.last_move.unwrap().uci, "d7d5");

        let d = replay_lenient(&rules, "1.e4 e6 2.d4 ?? d5", 3);
        assert_eq!(d.applied, 3);
        assert_eq!(d.last_move.unwrap().san, "d4");
    }

    #[test]
    fn test_garbage_yields_initial_position() {
        let rules = Standard;
        let d = derive_position(&rules, "foo bar 1... baz", 3);
        assert_eq!(d.applied, 0);
        assert!(d.last_move.is_none());
        assert_eq!(
            rules.to_canonical(&d.position),
            rules.to_canonical(&rules.initial_position())
        );
    }

    #[test]
    fn test_castling_recorded_as_last_move() {
        let rules = Standard;
        let list = "e4 e5 Nf3 Nc6 Bb5 a6 Ba4 Nf6 O-O Be7";
        let d = derive_position(&rules, list, 9);
        let last = d.last_move.unwrap();
        assert_eq!(last.san, "O-O");
        assert_eq!(last.uci, "e1g1");
        assert_eq!(rules.side_to_move(&d.position), Side::Black);
    }

    #[test]
    fn test_variations_and_comments_ignored() {
        let rules = Standard;
        let list = "1. e4 {best by test} e5 (1... c5 2. Nf3) 2. Nf3 $1 Nc6";
        let d = derive_position(&rules, list, 4);
        assert!(!d.used_fallback);
        assert_eq!(rules.to_canonical(&d.position), fen_after(&["e4", "e5", "Nf3", "Nc6"]));
    }

    #[test]
    fn test_illegal_mainline_move_triggers_fallback_only_before_target() {
        let rules = Standard;
        let list = "1. e4 e5 2. Ke3 Nc6";

        let d = derive_position(&rules, list, 2);
        assert!(!d.used_fallback);
        assert_eq!(d.last_move.unwrap().san, "e5");

        let d = derive_position(&rules, list, 4);
        assert!(d.used_fallback);
        assert_eq!(d.applied, 3);
        assert_eq!(rules.to_canonical(&d.position), fen_after(&["e4", "e5", "Nc6"]));
    }
}
