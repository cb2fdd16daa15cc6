#![allow(dead_code)]

use puzzle_core::{PuzzlePayload, Rules, Standard};

/// Albin-style line ending with White's 4. cxd5; Black to play
pub const ALBIN_MOVES: &str = "1. d4 d5 2. c4 e5 3. Nf3 c6 4. cxd5";

pub const ALBIN_SOLUTION: [&str; 3] = ["e5d4", "f3d4", "c6d5"];

/// FEN after playing `moves` (any notation) from the initial position.
pub fn fen_after(moves: &[&str]) -> String {
    let rules = Standard;
    let mut pos = rules.initial_position();
    for m in moves {
        let mv = rules
            .parse_move(m, &pos)
            .unwrap_or_else(|| panic!("illegal test move: {m}"));
        pos = rules.apply(&mv, &pos).unwrap();
    }
    rules.to_canonical(&pos)
}

/// Provider-shaped JSON for the Albin line
pub fn albin_payload_json() -> String {
    serde_json::json!({
        "game": { "id": "g1", "pgn": ALBIN_MOVES },
        "puzzle": {
            "id": "albin",
            "rating": 1650,
            "themes": ["opening", "advantage"],
            "solution": ALBIN_SOLUTION,
            "initialPly": 7
        }
    })
    .to_string()
}

pub fn albin_payload() -> PuzzlePayload {
    PuzzlePayload::from_json(&albin_payload_json()).unwrap()
}
