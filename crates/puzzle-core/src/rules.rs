//! Chess rules capability: move parsing, legality and notation.
//!
//! Derivation and the solving flow only orchestrate a [`Rules`] implementation;
//! they never generate moves themselves. [`Standard`] is the shakmaty-backed
//! implementation used everywhere outside of tests.

use std::fmt;

use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position, Square};

use crate::error::TrainerError;

/// Side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// Capability that knows the rules of chess.
///
/// `Move` is a move resolved against a concrete position (always legal there).
/// `LongMove` is the position-independent from/to/promotion form used by puzzle
/// solutions; two long moves are equal iff they name the same squares and
/// promotion piece.
pub trait Rules {
    type Position: Clone;
    type Move: Clone;
    type LongMove: Clone + PartialEq + fmt::Display;

    /// The standard starting position.
    fn initial_position(&self) -> Self::Position;

    /// Parse short-form notation (`Nf3`, `exd5`, `O-O`) as a legal move in `pos`.
    fn parse_short_form(&self, text: &str, pos: &Self::Position) -> Option<Self::Move>;

    /// Parse long-form notation (`g1f3`, `e7e8q`). Syntax only, no legality check.
    fn parse_long_form(&self, text: &str) -> Option<Self::LongMove>;

    /// Resolve a long-form move against `pos`; `None` if it is not legal there.
    fn resolve(&self, long: &Self::LongMove, pos: &Self::Position) -> Option<Self::Move>;

    /// Play `mv` on a copy of `pos`.
    fn apply(&self, mv: &Self::Move, pos: &Self::Position) -> Result<Self::Position, TrainerError>;

    fn legal_moves(&self, pos: &Self::Position) -> Vec<Self::Move>;

    /// Short-form notation of `mv` as played from `pos`, including check suffix.
    fn to_short_form(&self, mv: &Self::Move, pos: &Self::Position) -> String;

    fn to_long_form(&self, mv: &Self::Move) -> Self::LongMove;

    /// Destination square name of `mv`.
    fn destination(&self, mv: &Self::Move) -> String;

    fn side_to_move(&self, pos: &Self::Position) -> Side;

    /// Full move number (starts at 1, increments after Black moves).
    fn fullmove_number(&self, pos: &Self::Position) -> u32;

    /// Canonical string form of the position (FEN).
    fn to_canonical(&self, pos: &Self::Position) -> String;

    fn from_canonical(&self, text: &str) -> Result<Self::Position, TrainerError>;

    /// Legal moves starting on the square named by `text`.
    ///
    /// Returns `None` unless `text` is a board coordinate holding a piece. The
    /// list is empty when that piece cannot move (or belongs to the side not
    /// on move).
    fn moves_from_square(&self, text: &str, pos: &Self::Position) -> Option<(String, Vec<Self::Move>)>;

    /// True if `text` is well-formed move notation, legal or not.
    fn is_move_notation(&self, text: &str) -> bool;

    /// Short form first, then long form resolved against `pos`.
    fn parse_move(&self, text: &str, pos: &Self::Position) -> Option<Self::Move> {
        self.parse_short_form(text, pos).or_else(|| {
            let long = self.parse_long_form(text)?;
            self.resolve(&long, pos)
        })
    }

    /// Like [`Rules::parse_move`], but says why the text was rejected.
    fn read_move(&self, text: &str, pos: &Self::Position) -> Result<Self::Move, TrainerError> {
        if let Some(mv) = self.parse_move(text, pos) {
            return Ok(mv);
        }
        let text = text.trim().to_string();
        if self.is_move_notation(&text) {
            Err(TrainerError::IllegalMove(text))
        } else {
            Err(TrainerError::MalformedInput(text))
        }
    }
}

/// Standard chess rules backed by shakmaty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl Rules for Standard {
    type Position = Chess;
    type Move = Move;
    type LongMove = UciMove;

    fn initial_position(&self) -> Chess {
        Chess::default()
    }

    fn parse_short_form(&self, text: &str, pos: &Chess) -> Option<Move> {
        let san_plus: SanPlus = text.trim().parse().ok()?;
        san_plus.san.to_move(pos).ok()
    }

    fn parse_long_form(&self, text: &str) -> Option<UciMove> {
        match text.trim().parse::<UciMove>().ok()? {
            uci @ UciMove::Normal { .. } => Some(uci),
            _ => None,
        }
    }

    fn resolve(&self, long: &UciMove, pos: &Chess) -> Option<Move> {
        long.to_move(pos).ok()
    }

    fn apply(&self, mv: &Move, pos: &Chess) -> Result<Chess, TrainerError> {
        pos.clone()
            .play(mv.clone())
            .map_err(|e| TrainerError::IllegalMove(e.to_string()))
    }

    fn legal_moves(&self, pos: &Chess) -> Vec<Move> {
        pos.legal_moves().into_iter().collect()
    }

    fn to_short_form(&self, mv: &Move, pos: &Chess) -> String {
        let san = San::from_move(pos, mv.clone()).to_string();
        let mut after = pos.clone();
        after.play_unchecked(mv.clone());
        if after.is_checkmate() {
            format!("{san}#")
        } else if after.is_check() {
            format!("{san}+")
        } else {
            san
        }
    }

    fn to_long_form(&self, mv: &Move) -> UciMove {
        mv.to_uci(CastlingMode::Standard)
    }

    fn destination(&self, mv: &Move) -> String {
        mv.to().to_string()
    }

    fn side_to_move(&self, pos: &Chess) -> Side {
        match pos.turn() {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }

    fn fullmove_number(&self, pos: &Chess) -> u32 {
        pos.fullmoves().get()
    }

    fn to_canonical(&self, pos: &Chess) -> String {
        Fen::from_position(pos, EnPassantMode::Legal).to_string()
    }

    fn from_canonical(&self, text: &str) -> Result<Chess, TrainerError> {
        let fen: Fen = text
            .trim()
            .parse()
            .map_err(|e| TrainerError::InvalidPosition(format!("{text}: {e}")))?;
        fen.into_position(CastlingMode::Standard)
            .map_err(|e| TrainerError::InvalidPosition(format!("{text}: {e}")))
    }

    fn is_move_notation(&self, text: &str) -> bool {
        text.trim().parse::<SanPlus>().is_ok() || self.parse_long_form(text).is_some()
    }

    fn moves_from_square(&self, text: &str, pos: &Chess) -> Option<(String, Vec<Move>)> {
        let square: Square = text.trim().to_ascii_lowercase().parse().ok()?;
        pos.board().piece_at(square)?;

        let moves = pos
            .legal_moves()
            .into_iter()
            .filter(|m| m.from() == Some(square))
            .collect();
        Some((square.to_string(), moves))
    }
}
