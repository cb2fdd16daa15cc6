//! Puzzle trainer core.
//!
//! Derives puzzle starting positions from move lists, runs the solving state
//! machine against a fixed solution, and classifies played moves from a pair of
//! engine evaluations. Chess rules come from the [`rules::Rules`] capability and
//! engine access from [`search::Search`]; nothing here touches the network.

pub mod derivation;
pub mod error;
pub mod eval;
pub mod input;
pub mod payload;
pub mod quality;
pub mod review;
pub mod rules;
pub mod search;
pub mod session;

pub use derivation::{derive_position, Derivation, LastMoveInfo};
pub use error::TrainerError;
pub use eval::{EvaluationSample, Score};
pub use payload::{PreparedPuzzle, PuzzlePayload};
pub use quality::{classify, Classification, QualityLabel};
pub use review::{review_move, MoveReview};
pub use rules::{Rules, Side, Standard};
pub use search::{Search, SearchBudget, SearchRequest, SearchResponse};
pub use session::{PuzzleSession, Step, StepError};

/// Re-export so downstream crates use the same chess types
pub use shakmaty;
