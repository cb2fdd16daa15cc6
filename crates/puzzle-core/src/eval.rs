//! Engine evaluation types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pawn value used in place of a forced mate
pub const MATE_PAWNS: f64 = 100.0;

const MATE_CP: i32 = 10_000;

/// Engine score relative to the side to move.
///
/// Mate: positive N = side to move mates in N, negative N = side to move gets
/// mated in N, zero = side to move is already mated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    Centipawns(i32),
    Mate(i32),
}

impl Score {
    /// Centipawns with mates saturated to +/-100 pawns
    pub fn to_cp(self) -> i32 {
        match self {
            Score::Centipawns(cp) => cp,
            Score::Mate(n) if n > 0 => MATE_CP,
            Score::Mate(_) => -MATE_CP,
        }
    }

    pub fn pawns(self) -> f64 {
        f64::from(self.to_cp()) / 100.0
    }

    pub fn mate_in(self) -> Option<i32> {
        match self {
            Score::Mate(n) => Some(n),
            Score::Centipawns(_) => None,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "{:+.2}", f64::from(*cp) / 100.0),
            Score::Mate(n) if *n > 0 => write!(f, "Mate in {n}"),
            Score::Mate(n) => write!(f, "Mated in {}", n.abs()),
        }
    }
}

/// One search result as of the side to move, consumed immediately by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSample {
    pub score: Score,
    /// Recommended move in long form
    pub best_move: Option<String>,
    /// True when no search backed this sample (engine missing, crashed or timed out)
    pub degraded: bool,
}

impl EvaluationSample {
    pub fn new(score: Score, best_move: Option<String>) -> Self {
        Self {
            score,
            best_move,
            degraded: false,
        }
    }

    /// Neutral stand-in used when the search capability is unavailable
    pub fn neutral() -> Self {
        Self {
            score: Score::Centipawns(0),
            best_move: None,
            degraded: true,
        }
    }

    pub fn pawns(&self) -> f64 {
        self.score.pawns()
    }

    pub fn mate_in(&self) -> Option<i32> {
        self.score.mate_in()
    }
}

/// Human readable verdict for a score in pawns from White's point of view
pub fn describe_advantage(white_pawns: f64) -> &'static str {
    if white_pawns > 3.0 {
        "White is winning"
    } else if white_pawns > 1.0 {
        "White is better"
    } else if white_pawns > 0.3 {
        "White is slightly better"
    } else if white_pawns > -0.3 {
        "Equal position"
    } else if white_pawns > -1.0 {
        "Black is slightly better"
    } else if white_pawns > -3.0 {
        "Black is better"
    } else {
        "Black is winning"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_saturates() {
        assert_eq!(Score::Mate(3).pawns(), MATE_PAWNS);
        assert_eq!(Score::Mate(-2).pawns(), -MATE_PAWNS);
        // Side to move is already mated
        assert_eq!(Score::Mate(0).pawns(), -MATE_PAWNS);
        assert_eq!(Score::Centipawns(-35).pawns(), -0.35);
    }

    #[test]
    fn test_display() {
        assert_eq!(Score::Centipawns(35).to_string(), "+0.35");
        assert_eq!(Score::Centipawns(-120).to_string(), "-1.20");
        assert_eq!(Score::Mate(2).to_string(), "Mate in 2");
        assert_eq!(Score::Mate(-4).to_string(), "Mated in 4");
    }

    #[test]
    fn test_describe_advantage() {
        assert_eq!(describe_advantage(3.5), "White is winning");
        assert_eq!(describe_advantage(0.0), "Equal position");
        assert_eq!(describe_advantage(-0.5), "Black is slightly better");
        assert_eq!(describe_advantage(-3.0), "Black is winning");
    }

    #[test]
    fn test_neutral_sample() {
        let sample = EvaluationSample::neutral();
        assert!(sample.degraded);
        assert_eq!(sample.pawns(), 0.0);
        assert!(sample.best_move.is_none());
    }
}
