//! Move quality classification. Pure functions only, the caller obtains the
//! before/after samples.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::eval::EvaluationSample;

/// Classification thresholds (centipawn change from the mover's perspective)
const THRESHOLD_GOOD: i32 = -10;
const THRESHOLD_INACCURACY: i32 = -50;
const THRESHOLD_MISTAKE: i32 = -150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLabel {
    Best,
    Good,
    Inaccuracy,
    Mistake,
    Blunder,
    Illegal,
    Unknown,
}

impl QualityLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            QualityLabel::Best => "best",
            QualityLabel::Good => "good",
            QualityLabel::Inaccuracy => "inaccuracy",
            QualityLabel::Mistake => "mistake",
            QualityLabel::Blunder => "blunder",
            QualityLabel::Illegal => "illegal",
            QualityLabel::Unknown => "unknown",
        }
    }

    /// Label for an evaluation change in pawns (mover's perspective).
    /// The recommended move is always `Best`.
    pub fn from_eval_change(eval_change: f64, is_recommended: bool) -> Self {
        if is_recommended {
            QualityLabel::Best
        } else if eval_change >= -0.1 {
            QualityLabel::Good
        } else if eval_change >= -0.5 {
            QualityLabel::Inaccuracy
        } else if eval_change >= -1.5 {
            QualityLabel::Mistake
        } else {
            QualityLabel::Blunder
        }
    }

    fn from_cp_change(cp_change: i32, is_recommended: bool) -> Self {
        if is_recommended {
            QualityLabel::Best
        } else if cp_change >= THRESHOLD_GOOD {
            QualityLabel::Good
        } else if cp_change >= THRESHOLD_INACCURACY {
            QualityLabel::Inaccuracy
        } else if cp_change >= THRESHOLD_MISTAKE {
            QualityLabel::Mistake
        } else {
            QualityLabel::Blunder
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: QualityLabel,
    /// Pawns gained (positive) or lost (negative) by the mover; 0 when not computed
    pub eval_change: f64,
}

impl Classification {
    fn uncomputed(label: QualityLabel) -> Self {
        Self {
            label,
            eval_change: 0.0,
        }
    }
}

/// Change in evaluation caused by a move, in centipawns from the mover's side.
///
/// `before` is relative to the mover (on move before the move); `after` is
/// relative to the opponent (on move after it), so it is negated after mates
/// are saturated.
pub fn eval_change_cp(before: &EvaluationSample, after: &EvaluationSample) -> i32 {
    let before_cp = before.score.to_cp();
    let after_cp = -after.score.to_cp();
    after_cp - before_cp
}

/// Classify a single played move.
///
/// First match wins: no search behind either sample → `Unknown`; move not
/// legal → `Illegal`; move equals the recommendation → `Best`; otherwise the
/// evaluation change picks the tier.
pub fn classify(
    before: &EvaluationSample,
    after: &EvaluationSample,
    legal: bool,
    is_recommended: bool,
) -> Classification {
    if before.degraded || after.degraded {
        return Classification::uncomputed(QualityLabel::Unknown);
    }
    if !legal {
        return Classification::uncomputed(QualityLabel::Illegal);
    }

    let cp_change = eval_change_cp(before, after);
    Classification {
        label: QualityLabel::from_cp_change(cp_change, is_recommended),
        eval_change: f64::from(cp_change) / 100.0,
    }
}
