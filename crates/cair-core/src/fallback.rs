//! Basic scoring rule used when the judge cannot be reached.
//!
//! Scores here are on the 0-1 scale (`ScoreScale::Unit`). Grade and
//! destination are still derived from the reported number, so a fallback
//! decision always grades F and routes to SANDBOX.

use crate::model::{Decision, Grade, ScoreScale, Via};
use crate::routing;

/// Content longer than this many characters passes the basic rule.
pub const MIN_VALID_CHARS: usize = 10;
pub const VALID_SCORE: f64 = 0.8;
pub const INVALID_SCORE: f64 = 0.3;

/// Apply the basic rule. Infallible.
pub fn basic_decision(content: &str, via: Via) -> Decision {
    let valid = content.chars().count() > MIN_VALID_CHARS;
    let score = if valid { VALID_SCORE } else { INVALID_SCORE };
    Decision {
        score,
        grade: Grade::from_score(score),
        destination: routing::route(score),
        valid,
        via,
        scale: ScoreScale::Unit,
    }
}
