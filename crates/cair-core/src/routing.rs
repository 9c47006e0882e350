//! Score thresholds: grades, tier routing and validity.
//!
//! All boundaries are closed on the lower end, so a score sits in exactly
//! one band.

use crate::model::{Destination, Grade};

pub const GRADE_A: f64 = 90.0;
pub const GRADE_B: f64 = 80.0;
pub const GRADE_C: f64 = 70.0;
pub const GRADE_D: f64 = 60.0;

pub const PREMIUM_MIN: f64 = 90.0;
pub const LOCAL_MIN: f64 = 70.0;

/// Minimum judge score for a query to count as valid.
pub const VALID_MIN: f64 = 70.0;

pub const SCORE_MAX: f64 = 100.0;

/// Clamp into [0, 100]; NaN maps to 0 and infinities to the nearest bound.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        tracing::warn!("clamp_score: NaN score, treating as 0.0");
        return 0.0;
    }
    score.clamp(0.0, SCORE_MAX)
}

pub fn grade(score: f64) -> Grade {
    // NaN fails every comparison and falls through to F.
    if score >= GRADE_A {
        Grade::A
    } else if score >= GRADE_B {
        Grade::B
    } else if score >= GRADE_C {
        Grade::C
    } else if score >= GRADE_D {
        Grade::D
    } else {
        Grade::F
    }
}

pub fn route(score: f64) -> Destination {
    if score >= PREMIUM_MIN {
        Destination::Premium
    } else if score >= LOCAL_MIN {
        Destination::Local
    } else {
        Destination::Sandbox
    }
}

pub fn is_valid(score: f64) -> bool {
    score >= VALID_MIN
}
