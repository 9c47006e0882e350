//! Request-scoped records: queries, grades, destinations and decisions.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::routing;

pub const DEFAULT_AGENT: &str = "anonymous";

/// A single natural-language query. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    text: String,
    agent: String,
    context: String,
}

impl Query {
    /// Build a query; rejects empty or whitespace-only text.
    pub fn new(
        text: impl Into<String>,
        agent: Option<String>,
        context: Option<String>,
    ) -> CoreResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(CoreError::EmptyQuery);
        }
        Ok(Self {
            text,
            agent: agent
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_AGENT.to_string()),
            context: context.unwrap_or_default(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn context(&self) -> &str {
        &self.context
    }
}

/// Letter grade derived from a 0-100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        routing::grade(score)
    }

    pub fn letter(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Lowest score that still earns this grade.
    pub fn min_score(&self) -> f64 {
        match self {
            Self::A => routing::GRADE_A,
            Self::B => routing::GRADE_B,
            Self::C => routing::GRADE_C,
            Self::D => routing::GRADE_D,
            Self::F => 0.0,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.letter())
    }
}

/// Downstream tier a query is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Destination {
    /// Highest-trust backend.
    Premium,
    /// Mid-trust local backend.
    Local,
    /// Isolated execution for low-trust queries.
    Sandbox,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Premium => "PREMIUM",
            Self::Local => "LOCAL",
            Self::Sandbox => "SANDBOX",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which code path produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Via {
    #[serde(rename = "judge")]
    Judge,
    #[serde(rename = "bridge-fallback")]
    BridgeFallback,
    #[serde(rename = "basic")]
    Basic,
}

impl Via {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Judge => "judge",
            Self::BridgeFallback => "bridge-fallback",
            Self::Basic => "basic",
        }
    }
}

/// Unit of `Decision::score`. Judge scores are 0-100, fallback scores 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreScale {
    #[serde(rename = "0-100")]
    Percent,
    #[serde(rename = "0-1")]
    Unit,
}

/// Output of the in-process pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub score: f64,
    pub grade: Grade,
    pub destination: Destination,
}

impl Assessment {
    pub fn from_score(score: f64) -> Self {
        let score = routing::clamp_score(score);
        Self {
            score,
            grade: Grade::from_score(score),
            destination: routing::route(score),
        }
    }

    pub fn valid(&self) -> bool {
        routing::is_valid(self.score)
    }
}

/// Full routing verdict returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub score: f64,
    pub grade: Grade,
    pub destination: Destination,
    pub valid: bool,
    pub via: Via,
    pub scale: ScoreScale,
}

impl Decision {
    /// Decision backed by a judge score on the 0-100 scale.
    pub fn from_judge(score: f64) -> Self {
        let assessment = Assessment::from_score(score);
        Self {
            score: assessment.score,
            grade: assessment.grade,
            destination: assessment.destination,
            valid: assessment.valid(),
            via: Via::Judge,
            scale: ScoreScale::Percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_rejects_blank_text() {
        assert!(matches!(
            Query::new("   ", None, None),
            Err(CoreError::EmptyQuery)
        ));
    }

    #[test]
    fn query_defaults_agent_and_context() {
        let q = Query::new("hello", Some(" ".into()), None).unwrap();
        assert_eq!(q.agent(), DEFAULT_AGENT);
        assert_eq!(q.context(), "");
    }

    #[test]
    fn decision_serializes_wire_tags() {
        let d = Decision::from_judge(92.0);
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["grade"], "A");
        assert_eq!(v["destination"], "PREMIUM");
        assert_eq!(v["via"], "judge");
        assert_eq!(v["scale"], "0-100");
        assert_eq!(v["valid"], true);
    }

    #[test]
    fn non_finite_judge_score_is_worst_case() {
        let d = Decision::from_judge(f64::NAN);
        assert_eq!(d.score, 0.0);
        assert_eq!(d.grade, Grade::F);
        assert_eq!(d.destination, Destination::Sandbox);
        assert!(!d.valid);
    }
}
