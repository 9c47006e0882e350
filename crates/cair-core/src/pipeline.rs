//! `Route(Judge(Project(Embed(Q))))` for a single query.

use std::sync::Arc;

use tracing::debug;

use crate::embed::{Embedder, HashingEmbedder};
use crate::error::{CoreError, CoreResult};
use crate::judge::Judge;
use crate::model::{Assessment, Query};
use crate::projection::Projection;

/// Stages are shared read-only across requests; each call runs them in order.
#[derive(Clone)]
pub struct Pipeline {
    embedder: Arc<dyn Embedder>,
    projection: Arc<Projection>,
    judge: Judge,
}

impl Pipeline {
    pub fn new(embedder: Arc<dyn Embedder>, projection: Arc<Projection>, judge: Judge) -> Self {
        Self {
            embedder,
            projection,
            judge,
        }
    }

    /// Hashing embedder plus the standard projection.
    pub fn with_judge(judge: Judge) -> Self {
        Self::new(
            Arc::new(HashingEmbedder::new()),
            Arc::new(Projection::standard()),
            judge,
        )
    }

    pub fn judge(&self) -> &Judge {
        &self.judge
    }

    pub fn embedder_name(&self) -> &'static str {
        self.embedder.name()
    }

    pub async fn assess(&self, query: &Query) -> CoreResult<Assessment> {
        // Fail before the embedder call when there is nothing to score with.
        self.judge.model()?;

        let embedding = self
            .embedder
            .embed(query.text())
            .await
            .map_err(|e| CoreError::Embed {
                provider: self.embedder.name().to_string(),
                message: e.to_string(),
            })?;

        self.assess_embedding(&embedding)
    }

    /// Synchronous tail of the pipeline for an already embedded query.
    pub fn assess_embedding(&self, embedding: &[f32]) -> CoreResult<Assessment> {
        let projected = self.projection.project(embedding)?;
        self.assess_projected(&projected)
    }

    /// Judge and route a 512-wide vector.
    pub fn assess_projected(&self, projected: &[f32]) -> CoreResult<Assessment> {
        let score = self.judge.score(projected)?;
        let assessment = Assessment::from_score(score);
        debug!(
            score = assessment.score,
            grade = %assessment.grade,
            destination = %assessment.destination,
            "assessed query"
        );
        Ok(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::JudgeModel;
    use crate::model::Destination;
    use crate::projection::{EMBED_DIM, JUDGE_DIM};
    use async_trait::async_trait;

    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &'static str {
            "fixed"
        }
        fn model_id(&self) -> String {
            "fixed".into()
        }
    }

    fn pipeline(seed: u64) -> Pipeline {
        Pipeline::with_judge(Judge::new(JudgeModel::seeded(seed).unwrap()))
    }

    #[tokio::test]
    async fn assess_is_deterministic() {
        let q = Query::new("Teach me safe programming practices", None, None).unwrap();
        let a = pipeline(9).assess(&q).await.unwrap();
        let b = pipeline(9).assess(&q).await.unwrap();
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.destination, b.destination);
        assert!(matches!(
            a.destination,
            Destination::Premium | Destination::Local | Destination::Sandbox
        ));
    }

    #[tokio::test]
    async fn unloaded_judge_fails_before_embedding() {
        let p = Pipeline::with_judge(Judge::unloaded());
        let q = Query::new("anything", None, None).unwrap();
        assert!(matches!(
            p.assess(&q).await,
            Err(CoreError::NotReady { .. })
        ));
    }

    #[tokio::test]
    async fn wrong_embedder_width_is_shape_error() {
        let p = Pipeline::new(
            Arc::new(FixedEmbedder(vec![0.1; JUDGE_DIM])),
            Arc::new(Projection::standard()),
            Judge::new(JudgeModel::seeded(1).unwrap()),
        );
        let q = Query::new("anything", None, None).unwrap();
        let err = p.assess(&q).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::InputShape {
                stage: "projection",
                ..
            }
        ));
    }

    #[test]
    fn grade_matches_score() {
        let p = pipeline(4);
        let a = p.assess_embedding(&[0.05; EMBED_DIM]).unwrap();
        assert_eq!(a.grade, crate::model::Grade::from_score(a.score));
        assert!(a.score.is_finite());
    }
}
