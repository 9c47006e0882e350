//! Scoring and routing core of the Constitutional AI Router.
//!
//! A query flows through four stages, strictly in order:
//!
//! - **Embed**: text to a 384-wide vector ([`embed`])
//! - **Project**: fixed seeded 384×512 linear map ([`projection`])
//! - **Judge**: feed-forward scorer, 512 → score in [0, 100] ([`judge`])
//! - **Route**: score to PREMIUM / LOCAL / SANDBOX ([`routing`])
//!
//! # Quick Start
//!
//! ```no_run
//! use cair_core::{Judge, JudgeModel, Pipeline, Query};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let judge = Judge::new(JudgeModel::load("judge.json".as_ref())?);
//! let pipeline = Pipeline::with_judge(judge);
//! let query = Query::new("Explain constitutional AI principles", None, None)?;
//! let assessment = pipeline.assess(&query).await?;
//! println!("{} -> {}", assessment.score, assessment.destination);
//! # Ok(())
//! # }
//! ```

pub mod constitution;
pub mod embed;
pub mod error;
pub mod fallback;
pub mod judge;
pub mod model;
pub mod pipeline;
pub mod projection;
pub mod routing;

pub use constitution::{Constitution, CONSTITUTION_RULES, CONSTITUTION_SOURCE};
pub use embed::{Embedder, HashingEmbedder, HttpEmbedder};
pub use error::{CoreError, CoreResult, ErrorKind};
pub use fallback::basic_decision;
pub use judge::{Judge, JudgeModel, WeightsFile};
pub use model::{Assessment, Decision, Destination, Grade, Query, ScoreScale, Via};
pub use pipeline::Pipeline;
pub use projection::{Projection, EMBED_DIM, JUDGE_DIM, PROJECTION_SEED};
