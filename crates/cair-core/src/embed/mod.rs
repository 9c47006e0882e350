//! Text encoders producing 384-wide embeddings.
//!
//! The pipeline only requires that an embedder is deterministic for a given
//! text; width is checked downstream by the projection.

pub mod hashing;
pub mod http;

use async_trait::async_trait;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    fn name(&self) -> &'static str;

    fn model_id(&self) -> String;
}
