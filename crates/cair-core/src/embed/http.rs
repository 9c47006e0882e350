use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::Embedder;

/// Client for an external encoder service.
///
/// Sends `{"text": ..., "model": ...}` and accepts either `{"embedding": [...]}`
/// or the OpenAI-style `{"data": [{"embedding": [...]}]}`.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    pub url: String,
    pub model: String,
    client: reqwest::Client,
}

impl HttpEmbedder {
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to create embedder HTTP client")?;
        Ok(Self {
            url: url.into(),
            model: model.into(),
            client,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let body = json!({ "text": text, "model": self.model });

        let resp = self.client.post(&self.url).json(&body).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            anyhow::bail!("embedder error (status {}): {}", status, error_text);
        }

        let json: serde_json::Value = resp.json().await?;
        let vec = json
            .get("embedding")
            .or_else(|| json.pointer("/data/0/embedding"))
            .and_then(|v| v.as_array())
            .ok_or_else(|| anyhow::anyhow!("embedder response missing embedding field"))?;

        vec.iter()
            .map(|x| {
                x.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| anyhow::anyhow!("embedding contains a non-numeric value"))
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "http"
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}
