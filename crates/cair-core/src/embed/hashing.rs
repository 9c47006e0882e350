use async_trait::async_trait;
use sha2::{Digest, Sha256};

use super::Embedder;
use crate::projection::EMBED_DIM;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Signed feature hashing of words and character trigrams, L2-normalized.
///
/// Needs no model files, so it is the default encoder for local runs and
/// tests. Case-insensitive; punctuation only separates tokens.
#[derive(Debug, Clone, Default)]
pub struct HashingEmbedder;

impl HashingEmbedder {
    pub fn new() -> Self {
        Self
    }

    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; EMBED_DIM];
        let lowered = text.to_lowercase();

        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            accumulate(&mut v, &format!("w:{token}"), WORD_WEIGHT);

            let padded: Vec<char> = format!("^{token}$").chars().collect();
            for tri in padded.windows(3) {
                let tri: String = tri.iter().collect();
                accumulate(&mut v, &format!("t:{tri}"), TRIGRAM_WEIGHT);
            }
        }

        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

fn accumulate(v: &mut [f32], feature: &str, weight: f32) {
    let digest = Sha256::digest(feature.as_bytes());
    let bucket = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]) as usize;
    let sign = if digest[4] & 1 == 0 { 1.0 } else { -1.0 };
    v[bucket % EMBED_DIM] += sign * weight;
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn name(&self) -> &'static str {
        "hashing"
    }

    fn model_id(&self) -> String {
        format!("hashing-{EMBED_DIM}")
    }
}
