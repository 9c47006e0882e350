//! Judge: maps a 512-wide projected embedding to a score in [0, 100].
//!
//! Dense feed-forward network with ReLU hidden layers, a logistic on the final
//! scalar, times 100. Inference is a pure function of the input and the
//! loaded weights.

pub mod weights;

use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};
use crate::projection::JUDGE_DIM;
use crate::routing::{clamp_score, SCORE_MAX};

pub use weights::{LayerWeights, WeightsFile, HIDDEN_WIDTHS, WEIGHTS_FORMAT};

/// A validated, immutable judge network.
#[derive(Debug)]
pub struct JudgeModel {
    layers: Vec<LayerWeights>,
    fingerprint: String,
}

impl JudgeModel {
    pub fn from_file(file: WeightsFile) -> Result<Self, String> {
        file.validate()?;
        let encoded = serde_json::to_vec(&file).map_err(|e| e.to_string())?;
        let fingerprint = format!("sha256:{}", hex::encode(Sha256::digest(&encoded)));
        Ok(Self {
            layers: file.layers,
            fingerprint,
        })
    }

    pub fn load(path: &Path) -> CoreResult<Self> {
        let file = WeightsFile::read(path)?;
        Self::from_file(file).map_err(|reason| CoreError::WeightsInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// A model with freshly generated weights, not backed by any file.
    pub fn seeded(seed: u64) -> CoreResult<Self> {
        Self::from_file(WeightsFile::seeded(seed)).map_err(|reason| CoreError::NotReady { reason })
    }

    /// `sha256:<hex>` of the serialized weights.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn score(&self, embedding: &[f32]) -> CoreResult<f64> {
        if embedding.len() != JUDGE_DIM {
            return Err(CoreError::shape("judge", JUDGE_DIM, embedding.len()));
        }
        Ok(clamp_score(SCORE_MAX * sigmoid(self.logit(embedding))))
    }

    fn logit(&self, embedding: &[f32]) -> f64 {
        let last = self.layers.len() - 1;
        let mut activation = embedding.to_vec();

        for (idx, layer) in self.layers.iter().enumerate() {
            let mut next = layer.bias.clone();
            for (unit, out) in next.iter_mut().enumerate() {
                let row = &layer.weights[unit * layer.inputs..(unit + 1) * layer.inputs];
                *out += row
                    .iter()
                    .zip(&activation)
                    .map(|(w, a)| w * a)
                    .sum::<f32>();
            }
            if idx != last {
                for v in &mut next {
                    *v = v.max(0.0);
                }
            }
            activation = next;
        }

        f64::from(activation[0])
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Shared handle; absent weights surface as `NotReady` on every call.
#[derive(Debug, Clone, Default)]
pub struct Judge {
    model: Option<Arc<JudgeModel>>,
}

impl Judge {
    pub fn new(model: JudgeModel) -> Self {
        Self {
            model: Some(Arc::new(model)),
        }
    }

    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> CoreResult<&JudgeModel> {
        self.model.as_deref().ok_or_else(|| CoreError::NotReady {
            reason: "no weights loaded".to_string(),
        })
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.model.as_deref().map(JudgeModel::fingerprint)
    }

    pub fn score(&self, embedding: &[f32]) -> CoreResult<f64> {
        self.model()?.score(embedding)
    }
}
