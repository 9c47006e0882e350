//! On-disk judge weights (`cair-judge-v1`).
//!
//! ```json
//! {
//!   "format": "cair-judge-v1",
//!   "input_dim": 512,
//!   "layers": [
//!     { "inputs": 512, "outputs": 256, "weights": [...], "bias": [...] }
//!   ]
//! }
//! ```
//!
//! `weights` is row-major with one row of `inputs` values per output unit.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::projection::JUDGE_DIM;

pub const WEIGHTS_FORMAT: &str = "cair-judge-v1";

/// Hidden layer widths of the reference network.
pub const HIDDEN_WIDTHS: [usize; 3] = [256, 128, 64];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights {
    pub inputs: usize,
    pub outputs: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsFile {
    pub format: String,
    pub input_dim: usize,
    pub layers: Vec<LayerWeights>,
}

impl WeightsFile {
    /// Xavier-uniform weights and zero biases drawn from a ChaCha8 stream.
    pub fn seeded(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut widths = vec![JUDGE_DIM];
        widths.extend_from_slice(&HIDDEN_WIDTHS);
        widths.push(1);

        let layers = widths
            .windows(2)
            .map(|pair| {
                let (inputs, outputs) = (pair[0], pair[1]);
                let limit = (6.0 / (inputs + outputs) as f32).sqrt();
                LayerWeights {
                    inputs,
                    outputs,
                    weights: (0..inputs * outputs)
                        .map(|_| rng.gen_range(-limit..limit))
                        .collect(),
                    bias: vec![0.0; outputs],
                }
            })
            .collect();

        Self {
            format: WEIGHTS_FORMAT.to_string(),
            input_dim: JUDGE_DIM,
            layers,
        }
    }

    /// Check format tag, widths and layer chaining.
    pub fn validate(&self) -> Result<(), String> {
        if self.format != WEIGHTS_FORMAT {
            return Err(format!(
                "unsupported format '{}', expected '{}'",
                self.format, WEIGHTS_FORMAT
            ));
        }
        if self.input_dim != JUDGE_DIM {
            return Err(format!(
                "input_dim is {}, judge consumes {}",
                self.input_dim, JUDGE_DIM
            ));
        }
        if self.layers.is_empty() {
            return Err("no layers".to_string());
        }

        let mut width = self.input_dim;
        for (idx, layer) in self.layers.iter().enumerate() {
            if layer.inputs != width {
                return Err(format!(
                    "layer {} takes {} inputs but previous width is {}",
                    idx, layer.inputs, width
                ));
            }
            if layer.outputs == 0 {
                return Err(format!("layer {} has no outputs", idx));
            }
            if layer.weights.len() != layer.inputs * layer.outputs {
                return Err(format!(
                    "layer {} has {} weights, expected {}",
                    idx,
                    layer.weights.len(),
                    layer.inputs * layer.outputs
                ));
            }
            if layer.bias.len() != layer.outputs {
                return Err(format!(
                    "layer {} has {} biases, expected {}",
                    idx,
                    layer.bias.len(),
                    layer.outputs
                ));
            }
            if layer.weights.iter().chain(&layer.bias).any(|v| !v.is_finite()) {
                return Err(format!("layer {} contains non-finite values", idx));
            }
            width = layer.outputs;
        }

        if width != 1 {
            return Err(format!("final layer must have 1 output, has {}", width));
        }
        Ok(())
    }

    pub fn read(path: &Path) -> CoreResult<Self> {
        let raw = match std::fs::read(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::NotReady {
                    reason: format!("weights file not found: {}", path.display()),
                });
            }
            Err(source) => {
                return Err(CoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let file: Self =
            serde_json::from_slice(&raw).map_err(|e| CoreError::WeightsInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        file.validate()
            .map_err(|reason| CoreError::WeightsInvalid {
                path: path.to_path_buf(),
                reason,
            })?;
        Ok(file)
    }

    pub fn write(&self, path: &Path) -> CoreResult<()> {
        let io_err = |source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_vec(self).map_err(|e| CoreError::WeightsInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(io_err)
    }
}
