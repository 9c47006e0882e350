//! Fixed linear map from encoder space (384) to judge space (512).
//!
//! The matrix is drawn row-major from a ChaCha8 stream, each entry uniform in
//! `[-1, 1)` and scaled by `1 / sqrt(EMBED_DIM)`. Seed, generator and draw
//! order together define the matrix; changing any of them changes every score.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

pub const EMBED_DIM: usize = 384;
pub const JUDGE_DIM: usize = 512;
pub const PROJECTION_SEED: u64 = 42;

#[derive(Debug, Clone)]
pub struct Projection {
    seed: u64,
    /// Row-major, `EMBED_DIM` rows of `JUDGE_DIM` columns.
    matrix: Vec<f32>,
}

impl Projection {
    /// The projection every process must agree on.
    pub fn standard() -> Self {
        Self::seeded(PROJECTION_SEED)
    }

    pub fn seeded(seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let scale = 1.0 / (EMBED_DIM as f32).sqrt();
        let matrix = (0..EMBED_DIM * JUDGE_DIM)
            .map(|_| rng.gen_range(-1.0_f32..1.0_f32) * scale)
            .collect();
        Self { seed, matrix }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Compute `e · M`.
    pub fn project(&self, embedding: &[f32]) -> CoreResult<Vec<f32>> {
        if embedding.len() != EMBED_DIM {
            return Err(CoreError::shape("projection", EMBED_DIM, embedding.len()));
        }

        let mut out = vec![0.0_f32; JUDGE_DIM];
        for (i, &x) in embedding.iter().enumerate() {
            let row = &self.matrix[i * JUDGE_DIM..(i + 1) * JUDGE_DIM];
            for (o, &w) in out.iter_mut().zip(row) {
                *o += x * w;
            }
        }
        Ok(out)
    }

    /// sha256 over the little-endian matrix bytes, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for v in &self.matrix {
            hasher.update(v.to_le_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Vec<f32> {
        (0..EMBED_DIM).map(|i| (i as f32 / EMBED_DIM as f32) - 0.5).collect()
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let a = Projection::standard().project(&ramp()).unwrap();
        let b = Projection::seeded(PROJECTION_SEED).project(&ramp()).unwrap();
        assert_eq!(a.len(), JUDGE_DIM);
        let a_bits: Vec<u32> = a.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u32> = b.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
        assert_eq!(
            Projection::standard().fingerprint(),
            Projection::seeded(PROJECTION_SEED).fingerprint()
        );
    }

    #[test]
    fn different_seed_changes_matrix() {
        assert_ne!(
            Projection::seeded(1).fingerprint(),
            Projection::seeded(2).fingerprint()
        );
    }

    #[test]
    fn rejects_wrong_width() {
        let err = Projection::standard().project(&[0.0; 512]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InputShape {
                expected: 384,
                actual: 512,
                ..
            }
        ));
    }

    #[test]
    fn zero_maps_to_zero() {
        let out = Projection::standard().project(&[0.0; EMBED_DIM]).unwrap();
        assert!(out.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn entries_are_bounded() {
        let p = Projection::standard();
        let bound = 1.0 / (EMBED_DIM as f32).sqrt();
        assert!(p.matrix.iter().all(|v| v.abs() <= bound));
    }
}
