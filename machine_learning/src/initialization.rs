use rand::Rng;
use rand_distr::{Distribution, Normal, Uniform};
use serde::{Deserialize, Serialize};

use crate::{MlErr, Result, params::ParamShape};

/// Decides the starting value of every parameter tensor.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    /// Every parameter, biases included, set to `value`.
    Constant { value: f32 },
    /// Every parameter, biases included, sampled from `[low, high)`.
    Uniform { low: f32, high: f32 },
    /// Weights sampled from `[-r, r)` with `r = sqrt(6 / (fan_in + fan_out))`, zero biases.
    #[default]
    XavierUniform,
    /// Weights sampled from `N(0, sqrt(2 / fan_in))`, zero biases.
    KaimingNormal,
}

impl Initializer {
    /// Fills a single parameter tensor.
    ///
    /// # Arguments
    /// * `shape` - The shape of the tensor being filled.
    /// * `out` - The tensor's values.
    /// * `rng` - A random number generator.
    ///
    /// # Returns
    /// An error if the resulting distribution is invalid.
    pub fn fill<R: Rng>(&self, shape: ParamShape, out: &mut [f32], rng: &mut R) -> Result<()> {
        match (*self, shape) {
            (Initializer::Constant { value }, _) => out.fill(value),
            (Initializer::Uniform { low, high }, _) => {
                let dist = Uniform::new(low, high)
                    .map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;
                sample_into(out, dist, rng);
            }
            (Initializer::XavierUniform | Initializer::KaimingNormal, ParamShape::Bias { .. }) => {
                out.fill(0.)
            }
            (Initializer::XavierUniform, ParamShape::Weight { rows, cols }) => {
                let range = (6. / (rows + cols) as f32).sqrt();
                let dist = Uniform::new(-range, range)
                    .map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;
                sample_into(out, dist, rng);
            }
            (Initializer::KaimingNormal, ParamShape::Weight { rows, .. }) => {
                let std_dev = (2. / rows as f32).sqrt();
                let dist = Normal::new(0., std_dev)
                    .map_err(|e| MlErr::InvalidDistribution(e.to_string()))?;
                sample_into(out, dist, rng);
            }
        }

        Ok(())
    }
}

fn sample_into<R, D>(out: &mut [f32], dist: D, rng: &mut R)
where
    R: Rng,
    D: Distribution<f32>,
{
    out.iter_mut().for_each(|v| *v = dist.sample(rng));
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn constant_fills_everything() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut out = [0.; 4];

        Initializer::Constant { value: 0.5 }
            .fill(ParamShape::Bias { len: 4 }, &mut out, &mut rng)
            .unwrap();

        assert_eq!(out, [0.5; 4]);
    }

    #[test]
    fn xavier_stays_inside_its_range_and_zeroes_biases() {
        let mut rng = StdRng::seed_from_u64(42);
        let shape = ParamShape::Weight { rows: 4, cols: 2 };
        let mut w = [0.; 8];
        let mut b = [1.; 2];

        Initializer::XavierUniform.fill(shape, &mut w, &mut rng).unwrap();
        Initializer::XavierUniform
            .fill(ParamShape::Bias { len: 2 }, &mut b, &mut rng)
            .unwrap();

        let range = 1.0f32;
        assert!(w.iter().all(|v| (-range..range).contains(v)));
        assert!(w.iter().any(|&v| v != 0.));
        assert_eq!(b, [0.; 2]);
    }

    #[test]
    fn same_seed_same_values() {
        let shape = ParamShape::Weight { rows: 3, cols: 3 };
        let mut a = [0.; 9];
        let mut b = [0.; 9];

        Initializer::KaimingNormal
            .fill(shape, &mut a, &mut StdRng::seed_from_u64(7))
            .unwrap();
        Initializer::KaimingNormal
            .fill(shape, &mut b, &mut StdRng::seed_from_u64(7))
            .unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn empty_uniform_range_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut out = [0.; 2];

        let err = Initializer::Uniform { low: 1., high: 1. }
            .fill(ParamShape::Bias { len: 2 }, &mut out, &mut rng)
            .unwrap_err();

        assert!(matches!(err, MlErr::InvalidDistribution(_)));
    }
}
