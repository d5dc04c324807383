use ndarray::{Array2, ArrayView2, Axis};

use crate::{MlErr, Result};

/// Row-wise normalized exponential. It has no parameters.
#[derive(Debug, Clone, Default)]
pub struct Softmax {
    s: Option<Array2<f32>>,
}

impl Softmax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward(&mut self, x: ArrayView2<f32>) -> Array2<f32> {
        let s = softmax(x);
        self.s = Some(s.clone());
        s
    }

    /// Multiplies `d` by the softmax jacobian of each row, `s ⊙ (d − Σ d ⊙ s)`.
    pub fn backward(&mut self, mut d: Array2<f32>) -> Result<Array2<f32>> {
        let s = self
            .s
            .as_ref()
            .ok_or(MlErr::UninitializedGradient { what: "softmax layer" })?;

        if d.dim() != s.dim() {
            return Err(MlErr::ShapeMismatch {
                what: "softmax delta",
                got: d.dim(),
                expected: s.dim(),
            });
        }

        for (mut d_row, s_row) in d.axis_iter_mut(Axis(0)).zip(s.axis_iter(Axis(0))) {
            let dot = d_row.dot(&s_row);
            d_row.zip_mut_with(&s_row, |d, &s| *d = s * (*d - dot));
        }

        Ok(d)
    }
}

/// Computes the softmax of every row of `x`, shifted by the row maximum for stability.
pub fn softmax(x: ArrayView2<f32>) -> Array2<f32> {
    let mut s = x.to_owned();

    for mut row in s.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row /= sum;
    }

    s
}
