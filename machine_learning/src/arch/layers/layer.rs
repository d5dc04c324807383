use ndarray::{Array2, ArrayView2};

use super::{Dense, Softmax};
use crate::{MlErr, Result, arch::activations::ActFn, params::ParamShape};

/// A single step of a `Sequential` model.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
    Softmax(Softmax),
}

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    pub fn softmax() -> Self {
        Self::Softmax(Softmax::new())
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        match self {
            Self::Dense(l) => l.size(),
            Self::Softmax(_) => 0,
        }
    }

    pub fn param_shapes(&self) -> Vec<ParamShape> {
        match self {
            Self::Dense(l) => l.param_shapes().to_vec(),
            Self::Softmax(_) => Vec::new(),
        }
    }

    /// Returns the output width for an input of width `input`.
    ///
    /// # Returns
    /// An error if this layer can not take an input of that width.
    pub fn output_width(&self, input: usize) -> Result<usize> {
        match self {
            Self::Dense(l) if l.dim().0 == input => Ok(l.dim().1),
            Self::Dense(l) => Err(MlErr::SizeMismatch {
                what: "layer input width",
                got: input,
                expected: l.dim().0,
            }),
            Self::Softmax(_) => Ok(input),
        }
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.forward(params, x),
            Self::Softmax(l) => Ok(l.forward(x)),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Self::Dense(l) => l.backward(params, grad, d),
            Self::Softmax(l) => l.backward(d),
        }
    }
}
