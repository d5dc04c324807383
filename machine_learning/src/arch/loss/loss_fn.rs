use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::{MlErr, Result, arch::Model, params::ParamStore};

/// Measures how far a model's output is from the expected class labels.
pub trait LossFn {
    /// Computes the scalar loss.
    ///
    /// # Arguments
    /// * `y_pred` - The `(batch, classes)` model output.
    /// * `y` - One class index per row.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32>;

    /// Computes the derivative of the loss with respect to `y_pred`.
    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>>;

    /// Evaluates the loss, keeping its derivative around for a later `Loss::backward`.
    fn evaluate(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Loss> {
        let value = self.loss(y_pred, y)?;
        let delta = self.loss_prime(y_pred, y)?;
        Ok(Loss::new(value, delta))
    }
}

/// An evaluated loss, able to propagate itself back through the model that produced it.
#[derive(Debug, Clone)]
pub struct Loss {
    value: f32,
    delta: Option<Array2<f32>>,
}

impl Loss {
    /// Creates a new `Loss`.
    ///
    /// # Arguments
    /// * `value` - The scalar loss.
    /// * `delta` - The derivative of the loss with respect to the model output.
    pub fn new(value: f32, delta: Array2<f32>) -> Self {
        Self {
            value,
            delta: Some(delta),
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Populates the gradient of every parameter of `model` in `params`.
    ///
    /// The output derivative is consumed: calling it a second time fails.
    pub fn backward<M>(&mut self, model: &mut M, params: &mut ParamStore) -> Result<()>
    where
        M: Model + ?Sized,
    {
        let d = self
            .delta
            .take()
            .ok_or(MlErr::UninitializedGradient { what: "loss" })?;

        model.backward(params, d)
    }
}

/// Encodes class labels as rows of a `(labels, classes)` matrix.
///
/// # Returns
/// An error if a label is not lower than `classes`.
pub fn one_hot(y: ArrayView1<usize>, classes: usize) -> Result<Array2<f32>> {
    let mut encoded = Array2::zeros((y.len(), classes));

    for (i, &label) in y.iter().enumerate() {
        if label >= classes {
            return Err(MlErr::InvalidLabel { label, classes });
        }

        encoded[[i, label]] = 1.;
    }

    Ok(encoded)
}

/// Checks that there's exactly one label per output row.
pub(super) fn check_rows(y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<()> {
    if y_pred.nrows() != y.len() {
        return Err(MlErr::ShapeMismatch {
            what: "loss labels",
            got: (y.len(), y_pred.ncols()),
            expected: y_pred.dim(),
        });
    }

    Ok(())
}
