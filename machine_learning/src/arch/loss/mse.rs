use ndarray::{Array2, ArrayView1, ArrayView2};

use super::{LossFn, loss_fn::check_rows, one_hot};
use crate::Result;

/// Mean squared error loss function, against the one-hot encoding of the labels.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mse;

impl Mse {
    /// Returns a new `Mse`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for Mse {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        check_rows(y_pred, y)?;
        let y = one_hot(y, y_pred.ncols())?;

        Ok((&y_pred - &y)
            .mapv(|x| x.powi(2))
            .mean()
            .unwrap_or_default())
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>> {
        check_rows(y_pred, y)?;
        let y = one_hot(y, y_pred.ncols())?;

        Ok((&y_pred - &y) * (2.0 / y_pred.len() as f32))
    }
}
