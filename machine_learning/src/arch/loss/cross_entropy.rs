use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use super::{LossFn, loss_fn::check_rows, one_hot};
use crate::{Result, arch::layers::softmax};

/// Softmax followed by the negative log likelihood of the expected class, averaged over the
/// rows. Takes raw scores (logits), so models used with it should not end in a softmax layer.
#[derive(Debug, Default, Clone, Copy)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        check_rows(y_pred, y)?;
        let y = one_hot(y, y_pred.ncols())?;

        let mut total = 0.;
        for (logits, target) in y_pred.axis_iter(Axis(0)).zip(y.axis_iter(Axis(0))) {
            let max = logits.fold(f32::NEG_INFINITY, |m, &v| m.max(v));
            let log_sum = logits.mapv(|v| (v - max).exp()).sum().ln() + max;
            total += log_sum - logits.dot(&target);
        }

        Ok(total / y_pred.nrows().max(1) as f32)
    }

    fn loss_prime(&self, y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<Array2<f32>> {
        check_rows(y_pred, y)?;
        let y = one_hot(y, y_pred.ncols())?;

        Ok((softmax(y_pred) - &y) / y_pred.nrows().max(1) as f32)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn uniform_logits_give_log_of_classes() {
        let y_pred: Array2<f32> = Array2::zeros((2, 4));
        let y = array![0, 3];

        let loss = CrossEntropy.loss(y_pred.view(), y.view()).unwrap();
        assert_abs_diff_eq!(loss, 4f32.ln(), epsilon = 1e-6);
    }

    #[test]
    fn large_logits_stay_finite() {
        let y_pred: Array2<f32> = array![[1000., -1000.]];
        let y = array![1];

        let loss = CrossEntropy.loss(y_pred.view(), y.view()).unwrap();
        assert_abs_diff_eq!(loss, 2000., epsilon = 1e-2);
    }

    #[test]
    fn derivative_matches_finite_differences() {
        let y_pred: Array2<f32> = array![[0.3, -1.2, 0.8], [2., 0.1, -0.5]];
        let y = array![2, 0];

        let d = CrossEntropy.loss_prime(y_pred.view(), y.view()).unwrap();

        let h = 1e-2;
        for i in 0..2 {
            for j in 0..3 {
                let mut plus = y_pred.clone();
                let mut minus = y_pred.clone();
                plus[[i, j]] += h;
                minus[[i, j]] -= h;
                let numeric = (CrossEntropy.loss(plus.view(), y.view()).unwrap()
                    - CrossEntropy.loss(minus.view(), y.view()).unwrap())
                    / (2. * h);
                assert_abs_diff_eq!(d[[i, j]], numeric, epsilon = 1e-3);
            }
        }
    }
}
