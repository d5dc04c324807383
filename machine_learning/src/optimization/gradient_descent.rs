use super::Optimizer;
use crate::{MlErr, Result, params::ParamStore};

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `step`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the gradient, with a length of `learning_rate`.
    fn step(&mut self, params: &mut ParamStore) -> Result<()> {
        if !params.has_grad() {
            return Err(MlErr::UninitializedGradient { what: "optimizer step" });
        }

        let lr = self.learning_rate;
        let (params, grad) = params.split_mut();

        for (w, g) in params.iter_mut().zip(grad) {
            *w -= lr * g;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamShape;

    #[test]
    fn steps_against_the_gradient() {
        let shapes = [ParamShape::Bias { len: 3 }];
        let mut params = ParamStore::from_vec(&shapes, vec![1., 2., 3.]).unwrap();
        params.back().take(3).unwrap().1.copy_from_slice(&[1., 0., -2.]);

        let mut optimizer = GradientDescent::new(0.5);
        optimizer.step(&mut params).unwrap();

        assert_eq!(params.as_slice(), [0.5, 2., 4.]);
    }

    #[test]
    fn step_without_gradient_fails() {
        let shapes = [ParamShape::Bias { len: 1 }];
        let mut params = ParamStore::zeros(&shapes);
        let mut optimizer = GradientDescent::new(0.1);

        optimizer.zero_grad(&mut params);
        let err = optimizer.step(&mut params).unwrap_err();

        assert!(matches!(err, MlErr::UninitializedGradient { .. }));
        assert_eq!(params.as_slice(), [0.]);
    }
}
