use crate::{error::Result, params::ParamStore};

/// Updates a model's parameters from their accumulated gradient.
pub trait Optimizer {
    /// Resets the gradient accumulator of `params`. Must be called before every backward pass,
    /// gradients add up otherwise.
    fn zero_grad(&mut self, params: &mut ParamStore) {
        params.zero_grad();
    }

    /// Updates the parameters in place, following the optimizer's learning rule.
    ///
    /// # Returns
    /// An error if no gradient was populated since the last `zero_grad`.
    fn step(&mut self, params: &mut ParamStore) -> Result<()>;
}
