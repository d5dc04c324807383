use ndarray::{Array2, ArrayView2};

use crate::{
    error::Result,
    params::{ParamShape, ParamStore},
};

/// A differentiable function of its parameters and its input.
///
/// Models do not own their parameters, they read them from a `ParamStore` on `forward` and add
/// their gradient into the same store on `backward`.
pub trait Model {
    /// Returns the shape of every parameter tensor of the model, in order.
    fn param_shapes(&self) -> Vec<ParamShape>;

    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize {
        self.param_shapes().iter().map(ParamShape::len).sum()
    }

    /// Makes a forward pass through the model.
    ///
    /// Calling it twice with the same parameters and input yields the same output.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `x` - A `(batch, features)` input.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    fn forward(&mut self, params: &ParamStore, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Makes a backward pass through the model for the last forward pass, **adding** the
    /// gradient of the loss into `params`' gradient accumulator.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `d` - The derivative of the loss with respect to the last output.
    fn backward(&mut self, params: &mut ParamStore, d: Array2<f32>) -> Result<()>;
}
