use ndarray::{Array2, ArrayView2};

use super::{Model, layers::Layer};
use crate::{
    MlErr, Result,
    params::{ParamShape, ParamStore},
};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the output width for an input of width `input`.
    ///
    /// # Returns
    /// An error if two consecutive layers don't chain.
    pub fn output_width(&self, input: usize) -> Result<usize> {
        self.layers
            .iter()
            .try_fold(input, |width, layer| layer.output_width(width))
    }
}

impl Model for Sequential {
    fn param_shapes(&self) -> Vec<ParamShape> {
        self.layers.iter().flat_map(Layer::param_shapes).collect()
    }

    fn size(&self) -> usize {
        self.layers.iter().map(Layer::size).sum()
    }

    fn forward(&mut self, params: &ParamStore, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        params.check_len(self.size())?;

        let mut front = params.front();
        let mut layers = self.layers.iter_mut();

        let Some(first) = layers.next() else {
            return Ok(x.to_owned());
        };

        let mut y = first.forward(front.take(first.size())?, x)?;

        for layer in layers {
            y = layer.forward(front.take(layer.size())?, y.view())?;
        }

        Ok(y)
    }

    fn backward(&mut self, params: &mut ParamStore, mut d: Array2<f32>) -> Result<()> {
        params.check_len(self.size())?;

        if self.layers.is_empty() {
            return Err(MlErr::UninitializedGradient {
                what: "model without layers",
            });
        }

        let mut back = params.back();

        for layer in self.layers.iter_mut().rev() {
            let (params, grad) = back.take(layer.size())?;
            d = layer.backward(params, grad, d)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::arch::activations::ActFn;

    fn model() -> Sequential {
        Sequential::new([
            Layer::dense((2, 3), Some(ActFn::sigmoid(1.))),
            Layer::dense((3, 2), None),
            Layer::softmax(),
        ])
    }

    #[test]
    fn shapes_follow_the_layers() {
        let model = model();

        assert_eq!(model.size(), 9 + 8);
        assert_eq!(
            model.param_shapes(),
            [
                ParamShape::Weight { rows: 2, cols: 3 },
                ParamShape::Bias { len: 3 },
                ParamShape::Weight { rows: 3, cols: 2 },
                ParamShape::Bias { len: 2 },
            ]
        );
        assert_eq!(model.output_width(2).unwrap(), 2);
        assert!(model.output_width(3).is_err());
    }

    #[test]
    fn forward_twice_yields_the_same_output() {
        let mut model = model();
        let values = (0..model.size()).map(|i| (i as f32 - 8.) / 10.).collect();
        let params = ParamStore::from_vec(&model.param_shapes(), values).unwrap();
        let x: Array2<f32> = array![[0.5, -1.], [2., 0.25]];

        let y1 = model.forward(&params, x.view()).unwrap();
        let y2 = model.forward(&params, x.view()).unwrap();

        assert_eq!(y1, y2);
        assert_eq!(y1.dim(), (2, 2));
    }

    #[test]
    fn forward_with_a_store_of_the_wrong_size_fails() {
        let mut model = model();
        let params = ParamStore::zeros(&[ParamShape::Bias { len: 3 }]);
        let x: Array2<f32> = Array2::zeros((1, 2));

        let err = model.forward(&params, x.view()).unwrap_err();
        assert!(matches!(err, MlErr::SizeMismatch { .. }));
    }

    #[test]
    fn backward_fills_every_parameter_gradient() {
        let mut model = model();
        let values = (0..model.size()).map(|i| (i as f32 - 8.) / 10.).collect();
        let mut params = ParamStore::from_vec(&model.param_shapes(), values).unwrap();
        let x: Array2<f32> = array![[0.5, -1.], [2., 0.25]];

        model.forward(&params, x.view()).unwrap();
        model
            .backward(&mut params, array![[1., -1.], [-1., 1.]])
            .unwrap();

        assert!(params.has_grad());
        for i in 0..params.tensor_count() {
            assert!(params.grad_of(i).unwrap().iter().any(|&g| g != 0.));
        }
    }

    #[test]
    fn failed_backward_leaves_no_gradient() {
        let mut model = model();
        let mut params = ParamStore::zeros(&model.param_shapes());

        let err = model.backward(&mut params, array![[1., -1.]]).unwrap_err();

        assert!(matches!(err, MlErr::UninitializedGradient { .. }));
        assert!(!params.has_grad());
    }
}
