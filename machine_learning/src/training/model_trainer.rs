use ndarray::{Array2, ArrayView2};

use super::{Trainer, train};
use crate::{
    arch::{Model, loss::LossFn},
    dataset::{BatchSource, DataLoader},
    error::Result,
    metrics,
    optimization::Optimizer,
    params::ParamStore,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself and its parameters.
pub struct ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    model: M,
    params: ParamStore,
    optimizer: O,
    loss_fn: L,
    epochs: usize,
}

impl<M, O, L> ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `params` - The model's starting parameters.
    /// * `optimizer` - The optimizer updating the parameters after every batch.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output
    ///   and the expected one.
    /// * `epochs` - The amount of epochs to run per `train` call.
    ///
    /// # Returns
    /// An error if `params` doesn't fit `model`.
    pub fn new(
        model: M,
        params: ParamStore,
        optimizer: O,
        loss_fn: L,
        epochs: usize,
    ) -> Result<Self> {
        params.check_len(model.size())?;

        Ok(Self {
            model,
            params,
            optimizer,
            loss_fn,
            epochs,
        })
    }

    /// Performs `epochs` epochs of training its model over `source`.
    ///
    /// # Returns
    /// The mean loss of every epoch.
    pub fn train<S: BatchSource>(&mut self, source: &mut S) -> Result<Vec<f32>> {
        train(
            &mut self.model,
            &mut self.params,
            &self.loss_fn,
            &mut self.optimizer,
            source,
            self.epochs,
        )
    }

    /// Computes the model's output for `x` with the current parameters.
    pub fn predict(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.model.forward(&self.params, x)
    }

    /// Computes the fraction of examples of `source` classified correctly.
    pub fn accuracy<S: BatchSource>(&mut self, source: &mut S) -> Result<f32> {
        metrics::accuracy(&mut self.model, &self.params, source)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }
}

impl<M, O, L> Trainer for ModelTrainer<M, O, L>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
{
    fn train(&mut self, loader: &mut DataLoader) -> Result<Vec<f32>> {
        self.train(loader)
    }

    fn accuracy(&mut self, loader: &mut DataLoader) -> Result<f32> {
        self.accuracy(loader)
    }

    fn params(&self) -> &ParamStore {
        self.params()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use ndarray::array;

    use super::*;
    use crate::{
        arch::{Sequential, activations::ActFn, layers::Layer, loss::Mse},
        dataset::Dataset,
        optimization::GradientDescent,
        params::ParamShape,
    };

    fn trainer() -> ModelTrainer<Sequential, GradientDescent, Mse> {
        let model = Sequential::new([Layer::dense((2, 2), Some(ActFn::sigmoid(1.)))]);
        let values = (0..model.size()).map(|i| i as f32 / 10.).collect();
        let params = ParamStore::from_vec(&model.param_shapes(), values).unwrap();

        ModelTrainer::new(model, params, GradientDescent::new(0.1), Mse::new(), 2).unwrap()
    }

    #[test]
    fn params_must_fit_the_model() {
        let model = Sequential::new([Layer::dense((2, 2), None)]);
        let params = ParamStore::zeros(&[ParamShape::Bias { len: 2 }]);
        let trainer = ModelTrainer::new(model, params, GradientDescent::new(0.1), Mse::new(), 1);

        assert!(trainer.is_err());
    }

    #[test]
    fn predict_uses_the_current_params() {
        let mut trainer = trainer();
        let x = array![[1., -1.], [0.5, 2.]];

        let mut model = trainer.model().clone();
        let expected = model.forward(trainer.params(), x.view()).unwrap();
        assert_eq!(trainer.predict(x.view()).unwrap(), expected);

        let dataset = Dataset::from_flat(vec![1., -1., 0.5, 2.], 2, vec![0, 1]).unwrap();
        let mut loader = DataLoader::new(dataset, NonZeroUsize::new(2).unwrap());
        trainer.train(&mut loader).unwrap();

        let trained = model.forward(trainer.params(), x.view()).unwrap();
        assert_ne!(trained, expected);
        assert_eq!(trainer.predict(x.view()).unwrap(), trained);
    }
}
