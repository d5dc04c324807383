use log::warn;
use rand::{SeedableRng, rngs::StdRng};

use super::{ModelTrainer, Trainer};
use crate::{
    MlErr, Result,
    arch::{
        Model, Sequential,
        activations::ActFn,
        layers::Layer,
        loss::{CrossEntropy, LossFn, Mse},
    },
    dataset::{DataLoader, Dataset},
    optimization::{GradientDescent, Optimizer},
    params::ParamStore,
    specs::{ActFnSpec, LayerSpec, LossFnSpec, ModelSpec, OptimizerSpec, TrainerSpec},
};

/// Builds `Trainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    ///
    /// # Returns
    /// An error if the spec describes an invalid model.
    pub fn build(&self, spec: &TrainerSpec) -> Result<Box<dyn Trainer>> {
        self.resolve_model(spec)
    }

    /// Builds the `DataLoader` a `Trainer` built from `spec` should be fed with.
    pub fn build_loader(&self, spec: &TrainerSpec, dataset: Dataset) -> DataLoader {
        let loader = DataLoader::new(dataset, spec.batch_size);

        match (spec.shuffle, spec.seed) {
            (false, _) => loader,
            (true, Some(seed)) => loader.shuffled(seed),
            (true, None) => loader.shuffled(rand::random()),
        }
    }

    fn resolve_model(&self, spec: &TrainerSpec) -> Result<Box<dyn Trainer>> {
        match &spec.model {
            ModelSpec::Sequential {
                layers: layer_specs,
            } => {
                self.check_layers(spec, layer_specs)?;

                let layers = layer_specs.iter().map(|ls| self.resolve_layer(*ls));
                let model = Sequential::new(layers);
                self.resolve_optimizer(spec, model)
            }
        }
    }

    fn check_layers(&self, spec: &TrainerSpec, layer_specs: &[LayerSpec]) -> Result<()> {
        let Some(input) = layer_specs.iter().find_map(|ls| match ls {
            LayerSpec::Dense { dim, .. } => Some(dim.0),
            LayerSpec::Softmax => None,
        }) else {
            return Err(MlErr::InvalidSpec(
                "the model needs at least one dense layer".into(),
            ));
        };

        let layers: Vec<_> = layer_specs.iter().map(|ls| self.resolve_layer(*ls)).collect();
        Sequential::new(layers).output_width(input)?;

        let softmaxes: Vec<_> = layer_specs
            .iter()
            .enumerate()
            .filter(|(_, ls)| matches!(ls, LayerSpec::Softmax))
            .map(|(i, _)| i)
            .collect();

        if softmaxes.len() > 1 {
            warn!(
                "softmax is applied {} times, it's normally applied once at the output",
                softmaxes.len()
            );
        }

        if softmaxes.iter().any(|&i| i != layer_specs.len() - 1) {
            warn!("softmax is followed by other layers, it's normally the last one");
        }

        if !softmaxes.is_empty() && spec.loss == LossFnSpec::CrossEntropy {
            warn!("cross entropy already applies softmax to the model output");
        }

        Ok(())
    }

    fn resolve_layer(&self, spec: LayerSpec) -> Layer {
        match spec {
            LayerSpec::Dense { dim, act_fn } => {
                let factory = |act_fn| Layer::dense(dim, act_fn);
                self.resolve_act_fn(act_fn, factory)
            }
            LayerSpec::Softmax => Layer::softmax(),
        }
    }

    fn resolve_act_fn<F>(&self, spec: Option<ActFnSpec>, layer_factory: F) -> Layer
    where
        F: FnOnce(Option<ActFn>) -> Layer,
    {
        let Some(act_fn) = spec else {
            return layer_factory(None);
        };

        let act_fn = match act_fn {
            ActFnSpec::Sigmoid { amp } => ActFn::sigmoid(amp),
            ActFnSpec::Relu => ActFn::relu(),
        };

        layer_factory(Some(act_fn))
    }

    fn resolve_optimizer<M>(&self, spec: &TrainerSpec, model: M) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
    {
        match spec.optimizer {
            OptimizerSpec::GradientDescent { learning_rate } => {
                let optimizer = GradientDescent::new(learning_rate);
                self.resolve_loss(spec, model, optimizer)
            }
        }
    }

    fn resolve_loss<M, O>(
        &self,
        spec: &TrainerSpec,
        model: M,
        optimizer: O,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
    {
        match spec.loss {
            LossFnSpec::Mse => self.terminate_build(spec, model, optimizer, Mse::new()),
            LossFnSpec::CrossEntropy => {
                self.terminate_build(spec, model, optimizer, CrossEntropy::new())
            }
        }
    }

    fn terminate_build<M, O, L>(
        &self,
        spec: &TrainerSpec,
        model: M,
        optimizer: O,
        loss: L,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
        L: LossFn + 'static,
    {
        let mut rng = self.generate_rng(spec.seed);
        let params = ParamStore::initialized(&model.param_shapes(), &spec.initializer, &mut rng)?;

        let trainer = ModelTrainer::new(model, params, optimizer, loss, spec.epochs)?;
        Ok(Box::new(trainer))
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::initialization::Initializer;

    fn spec(layers: Vec<LayerSpec>, loss: LossFnSpec) -> TrainerSpec {
        TrainerSpec {
            model: ModelSpec::Sequential { layers },
            optimizer: OptimizerSpec::GradientDescent { learning_rate: 0.5 },
            loss,
            initializer: Initializer::XavierUniform,
            epochs: 3,
            batch_size: NonZeroUsize::new(2).unwrap(),
            shuffle: true,
            seed: Some(1),
        }
    }

    fn dense(dim: (usize, usize), act_fn: Option<ActFnSpec>) -> LayerSpec {
        LayerSpec::Dense { dim, act_fn }
    }

    fn dataset() -> Dataset {
        Dataset::from_flat(vec![0., 0., 0., 1., 1., 0., 1., 1.], 2, vec![0, 1, 1, 1]).unwrap()
    }

    #[test]
    fn builds_a_runnable_trainer() {
        let builder = TrainerBuilder::new();
        let spec = spec(
            vec![
                dense((2, 4), Some(ActFnSpec::Relu)),
                dense((4, 2), None),
            ],
            LossFnSpec::CrossEntropy,
        );

        let mut trainer = builder.build(&spec).unwrap();
        let mut loader = builder.build_loader(&spec, dataset());

        assert_eq!(trainer.params().len(), 12 + 10);
        let losses = trainer.train(&mut loader).unwrap();
        assert_eq!(losses.len(), 3);
        assert!(losses.iter().all(|l| l.is_finite()));

        let accuracy = trainer.accuracy(&mut loader).unwrap();
        assert!((0. ..=1.).contains(&accuracy));
    }

    #[test]
    fn same_seed_same_initial_params() {
        let builder = TrainerBuilder::new();
        let spec = spec(vec![dense((2, 3), None)], LossFnSpec::Mse);

        let a = builder.build(&spec).unwrap();
        let b = builder.build(&spec).unwrap();

        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn layers_that_dont_chain_are_rejected() {
        let builder = TrainerBuilder::new();
        let spec = spec(vec![dense((2, 3), None), dense((4, 1), None)], LossFnSpec::Mse);

        assert!(builder.build(&spec).is_err());
    }

    #[test]
    fn a_model_without_dense_layers_is_rejected() {
        let builder = TrainerBuilder::new();
        let spec = spec(vec![LayerSpec::Softmax], LossFnSpec::Mse);

        assert!(matches!(builder.build(&spec), Err(MlErr::InvalidSpec(_))));
    }

    #[test]
    fn doubled_softmax_still_builds() {
        let builder = TrainerBuilder::new();
        let spec = spec(
            vec![
                dense((2, 3), Some(ActFnSpec::Sigmoid { amp: 1. })),
                LayerSpec::Softmax,
                LayerSpec::Softmax,
                dense((3, 2), None),
            ],
            LossFnSpec::Mse,
        );

        assert!(builder.build(&spec).is_ok());
    }
}
