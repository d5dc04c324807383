use crate::{dataset::DataLoader, error::Result, params::ParamStore};

/// A type-erased training session, as produced by the `TrainerBuilder`.
pub trait Trainer {
    /// Trains for the configured amount of epochs.
    ///
    /// # Returns
    /// The mean loss of every epoch.
    fn train(&mut self, loader: &mut DataLoader) -> Result<Vec<f32>>;

    /// Computes the fraction of examples of `loader` classified correctly.
    fn accuracy(&mut self, loader: &mut DataLoader) -> Result<f32>;

    /// The trained parameters.
    fn params(&self) -> &ParamStore;
}
