//! Serializable descriptions of a training session.

use std::{num::NonZeroUsize, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    dataset::{Dataset, idx},
    initialization::Initializer,
};

/// The specification for the `ActFn` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Sigmoid { amp: f32 },
    Relu,
}

/// The specification for the `Layer` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        dim: (usize, usize),
        act_fn: Option<ActFnSpec>,
    },
    Softmax,
}

/// The specification for the `Model` trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    Sequential { layers: Vec<LayerSpec> },
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    GradientDescent { learning_rate: f32 },
}

/// The specification for the `LossFn` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnSpec {
    Mse,
    CrossEntropy,
}

/// The specification for the `Trainer` trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerSpec {
    pub model: ModelSpec,
    pub optimizer: OptimizerSpec,
    pub loss: LossFnSpec,
    #[serde(default)]
    pub initializer: Initializer,
    pub epochs: usize,
    pub batch_size: NonZeroUsize,
    #[serde(default)]
    pub shuffle: bool,
    pub seed: Option<u64>,
}

/// Where the examples of a `Dataset` come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSpec {
    Inline {
        data: Vec<f32>,
        x_size: usize,
        labels: Vec<usize>,
    },
    Idx {
        images: PathBuf,
        labels: PathBuf,
    },
}

/// Maps every input value `v` to `(v - mean) / std`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizeSpec {
    pub mean: f32,
    pub std: f32,
}

/// The specification for the `Dataset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSpec {
    pub source: SourceSpec,
    /// Applied before `normalize`.
    pub scale: Option<f32>,
    pub normalize: Option<NormalizeSpec>,
    pub limit: Option<usize>,
}

impl DatasetSpec {
    /// Loads and transforms the dataset this spec describes.
    pub fn load(&self) -> Result<Dataset> {
        let mut dataset = match &self.source {
            SourceSpec::Inline {
                data,
                x_size,
                labels,
            } => Dataset::from_flat(data.clone(), *x_size, labels.clone())?,
            SourceSpec::Idx { images, labels } => idx::read_dataset(images, labels)?,
        };

        if let Some(limit) = self.limit {
            dataset = dataset.take(limit);
        }

        if let Some(factor) = self.scale {
            dataset = dataset.scale(factor);
        }

        if let Some(NormalizeSpec { mean, std }) = self.normalize {
            dataset = dataset.normalize(mean, std)?;
        }

        Ok(dataset)
    }
}
