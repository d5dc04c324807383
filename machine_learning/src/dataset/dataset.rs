use ndarray::{Array1, Array2, Axis};

use super::Batch;
use crate::{MlErr, Result};

/// An in-memory labeled dataset, one example per row.
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    y: Array1<usize>,
}

impl Dataset {
    /// Creates a new `Dataset`.
    ///
    /// # Arguments
    /// * `x` - The `(examples, features)` inputs.
    /// * `y` - One class label per example.
    ///
    /// # Returns
    /// An error if the amount of labels and examples differ.
    pub fn new(x: Array2<f32>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MlErr::SizeMismatch {
                what: "dataset labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    /// Creates a new `Dataset` from a flat, row-major buffer of inputs.
    ///
    /// # Arguments
    /// * `data` - The inputs, `x_size` values per example.
    /// * `x_size` - The amount of features per example.
    /// * `labels` - One class label per example.
    pub fn from_flat(data: Vec<f32>, x_size: usize, labels: Vec<usize>) -> Result<Self> {
        if x_size == 0 || data.len() % x_size != 0 {
            return Err(MlErr::InvalidSpec(format!(
                "{} values can not be split in rows of {x_size}",
                data.len()
            )));
        }

        let rows = data.len() / x_size;
        let x = Array2::from_shape_vec((rows, x_size), data)
            .map_err(|e| MlErr::InvalidSpec(e.to_string()))?;

        Self::new(x, Array1::from(labels))
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Returns the amount of features per example.
    pub fn x_size(&self) -> usize {
        self.x.ncols()
    }

    /// Returns the amount of classes, that is, the highest label plus one.
    pub fn classes(&self) -> usize {
        self.y.iter().max().map_or(0, |&max| max + 1)
    }

    pub fn x(&self) -> &Array2<f32> {
        &self.x
    }

    pub fn y(&self) -> &Array1<usize> {
        &self.y
    }

    /// Multiplies every input value by `factor`.
    pub fn scale(mut self, factor: f32) -> Self {
        self.x *= factor;
        self
    }

    /// Maps every input value `v` to `(v - mean) / std`.
    ///
    /// # Returns
    /// An error if `std` is zero or not finite.
    pub fn normalize(mut self, mean: f32, std: f32) -> Result<Self> {
        if std == 0. || !std.is_finite() {
            return Err(MlErr::InvalidSpec(format!(
                "can't normalize with a standard deviation of {std}"
            )));
        }

        self.x.mapv_inplace(|v| (v - mean) / std);
        Ok(self)
    }

    /// Keeps only the first `n` examples.
    pub fn take(self, n: usize) -> Self {
        let n = n.min(self.len());

        Self {
            x: self.x.slice_axis(Axis(0), (0..n).into()).to_owned(),
            y: self.y.slice_axis(Axis(0), (0..n).into()).to_owned(),
        }
    }

    /// Gathers the given examples into a batch.
    pub fn select(&self, indices: &[usize]) -> Batch {
        Batch {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
        }
    }
}
