use ndarray::{Array1, Array2};

use crate::{MlErr, Result};

/// A group of examples: one `(batch, features)` input and one class label per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub x: Array2<f32>,
    pub y: Array1<usize>,
}

impl Batch {
    /// Creates a new `Batch`.
    ///
    /// # Returns
    /// An error if there isn't exactly one label per input row.
    pub fn new(x: Array2<f32>, y: Array1<usize>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MlErr::SizeMismatch {
                what: "batch labels",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        Ok(Self { x, y })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Something that can be traversed as a finite sequence of batches, any number of times.
pub trait BatchSource {
    /// Starts a new traversal. Every call yields a full epoch's worth of batches.
    fn batches(&mut self) -> impl Iterator<Item = Batch> + '_;
}

impl BatchSource for Vec<Batch> {
    fn batches(&mut self) -> impl Iterator<Item = Batch> + '_ {
        self.iter().cloned()
    }
}
