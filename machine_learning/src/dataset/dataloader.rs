use std::num::NonZeroUsize;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use super::{Batch, BatchSource, Dataset};

/// Splits a `Dataset` into batches, optionally reshuffling it on every traversal.
#[derive(Debug, Clone)]
pub struct DataLoader {
    dataset: Dataset,
    batch_size: NonZeroUsize,
    order: Vec<usize>,
    rng: Option<StdRng>,
}

impl DataLoader {
    /// Creates a new `DataLoader` that yields the examples in order.
    ///
    /// # Arguments
    /// * `dataset` - The examples.
    /// * `batch_size` - The amount of examples per batch, the last batch may be smaller.
    pub fn new(dataset: Dataset, batch_size: NonZeroUsize) -> Self {
        Self {
            order: (0..dataset.len()).collect(),
            dataset,
            batch_size,
            rng: None,
        }
    }

    /// Shuffles the examples before every traversal, deterministically for a given `seed`.
    pub fn shuffled(mut self, seed: u64) -> Self {
        self.rng = Some(StdRng::seed_from_u64(seed));
        self
    }

    /// Returns the amount of batches in a traversal.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size.get())
    }
}

impl BatchSource for DataLoader {
    fn batches(&mut self) -> impl Iterator<Item = Batch> + '_ {
        if let Some(rng) = &mut self.rng {
            self.order.shuffle(rng);
        }

        let dataset = &self.dataset;
        self.order
            .chunks(self.batch_size.get())
            .map(move |indices| dataset.select(indices))
    }
}
