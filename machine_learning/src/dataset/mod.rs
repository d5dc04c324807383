mod batch;
mod dataloader;
#[allow(clippy::module_inception)]
mod dataset;
pub mod idx;

pub use batch::{Batch, BatchSource};
pub use dataloader::DataLoader;
pub use dataset::Dataset;
