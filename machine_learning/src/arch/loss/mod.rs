mod cross_entropy;
mod loss_fn;
mod mse;

pub use cross_entropy::CrossEntropy;
pub use loss_fn::{Loss, LossFn, one_hot};
pub use mse::Mse;
