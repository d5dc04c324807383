pub mod arch;
pub mod dataset;
pub mod error;
pub mod initialization;
pub mod metrics;
pub mod optimization;
pub mod params;
pub mod specs;
pub mod training;

pub use error::{MlErr, Result, Stage};
