mod builder;
mod driver;
mod model_trainer;
mod trainer;

pub use builder::TrainerBuilder;
pub use driver::train;
pub use model_trainer::ModelTrainer;
pub use trainer::Trainer;
