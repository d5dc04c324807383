use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use log::info;
use machine_learning::{
    specs::{DatasetSpec, TrainerSpec},
    training::{Trainer, TrainerBuilder},
};
use serde::Deserialize;

/// A whole training run: the trainer to build and the dataset to feed it.
#[derive(Debug, Deserialize)]
struct RunSpec {
    trainer: TrainerSpec,
    dataset: DatasetSpec,
}

fn read_spec(path: &Path) -> Result<RunSpec> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;

    serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: classifier-trainer <config.json>");
    };

    let spec = read_spec(&path)?;

    let dataset = spec.dataset.load().context("failed to load the dataset")?;
    info!(
        "loaded {} examples with {} features and {} classes",
        dataset.len(),
        dataset.x_size(),
        dataset.classes()
    );

    let builder = TrainerBuilder::new();
    let mut trainer = builder
        .build(&spec.trainer)
        .context("failed to build the trainer")?;
    let mut loader = builder.build_loader(&spec.trainer, dataset);
    info!("training for {} epochs", spec.trainer.epochs);

    let losses = trainer.train(&mut loader).context("training failed")?;
    let accuracy = trainer
        .accuracy(&mut loader)
        .context("failed to measure the accuracy")?;

    match losses.last() {
        Some(loss) => println!("final mean loss: {loss}"),
        None => println!("no epochs were run"),
    }
    println!("accuracy: {:.2}%", accuracy * 100.);

    Ok(())
}
