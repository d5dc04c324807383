use log::{debug, info};

use crate::{
    MlErr, Result, Stage,
    arch::{Model, loss::LossFn},
    dataset::BatchSource,
    optimization::Optimizer,
    params::ParamStore,
};

/// Trains `model` for `epochs` full traversals of `source`.
///
/// Every batch goes through the same strictly sequential steps: reset the gradient, forward
/// pass, loss evaluation, backward pass and optimizer step. Parameters are updated in place
/// after every batch.
///
/// # Arguments
/// * `model` - The model being trained.
/// * `params` - The model's parameters and gradient accumulator.
/// * `loss_fn` - The criterion measuring each batch's loss.
/// * `optimizer` - Updates `params` from their gradient.
/// * `source` - The batches, traversed once per epoch.
/// * `epochs` - The amount of traversals, `0` performs no work.
///
/// # Returns
/// The mean batch loss of every epoch, in order, or the first error raised. Errors coming from
/// a batch are tagged with the stage that raised them, parameters keep the values of the last
/// completed step.
pub fn train<M, L, O, S>(
    model: &mut M,
    params: &mut ParamStore,
    loss_fn: &L,
    optimizer: &mut O,
    source: &mut S,
    epochs: usize,
) -> Result<Vec<f32>>
where
    M: Model + ?Sized,
    L: LossFn + ?Sized,
    O: Optimizer + ?Sized,
    S: BatchSource,
{
    let mut losses = Vec::with_capacity(epochs);

    for epoch in 0..epochs {
        let loss = run_epoch(model, params, loss_fn, optimizer, source, epoch)?;
        info!("epoch {epoch}: mean loss {loss}");
        losses.push(loss);
    }

    Ok(losses)
}

// NOTE: this is the mean of the batch losses, each taken before its own update. It's not the
// loss of the parameters at the end of the epoch and batches of different sizes weigh the same.
fn run_epoch<M, L, O, S>(
    model: &mut M,
    params: &mut ParamStore,
    loss_fn: &L,
    optimizer: &mut O,
    source: &mut S,
    epoch: usize,
) -> Result<f32>
where
    M: Model + ?Sized,
    L: LossFn + ?Sized,
    O: Optimizer + ?Sized,
    S: BatchSource,
{
    let mut total_loss = 0.0;
    let mut num_batches = 0;

    for (i, batch) in source.batches().enumerate() {
        optimizer.zero_grad(params);

        let y_pred = model
            .forward(params, batch.x.view())
            .map_err(|e| e.at(Stage::Forward, epoch, i))?;

        let mut loss = loss_fn
            .evaluate(y_pred.view(), batch.y.view())
            .map_err(|e| e.at(Stage::Loss, epoch, i))?;

        loss.backward(model, params)
            .map_err(|e| e.at(Stage::Backward, epoch, i))?;

        optimizer
            .step(params)
            .map_err(|e| e.at(Stage::Step, epoch, i))?;

        debug!(epoch = epoch, batch = i, loss = loss.value(); "batch done");

        total_loss += loss.value();
        num_batches += 1;
    }

    if num_batches == 0 {
        return Err(MlErr::EmptyEpoch { epoch });
    }

    Ok(total_loss / num_batches as f32)
}
