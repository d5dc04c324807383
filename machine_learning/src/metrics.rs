use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::{MlErr, Result, arch::Model, dataset::BatchSource, params::ParamStore};

/// Returns the index of the highest value of every row.
pub fn argmax(y: ArrayView2<f32>) -> Vec<usize> {
    y.axis_iter(Axis(0))
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, &v)| {
                    if v > best.1 { (i, v) } else { best }
                })
                .0
        })
        .collect()
}

/// Counts the rows of `y_pred` whose highest value is at the expected label.
pub fn correct(y_pred: ArrayView2<f32>, y: ArrayView1<usize>) -> usize {
    argmax(y_pred)
        .into_iter()
        .zip(y.iter())
        .filter(|(pred, label)| pred == *label)
        .count()
}

/// Computes the fraction of examples of a full traversal of `source` the model classifies
/// correctly.
///
/// # Returns
/// An error if the model fails or the source yields no examples.
pub fn accuracy<M, S>(model: &mut M, params: &ParamStore, source: &mut S) -> Result<f32>
where
    M: Model + ?Sized,
    S: BatchSource,
{
    let mut hits = 0;
    let mut total = 0;

    for batch in source.batches() {
        let y_pred = model.forward(params, batch.x.view())?;
        hits += correct(y_pred.view(), batch.y.view());
        total += batch.len();
    }

    if total == 0 {
        return Err(MlErr::EmptySource);
    }

    Ok(hits as f32 / total as f32)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array};

    use super::*;
    use crate::{
        arch::{Sequential, layers::Layer},
        dataset::Batch,
    };

    #[test]
    fn argmax_takes_the_first_maximum() {
        let y: Array2<f32> = array![[0.1, 0.7, 0.2], [0.5, 0.5, 0.], [-1., -2., -0.5]];
        assert_eq!(argmax(y.view()), [1, 0, 2]);
    }

    #[test]
    fn correct_counts_matches() {
        let y: Array2<f32> = array![[0.1, 0.9], [0.8, 0.2], [0.3, 0.7]];
        let labels = array![1, 1, 1];
        assert_eq!(correct(y.view(), labels.view()), 2);
    }

    fn identity() -> (Sequential, ParamStore) {
        let model = Sequential::new([Layer::dense((2, 2), None)]);
        let params =
            ParamStore::from_vec(&model.param_shapes(), vec![1., 0., 0., 1., 0., 0.]).unwrap();
        (model, params)
    }

    #[test]
    fn accuracy_over_every_batch() {
        let (mut model, params) = identity();
        let mut source = vec![
            Batch::new(array![[1., 0.], [0., 1.]], array![0, 1]).unwrap(),
            Batch::new(array![[3., 1.]], array![1]).unwrap(),
        ];

        let accuracy = accuracy(&mut model, &params, &mut source).unwrap();
        assert_abs_diff_eq!(accuracy, 2. / 3.);
    }

    #[test]
    fn accuracy_of_an_empty_source_fails() {
        let (mut model, params) = identity();
        let mut source: Vec<Batch> = Vec::new();

        let err = accuracy(&mut model, &params, &mut source).unwrap_err();
        assert!(matches!(err, MlErr::EmptySource));
    }
}
