use std::{fmt, io};

use thiserror::Error;

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The step of a training iteration in which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Forward,
    Loss,
    Backward,
    Step,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Forward => "forward",
            Stage::Loss => "loss",
            Stage::Backward => "backward",
            Stage::Step => "step",
        };

        write!(f, "{s}")
    }
}

/// The machine learning module's error type.
#[derive(Debug, Error)]
pub enum MlErr {
    #[error("shape mismatch in {what}, got {got:?} and expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        got: (usize, usize),
        expected: (usize, usize),
    },

    #[error("size mismatch in {what}, got {got} and expected {expected}")]
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("no gradient available for {what}")]
    UninitializedGradient { what: &'static str },

    #[error("epoch {epoch} yielded no batches")]
    EmptyEpoch { epoch: usize },

    #[error("the batch source yielded no examples")]
    EmptySource,

    #[error("label {label} is out of range for {classes} classes")]
    InvalidLabel { label: usize, classes: usize },

    #[error("{stage} failed at epoch {epoch}, batch {batch}: {source}")]
    Stage {
        stage: Stage,
        epoch: usize,
        batch: usize,
        #[source]
        source: Box<MlErr>,
    },

    #[error("invalid spec: {0}")]
    InvalidSpec(String),

    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("invalid idx file: {0}")]
    IdxFormat(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl MlErr {
    /// Wraps `self` with the training position it was raised at.
    pub fn at(self, stage: Stage, epoch: usize, batch: usize) -> Self {
        MlErr::Stage {
            stage,
            epoch,
            batch,
            source: Box::new(self),
        }
    }

    /// Returns the training stage this error was raised in, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            MlErr::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the underlying error, skipping any stage wrappers.
    pub fn root(&self) -> &MlErr {
        match self {
            MlErr::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_wrapper_keeps_the_cause() {
        let err = MlErr::UninitializedGradient { what: "loss" }.at(Stage::Backward, 2, 7);

        assert_eq!(err.stage(), Some(Stage::Backward));
        assert!(matches!(
            err.root(),
            MlErr::UninitializedGradient { what: "loss" }
        ));
        assert_eq!(
            err.to_string(),
            "backward failed at epoch 2, batch 7: no gradient available for loss"
        );
    }

    #[test]
    fn unwrapped_errors_have_no_stage() {
        let err = MlErr::EmptyEpoch { epoch: 0 };
        assert_eq!(err.stage(), None);
        assert!(matches!(err.root(), MlErr::EmptyEpoch { epoch: 0 }));
    }
}
