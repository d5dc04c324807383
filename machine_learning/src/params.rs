use std::{mem, ops::Range};

use rand::Rng;

use crate::{MlErr, Result, initialization::Initializer};

/// The shape of a single parameter tensor inside a `ParamStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    /// A row-major `(rows, cols)` weight matrix, `rows` being the fan in.
    Weight { rows: usize, cols: usize },
    /// A bias vector.
    Bias { len: usize },
}

impl ParamShape {
    /// Returns the amount of values a tensor of this shape holds.
    pub fn len(&self) -> usize {
        match *self {
            ParamShape::Weight { rows, cols } => rows * cols,
            ParamShape::Bias { len } => len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Owns a model's parameters and their gradient accumulator.
///
/// The parameters live in a single flat buffer partitioned into an ordered list of tensors,
/// the gradient has exactly the same layout. Backward passes *add* into the gradient, so it
/// has to be reset through `zero_grad` before every new batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamStore {
    params: Vec<f32>,
    grad: Vec<f32>,
    shapes: Vec<ParamShape>,
    ranges: Vec<Range<usize>>,
    grad_ready: bool,
}

impl ParamStore {
    /// Creates a new `ParamStore` with every parameter set to zero.
    ///
    /// # Arguments
    /// * `shapes` - The shape of each parameter tensor, in model order.
    pub fn zeros(shapes: &[ParamShape]) -> Self {
        let ranges = ranges_of(shapes);
        let len = ranges.last().map_or(0, |r| r.end);

        Self {
            params: vec![0.; len],
            grad: vec![0.; len],
            shapes: shapes.to_vec(),
            ranges,
            grad_ready: false,
        }
    }

    /// Creates a new `ParamStore` from already known parameter values.
    ///
    /// # Arguments
    /// * `shapes` - The shape of each parameter tensor, in model order.
    /// * `params` - The flat parameter values.
    ///
    /// # Returns
    /// An error if the amount of values does not match the shapes.
    pub fn from_vec(shapes: &[ParamShape], params: Vec<f32>) -> Result<Self> {
        let mut store = Self::zeros(shapes);

        if params.len() != store.len() {
            return Err(MlErr::SizeMismatch {
                what: "parameter values",
                got: params.len(),
                expected: store.len(),
            });
        }

        store.params = params;
        Ok(store)
    }

    /// Creates a new `ParamStore` filled by an initializer.
    ///
    /// # Arguments
    /// * `shapes` - The shape of each parameter tensor, in model order.
    /// * `initializer` - Decides the starting value of each tensor.
    /// * `rng` - The random number generator the initializer samples from.
    pub fn initialized<R: Rng>(
        shapes: &[ParamShape],
        initializer: &Initializer,
        rng: &mut R,
    ) -> Result<Self> {
        let mut store = Self::zeros(shapes);

        for (shape, range) in store.shapes.iter().zip(&store.ranges) {
            initializer.fill(*shape, &mut store.params[range.clone()], rng)?;
        }

        Ok(store)
    }

    /// Returns the total amount of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the amount of parameter tensors.
    pub fn tensor_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn shapes(&self) -> &[ParamShape] {
        &self.shapes
    }

    /// Returns the values of the `i`-th parameter tensor.
    pub fn tensor(&self, i: usize) -> Option<&[f32]> {
        self.ranges.get(i).map(|r| &self.params[r.clone()])
    }

    /// Returns the values of the `i`-th parameter tensor, mutably.
    pub fn tensor_mut(&mut self, i: usize) -> Option<&mut [f32]> {
        self.ranges.get(i).map(|r| &mut self.params[r.clone()])
    }

    /// Returns the gradient of the `i`-th parameter tensor.
    pub fn grad_of(&self, i: usize) -> Option<&[f32]> {
        self.ranges.get(i).map(|r| &self.grad[r.clone()])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.params
    }

    pub fn grad(&self) -> &[f32] {
        &self.grad
    }

    /// Whether a backward pass has written into the gradient since the last reset.
    pub fn has_grad(&self) -> bool {
        self.grad_ready
    }

    /// Resets the gradient accumulator to zero.
    pub fn zero_grad(&mut self) {
        self.grad.fill(0.);
        self.grad_ready = false;
    }

    /// Checks that this store holds exactly `expected` parameters.
    pub fn check_len(&self, expected: usize) -> Result<()> {
        if self.len() != expected {
            return Err(MlErr::SizeMismatch {
                what: "parameter store",
                got: self.len(),
                expected,
            });
        }

        Ok(())
    }

    /// Gives the parameters and the gradient at the same time, for an optimizer step.
    pub fn split_mut(&mut self) -> (&mut [f32], &[f32]) {
        (&mut self.params, &self.grad)
    }

    /// Creates a new iterator over the parameters in model order.
    pub fn front(&self) -> FrontIter<'_> {
        FrontIter {
            params: &self.params,
        }
    }

    /// Creates a new iterator over the parameters and their gradient in reverse model order.
    ///
    /// The gradient is marked as populated once every parameter has been taken.
    pub fn back(&mut self) -> BackIter<'_> {
        BackIter {
            params: &self.params,
            grad: &mut self.grad,
            ready: &mut self.grad_ready,
        }
    }
}

fn ranges_of(shapes: &[ParamShape]) -> Vec<Range<usize>> {
    let mut start = 0;

    shapes
        .iter()
        .map(|shape| {
            let range = start..start + shape.len();
            start = range.end;
            range
        })
        .collect()
}

/// The parameter iterator used on forward passes.
pub struct FrontIter<'ps> {
    params: &'ps [f32],
}

impl<'ps> FrontIter<'ps> {
    /// Takes the next `n` parameters.
    ///
    /// # Returns
    /// A slice of parameters or an error if fewer than `n` remain.
    pub fn take(&mut self, n: usize) -> Result<&'ps [f32]> {
        if n > self.params.len() {
            return Err(MlErr::SizeMismatch {
                what: "remaining parameters",
                got: self.params.len(),
                expected: n,
            });
        }

        let (head, tail) = self.params.split_at(n);
        self.params = tail;
        Ok(head)
    }

    /// Returns the amount of parameters not yet taken.
    pub fn remaining(&self) -> usize {
        self.params.len()
    }
}

/// The parameter and gradient iterator used on backward passes.
pub struct BackIter<'ps> {
    params: &'ps [f32],
    grad: &'ps mut [f32],
    ready: &'ps mut bool,
}

impl<'ps> BackIter<'ps> {
    /// Takes the last `n` parameters and their gradient.
    ///
    /// # Returns
    /// A tuple with the parameters and their gradient or an error if fewer than `n` remain.
    pub fn take(&mut self, n: usize) -> Result<(&'ps [f32], &'ps mut [f32])> {
        if n > self.params.len() {
            return Err(MlErr::SizeMismatch {
                what: "remaining parameters",
                got: self.params.len(),
                expected: n,
            });
        }

        let split = self.params.len() - n;
        let (params_head, params_tail) = self.params.split_at(split);
        let (grad_head, grad_tail) = mem::take(&mut self.grad).split_at_mut(split);

        self.params = params_head;
        self.grad = grad_head;

        if self.params.is_empty() {
            *self.ready = true;
        }

        Ok((params_tail, grad_tail))
    }
}
