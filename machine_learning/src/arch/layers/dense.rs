use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, Axis, linalg};

use crate::{MlErr, Result, arch::activations::ActFn, params::ParamShape};

/// A fully connected layer, `a = act_fn(x·W + b)`.
///
/// Its parameters are laid out as the row-major `(in, out)` weight matrix followed by the `out`
/// biases.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,

    // Forward metadata
    x: Option<Array2<f32>>,
    z: Option<Array2<f32>>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The input and output widths.
    /// * `act_fn` - An optional activation applied to the weighted sums.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self {
            dim,
            act_fn,
            x: None,
            z: None,
        }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        (self.dim.0 + 1) * self.dim.1
    }

    pub fn param_shapes(&self) -> [ParamShape; 2] {
        [
            ParamShape::Weight {
                rows: self.dim.0,
                cols: self.dim.1,
            },
            ParamShape::Bias { len: self.dim.1 },
        ]
    }

    /// Computes this layer's output, caching what `backward` needs.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `x` - A `(batch, in)` input.
    ///
    /// # Returns
    /// The `(batch, out)` output or an error if `x` has the wrong width.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::ShapeMismatch {
                what: "dense input",
                got: x.dim(),
                expected: (x.nrows(), self.dim.0),
            });
        }

        let (w, b) = self.view_params(params)?;

        let mut z = Array2::zeros((x.nrows(), self.dim.1));
        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut z);
        z += &b;

        self.x = Some(x.to_owned());

        let Some(ref act_fn) = self.act_fn else {
            self.z = None;
            return Ok(z);
        };

        let a = z.mapv(|z| act_fn.f(z));
        self.z = Some(z);
        Ok(a)
    }

    /// Propagates `d`, the loss derivative with respect to this layer's output, adding this
    /// layer's contribution into `grad`.
    ///
    /// # Arguments
    /// * `params` - This layer's parameters.
    /// * `grad` - This layer's gradient accumulator.
    /// * `d` - The `(batch, out)` delta coming from the next layer.
    ///
    /// # Returns
    /// The `(batch, in)` delta for the previous layer.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        let x = self
            .x
            .as_ref()
            .ok_or(MlErr::UninitializedGradient { what: "dense layer" })?;

        if d.dim() != (x.nrows(), self.dim.1) {
            return Err(MlErr::ShapeMismatch {
                what: "dense delta",
                got: d.dim(),
                expected: (x.nrows(), self.dim.1),
            });
        }

        if let Some(act_fn) = &self.act_fn {
            let z = self
                .z
                .as_ref()
                .ok_or(MlErr::UninitializedGradient { what: "dense layer" })?;
            d.zip_mut_with(z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &x.t(), &d, 1.0, &mut dw);
        db += &d.sum_axis(Axis(0));

        let (w, _) = self.view_params(params)?;
        Ok(d.dot(&w.t()))
    }

    fn check_size(&self, got: usize) -> Result<()> {
        if got != self.size() {
            return Err(MlErr::SizeMismatch {
                what: "dense parameters",
                got,
                expected: self.size(),
            });
        }

        Ok(())
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        self.check_size(grad.len())?;

        let (dw_raw, db_raw) = grad.split_at_mut(self.dim.0 * self.dim.1);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw);
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw);

        match (dw, db) {
            (Ok(dw), Ok(db)) => Ok((dw, db)),
            _ => Err(MlErr::SizeMismatch {
                what: "dense gradient",
                got: self.size(),
                expected: self.size(),
            }),
        }
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        self.check_size(params.len())?;

        let (w_raw, b_raw) = params.split_at(self.dim.0 * self.dim.1);
        let w = ArrayView2::from_shape(self.dim, w_raw);
        let b = ArrayView1::from_shape(self.dim.1, b_raw);

        match (w, b) {
            (Ok(w), Ok(b)) => Ok((w, b)),
            _ => Err(MlErr::SizeMismatch {
                what: "dense parameters",
                got: self.size(),
                expected: self.size(),
            }),
        }
    }
}
