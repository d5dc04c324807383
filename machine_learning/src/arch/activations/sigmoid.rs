/// The logistic function scaled by `amp`.
#[derive(Clone, Debug, Default)]
pub struct Sigmoid {
    amp: f32,
}

impl Sigmoid {
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }

    pub fn f(&self, z: f32) -> f32 {
        self.amp / (1. + (-z).exp())
    }

    pub fn df(&self, z: f32) -> f32 {
        let e = (-z).exp();
        (self.amp * e) / (e + 1.).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn derivative_matches_finite_differences() {
        let s = Sigmoid::new(2.);
        let h = 1e-3;

        for z in [-3., -0.5, 0., 0.7, 4.] {
            let numeric = (s.f(z + h) - s.f(z - h)) / (2. * h);
            assert_abs_diff_eq!(s.df(z), numeric, epsilon = 1e-3);
        }
    }

    #[test]
    fn saturates_at_amp() {
        let s = Sigmoid::new(3.);
        assert_abs_diff_eq!(s.f(0.), 1.5);
        assert_abs_diff_eq!(s.f(50.), 3., epsilon = 1e-6);
    }
}
