use crate::C64;

/// Numerical inverse Laplace transform supplied by the model.
///
/// `signal` holds one value per Laplace sample of the model. `times` are
/// ascending and lie within the model bounds. The returned vector has one
/// real value per time and must be deterministic for identical inputs.
pub trait InverseLaplace: Send + Sync {
    fn invert(&self, signal: &[C64], times: &[f64]) -> Vec<f64>;
}

impl<F> InverseLaplace for F
where
    F: Fn(&[C64], &[f64]) -> Vec<f64> + Send + Sync,
{
    fn invert(&self, signal: &[C64], times: &[f64]) -> Vec<f64> {
        self(signal, times)
    }
}
