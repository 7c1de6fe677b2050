//! The conditional-prior seam between a model and the sampler
use rand::Rng;

/// The hierarchical prior p(component | hyperparameters) together with the
/// current hyperparameter values.
///
/// Implementations define a bijection between a component's native
/// coordinates and the unit hypercube [0, 1]<sup>ndim</sup>: the forward map
/// sends each field through its prior CDF, so the conditional prior is
/// uniform in cube coordinates. The sampler draws and perturbs proposals in
/// that space and maps them back, which makes its random-walk kernel exactly
/// prior-preserving.
///
/// `ln_f` evaluates the log density of one component in native coordinates
/// and returns `f64::NEG_INFINITY` outside the hard support. That value is a
/// sentinel consumed by the acceptance arithmetic, not an error.
///
/// The set of implementations is closed and chosen at construction time; the
/// sampler is generic over `P: ConditionalPrior`, so dispatch is static.
pub trait ConditionalPrior {
    /// Number of fields in one component vector
    fn ndim(&self) -> usize;

    /// Number of inferred hyperparameters.
    ///
    /// Returning 0 removes the hyperparameter move from the sampler's menu.
    fn n_hyperparams(&self) -> usize;

    /// Overwrite the stored hyperparameters with a draw from the hyperprior
    fn sample_hyperparams<R: Rng>(&mut self, rng: &mut R);

    /// Random-walk the stored hyperparameters, returning the log-Hastings
    /// factor of the kernel.
    ///
    /// A symmetric walk in the hyperparameter's own unit-cube coordinate
    /// (with periodic wrap) returns 0; the sampler adds the component
    /// density difference itself.
    fn perturb_hyperparams<R: Rng>(&mut self, rng: &mut R) -> f64;

    /// Map one component from native coordinates into [0, 1]^ndim in place,
    /// given the current hyperparameters
    fn to_unit_cube(&self, component: &mut [f64]);

    /// Map one component from [0, 1]^ndim back to native coordinates in
    /// place.
    ///
    /// Inputs of exactly 0 or 1 on unbounded fields must be clamped into
    /// the open interval rather than mapped to non-finite values.
    fn from_unit_cube(&self, component: &mut [f64]);

    /// Log density of one component in native coordinates under the current
    /// hyperparameters; `f64::NEG_INFINITY` outside the hard support
    fn ln_f(&self, component: &[f64]) -> f64;
}
