//! Uniform-position, exponential-amplitude conditional prior
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::misc::{unit_step, wrap_unit};
use crate::traits::ConditionalPrior;
use rand::Rng;
use std::fmt;

/// Margin keeping unit-cube inputs inside the open interval, so the inverse
/// amplitude transform never produces 0 or infinity
const UNIT_EPS: f64 = 1e-12;

/// The classic mass-inference conditional prior over two-field components
/// (position, amplitude).
///
/// Position is uniform on the fixed interval `[x_min, x_max]`. Amplitude is
/// exponential with mean `mu`, where `mu` is an inferred hyperparameter
/// with a log-uniform hyperprior on `[mu_min, mu_max]`.
///
/// The unit-cube transform sends position through its affine CDF and
/// amplitude through the exponential CDF `1 - exp(-a/mu)`; the inverse is
/// `-mu ln(1 - u)` with the input clamped into the open interval.
///
/// # Example
///
/// ```
/// use rjmc::prelude::*;
///
/// let prior = UniformExpPrior::new(-10.0, 10.0, 1e-3, 1e3).unwrap();
///
/// // inside support: finite; negative amplitude: rejected outright
/// assert!(prior.ln_f(&[0.0, 1.0]).is_finite());
/// assert_eq!(prior.ln_f(&[0.0, -1.0]), f64::NEG_INFINITY);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct UniformExpPrior {
    x_min: f64,
    x_max: f64,
    mu_min: f64,
    mu_max: f64,
    /// Mean of the exponential prior over amplitudes
    mu: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum UniformExpPriorError {
    /// x_min >= x_max
    InvalidInterval { x_min: f64, x_max: f64 },
    /// One of the position bounds was infinite or NaN
    IntervalNotFinite { x_min: f64, x_max: f64 },
    /// mu_min <= 0, mu_min >= mu_max, or a non-finite scale bound
    InvalidScaleRange { mu_min: f64, mu_max: f64 },
    /// Attempt to set mu outside [mu_min, mu_max]
    ScaleOutOfRange { mu: f64 },
}

impl UniformExpPrior {
    /// Create a new prior with position bounds `[x_min, x_max]` and scale
    /// hyperprior range `[mu_min, mu_max]`.
    ///
    /// The stored `mu` starts at the geometric mean of its range; call
    /// `sample_hyperparams` to draw it from the hyperprior.
    pub fn new(
        x_min: f64,
        x_max: f64,
        mu_min: f64,
        mu_max: f64,
    ) -> Result<Self, UniformExpPriorError> {
        if !x_min.is_finite() || !x_max.is_finite() {
            Err(UniformExpPriorError::IntervalNotFinite { x_min, x_max })
        } else if x_min >= x_max {
            Err(UniformExpPriorError::InvalidInterval { x_min, x_max })
        } else if !(mu_min > 0.0) || !mu_min.is_finite() || !mu_max.is_finite() || mu_min >= mu_max
        {
            Err(UniformExpPriorError::InvalidScaleRange { mu_min, mu_max })
        } else {
            Ok(Self::new_unchecked(x_min, x_max, mu_min, mu_max))
        }
    }

    /// Creates a new UniformExpPrior without checking whether the parameters
    /// are valid.
    #[inline]
    pub fn new_unchecked(x_min: f64, x_max: f64, mu_min: f64, mu_max: f64) -> Self {
        let mu = (0.5 * (mu_min.ln() + mu_max.ln())).exp();
        UniformExpPrior {
            x_min,
            x_max,
            mu_min,
            mu_max,
            mu,
        }
    }

    /// Lower position bound
    #[inline]
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Upper position bound
    #[inline]
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Current amplitude scale hyperparameter
    #[inline]
    pub fn mu(&self) -> f64 {
        self.mu
    }

    /// Set the amplitude scale hyperparameter
    ///
    /// # Example
    ///
    /// ```
    /// # use rjmc::prior::UniformExpPrior;
    /// let mut prior = UniformExpPrior::new(-10.0, 10.0, 1e-3, 1e3).unwrap();
    ///
    /// assert!(prior.set_mu(2.5).is_ok());
    /// assert_eq!(prior.mu(), 2.5);
    /// assert!(prior.set_mu(1e4).is_err());
    /// assert!(prior.set_mu(-1.0).is_err());
    /// ```
    pub fn set_mu(&mut self, mu: f64) -> Result<(), UniformExpPriorError> {
        if mu < self.mu_min || mu > self.mu_max || !mu.is_finite() {
            Err(UniformExpPriorError::ScaleOutOfRange { mu })
        } else {
            self.mu = mu;
            Ok(())
        }
    }

    /// Set mu without input validation
    #[inline]
    pub fn set_mu_unchecked(&mut self, mu: f64) {
        self.mu = mu;
    }

    #[inline]
    fn ln_mu_span(&self) -> f64 {
        (self.mu_max / self.mu_min).ln()
    }
}

impl ConditionalPrior for UniformExpPrior {
    #[inline]
    fn ndim(&self) -> usize {
        2
    }

    #[inline]
    fn n_hyperparams(&self) -> usize {
        1
    }

    fn sample_hyperparams<R: Rng>(&mut self, rng: &mut R) {
        // log-uniform over [mu_min, mu_max]
        let u: f64 = rng.gen();
        self.mu = (self.ln_mu_span().mul_add(u, self.mu_min.ln())).exp();
    }

    fn perturb_hyperparams<R: Rng>(&mut self, rng: &mut R) -> f64 {
        // symmetric walk in the hyperprior's own cube coordinate
        let span = self.ln_mu_span();
        let v = (self.mu / self.mu_min).ln() / span;
        let v = wrap_unit(v + unit_step(rng));
        self.mu = (span.mul_add(v, self.mu_min.ln())).exp();
        0.0
    }

    fn to_unit_cube(&self, component: &mut [f64]) {
        debug_assert_eq!(component.len(), 2);
        component[0] = (component[0] - self.x_min) / (self.x_max - self.x_min);
        component[1] = 1.0 - (-component[1] / self.mu).exp();
    }

    fn from_unit_cube(&self, component: &mut [f64]) {
        debug_assert_eq!(component.len(), 2);
        component[0] = (self.x_max - self.x_min).mul_add(component[0], self.x_min);
        let u = component[1].clamp(UNIT_EPS, 1.0 - UNIT_EPS);
        component[1] = -self.mu * (1.0 - u).ln();
    }

    fn ln_f(&self, component: &[f64]) -> f64 {
        debug_assert_eq!(component.len(), 2);
        let x = component[0];
        let a = component[1];
        if x < self.x_min || x > self.x_max || a < 0.0 {
            f64::NEG_INFINITY
        } else {
            -(self.x_max - self.x_min).ln() - self.mu.ln() - a / self.mu
        }
    }
}

impl From<&UniformExpPrior> for String {
    fn from(prior: &UniformExpPrior) -> String {
        format!(
            "UniformExp(x: [{}, {}], μ: {})",
            prior.x_min, prior.x_max, prior.mu
        )
    }
}

impl fmt::Display for UniformExpPrior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from(self))
    }
}

impl std::error::Error for UniformExpPriorError {}

impl fmt::Display for UniformExpPriorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInterval { x_min, x_max } => {
                write!(f, "invalid interval: [{}, {}]", x_min, x_max)
            }
            Self::IntervalNotFinite { x_min, x_max } => {
                write!(f, "non-finite interval: [{}, {}]", x_min, x_max)
            }
            Self::InvalidScaleRange { mu_min, mu_max } => {
                write!(f, "invalid scale range: [{}, {}]", mu_min, mu_max)
            }
            Self::ScaleOutOfRange { mu } => {
                write!(f, "mu ({}) outside the hyperprior range", mu)
            }
        }
    }
}
