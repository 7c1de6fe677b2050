//! Unit-cube conditional prior: iid U(0, 1) fields, no hyperparameters
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::traits::ConditionalPrior;
use rand::Rng;
use std::fmt;

/// The simplest conditional prior: every field of a component is iid
/// U(0, 1), native and cube coordinates coincide, and there are no
/// hyperparameters.
///
/// With no hyperparameters the sampler drops the hyperparameter move from
/// its menu. The prior's normalizing constant is exactly 1, which makes it
/// the toy model for exercising the trans-dimensional machinery on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct UnitCubePrior {
    ndim: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum UnitCubePriorError {
    /// ndim is zero
    ZeroDim,
}

impl UnitCubePrior {
    /// Create a new prior over `ndim`-field components
    #[inline]
    pub fn new(ndim: usize) -> Result<Self, UnitCubePriorError> {
        if ndim == 0 {
            Err(UnitCubePriorError::ZeroDim)
        } else {
            Ok(UnitCubePrior { ndim })
        }
    }
}

impl ConditionalPrior for UnitCubePrior {
    #[inline]
    fn ndim(&self) -> usize {
        self.ndim
    }

    #[inline]
    fn n_hyperparams(&self) -> usize {
        0
    }

    fn sample_hyperparams<R: Rng>(&mut self, _rng: &mut R) {}

    fn perturb_hyperparams<R: Rng>(&mut self, _rng: &mut R) -> f64 {
        0.0
    }

    fn to_unit_cube(&self, component: &mut [f64]) {
        debug_assert_eq!(component.len(), self.ndim);
    }

    fn from_unit_cube(&self, component: &mut [f64]) {
        debug_assert_eq!(component.len(), self.ndim);
    }

    fn ln_f(&self, component: &[f64]) -> f64 {
        debug_assert_eq!(component.len(), self.ndim);
        if component.iter().all(|&u| (0.0..=1.0).contains(&u)) {
            0.0
        } else {
            f64::NEG_INFINITY
        }
    }
}

impl From<&UnitCubePrior> for String {
    fn from(prior: &UnitCubePrior) -> String {
        format!("UnitCube(ndim: {})", prior.ndim)
    }
}

impl fmt::Display for UnitCubePrior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from(self))
    }
}

impl std::error::Error for UnitCubePriorError {}

impl fmt::Display for UnitCubePriorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDim => write!(f, "ndim must be at least 1"),
        }
    }
}
