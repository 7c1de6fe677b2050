//! Conditional prior implementations
//!
//! The set is closed: a sampler is constructed with one concrete prior and
//! dispatches to it statically through
//! [`ConditionalPrior`](crate::traits::ConditionalPrior).
mod uniform_exp;
mod unit_cube;

pub use self::uniform_exp::{UniformExpPrior, UniformExpPriorError};
pub use self::unit_cube::{UnitCubePrior, UnitCubePriorError};
