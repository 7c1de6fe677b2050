//! Re-imports for convenience
#[doc(no_inline)]
pub use crate::buffer::ComponentBuffer;
#[doc(no_inline)]
pub use crate::prior::{UniformExpPrior, UnitCubePrior};
#[doc(no_inline)]
pub use crate::sampler::{MoveKind, MoveWeights, RjSampler};
#[doc(no_inline)]
pub use crate::traits::ConditionalPrior;
