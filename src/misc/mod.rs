//! Random utilities
mod func;
mod ks;
mod x2;

pub use func::*;
pub use ks::ks_test;
pub use x2::x2_test;
