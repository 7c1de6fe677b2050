//! Reversible-jump MCMC building blocks.
//!
//! This crate provides the trans-dimensional core of a nested-sampling or
//! posterior-sampling run: a [`RjSampler`](sampler::RjSampler) that explores
//! a state made of an unknown number of components, each a short vector of
//! real parameters, under a hierarchical [`ConditionalPrior`](traits::ConditionalPrior)
//! whose hyperparameters are inferred alongside the components.
//!
//! The sampler owns a fixed-capacity [`ComponentBuffer`](buffer::ComponentBuffer)
//! and proposes moves from a weighted menu: in-place perturbation of one
//! component, a hyperparameter random walk, and reversible-jump birth/death
//! moves that grow or shrink the component count. Each proposal returns the
//! prior part of the log Metropolis-Hastings ratio; the caller folds in a
//! likelihood term and commits or rolls back.
//!
//! # Example
//!
//! Run a prior-only chain (likelihood ratio fixed at 1):
//!
//! ```
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//! use rjmc::prelude::*;
//!
//! let prior = UniformExpPrior::new(-10.0, 10.0, 1e-3, 1e3).unwrap();
//! let mut sampler = RjSampler::new(10, prior).unwrap();
//!
//! let mut rng = Xoshiro256Plus::seed_from_u64(0x5EED);
//! sampler.init_from_prior(&mut rng);
//!
//! for _ in 0..1_000 {
//!     sampler.metropolis_step(&mut rng, |_| 0.0);
//! }
//!
//! assert!(sampler.n() <= 10);
//! assert!(sampler.ln_prior().is_finite());
//! ```
pub mod buffer;
pub mod misc;
pub mod prelude;
pub mod prior;
pub mod sampler;
pub mod traits;
