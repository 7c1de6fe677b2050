//! Reversible-jump sampler over a variable number of components
#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::buffer::ComponentBuffer;
use crate::misc::{pflip_one, unit_step, wrap_unit};
use crate::traits::ConditionalPrior;
use rand::distributions::Open01;
use rand::Rng;
use std::fmt;

/// The kinds of proposal the sampler draws from its menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum MoveKind {
    /// Random-walk one existing component in cube coordinates
    Perturb = 0,
    /// Random-walk the prior's hyperparameters
    Hyper = 1,
    /// Draw one fresh component from the conditional prior and append it
    Birth = 2,
    /// Remove one uniformly chosen component
    Death = 3,
}

/// Relative weights for the proposal menu.
///
/// Kinds that are illegal at the current occupancy (birth when full, death
/// or perturbation when empty, the hyperparameter move when the prior has
/// none) are masked to zero before selection; the birth/death acceptance
/// ratio accounts for the resulting reweighting, so any non-negative finite
/// weights keep detailed balance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub struct MoveWeights {
    pub perturb: f64,
    pub hyper: f64,
    pub birth: f64,
    pub death: f64,
}

impl Default for MoveWeights {
    fn default() -> Self {
        MoveWeights {
            perturb: 3.0,
            hyper: 1.0,
            birth: 1.0,
            death: 1.0,
        }
    }
}

impl MoveWeights {
    fn is_valid(&self) -> bool {
        let ws = [self.perturb, self.hyper, self.birth, self.death];
        ws.iter().all(|w| w.is_finite() && *w >= 0.0) && ws.iter().sum::<f64>() > 0.0
    }

    /// Menu weights with illegal kinds zeroed, indexed by `MoveKind`
    fn masked(&self, n: usize, n_max: usize, n_hyper: usize) -> [f64; 4] {
        [
            if n >= 1 { self.perturb } else { 0.0 },
            if n_hyper >= 1 { self.hyper } else { 0.0 },
            if n < n_max { self.birth } else { 0.0 },
            if n >= 1 { self.death } else { 0.0 },
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
enum Pending {
    Perturb { ix: usize },
    Hyper,
    Birth,
    Death { ix: usize },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde1", serde(rename_all = "snake_case"))]
pub enum RjSamplerError {
    /// n_max is zero
    ZeroCapacity,
    /// A move weight was negative or non-finite, or all weights were zero
    InvalidWeights,
}

/// A reversible-jump sampler over a variable number of components.
///
/// The sampler owns a [`ComponentBuffer`] holding up to `n_max` components
/// and a [`ConditionalPrior`] whose hyperparameters it perturbs alongside
/// them. Proposals are drawn from a weighted menu of four kinds
/// ([`MoveKind`]); each proposal returns the prior part of the log
/// Metropolis-Hastings ratio, and the caller combines it with a likelihood
/// term before committing with [`accept`](Self::accept) or rolling back
/// with [`reject`](Self::reject).
///
/// Per move the protocol is `propose` then exactly one of `accept` or
/// `reject`. Breaking it (double propose, resolving while idle) is a
/// programming error and panics.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand_xoshiro::Xoshiro256Plus;
/// use rjmc::prelude::*;
///
/// let prior = UniformExpPrior::new(-10.0, 10.0, 1e-3, 1e3).unwrap();
/// let mut sampler = RjSampler::new(10, prior).unwrap();
/// let mut rng = Xoshiro256Plus::seed_from_u64(42);
///
/// sampler.init_from_prior(&mut rng);
///
/// let log_alpha = sampler.propose(&mut rng);
/// if log_alpha >= 0.0 {
///     sampler.accept();
/// } else {
///     sampler.reject();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RjSampler<P: ConditionalPrior + Clone> {
    prior: P,
    buf: ComponentBuffer,
    weights: MoveWeights,
    pending: Option<Pending>,
    /// Pre-move copy of the touched row, reused across moves
    saved_row: Vec<f64>,
    /// Pre-move copy of the prior for hyperparameter rollback
    saved_prior: Option<P>,
}

impl<P: ConditionalPrior + Clone> RjSampler<P> {
    /// Create a sampler with capacity `n_max` and the default move weights
    pub fn new(n_max: usize, prior: P) -> Result<Self, RjSamplerError> {
        Self::with_weights(n_max, prior, MoveWeights::default())
    }

    /// Create a sampler with explicit move weights.
    ///
    /// Setting a weight to zero removes that kind from the menu entirely;
    /// the caller is responsible for leaving at least one legal kind at
    /// every reachable occupancy.
    pub fn with_weights(
        n_max: usize,
        prior: P,
        weights: MoveWeights,
    ) -> Result<Self, RjSamplerError> {
        if n_max == 0 {
            Err(RjSamplerError::ZeroCapacity)
        } else if !weights.is_valid() {
            Err(RjSamplerError::InvalidWeights)
        } else {
            let ndim = prior.ndim();
            Ok(RjSampler {
                prior,
                buf: ComponentBuffer::new(n_max, ndim),
                weights,
                pending: None,
                saved_row: vec![0.0; ndim],
                saved_prior: None,
            })
        }
    }

    /// Number of live components
    #[inline]
    pub fn n(&self) -> usize {
        self.buf.n()
    }

    /// Component capacity
    #[inline]
    pub fn n_max(&self) -> usize {
        self.buf.n_max()
    }

    /// Fields per component
    #[inline]
    pub fn ndim(&self) -> usize {
        self.buf.ndim()
    }

    /// The live components in native coordinates, row-major
    #[inline]
    pub fn components(&self) -> &[f64] {
        self.buf.valid()
    }

    /// One live component in native coordinates
    #[inline]
    pub fn component(&self, ix: usize) -> &[f64] {
        self.buf.row(ix)
    }

    /// The underlying buffer
    #[inline]
    pub fn buffer(&self) -> &ComponentBuffer {
        &self.buf
    }

    /// The conditional prior and its current hyperparameters
    #[inline]
    pub fn prior(&self) -> &P {
        &self.prior
    }

    /// The configured move weights
    #[inline]
    pub fn weights(&self) -> &MoveWeights {
        &self.weights
    }

    /// Kind of the unresolved proposal, if one is pending
    pub fn pending_kind(&self) -> Option<MoveKind> {
        self.pending.map(|p| match p {
            Pending::Perturb { .. } => MoveKind::Perturb,
            Pending::Hyper => MoveKind::Hyper,
            Pending::Birth => MoveKind::Birth,
            Pending::Death { .. } => MoveKind::Death,
        })
    }

    /// Sum of the prior log density over the live components.
    ///
    /// `NEG_INFINITY` if any live component is outside the prior's support,
    /// which never holds between resolved moves.
    pub fn ln_prior(&self) -> f64 {
        self.buf.rows().map(|row| self.prior.ln_f(row)).sum()
    }

    /// Draw (N, hyperparameters, components) from the prior.
    ///
    /// N is uniform over {0, ..., n_max}; components are drawn uniformly in
    /// cube coordinates and mapped to native ones. Total: there is no error
    /// path given a working entropy source.
    ///
    /// # Panics
    ///
    /// Panics if a proposal is pending.
    pub fn init_from_prior<R: Rng>(&mut self, rng: &mut R) {
        assert!(
            self.pending.is_none(),
            "init_from_prior called with an unresolved proposal"
        );
        let n = rng.gen_range(0..=self.buf.n_max());

        let Self { prior, buf, .. } = self;
        prior.sample_hyperparams(rng);
        buf.set_len(0);
        for _ in 0..n {
            let row = buf.push_row();
            for u in row.iter_mut() {
                *u = rng.sample(Open01);
            }
            prior.from_unit_cube(row);
        }
    }

    /// Propose one move from the weighted menu and return the prior part of
    /// the log Metropolis-Hastings ratio.
    ///
    /// The state is left in the proposed configuration; the caller must
    /// resolve it with [`accept`](Self::accept) or [`reject`](Self::reject)
    /// before proposing again. `NEG_INFINITY` means "always reject" and is
    /// a normal return value, not a fault.
    ///
    /// # Panics
    ///
    /// Panics if a proposal is already pending, or if every move kind has
    /// zero weight at the current occupancy.
    pub fn propose<R: Rng>(&mut self, rng: &mut R) -> f64 {
        assert!(
            self.pending.is_none(),
            "propose called with an unresolved proposal"
        );

        let w = self
            .weights
            .masked(self.buf.n(), self.buf.n_max(), self.prior.n_hyperparams());
        let total: f64 = w.iter().sum();
        assert!(total > 0.0, "no legal move kind at the current occupancy");

        match pflip_one(&w, rng) {
            0 => self.propose_perturb(rng),
            1 => self.propose_hyper(rng),
            2 => self.propose_birth(rng),
            _ => self.propose_death(rng),
        }
    }

    /// Commit the pending proposal.
    ///
    /// # Panics
    ///
    /// Panics if no proposal is pending.
    pub fn accept(&mut self) {
        assert!(
            self.pending.take().is_some(),
            "accept called without a pending proposal"
        );
        self.saved_prior = None;
    }

    /// Roll back the pending proposal, restoring (N, components,
    /// hyperparameters) exactly as they were before `propose`.
    ///
    /// # Panics
    ///
    /// Panics if no proposal is pending.
    pub fn reject(&mut self) {
        match self.pending.take() {
            None => panic!("reject called without a pending proposal"),
            Some(Pending::Perturb { ix }) => {
                self.buf.row_mut(ix).copy_from_slice(&self.saved_row);
            }
            Some(Pending::Hyper) => {
                if let Some(prior) = self.saved_prior.take() {
                    self.prior = prior;
                }
            }
            Some(Pending::Birth) => {
                let n = self.buf.n();
                self.buf.set_len(n - 1);
            }
            Some(Pending::Death { ix }) => {
                // regrow over the removed row, then undo the swap
                let n = self.buf.n();
                self.buf.set_len(n + 1);
                self.buf.swap_rows(ix, n);
            }
        }
    }

    /// Do one full Metropolis-Hastings step: propose, fold in the caller's
    /// log likelihood ratio (evaluated on the proposed state), and resolve.
    ///
    /// Returns `true` if the move was accepted. Passing `|_| 0.0` samples
    /// the prior.
    pub fn metropolis_step<R, F>(&mut self, rng: &mut R, ln_like_ratio: F) -> bool
    where
        R: Rng,
        F: FnOnce(&Self) -> f64,
    {
        let log_alpha = self.propose(rng) + ln_like_ratio(self);
        let accept = log_alpha >= 0.0 || {
            let u: f64 = rng.sample(Open01);
            u.ln() < log_alpha
        };
        if accept {
            self.accept();
        } else {
            self.reject();
        }
        accept
    }

    /// Log probability of selecting `kind` from the menu at occupancy `n`
    fn ln_menu_prob(&self, kind: MoveKind, n: usize) -> f64 {
        let w = self
            .weights
            .masked(n, self.buf.n_max(), self.prior.n_hyperparams());
        let total: f64 = w.iter().sum();
        (w[kind as usize] / total).ln()
    }

    /// Random-walk one component in cube coordinates with periodic wrap.
    ///
    /// The conditional prior is uniform in cube coordinates and the wrapped
    /// heavy-tailed kernel is symmetric, so the prior contribution to the
    /// acceptance ratio is exactly zero.
    fn propose_perturb<R: Rng>(&mut self, rng: &mut R) -> f64 {
        let Self {
            prior,
            buf,
            saved_row,
            ..
        } = self;

        let ix = rng.gen_range(0..buf.n());
        let row = buf.row_mut(ix);
        saved_row.copy_from_slice(row);

        prior.to_unit_cube(row);
        for u in row.iter_mut() {
            *u = wrap_unit(*u + unit_step(rng));
        }
        prior.from_unit_cube(row);

        self.pending = Some(Pending::Perturb { ix });
        0.0
    }

    /// Random-walk the hyperparameters with the components held fixed in
    /// native coordinates; the acceptance ratio is the kernel's log-Hastings
    /// factor plus the change in the components' prior log density.
    fn propose_hyper<R: Rng>(&mut self, rng: &mut R) -> f64 {
        let before = self.ln_prior();
        self.saved_prior = Some(self.prior.clone());

        let mut log_alpha = self.prior.perturb_hyperparams(rng);
        log_alpha += self.ln_prior() - before;

        self.pending = Some(Pending::Hyper);
        log_alpha
    }

    /// Append one fresh prior draw.
    ///
    /// The new component's prior density cancels against its proposal
    /// density, and the prior over N is uniform, so what remains is the
    /// menu asymmetry: the probability of selecting the reverse death at
    /// occupancy n+1 over the probability of this birth at occupancy n.
    /// (The uniform death-selection factor 1/(n+1) cancels against the
    /// number of equivalent orderings of the grown state.)
    fn propose_birth<R: Rng>(&mut self, rng: &mut R) -> f64 {
        let n = self.buf.n();
        let log_alpha =
            self.ln_menu_prob(MoveKind::Death, n + 1) - self.ln_menu_prob(MoveKind::Birth, n);

        let Self { prior, buf, .. } = self;
        let row = buf.push_row();
        for u in row.iter_mut() {
            *u = rng.sample(Open01);
        }
        prior.from_unit_cube(row);

        self.pending = Some(Pending::Birth);
        log_alpha
    }

    /// Swap-remove one uniformly chosen component; the mirror of a birth.
    fn propose_death<R: Rng>(&mut self, rng: &mut R) -> f64 {
        let n = self.buf.n();
        let ix = rng.gen_range(0..n);
        let log_alpha =
            self.ln_menu_prob(MoveKind::Birth, n - 1) - self.ln_menu_prob(MoveKind::Death, n);

        self.buf.swap_remove(ix);

        self.pending = Some(Pending::Death { ix });
        log_alpha
    }
}

impl std::error::Error for RjSamplerError {}

impl fmt::Display for RjSamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "n_max must be at least 1"),
            Self::InvalidWeights => {
                write!(f, "move weights must be non-negative, finite, and not all zero")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prior::{UniformExpPrior, UnitCubePrior};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    fn reference_prior() -> UniformExpPrior {
        UniformExpPrior::new(-10.0, 10.0, 1e-3, 1e3).unwrap()
    }

    fn only(kind: MoveKind) -> MoveWeights {
        MoveWeights {
            perturb: if kind == MoveKind::Perturb { 1.0 } else { 0.0 },
            hyper: if kind == MoveKind::Hyper { 1.0 } else { 0.0 },
            birth: if kind == MoveKind::Birth { 1.0 } else { 0.0 },
            death: if kind == MoveKind::Death { 1.0 } else { 0.0 },
        }
    }

    #[test]
    fn new_rejects_zero_capacity() {
        assert!(RjSampler::new(0, reference_prior()).is_err());
        assert!(RjSampler::new(1, reference_prior()).is_ok());
    }

    #[test]
    fn with_weights_rejects_bad_weights() {
        let bad = MoveWeights {
            perturb: -1.0,
            ..MoveWeights::default()
        };
        assert_eq!(
            RjSampler::with_weights(4, reference_prior(), bad).unwrap_err(),
            RjSamplerError::InvalidWeights
        );

        let zero = MoveWeights {
            perturb: 0.0,
            hyper: 0.0,
            birth: 0.0,
            death: 0.0,
        };
        assert!(RjSampler::with_weights(4, reference_prior(), zero).is_err());
    }

    #[test]
    fn init_from_prior_yields_a_consistent_state() {
        let mut rng = Xoshiro256Plus::seed_from_u64(1);
        let mut sampler = RjSampler::new(10, reference_prior()).unwrap();
        for _ in 0..100 {
            sampler.init_from_prior(&mut rng);
            assert!(sampler.n() <= 10);
            assert!(sampler.ln_prior().is_finite());
            assert_eq!(sampler.components().len(), sampler.n() * sampler.ndim());
        }
    }

    #[test]
    fn rollback_restores_state_after_perturb() {
        rollback_check(MoveKind::Perturb, 5);
    }

    #[test]
    fn rollback_restores_state_after_hyper() {
        rollback_check(MoveKind::Hyper, 5);
    }

    #[test]
    fn rollback_restores_state_after_birth() {
        rollback_check(MoveKind::Birth, 5);
    }

    #[test]
    fn rollback_restores_state_after_death() {
        rollback_check(MoveKind::Death, 5);
    }

    fn rollback_check(kind: MoveKind, n_target: usize) {
        let mut rng = Xoshiro256Plus::seed_from_u64(kind as u64 + 7);
        let mut sampler =
            RjSampler::with_weights(10, reference_prior(), only(kind)).unwrap();

        // land on a state with room in both directions
        loop {
            sampler.init_from_prior(&mut rng);
            if sampler.n() == n_target {
                break;
            }
        }

        for _ in 0..100 {
            let n_before = sampler.n();
            let components_before = sampler.components().to_vec();
            let mu_before = sampler.prior().mu();

            let _ = sampler.propose(&mut rng);
            assert_eq!(sampler.pending_kind(), Some(kind));
            sampler.reject();

            assert_eq!(sampler.n(), n_before);
            assert_eq!(sampler.components(), components_before.as_slice());
            assert_eq!(sampler.prior().mu(), mu_before);
        }
    }

    #[test]
    fn birth_and_death_log_alphas_mirror_each_other() {
        let mut rng = Xoshiro256Plus::seed_from_u64(11);
        let mut sampler = RjSampler::new(10, reference_prior()).unwrap();
        loop {
            sampler.init_from_prior(&mut rng);
            if sampler.n() == 5 {
                break;
            }
        }

        // interior occupancy: the menu is identical at n and n+1, so the
        // asymmetry terms reduce to the weight ratio, here ln(1/1) = 0
        let w = MoveWeights::default();
        let expected_birth = (w.death / w.birth).ln();
        let expected_death = (w.birth / w.death).ln();

        for _ in 0..100 {
            let log_alpha = sampler.propose(&mut rng);
            let kind = sampler.pending_kind().unwrap();
            sampler.reject();
            match kind {
                MoveKind::Birth => assert::close(log_alpha, expected_birth, 1E-12),
                MoveKind::Death => assert::close(log_alpha, expected_death, 1E-12),
                _ => (),
            }
        }
    }

    #[test]
    fn birth_without_a_reverse_death_is_always_rejected() {
        let mut rng = Xoshiro256Plus::seed_from_u64(21);
        let mut sampler =
            RjSampler::with_weights(10, reference_prior(), only(MoveKind::Birth)).unwrap();
        loop {
            sampler.init_from_prior(&mut rng);
            if sampler.n() == 5 {
                break;
            }
        }
        let log_alpha = sampler.propose(&mut rng);
        sampler.reject();
        assert_eq!(log_alpha, f64::NEG_INFINITY);
    }

    #[test]
    fn perturb_log_alpha_is_zero() {
        let mut rng = Xoshiro256Plus::seed_from_u64(12);
        let mut sampler =
            RjSampler::with_weights(10, reference_prior(), only(MoveKind::Perturb)).unwrap();
        loop {
            sampler.init_from_prior(&mut rng);
            if sampler.n() >= 1 {
                break;
            }
        }
        for _ in 0..100 {
            let log_alpha = sampler.propose(&mut rng);
            assert_eq!(log_alpha, 0.0);
            assert!(sampler.ln_prior().is_finite());
            sampler.accept();
        }
    }

    #[test]
    fn menu_masks_illegal_kinds_when_empty() {
        let mut rng = Xoshiro256Plus::seed_from_u64(13);
        let mut sampler = RjSampler::new(4, UnitCubePrior::new(2).unwrap()).unwrap();
        loop {
            sampler.init_from_prior(&mut rng);
            if sampler.n() == 0 {
                break;
            }
        }
        // no components and no hyperparameters: only birth is legal
        let _ = sampler.propose(&mut rng);
        assert_eq!(sampler.pending_kind(), Some(MoveKind::Birth));
        sampler.reject();
    }

    #[test]
    fn menu_masks_birth_when_full() {
        let mut rng = Xoshiro256Plus::seed_from_u64(14);
        let mut sampler = RjSampler::with_weights(
            3,
            reference_prior(),
            MoveWeights {
                perturb: 0.0,
                hyper: 0.0,
                birth: 1.0,
                death: 1.0,
            },
        )
        .unwrap();
        loop {
            sampler.init_from_prior(&mut rng);
            if sampler.n() == 3 {
                break;
            }
        }
        let _ = sampler.propose(&mut rng);
        assert_eq!(sampler.pending_kind(), Some(MoveKind::Death));
        sampler.reject();
    }

    #[test]
    fn hyper_move_is_legal_with_an_empty_buffer() {
        let mut rng = Xoshiro256Plus::seed_from_u64(15);
        let mut sampler =
            RjSampler::with_weights(4, reference_prior(), only(MoveKind::Hyper)).unwrap();
        loop {
            sampler.init_from_prior(&mut rng);
            if sampler.n() == 0 {
                break;
            }
        }
        let log_alpha = sampler.propose(&mut rng);
        // empty density sum on both sides of the ratio
        assert_eq!(log_alpha, 0.0);
        sampler.accept();
    }

    #[test]
    #[should_panic(expected = "unresolved proposal")]
    fn double_propose_panics() {
        let mut rng = Xoshiro256Plus::seed_from_u64(16);
        let mut sampler = RjSampler::new(4, reference_prior()).unwrap();
        sampler.init_from_prior(&mut rng);
        let _ = sampler.propose(&mut rng);
        let _ = sampler.propose(&mut rng);
    }

    #[test]
    #[should_panic(expected = "without a pending proposal")]
    fn accept_while_idle_panics() {
        let prior = reference_prior();
        let mut sampler = RjSampler::new(4, prior).unwrap();
        sampler.accept();
    }

    #[test]
    #[should_panic(expected = "without a pending proposal")]
    fn reject_while_idle_panics() {
        let prior = reference_prior();
        let mut sampler = RjSampler::new(4, prior).unwrap();
        sampler.reject();
    }

    #[test]
    fn metropolis_step_resolves_every_proposal() {
        let mut rng = Xoshiro256Plus::seed_from_u64(17);
        let mut sampler = RjSampler::new(10, reference_prior()).unwrap();
        sampler.init_from_prior(&mut rng);
        for _ in 0..1_000 {
            sampler.metropolis_step(&mut rng, |_| 0.0);
            assert!(sampler.pending_kind().is_none());
        }
    }
}
