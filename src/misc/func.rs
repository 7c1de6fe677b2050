use rand::distributions::Open01;
use rand::Rng;
use rand_distr::StandardNormal;

/// Heavy-tailed random-walk increment scaled to the unit interval.
///
/// Draws `10^(1.5 - 6u) * z` with `u ~ U(0, 1)` and `z` standard normal.
/// The step scale spans roughly six orders of magnitude, so one kernel
/// serves both bold and fine moves in cube coordinates without tuning.
///
/// # Example
///
/// ```rust
/// # use rjmc::misc::unit_step;
/// let mut rng = rand::thread_rng();
/// let dx = unit_step(&mut rng);
/// assert!(dx.is_finite());
/// ```
pub fn unit_step<R: Rng>(rng: &mut R) -> f64 {
    let u: f64 = rng.sample(Open01);
    let z: f64 = rng.sample(StandardNormal);
    10.0_f64.powf(6.0_f64.mul_add(-u, 1.5)) * z
}

/// Wrap `x` periodically into [0, 1).
///
/// # Example
///
/// ```rust
/// # use rjmc::misc::wrap_unit;
/// assert_eq!(wrap_unit(0.25), 0.25);
/// assert_eq!(wrap_unit(1.25), 0.25);
/// assert_eq!(wrap_unit(-0.25), 0.75);
/// ```
pub fn wrap_unit(x: f64) -> f64 {
    let w = x - x.floor();
    // x - floor(x) can round up to 1.0 for tiny negative x
    if w >= 1.0 {
        0.0
    } else {
        w
    }
}

/// Draw one index in proportion to `weights` without allocating.
///
/// Weights must be non-negative, finite, and sum to a positive value.
///
/// # Panics
///
/// Panics if all weights are zero.
pub fn pflip_one<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().sum();
    assert!(total > 0.0, "all weights are zero");

    let r: f64 = rng.gen::<f64>() * total;
    let mut acc = 0.0;
    for (ix, &w) in weights.iter().enumerate() {
        acc += w;
        if r < acc {
            return ix;
        }
    }
    // r landed on the top of the cumulative sum
    weights.len() - 1
}
