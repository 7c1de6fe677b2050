use std::cmp::Ordering;

/// One-sample, two-sided Kolmogorov-Smirnov test.
///
/// Returns the KS statistic, D, and the asymptotic (large-N) p-value against
/// the hypothesis that `xs` were drawn from the distribution with CDF `cdf`.
///
/// # Example
///
/// ```
/// use rjmc::misc::ks_test;
///
/// // 0.05, 0.15, ..., 0.95 is about as uniform as 10 points get
/// let xs: Vec<f64> = (0..10).map(|i| 0.05 + 0.1 * i as f64).collect();
/// let (d, p) = ks_test(&xs, |x| x);
///
/// assert!(d < 0.06);
/// assert!(p > 0.99);
/// ```
pub fn ks_test<F: Fn(f64) -> f64>(xs: &[f64], cdf: F) -> (f64, f64) {
    let mut ys: Vec<f64> = xs.to_vec();
    ys.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = ys.len() as f64;
    let d = ys.iter().enumerate().fold(0.0_f64, |acc, (i, y)| {
        let f = cdf(*y);
        let lo = (f - i as f64 / n).abs();
        let hi = ((i + 1) as f64 / n - f).abs();
        acc.max(lo.max(hi))
    });

    (d, ks_sf(n.sqrt() * d))
}

/// Survival function of the asymptotic Kolmogorov distribution,
/// Q(t) = 2 Σ_{k≥1} (-1)^(k-1) exp(-2 k² t²)
fn ks_sf(t: f64) -> f64 {
    if t <= 0.0 {
        return 1.0;
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let kf = k as f64;
        let term = (-2.0 * kf * kf * t * t).exp();
        sum += sign * term;
        sign = -sign;
        if term < 1E-16 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}
