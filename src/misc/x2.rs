use special::Gamma;

/// Χ<sup>2</sup> (chi-squared) goodness-of-fit test.
///
/// Returns the test statistic and the p-value against the hypothesis that
/// the observed counts `f_obs` were drawn with cell probabilities `ps`.
///
/// # Example
///
/// Counts from a fair four-sided die look uniform.
///
/// ```
/// use rjmc::misc::x2_test;
///
/// let f_obs: Vec<u32> = vec![251, 240, 263, 246];
/// let ps: Vec<f64> = vec![0.25; 4];
///
/// let (_, p) = x2_test(&f_obs, &ps);
/// assert!(p > 0.05);
/// ```
pub fn x2_test(f_obs: &[u32], ps: &[f64]) -> (f64, f64) {
    let n: f64 = f_obs.iter().map(|&ct| f64::from(ct)).sum();
    let x2 = f_obs.iter().zip(ps.iter()).fold(0.0, |acc, (&o, &p)| {
        let e = n * p;
        acc + (f64::from(o) - e).powi(2) / e
    });

    let df = (f_obs.len() - 1) as f64;
    let p = 1.0 - (x2 / 2.0).inc_gamma(df / 2.0);
    (x2, p)
}
