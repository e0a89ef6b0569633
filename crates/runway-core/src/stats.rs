//! Statistical helpers for correlation analysis

use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

use crate::error::{Error, Result};

/// |r| at or above this is treated as a perfect linear relationship
const PERFECT_CORRELATION: f64 = 1.0 - 1e-12;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// True when every value is identical (Pearson undefined)
pub fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Pearson correlation coefficient
///
/// Two-pass, mean-centred. Returns None for mismatched lengths, fewer than
/// two points, or a series without variance. The result is clamped to
/// `[-1, 1]` to absorb rounding.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 || is_constant(x) || is_constant(y) {
        return None;
    }

    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Two-tailed p-value for H0: ρ = 0, using Student's t with n − 2 df
pub fn correlation_p_value(r: f64, n: usize) -> Result<f64> {
    if n < 3 {
        return Err(Error::Statistics(format!(
            "p-value needs at least 3 points, got {}",
            n
        )));
    }
    if r.abs() >= PERFECT_CORRELATION {
        return Ok(0.0);
    }

    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|e| Error::Statistics(e.to_string()))?;

    Ok((2.0 * dist.sf(t.abs())).clamp(0.0, 1.0))
}

/// Confidence interval for r via the Fisher z-transform
///
/// Returns None when `n <= 3` (the standard error 1/√(n−3) is undefined).
pub fn fisher_interval(r: f64, n: usize, level: f64) -> Result<Option<(f64, f64)>> {
    if !(level > 0.0 && level < 1.0) {
        return Err(Error::Statistics(format!(
            "Confidence level must be in (0, 1), got {}",
            level
        )));
    }
    if n <= 3 {
        return Ok(None);
    }

    let bounded = r.clamp(-PERFECT_CORRELATION, PERFECT_CORRELATION);
    let z = bounded.atanh();
    let se = 1.0 / ((n - 3) as f64).sqrt();

    let normal = Normal::new(0.0, 1.0).map_err(|e| Error::Statistics(e.to_string()))?;
    let critical = normal.inverse_cdf(1.0 - (1.0 - level) / 2.0);

    Ok(Some((
        (z - critical * se).tanh(),
        (z + critical * se).tanh(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let y_neg = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y_neg).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_known_value() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        // cov = 8, var_x = 10, var_y = 10
        assert!((pearson(&x, &y).unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_undefined() {
        assert!(pearson(&[1.0, 2.0], &[1.0]).is_none());
        assert!(pearson(&[1.0], &[1.0]).is_none());
        assert!(pearson(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_p_value() {
        assert_eq!(correlation_p_value(1.0, 5).unwrap(), 0.0);
        assert!((correlation_p_value(0.0, 10).unwrap() - 1.0).abs() < 1e-12);

        // r = 0.8, n = 5 → t ≈ 2.309 with 3 df → p ≈ 0.104
        let p = correlation_p_value(0.8, 5).unwrap();
        assert!((p - 0.104).abs() < 0.002, "p = {}", p);

        assert!(correlation_p_value(0.5, 2).is_err());
    }

    #[test]
    fn test_fisher_interval() {
        assert!(fisher_interval(0.5, 3, 0.95).unwrap().is_none());
        assert!(fisher_interval(0.5, 10, 1.5).is_err());

        // r = 0.5, n = 28 → z = 0.5493, se = 0.2 → [0.156, 0.736]
        let (lo, hi) = fisher_interval(0.5, 28, 0.95).unwrap().unwrap();
        assert!((lo - 0.156).abs() < 0.002, "lo = {}", lo);
        assert!((hi - 0.736).abs() < 0.002, "hi = {}", hi);

        let (lo, hi) = fisher_interval(1.0, 20, 0.95).unwrap().unwrap();
        assert!(lo > 0.99 && hi <= 1.0);
    }
}
