//! Small numeric helpers shared by the analyzers

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (Bessel-corrected, n - 1 denominator)
///
/// Needs at least two values.
pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Ordinary least-squares slope of `y` over `x`
///
/// Returns `None` with fewer than two points and `Some(0.0)` when every `x`
/// is identical.
pub fn least_squares_slope(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }

    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let numerator: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let denominator: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();

    if denominator == 0.0 {
        Some(0.0)
    } else {
        Some(numerator / denominator)
    }
}

/// Round to a fixed number of decimals (half away from zero)
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[28.0, 30.0, 26.0]), Some(28.0));
    }

    #[test]
    fn test_sample_stddev() {
        assert_eq!(sample_stddev(&[28.0]), None);
        let sd = sample_stddev(&[28.0, 30.0, 26.0]).unwrap();
        assert!((sd - 2.0).abs() < 1e-9);
        assert_eq!(sample_stddev(&[5.0, 5.0, 5.0]), Some(0.0));
    }

    #[test]
    fn test_least_squares_slope() {
        assert_eq!(least_squares_slope(&[(0.0, 3.0)]), None);

        let rising = [(0.0, 2.0), (1.0, 4.0), (2.0, 6.0)];
        assert!((least_squares_slope(&rising).unwrap() - 2.0).abs() < 1e-9);

        let falling = [(0.0, 9.0), (2.0, 5.0)];
        assert!((least_squares_slope(&falling).unwrap() + 2.0).abs() < 1e-9);

        let vertical = [(1.0, 2.0), (1.0, 8.0)];
        assert_eq!(least_squares_slope(&vertical), Some(0.0));
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(85.714285, 1), 85.7);
        assert_eq!(round_to(33.35, 0), 33.0);
        assert_eq!(round_to(2.346, 2), 2.35);
        assert_eq!(round_to(-0.25, 1), -0.3);
    }
}
