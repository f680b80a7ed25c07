//! Numeric primitives shared by the analytics and prediction engines
//!
//! All helpers are total over their inputs: empty or too-short slices yield 0
//! (or an explicit `InsufficientData` trend label) instead of panicking, since
//! every caller treats short windows as a recoverable condition.

use serde::{Deserialize, Serialize};

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median; 0 for an empty slice
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation (n-1 denominator); 0 for fewer than 2 samples
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Nearest-rank percentile (p in [0, 100]); 0 for an empty slice
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[rank]
}

/// Pearson correlation coefficient in [-1, 1]
///
/// 0 for mismatched lengths, fewer than 2 points, or zero variance on
/// either side.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);

    let numerator: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();
    let denominator = x.iter().map(|xi| (xi - mean_x).powi(2)).sum::<f64>().sqrt()
        * y.iter().map(|yi| (yi - mean_y).powi(2)).sum::<f64>().sqrt();

    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Ordinary-least-squares slope of value against index; 0 for <2 points
pub fn trend_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len();
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let numerator: f64 = values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64 - x_mean) * (v - y_mean))
        .sum();
    let denominator: f64 = (0..n).map(|i| (i as f64 - x_mean).powi(2)).sum();

    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Coefficient of variation (stdev / mean); 0 when the mean is 0
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    sample_std_dev(values) / m
}

/// Qualitative direction of a series, comparing first-half and second-half means
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

/// Classify a series as increasing/decreasing/stable at a ±5% band
pub fn classify_trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::InsufficientData;
    }

    let first_half = mean(&values[..values.len() / 2]);
    let second_half = mean(&values[values.len() / 2..]);

    if second_half > first_half * 1.05 {
        Trend::Increasing
    } else if second_half < first_half * 0.95 {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Round to 1 decimal place (for percentage display fields)
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Round to 2 decimal places (for currency fields)
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_within_bounds() {
        let values = [3.0, 7.5, 1.2, 9.9, 4.4];
        let m = mean(&values);
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(m >= min && m <= max);
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_median_even_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_std_dev_constant_sequence_is_zero() {
        assert_eq!(sample_std_dev(&[5.0, 5.0, 5.0, 5.0]), 0.0);
    }

    #[test]
    fn test_std_dev_single_sample_is_zero() {
        assert_eq!(sample_std_dev(&[42.0]), 0.0);
    }

    #[test]
    fn test_std_dev_sample_denominator() {
        // Sample variance of [2, 4] is (1 + 1) / 1 = 2
        let sd = sample_std_dev(&[2.0, 4.0]);
        assert!((sd - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);

        let inv = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &inv) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[2.0, 5.0, 9.0]), 0.0);
    }

    #[test]
    fn test_trend_slope_linear() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert!((trend_slope(&values) - 10.0).abs() < 1e-12);
        assert_eq!(trend_slope(&[7.0]), 0.0);
    }

    #[test]
    fn test_classify_trend() {
        assert_eq!(classify_trend(&[10.0, 10.0, 20.0, 20.0]), Trend::Increasing);
        assert_eq!(classify_trend(&[20.0, 20.0, 10.0, 10.0]), Trend::Decreasing);
        assert_eq!(classify_trend(&[10.0, 10.0, 10.0, 10.0]), Trend::Stable);
        assert_eq!(classify_trend(&[10.0]), Trend::InsufficientData);
    }

    #[test]
    fn test_percentile() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 50.0), 3.0);
        assert_eq!(percentile(&values, 100.0), 5.0);
    }
}
