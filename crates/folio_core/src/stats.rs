//! Numeric helpers shared by the engines
//!
//! Every helper here returns a finite number: empty inputs, zero
//! denominators and NaN results collapse to a caller-supplied or zero default.

/// Replace NaN and infinities with `default`
#[inline]
#[must_use]
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

/// `numerator / denominator`, or `default` when the denominator is zero or the result is not finite
#[inline]
#[must_use]
pub fn safe_div(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        return default;
    }
    finite_or(numerator / denominator, default)
}

#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    finite_or(values.iter().sum::<f64>() / values.len() as f64, 0.0)
}

// Rounding in `mean` would otherwise leave a tiny non-zero spread
fn is_constant(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] == w[1])
}

/// Sample standard deviation (n - 1 denominator). Fewer than two values gives 0.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 || is_constant(values) {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    finite_or(variance.sqrt(), 0.0)
}

/// Population standard deviation (n denominator)
#[must_use]
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() || is_constant(values) {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    finite_or(variance.sqrt(), 0.0)
}

/// Percentile of an ascending-sorted slice using linear interpolation between closest ranks.
///
/// `p` is in `[0, 100]`.
#[must_use]
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            finite_or(sorted[lo] + (sorted[hi] - sorted[lo]) * frac, 0.0)
        }
    }
}

/// Sort a copy of `values` ascending, treating NaN as equal
#[must_use]
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Worst peak-to-trough decline of a wealth path as a percentage (zero or negative).
///
/// Points where the running peak is not positive are skipped.
#[must_use]
pub fn max_drawdown_pct(path: &[f64]) -> f64 {
    let Some(&first) = path.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut worst = 0.0_f64;
    for &value in path {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let drawdown = (value - peak) / peak * 100.0;
            if drawdown < worst {
                worst = drawdown;
            }
        }
    }
    finite_or(worst, 0.0)
}

#[inline]
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    finite_or((value * factor).round() / factor, 0.0)
}

/// Two decimals, for currency and percentages
#[inline]
#[must_use]
pub fn round_currency(value: f64) -> f64 {
    round_to(value, 2)
}

/// Four decimals, for ratios
#[inline]
#[must_use]
pub fn round_ratio(value: f64) -> f64 {
    round_to(value, 4)
}
