//! Sample statistics over return series.
//!
//! Every estimator returns `None` when the input is too short or degenerate
//! (e.g. zero variance) instead of producing an infinite or NaN ratio.

/// Standard deviations at or below this are treated as zero variance.
pub const ZERO_VARIANCE: f64 = 1e-12;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator). Needs at least two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Returns a sorted copy, NaNs last.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut copy = values.to_vec();
    copy.sort_by(|a, b| a.total_cmp(b));
    copy
}

/// Quantile of an ascending slice, interpolating linearly between the two
/// nearest order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    if n == 1 {
        return Some(sorted[0]);
    }

    let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    if idx + 1 < n {
        Some(sorted[idx] + (sorted[idx + 1] - sorted[idx]) * frac)
    } else {
        Some(sorted[idx])
    }
}

/// Adjusted Fisher-Pearson skewness. Needs at least three values.
pub fn skewness(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 3 {
        return None;
    }
    let m = mean(values)?;
    let s = non_zero(sample_std(values)?)?;
    let n = n as f64;

    let sum_cubed: f64 = values.iter().map(|v| ((v - m) / s).powi(3)).sum();
    Some(n / ((n - 1.0) * (n - 2.0)) * sum_cubed)
}

/// Unbiased excess kurtosis (0 for a normal distribution). Needs at least
/// four values.
pub fn excess_kurtosis(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 4 {
        return None;
    }
    let m = mean(values)?;
    let s = non_zero(sample_std(values)?)?;
    let n = n as f64;

    let sum_fourth: f64 = values.iter().map(|v| ((v - m) / s).powi(4)).sum();
    let scale = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
    let correction = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
    Some(scale * sum_fourth - correction)
}

/// Pearson correlation between the series and itself shifted by `lag`.
pub fn autocorrelation(values: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || values.len() < lag + 2 {
        return None;
    }
    let lead = &values[lag..];
    let lagged = &values[..values.len() - lag];
    pearson(lead, lagged)
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;

    let mut covariance = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        covariance += (x - mean_a) * (y - mean_b);
        var_a += (x - mean_a) * (x - mean_a);
        var_b += (y - mean_b) * (y - mean_b);
    }

    let denominator = (var_a * var_b).sqrt();
    if denominator <= ZERO_VARIANCE {
        return None;
    }
    Some(covariance / denominator)
}

/// Historical value-at-risk and expected shortfall at `confidence`.
///
/// VaR is the `1 - confidence` quantile of the returns; CVaR is the mean of
/// the returns at or below it. Both are returns (typically negative), not
/// loss magnitudes.
pub fn historical_var(values: &[f64], confidence: f64) -> Option<(f64, f64)> {
    let ordered = sorted(values);
    let var = quantile(&ordered, 1.0 - confidence)?;
    let tail: Vec<f64> = ordered.iter().copied().filter(|v| *v <= var).collect();
    let cvar = mean(&tail).unwrap_or(var);
    Some((var, cvar))
}

/// Mean excess return over its standard deviation, per period.
pub fn sharpe_ratio(returns: &[f64], risk_free_per_period: f64) -> Option<f64> {
    let m = mean(returns)?;
    let s = non_zero(sample_std(returns)?)?;
    Some((m - risk_free_per_period) / s)
}

/// Mean excess return over the standard deviation of the negative returns
/// only, per period. Needs at least two negative returns.
pub fn sortino_ratio(returns: &[f64], risk_free_per_period: f64) -> Option<f64> {
    let m = mean(returns)?;
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let s = non_zero(sample_std(&downside)?)?;
    Some((m - risk_free_per_period) / s)
}

/// Compound growth rate of `final_equity` (from a base of 1.0) over
/// `horizon_years`.
pub fn cagr(final_equity: f64, horizon_years: f64) -> Option<f64> {
    if final_equity <= 0.0 || horizon_years <= 0.0 {
        return None;
    }
    let rate = final_equity.powf(1.0 / horizon_years) - 1.0;
    rate.is_finite().then_some(rate)
}

/// Growth rate over the magnitude of the worst drawdown.
pub fn calmar_ratio(cagr: Option<f64>, max_drawdown: f64) -> Option<f64> {
    let magnitude = max_drawdown.abs();
    if magnitude <= ZERO_VARIANCE {
        return None;
    }
    cagr.map(|rate| rate / magnitude)
}

fn non_zero(std: f64) -> Option<f64> {
    (std.is_finite() && std > ZERO_VARIANCE).then_some(std)
}
