//! Augmented Dickey-Fuller test for unit roots
//!
//! Implements the constant-only ADF regression
//! `Δy_t = α + β·y_{t-1} + Σ γ_i·Δy_{t-i} + e_t` with the lag order chosen
//! by AIC, and maps the test statistic to an approximate p-value with the
//! MacKinnon (1994) response surface. The decision rule downstream is the
//! conventional one: failing to reject the unit-root null at the 5% level
//! marks the series non-stationary.

use statrs::function::erf::erf;

use crate::error::{ForecastError, Result};

/// Significance level for the non-stationarity decision
pub const ADF_SIGNIFICANCE: f64 = 0.05;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

// MacKinnon response-surface coefficients for the constant-only case,
// in increasing powers of tau. The quadratic covers tau <= TAU_STAR,
// the cubic the remainder; outside [TAU_MIN, TAU_MAX] the p-value is clamped.
const TAU_STAR: f64 = -1.61;
const TAU_MIN: f64 = -18.83;
const TAU_MAX: f64 = 2.74;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.15032, -0.03333];

/// Outcome of an Augmented Dickey-Fuller test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdfResult {
    /// The tau statistic, `β̂ / se(β̂)`
    pub statistic: f64,
    /// MacKinnon approximate p-value for the unit-root null
    pub p_value: f64,
    /// Number of lagged difference terms included in the regression
    pub used_lag: usize,
    /// Number of rows in the final regression
    pub nobs: usize,
}

impl AdfResult {
    /// True when the unit-root null cannot be rejected at the 5% level
    pub fn is_nonstationary(&self) -> bool {
        self.p_value > ADF_SIGNIFICANCE
    }
}

/// Run the ADF test on a gap-free price sequence.
///
/// The lag order is selected by AIC over `0..=maxlag` with
/// `maxlag = min(ceil(12·(n/100)^¼), n/2 − 2)`; all candidate regressions use
/// the same number of rows so their AICs are comparable. Candidates whose
/// regression has no residual degrees of freedom are skipped, which keeps
/// very short series from producing a saturated fit and a NaN statistic.
pub fn adf_test(series: &[f64]) -> Result<AdfResult> {
    let n = series.len();
    if n < 4 {
        return Err(ForecastError::Stationarity(format!(
            "series too short for ADF test: {} observations, need at least 4",
            n
        )));
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::Stationarity(
            "series contains non-finite values".to_string(),
        ));
    }
    let (min, max) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return Err(ForecastError::Stationarity(
            "series is constant".to_string(),
        ));
    }

    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let maxlag = schwert.min((n / 2).saturating_sub(2));

    let used_lag = select_lag_by_aic(series, maxlag)?;

    // Final regression re-uses every available row for the chosen lag.
    let fit = adf_regression(series, used_lag, used_lag)?;
    let statistic = fit.params[0] / fit.stderrs[0];
    if !statistic.is_finite() {
        return Err(ForecastError::Stationarity(
            "degenerate regression: test statistic is not finite".to_string(),
        ));
    }

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p(statistic),
        used_lag,
        nobs: fit.nobs,
    })
}

/// Pick the lag minimizing AIC, holding the sample fixed at `maxlag` rows lost
fn select_lag_by_aic(series: &[f64], maxlag: usize) -> Result<usize> {
    let mut best: Option<(f64, usize)> = None;

    for lag in 0..=maxlag {
        let fit = match adf_regression(series, lag, maxlag) {
            Ok(fit) => fit,
            // Saturated or singular candidates drop out of the search
            Err(_) => continue,
        };
        let nobs = fit.nobs as f64;
        let k = fit.params.len() as f64;
        let aic = if fit.ssr > 0.0 {
            nobs * (fit.ssr / nobs).ln() + 2.0 * k
        } else {
            f64::NEG_INFINITY
        };
        if best.map_or(true, |(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }

    match best {
        Some((_, lag)) => Ok(lag),
        None => Err(ForecastError::Stationarity(
            "no usable lag order for ADF regression".to_string(),
        )),
    }
}

/// Run the ADF regression with `lag` difference terms, dropping the first
/// `startlag + 1` observations so candidates with different lags share rows.
/// Parameter order: `y_{t-1}`, lagged differences, constant.
fn adf_regression(series: &[f64], lag: usize, startlag: usize) -> Result<OlsFit> {
    let n = series.len();
    let first = startlag + 1;
    if first >= n {
        return Err(ForecastError::Stationarity(
            "not enough observations for ADF regression".to_string(),
        ));
    }

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut y = Vec::with_capacity(n - first);
    let mut x = Vec::with_capacity(n - first);
    for t in first..n {
        // diff[t - 1] is Δy_t
        y.push(diff[t - 1]);
        let mut row = Vec::with_capacity(lag + 2);
        row.push(series[t - 1]);
        for i in 1..=lag {
            row.push(diff[t - 1 - i]);
        }
        row.push(1.0);
        x.push(row);
    }

    ols(&y, &x)
}

struct OlsFit {
    params: Vec<f64>,
    stderrs: Vec<f64>,
    ssr: f64,
    nobs: usize,
}

/// Ordinary least squares via the normal equations.
///
/// The regressor count is at most a handful here, so a dense Gauss-Jordan
/// inversion of X'X is adequate. Requires at least one residual degree of
/// freedom so standard errors are defined.
fn ols(y: &[f64], x: &[Vec<f64>]) -> Result<OlsFit> {
    let nobs = y.len();
    let k = x.first().map_or(0, |row| row.len());
    if k == 0 || nobs <= k {
        return Err(ForecastError::Stationarity(
            "no residual degrees of freedom in regression".to_string(),
        ));
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (row, &yi) in x.iter().zip(y.iter()) {
        for i in 0..k {
            xty[i] += row[i] * yi;
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let inv = invert(xtx).ok_or_else(|| {
        ForecastError::Stationarity("singular design matrix in regression".to_string())
    })?;

    let params: Vec<f64> = (0..k)
        .map(|i| (0..k).map(|j| inv[i][j] * xty[j]).sum())
        .collect();

    let mut ssr = 0.0;
    for (row, &yi) in x.iter().zip(y.iter()) {
        let fitted: f64 = row.iter().zip(params.iter()).map(|(xi, b)| xi * b).sum();
        ssr += (yi - fitted) * (yi - fitted);
    }

    let sigma2 = ssr / (nobs - k) as f64;
    let stderrs: Vec<f64> = (0..k).map(|i| (sigma2 * inv[i][i]).sqrt()).collect();

    Ok(OlsFit { params, stderrs, ssr, nobs })
}

/// Gauss-Jordan inversion with partial pivoting; `None` on singularity
fn invert(mut m: Vec<Vec<f64>>) -> Option<Vec<Vec<f64>>> {
    let k = m.len();
    let scale = m
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    let tol = 1e-12 * scale.max(1.0);

    let mut inv: Vec<Vec<f64>> = (0..k)
        .map(|i| (0..k).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&a, &b| m[a][col].abs().partial_cmp(&m[b][col].abs()).unwrap_or(std::cmp::Ordering::Equal))?;
        if m[pivot_row][col].abs() < tol {
            return None;
        }
        m.swap(col, pivot_row);
        inv.swap(col, pivot_row);

        let pivot = m[col][col];
        for j in 0..k {
            m[col][j] /= pivot;
            inv[col][j] /= pivot;
        }
        for row in 0..k {
            if row == col {
                continue;
            }
            let factor = m[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..k {
                m[row][j] -= factor * m[col][j];
                inv[row][j] -= factor * inv[col][j];
            }
        }
    }

    Some(inv)
}

/// MacKinnon (1994) approximate p-value for the constant-only tau statistic
fn mackinnon_p(statistic: f64) -> f64 {
    if statistic <= TAU_MIN {
        return 0.0;
    }
    if statistic >= TAU_MAX {
        return 1.0;
    }
    let z = if statistic <= TAU_STAR {
        polyval(&TAU_SMALL_P, statistic)
    } else {
        polyval(&TAU_LARGE_P, statistic)
    };
    norm_cdf(z).clamp(0.0, 1.0)
}

/// Evaluate a polynomial given coefficients in increasing powers
fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Standard normal CDF
fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / SQRT_2))
}
