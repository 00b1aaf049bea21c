//! ARIMA models for time series forecasting

use crate::error::{ForecastError, Result};
use crate::models::ForecastResult;

// Coefficient bound keeping the AR part stationary and the MA part invertible
const COEF_BOUND: f64 = 0.99;
// Step schedule for the coordinate-descent refinement of the CSS objective
const STEP_SCHEDULE: [f64; 4] = [0.2, 0.05, 0.01, 0.002];

/// ARIMA model (AutoRegressive Integrated Moving Average)
///
/// Fitting minimizes the conditional sum of squared one-step errors over the
/// `d`-times differenced series, with pre-sample errors set to zero. No
/// constant term is included, matching the standard treatment for
/// differenced models.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
}

/// Fitted ARIMA model, ready to forecast
#[derive(Debug, Clone)]
pub struct FittedArima {
    name: String,
    /// Fitted AR coefficients
    ar_coefficients: Vec<f64>,
    /// Fitted MA coefficients
    ma_coefficients: Vec<f64>,
    /// The differenced series the model was fitted on
    diffed: Vec<f64>,
    /// One-step residuals over the differenced series
    residuals: Vec<f64>,
    /// Last value of each partially differenced series, outermost first;
    /// used to integrate forecasts back to the level scale
    integration_tails: Vec<f64>,
}

impl ArimaModel {
    /// Create a new ARIMA model with the given order
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
        }
    }

    /// Get the name of the model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fit the model to a level-scale series by conditional sum of squares
    pub fn fit(&self, values: &[f64]) -> Result<FittedArima> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Estimation(
                "series contains non-finite values".to_string(),
            ));
        }
        let min_len = self.p + self.d + self.q + 1;
        if values.len() < min_len {
            return Err(ForecastError::Estimation(format!(
                "Insufficient data for {}. Need at least {} observations, got {}.",
                self.name,
                min_len,
                values.len()
            )));
        }

        let mut integration_tails = Vec::with_capacity(self.d);
        let mut diffed = values.to_vec();
        for _ in 0..self.d {
            integration_tails.push(diffed[diffed.len() - 1]);
            diffed = diffed.windows(2).map(|w| w[1] - w[0]).collect();
        }

        let (ar_coefficients, ma_coefficients) = estimate_css(&diffed, self.p, self.q);
        let residuals = one_step_residuals(&diffed, &ar_coefficients, &ma_coefficients);

        Ok(FittedArima {
            name: self.name.clone(),
            ar_coefficients,
            ma_coefficients,
            diffed,
            residuals,
            integration_tails,
        })
    }
}

impl FittedArima {
    /// Name of the fitted model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fitted AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Fitted MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Produce a level-scale point forecast `horizon` steps ahead
    pub fn forecast(&self, horizon: usize) -> Result<ForecastResult> {
        if self.diffed.is_empty() {
            return Err(ForecastError::Estimation(
                "Model has not been fitted to data".to_string(),
            ));
        }

        let n = self.diffed.len();

        let mut extended = self.diffed.clone();
        let mut forecasts = Vec::with_capacity(horizon);
        for h in 0..horizon {
            let t = n + h;
            let mut value = 0.0;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                if t >= i + 1 {
                    value += phi * extended[t - i - 1];
                }
            }
            // Future shocks have zero expectation; only in-sample residuals
            // contribute to the MA part
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                let lag = j + 1;
                if t >= lag && t - lag < n {
                    value += theta * self.residuals[t - lag];
                }
            }
            extended.push(value);
            forecasts.push(value);
        }

        // Undo the differencing, innermost level first
        for &tail in self.integration_tails.iter().rev() {
            let mut running = tail;
            for f in forecasts.iter_mut() {
                running += *f;
                *f = running;
            }
        }

        if forecasts.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Estimation(
                "forecast produced non-finite values".to_string(),
            ));
        }

        ForecastResult::new(forecasts, horizon)
    }
}

/// One-step prediction errors of an ARMA(p, q) over `y`, pre-sample errors zero
fn one_step_residuals(y: &[f64], phi: &[f64], theta: &[f64]) -> Vec<f64> {
    let mut residuals = vec![0.0; y.len()];
    for t in 0..y.len() {
        let mut predicted = 0.0;
        for (i, c) in phi.iter().enumerate() {
            if t >= i + 1 {
                predicted += c * y[t - i - 1];
            }
        }
        for (j, c) in theta.iter().enumerate() {
            if t >= j + 1 {
                predicted += c * residuals[t - j - 1];
            }
        }
        residuals[t] = y[t] - predicted;
    }
    residuals
}

/// Conditional sum of squared one-step errors
fn css(y: &[f64], phi: &[f64], theta: &[f64]) -> f64 {
    let residuals = one_step_residuals(y, phi, theta);
    let start = phi.len();
    let ssr: f64 = residuals[start..].iter().map(|e| e * e).sum();
    if ssr.is_finite() {
        ssr
    } else {
        f64::INFINITY
    }
}

/// Minimize the CSS objective by cyclic coordinate descent with a shrinking
/// step schedule. Starts at the origin and accepts only strict improvement,
/// so a degenerate series (constant after differencing) keeps all
/// coefficients at zero and forecasts flat.
fn estimate_css(y: &[f64], p: usize, q: usize) -> (Vec<f64>, Vec<f64>) {
    let mut params = vec![0.0; p + q];
    if params.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let objective = |params: &[f64]| css(y, &params[..p], &params[p..]);
    let mut best = objective(&params);

    for &step in STEP_SCHEDULE.iter() {
        loop {
            let mut improved = false;
            for i in 0..params.len() {
                for direction in [-1.0, 1.0] {
                    loop {
                        let candidate = params[i] + direction * step;
                        if candidate.abs() > COEF_BOUND {
                            break;
                        }
                        let previous = params[i];
                        params[i] = candidate;
                        let value = objective(&params);
                        if value < best {
                            best = value;
                            improved = true;
                        } else {
                            params[i] = previous;
                            break;
                        }
                    }
                }
            }
            if !improved {
                break;
            }
        }
    }

    (params[..p].to_vec(), params[p..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_is_an_estimation_error() {
        let model = ArimaModel::new(1, 1, 1);
        let err = model.fit(&[100.0, 101.0, 102.0]).unwrap_err();
        assert!(matches!(err, ForecastError::Estimation(_)));
        assert!(err.to_string().contains("Insufficient data"));
    }

    #[test]
    fn non_finite_input_is_an_estimation_error() {
        let model = ArimaModel::new(1, 1, 1);
        let err = model.fit(&[100.0, f64::NAN, 102.0, 103.0, 104.0]).unwrap_err();
        assert!(matches!(err, ForecastError::Estimation(_)));
    }

    #[test]
    fn constant_series_forecasts_flat() {
        let model = ArimaModel::new(1, 1, 1);
        let fitted = model.fit(&[50.0; 20]).unwrap();
        let forecast = fitted.forecast(3).unwrap();
        for value in forecast.values() {
            assert!((value - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn ar_coefficient_is_recovered_from_a_simulated_ar_process() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;
        use rand_distr::{Distribution, Normal};

        // y_t = 0.7 y_{t-1} + shock, zero mean
        let mut rng = StdRng::seed_from_u64(3);
        let noise = Normal::new(0.0, 1.0).unwrap();
        let mut y = vec![0.0];
        for t in 1..400 {
            let next = 0.7 * y[t - 1] + noise.sample(&mut rng);
            y.push(next);
        }
        let model = ArimaModel::new(1, 0, 0);
        let fitted = model.fit(&y).unwrap();
        let phi = fitted.ar_coefficients()[0];
        assert!((phi - 0.7).abs() < 0.1, "phi = {}", phi);
    }

    #[test]
    fn forecast_has_requested_horizon_and_is_finite() {
        let values: Vec<f64> = (0..30).map(|t| 100.0 + (t as f64 * 0.7).sin() * 3.0).collect();
        let model = ArimaModel::new(1, 1, 1);
        let forecast = model.fit(&values).unwrap().forecast(3).unwrap();
        assert_eq!(forecast.horizons(), 3);
        assert_eq!(forecast.values().len(), 3);
        assert!(forecast.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn five_observation_series_fits() {
        let model = ArimaModel::new(1, 1, 1);
        let fitted = model.fit(&[100.0, 101.0, 99.0, 102.0, 103.0]).unwrap();
        let forecast = fitted.forecast(3).unwrap();
        assert!(forecast.values().iter().all(|v| v.is_finite()));
    }
}
