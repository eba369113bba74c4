//! Seasonal ARIMA Module
//!
//! SARIMA(p,d,q)(P,D,Q)[s] estimated by conditional sum of squares (CSS).
//!
//! The series `y` is differenced with `(1 - B)^d (1 - B^s)^D` into `w`, and
//! `w` follows
//!
//! ```text
//! φ(B) Φ(B^s) w_t = θ(B) Θ(B^s) e_t
//! ```
//!
//! Coefficients are searched with Nelder-Mead on `tanh`-transformed values so
//! every AR and MA coefficient stays inside (-1, 1). Innovations before the
//! first full AR window are taken as zero. No constant term is estimated, as
//! is usual once the series has been differenced.

use statrs::distribution::{ContinuousCDF, Normal};
use std::fmt;
use thiserror::Error;

use super::optimizer::{nelder_mead, NelderMeadConfig};
use crate::config::SarimaOrder;

#[derive(Error, Debug)]
pub enum SarimaError {
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("series contains NaN or infinite values")]
    NonFinite,
    #[error("model fitting failed: {0}")]
    FitFailed(String),
    #[error("interval level must be in (0, 1), got {0}")]
    InvalidLevel(f64),
    #[error("model has not been fitted")]
    NotFitted,
}

/// Fitted coefficients and fit diagnostics.
#[derive(Debug, Clone)]
pub struct ModelSummary {
    pub order: SarimaOrder,
    pub ar: Vec<f64>,
    pub seasonal_ar: Vec<f64>,
    pub ma: Vec<f64>,
    pub seasonal_ma: Vec<f64>,
    /// Innovation variance estimate.
    pub sigma2: f64,
    pub sse: f64,
    pub n_obs: usize,
    pub iterations: usize,
    pub converged: bool,
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = |v: &[f64]| {
            v.iter()
                .map(|c| format!("{c:.3}"))
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(
            f,
            "{} ar=[{}] sar=[{}] ma=[{}] sma=[{}] sigma2={:.4}",
            self.order,
            list(&self.ar),
            list(&self.seasonal_ar),
            list(&self.ma),
            list(&self.seasonal_ma),
            self.sigma2
        )
    }
}

#[derive(Debug, Clone)]
struct FittedState {
    summary: ModelSummary,
    ar_poly: Vec<f64>,
    ma_poly: Vec<f64>,
    diff_poly: Vec<f64>,
    history: Vec<f64>,
    differenced: Vec<f64>,
    residuals: Vec<f64>,
}

/// Seasonal ARIMA model.
#[derive(Debug, Clone)]
pub struct Sarima {
    order: SarimaOrder,
    optimizer: NelderMeadConfig,
    fitted: Option<FittedState>,
}

impl Sarima {
    pub fn new(order: SarimaOrder) -> Self {
        Self {
            order,
            optimizer: NelderMeadConfig::default(),
            fitted: None,
        }
    }

    pub fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Smallest series length that leaves at least one CSS residual per
    /// coefficient after differencing.
    pub fn min_observations(&self) -> usize {
        let o = &self.order;
        let ar_lags = o.p + o.seasonal_p * o.period;
        let ma_lags = o.q + o.seasonal_q * o.period;
        o.d + o.seasonal_d * o.period + ar_lags.max(ma_lags) + o.n_params().max(1)
    }

    pub fn summary(&self) -> Option<&ModelSummary> {
        self.fitted.as_ref().map(|f| &f.summary)
    }

    /// Fit the model to `data` (oldest first).
    pub fn fit(&mut self, data: &[f64]) -> Result<(), SarimaError> {
        let required = self.min_observations();
        if data.len() < required {
            return Err(SarimaError::InsufficientData {
                required,
                actual: data.len(),
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(SarimaError::NonFinite);
        }

        let order = self.order;
        let diff_poly = difference_poly(order.d, order.seasonal_d, order.period);
        let differenced = apply_difference(data, &diff_poly);

        let objective = |u: &[f64]| {
            let (ar_poly, ma_poly) = lag_polynomials(&order, u);
            let start = ar_poly.len() - 1;
            css_residuals(&differenced, &ar_poly, &ma_poly)[start..]
                .iter()
                .map(|e| e * e)
                .sum::<f64>()
        };

        let initial = vec![0.1; order.n_params()];
        let result = nelder_mead(objective, &initial, self.optimizer);

        if !result.optimal_value.is_finite() {
            return Err(SarimaError::FitFailed(
                "conditional sum of squares is not finite".to_string(),
            ));
        }
        if !result.converged {
            log::warn!(
                "{order} did not converge after {} iterations (sse={:.4})",
                result.iterations,
                result.optimal_value
            );
        }
        log::debug!(
            "{order} optimizer: {} iterations, sse={:.6}",
            result.iterations,
            result.optimal_value
        );

        let coeffs: Vec<f64> = result.optimal_point.iter().map(|u| u.tanh()).collect();
        let (ar, seasonal_ar, ma, seasonal_ma) = split_coefficients(&order, &coeffs);
        let (ar_poly, ma_poly) = lag_polynomials(&order, &result.optimal_point);
        let residuals = css_residuals(&differenced, &ar_poly, &ma_poly);

        let effective = differenced.len() - (ar_poly.len() - 1);
        let sigma2 = result.optimal_value / effective as f64;

        self.fitted = Some(FittedState {
            summary: ModelSummary {
                order,
                ar,
                seasonal_ar,
                ma,
                seasonal_ma,
                sigma2,
                sse: result.optimal_value,
                n_obs: data.len(),
                iterations: result.iterations,
                converged: result.converged,
            },
            ar_poly,
            ma_poly,
            diff_poly,
            history: data.to_vec(),
            differenced,
            residuals,
        });

        Ok(())
    }

    /// Point forecasts for the next `steps` periods after the fitted series.
    pub fn predict(&self, steps: usize) -> Result<Vec<f64>, SarimaError> {
        let fitted = self.fitted.as_ref().ok_or(SarimaError::NotFitted)?;

        let m = fitted.differenced.len();
        let mut w = fitted.differenced.clone();
        let mut e = fitted.residuals.clone();

        for t in m..m + steps {
            let mut value = 0.0;
            for (i, c) in fitted.ar_poly.iter().enumerate().skip(1) {
                value -= c * lagged(&w, t, i);
            }
            for (j, c) in fitted.ma_poly.iter().enumerate().skip(1) {
                value += c * lagged(&e, t, j);
            }
            w.push(value);
            e.push(0.0);
        }

        Ok(integrate(&fitted.history, &w[m..], &fitted.diff_poly))
    }

    /// Point forecasts with symmetric normal prediction bounds at `level`.
    ///
    /// Returns `(mean, lower, upper)`.
    pub fn predict_intervals(
        &self,
        steps: usize,
        level: f64,
    ) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), SarimaError> {
        if !(level > 0.0 && level < 1.0) {
            return Err(SarimaError::InvalidLevel(level));
        }
        let fitted = self.fitted.as_ref().ok_or(SarimaError::NotFitted)?;
        let mean = self.predict(steps)?;

        let normal = Normal::new(0.0, 1.0).map_err(|e| SarimaError::FitFailed(e.to_string()))?;
        let z = normal.inverse_cdf(0.5 + level / 2.0);

        let full_ar = poly_mul(&fitted.ar_poly, &fitted.diff_poly);
        let psi = psi_weights(&full_ar, &fitted.ma_poly, steps);

        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        for (h, value) in mean.iter().enumerate() {
            cumulative += psi[h] * psi[h];
            let half_width = z * (fitted.summary.sigma2 * cumulative).sqrt();
            lower.push(value - half_width);
            upper.push(value + half_width);
        }

        Ok((mean, lower, upper))
    }
}

fn lagged(values: &[f64], t: usize, lag: usize) -> f64 {
    if lag <= t {
        values.get(t - lag).copied().unwrap_or(0.0)
    } else {
        0.0
    }
}

pub(crate) fn poly_mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 + sign * (c_1 B^step + c_2 B^{2 step} + ...)`
fn lag_poly(coeffs: &[f64], step: usize, sign: f64) -> Vec<f64> {
    let mut poly = vec![0.0; coeffs.len() * step + 1];
    poly[0] = 1.0;
    for (k, c) in coeffs.iter().enumerate() {
        poly[(k + 1) * step] = sign * c;
    }
    poly
}

/// `(1 - B)^d (1 - B^s)^D`
pub(crate) fn difference_poly(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = poly_mul(&poly, &lag_poly(&[1.0], 1, -1.0));
    }
    for _ in 0..seasonal_d {
        poly = poly_mul(&poly, &lag_poly(&[1.0], period, -1.0));
    }
    poly
}

pub(crate) fn apply_difference(data: &[f64], poly: &[f64]) -> Vec<f64> {
    let k = poly.len() - 1;
    (k..data.len())
        .map(|t| poly.iter().enumerate().map(|(i, c)| c * data[t - i]).sum())
        .collect()
}

/// Undo differencing: extend `history` by the differenced forecasts.
pub(crate) fn integrate(history: &[f64], future: &[f64], poly: &[f64]) -> Vec<f64> {
    let n = history.len();
    let mut y = history.to_vec();
    for (h, w) in future.iter().enumerate() {
        let t = n + h;
        let mut value = *w;
        for (i, c) in poly.iter().enumerate().skip(1) {
            value -= c * lagged(&y, t, i);
        }
        y.push(value);
    }
    y.split_off(n)
}

fn split_coefficients(
    order: &SarimaOrder,
    coeffs: &[f64],
) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let (ar, rest) = coeffs.split_at(order.p);
    let (seasonal_ar, rest) = rest.split_at(order.seasonal_p);
    let (ma, seasonal_ma) = rest.split_at(order.q);
    (
        ar.to_vec(),
        seasonal_ar.to_vec(),
        ma.to_vec(),
        seasonal_ma[..order.seasonal_q].to_vec(),
    )
}

/// AR and MA lag polynomials from unconstrained parameters.
fn lag_polynomials(order: &SarimaOrder, unconstrained: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let coeffs: Vec<f64> = unconstrained.iter().map(|u| u.tanh()).collect();
    let (ar, seasonal_ar, ma, seasonal_ma) = split_coefficients(order, &coeffs);

    let ar_poly = poly_mul(
        &lag_poly(&ar, 1, -1.0),
        &lag_poly(&seasonal_ar, order.period, -1.0),
    );
    let ma_poly = poly_mul(
        &lag_poly(&ma, 1, 1.0),
        &lag_poly(&seasonal_ma, order.period, 1.0),
    );
    (ar_poly, ma_poly)
}

/// One-step innovations, zero before the first full AR window.
fn css_residuals(w: &[f64], ar_poly: &[f64], ma_poly: &[f64]) -> Vec<f64> {
    let start = ar_poly.len() - 1;
    let mut e = vec![0.0; w.len()];
    for t in start..w.len() {
        let mut value = 0.0;
        for (i, c) in ar_poly.iter().enumerate() {
            value += c * w[t - i];
        }
        for (j, c) in ma_poly.iter().enumerate().skip(1) {
            value -= c * lagged(&e, t, j);
        }
        e[t] = value;
    }
    e
}

/// MA(∞) weights of `ar(B) y = ma(B) e`.
fn psi_weights(ar: &[f64], ma: &[f64], count: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(count);
    for j in 0..count {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = ma.get(j).copied().unwrap_or(0.0);
        for i in 1..=j.min(ar.len() - 1) {
            value -= ar[i] * psi[j - i];
        }
        psi.push(value);
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seasonal_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| {
                let t = t as f64;
                let noise = ((t as usize * 7 + 3) % 5) as f64 * 0.2 - 0.4;
                100.0 + 2.0 * t + 10.0 * (2.0 * std::f64::consts::PI * t / 12.0).sin() + noise
            })
            .collect()
    }

    #[test]
    fn test_difference_poly_default_order() {
        let poly = difference_poly(1, 1, 12);
        assert_eq!(poly.len(), 14);
        assert_eq!(poly[0], 1.0);
        assert_eq!(poly[1], -1.0);
        assert_eq!(poly[12], -1.0);
        assert_eq!(poly[13], 1.0);
    }

    #[test]
    fn test_integrate_inverts_difference() {
        let data = seasonal_series(40);
        let poly = difference_poly(1, 1, 12);
        let w = apply_difference(&data, &poly);
        assert_eq!(w.len(), 40 - 13);

        // Rebuild the last 5 observations from the first 35 and their differences.
        let rebuilt = integrate(&data[..35], &w[w.len() - 5..], &poly);
        for (a, b) in rebuilt.iter().zip(&data[35..]) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let mut model = Sarima::new(SarimaOrder::default());
        let err = model.fit(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            SarimaError::InsufficientData { actual: 3, .. }
        ));
        assert!(model.summary().is_none());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut model = Sarima::new(SarimaOrder::default());
        let mut data = seasonal_series(48);
        data[10] = f64::NAN;
        assert!(matches!(model.fit(&data), Err(SarimaError::NonFinite)));
    }

    #[test]
    fn test_predict_before_fit() {
        let model = Sarima::new(SarimaOrder::default());
        assert!(matches!(model.predict(12), Err(SarimaError::NotFitted)));
    }

    #[test]
    fn test_linear_trend_is_continued_exactly() {
        let data: Vec<f64> = (0..36).map(|t| 3.0 * t as f64 + 1.0).collect();
        let mut model = Sarima::new(SarimaOrder::default());
        model.fit(&data).unwrap();

        let forecast = model.predict(12).unwrap();
        assert_eq!(forecast.len(), 12);
        for (h, value) in forecast.iter().enumerate() {
            let expected = 3.0 * (36 + h) as f64 + 1.0;
            assert!((value - expected).abs() < 1e-6, "h={h}: {value} vs {expected}");
        }
    }

    #[test]
    fn test_seasonal_series_forecast() {
        let data = seasonal_series(72);
        let mut model = Sarima::new(SarimaOrder::default());
        model.fit(&data).unwrap();

        let (mean, lower, upper) = model.predict_intervals(12, 0.95).unwrap();
        assert_eq!(mean.len(), 12);
        assert!(mean.iter().all(|v| v.is_finite()));

        // Trend of 2 per step lifts next year's average by about 24.
        let last_year = data[60..].iter().sum::<f64>() / 12.0;
        let next_year = mean.iter().sum::<f64>() / 12.0;
        let lift = next_year - last_year;
        assert!(lift > 12.0 && lift < 36.0, "lift = {lift}");

        let mut previous_width = 0.0;
        for h in 0..12 {
            assert!(lower[h] <= mean[h] && mean[h] <= upper[h]);
            let width = upper[h] - lower[h];
            assert!(width + 1e-9 >= previous_width);
            previous_width = width;
        }

        let summary = model.summary().unwrap();
        assert_eq!(summary.n_obs, 72);
        assert!(summary.ar[0].abs() < 1.0);
        assert!(summary.seasonal_ma[0].abs() < 1.0);
    }

    #[test]
    fn test_invalid_interval_level() {
        let data: Vec<f64> = (0..36).map(|t| t as f64).collect();
        let mut model = Sarima::new(SarimaOrder::default());
        model.fit(&data).unwrap();
        assert!(matches!(
            model.predict_intervals(12, 1.5),
            Err(SarimaError::InvalidLevel(_))
        ));
    }
}
