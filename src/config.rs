//! Application defaults.
//! Nothing here is persisted; the values are compiled in and grouped so the
//! controller and tests can build variations.

/// Window and table defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    pub sidebar_width: f32,
    /// Rows shown in the preview table.
    pub preview_rows: usize,
    pub forecast: ForecastConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Data Visualization & Prediction App".to_string(),
            window_size: [1200.0, 800.0],
            min_window_size: [900.0, 600.0],
            sidebar_width: 300.0,
            preview_rows: 100,
            forecast: ForecastConfig::default(),
        }
    }
}

/// Seasonal ARIMA order `(p, d, q)(P, D, Q)[s]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub seasonal_p: usize,
    pub seasonal_d: usize,
    pub seasonal_q: usize,
    pub period: usize,
}

impl SarimaOrder {
    pub const fn new(order: (usize, usize, usize), seasonal: (usize, usize, usize, usize)) -> Self {
        Self {
            p: order.0,
            d: order.1,
            q: order.2,
            seasonal_p: seasonal.0,
            seasonal_d: seasonal.1,
            seasonal_q: seasonal.2,
            period: seasonal.3,
        }
    }

    /// Number of free coefficients.
    pub fn n_params(&self) -> usize {
        self.p + self.q + self.seasonal_p + self.seasonal_q
    }
}

impl Default for SarimaOrder {
    fn default() -> Self {
        Self::new((1, 1, 1), (1, 1, 1, 12))
    }
}

impl std::fmt::Display for SarimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SARIMA({},{},{})({},{},{})[{}]",
            self.p,
            self.d,
            self.q,
            self.seasonal_p,
            self.seasonal_d,
            self.seasonal_q,
            self.period
        )
    }
}

/// Forecast settings.
#[derive(Debug, Clone)]
pub struct ForecastConfig {
    pub order: SarimaOrder,
    /// Number of periods predicted.
    pub horizon: usize,
    /// Coverage of the prediction interval, e.g. 0.95.
    pub interval_level: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            order: SarimaOrder::default(),
            horizon: 12,
            interval_level: 0.95,
            max_iterations: 2000,
            tolerance: 1e-10,
        }
    }
}
