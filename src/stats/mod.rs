//! Stats module - seasonal ARIMA forecasting

mod forecaster;
mod optimizer;
mod sarima;

pub use forecaster::{ForecastError, ForecastPoint, ForecastResult, Forecaster};
pub use sarima::ModelSummary;
