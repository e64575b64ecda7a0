//! # stockcast
//!
//! Daily demand forecasting and monthly inventory planning for retail
//! sales records.
//!
//! Transactions are filtered by category and sub-category, summed per
//! calendar date and fitted with an additive piecewise-linear trend plus
//! yearly and weekly Fourier seasonality. The fitted model is evaluated
//! over the history and a future horizon, and the future demand is grouped
//! by month into safety-stock and ideal-stock recommendations.
//!
//! ```
//! use stockcast::prelude::*;
//! use chrono::{Duration, NaiveDate};
//!
//! let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
//! let rows: Vec<Transaction> = (0..90)
//!     .map(|i| {
//!         Transaction::new(start + Duration::days(i), "Furniture", "Chairs", 100.0 + i as f64)
//!             .unwrap()
//!     })
//!     .collect();
//! let dataset = SalesDataset::new(rows);
//!
//! let pipeline = DemandPipeline::new(PlannerConfig::default()).unwrap();
//! let report = pipeline
//!     .run(&dataset, &PlanRequest::new(SalesFilter::all(), 30, 0.2))
//!     .unwrap();
//!
//! assert_eq!(report.forecast.future().len(), 30);
//! for month in &report.inventory {
//!     assert!((month.ideal_stock - month.estimated_demand - month.safety_stock).abs() < 1e-9);
//! }
//! ```

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod forecast;
pub mod inventory;
pub mod models;
pub mod pipeline;
pub mod seasonality;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::config::PlannerConfig;
    pub use crate::core::{DailySeries, ForecastRow, ForecastTable, SalesFilter, Transaction};
    pub use crate::data::{SalesDataset, TimeSeriesAggregator, TransactionReader};
    pub use crate::error::{ForecastError, Result};
    pub use crate::forecast::{ForecastExtender, Horizon};
    pub use crate::inventory::{InventoryPlanner, InventoryRow, SafetyRatio};
    pub use crate::models::{FittedForecaster, Forecaster, SeasonalTrendModel};
    pub use crate::pipeline::{DemandPipeline, PlanReport, PlanRequest};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
