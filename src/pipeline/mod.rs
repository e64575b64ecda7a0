//! End-to-end demand planning: aggregate, fit, forecast, plan.

mod cache;

pub use cache::{FitKey, ModelCache};

use crate::config::PlannerConfig;
use crate::core::{DailySeries, ForecastTable, SalesFilter};
use crate::data::{SalesDataset, TimeSeriesAggregator};
use crate::error::Result;
use crate::forecast::{ForecastExtender, Horizon};
use crate::inventory::{InventoryPlanner, InventoryRow, SafetyRatio};
use crate::models::{FittedForecaster, FittedModel, Forecaster, SeasonalTrendModel};
use crate::seasonality::{weekly_profile, yearly_profile, SeasonalProfile};
use crate::utils::{calculate_metrics, AccuracyMetrics};
use chrono::{Month, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// One planning query from the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub filter: SalesFilter,
    pub horizon_days: i64,
    pub safety_ratio: f64,
}

impl PlanRequest {
    pub fn new(filter: SalesFilter, horizon_days: i64, safety_ratio: f64) -> Self {
        Self {
            filter,
            horizon_days,
            safety_ratio,
        }
    }
}

/// Headline figures for the selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SalesSummary {
    /// Sum of all selected transaction amounts.
    pub total_sales: f64,
    /// Mean of the aggregated daily totals.
    pub average_daily_sales: f64,
    pub safety_ratio: f64,
    /// Latest transaction date in the whole dataset, whatever the selection.
    pub latest_date: Option<NaiveDate>,
}

/// Everything produced for one request.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub series: DailySeries,
    pub forecast: ForecastTable,
    pub inventory: Vec<InventoryRow>,
    pub weekly_profile: SeasonalProfile<Weekday>,
    pub yearly_profile: SeasonalProfile<Month>,
    pub summary: SalesSummary,
    /// In-sample accuracy of the fitted model.
    pub accuracy: AccuracyMetrics,
}

/// Stateless planning service over a shared model cache.
///
/// A pipeline can be cloned and used from several threads; clones share
/// the cache.
#[derive(Debug, Clone)]
pub struct DemandPipeline {
    config: PlannerConfig,
    model: SeasonalTrendModel,
    aggregator: TimeSeriesAggregator,
    cache: ModelCache,
}

impl DemandPipeline {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model: SeasonalTrendModel::new(config.model.clone()),
            aggregator: TimeSeriesAggregator::new().with_gap_policy(config.gap_policy),
            cache: ModelCache::new(config.cache_capacity),
            config,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Request for `filter` with the configured default horizon and ratio.
    pub fn default_request(&self, filter: SalesFilter) -> PlanRequest {
        PlanRequest::new(
            filter,
            self.config.default_horizon_days,
            self.config.default_safety_ratio,
        )
    }

    /// Aggregate the selection and fit it, reusing a cached fit when the
    /// selection, data and settings are unchanged.
    pub fn fit(
        &self,
        dataset: &SalesDataset,
        filter: &SalesFilter,
    ) -> Result<(DailySeries, Arc<FittedModel>)> {
        let series = self.aggregator.aggregate(dataset.transactions(), filter)?;

        let key = FitKey::new(
            filter.clone(),
            dataset.snapshot(),
            self.config.fit_fingerprint(),
        );
        if let Some(model) = self.cache.get(&key) {
            debug!(snapshot = %key.snapshot, "fitted model served from cache");
            return Ok((series, model));
        }

        let model = Arc::new(self.model.fit(&series)?);
        self.cache.insert(key, Arc::clone(&model));
        Ok((series, model))
    }

    /// Produce the forecast and inventory tables for one request.
    #[instrument(
        skip_all,
        fields(
            snapshot = %dataset.snapshot(),
            horizon = request.horizon_days,
            ratio = request.safety_ratio
        )
    )]
    pub fn run(&self, dataset: &SalesDataset, request: &PlanRequest) -> Result<PlanReport> {
        let horizon = Horizon::new(request.horizon_days)?;
        let ratio = SafetyRatio::new(request.safety_ratio)?;

        let (series, model) = self.fit(dataset, &request.filter)?;
        let last = model.last_observed();

        let forecast = ForecastExtender::new().forecast(model.as_ref(), &series, horizon)?;
        let inventory = InventoryPlanner::new().plan_with(forecast.rows(), last, ratio);

        let accuracy = calculate_metrics(series.values(), model.fitted_values())?;
        let summary = SalesSummary {
            total_sales: dataset.total_sales(&request.filter),
            average_daily_sales: series.mean().unwrap_or(0.0),
            safety_ratio: ratio.value(),
            latest_date: dataset.latest_date(),
        };

        info!(
            observations = series.len(),
            last_observed = %last,
            months = inventory.len(),
            "demand plan ready"
        );

        Ok(PlanReport {
            weekly_profile: weekly_profile(forecast.rows()),
            yearly_profile: yearly_profile(forecast.rows()),
            series,
            forecast,
            inventory,
            summary,
            accuracy,
        })
    }
}

impl Default for DemandPipeline {
    fn default() -> Self {
        let config = PlannerConfig::default();
        Self {
            model: SeasonalTrendModel::new(config.model.clone()),
            aggregator: TimeSeriesAggregator::new().with_gap_policy(config.gap_policy),
            cache: ModelCache::new(config.cache_capacity),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transaction;
    use crate::error::ForecastError;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn dataset(days: i64) -> SalesDataset {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let mut rows = Vec::new();
        for i in 0..days {
            let date = start + Duration::days(i);
            rows.push(Transaction::new(date, "Furniture", "Chairs", 100.0 + i as f64).unwrap());
            rows.push(Transaction::new(date, "Technology", "Phones", 50.0).unwrap());
        }
        SalesDataset::new(rows)
    }

    #[test]
    fn bad_request_fails_before_fitting() {
        let pipeline = DemandPipeline::default();
        let data = dataset(30);

        let bad_horizon = PlanRequest::new(SalesFilter::all(), 0, 0.2);
        assert!(matches!(
            pipeline.run(&data, &bad_horizon),
            Err(ForecastError::InvalidInput(_))
        ));
        let bad_ratio = PlanRequest::new(SalesFilter::all(), 30, 1.2);
        assert!(matches!(
            pipeline.run(&data, &bad_ratio),
            Err(ForecastError::InvalidInput(_))
        ));
        assert!(pipeline.cache().is_empty());
    }

    #[test]
    fn run_produces_horizon_and_summary() {
        let pipeline = DemandPipeline::default();
        let data = dataset(60);
        let filter = SalesFilter::all().with_category("Furniture");
        let report = pipeline
            .run(&data, &PlanRequest::new(filter, 30, 0.2))
            .unwrap();

        assert_eq!(report.series.len(), 60);
        assert_eq!(report.forecast.future().len(), 30);
        assert_eq!(report.forecast.historical().len(), 60);
        assert_relative_eq!(report.summary.total_sales, 100.0 * 60.0 + 1770.0);
        assert_relative_eq!(report.summary.average_daily_sales, 129.5);
        assert_eq!(
            report.summary.latest_date,
            NaiveDate::from_ymd_opt(2018, 3, 1)
        );
        assert!(report.accuracy.r_squared > 0.9);

        let demand: f64 = report.inventory.iter().map(|r| r.estimated_demand).sum();
        let future: f64 = report.forecast.future().iter().map(|r| r.yhat).sum();
        assert_relative_eq!(demand, future, epsilon = 1e-6);
    }

    #[test]
    fn empty_selection_reports_no_data() {
        let pipeline = DemandPipeline::default();
        let filter = SalesFilter::all()
            .with_category("Furniture")
            .with_sub_categories(Vec::<String>::new());
        let err = pipeline
            .run(&dataset(30), &PlanRequest::new(filter, 30, 0.2))
            .unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn fit_is_cached_across_horizons() {
        let pipeline = DemandPipeline::default();
        let data = dataset(40);
        let filter = SalesFilter::all();

        let (_, first) = pipeline.fit(&data, &filter).unwrap();
        pipeline
            .run(&data, &PlanRequest::new(filter.clone(), 90, 0.5))
            .unwrap();
        let (_, second) = pipeline.fit(&data, &filter).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(pipeline.cache().len(), 1);

        let (_, refit) = pipeline.fit(&dataset(41), &filter).unwrap();
        assert!(!Arc::ptr_eq(&first, &refit));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PlannerConfig::default().with_cache_capacity(0);
        assert!(DemandPipeline::new(config).is_err());
    }
}
