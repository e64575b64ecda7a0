//! Planner configuration.

use crate::core::GapPolicy;
use crate::error::{ForecastError, Result};
use crate::forecast::Horizon;
use crate::inventory::SafetyRatio;
use crate::models::SeasonalTrendConfig;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Settings shared by every plan produced by a pipeline.
///
/// Deserializes from a partial document; missing fields take their
/// defaults.
///
/// # Example
/// ```
/// use stockcast::config::PlannerConfig;
/// use stockcast::core::GapPolicy;
///
/// let config = PlannerConfig::default()
///     .with_gap_policy(GapPolicy::ZeroFill)
///     .with_cache_capacity(8);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.default_horizon_days, 90);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub model: SeasonalTrendConfig,
    pub gap_policy: GapPolicy,
    pub default_horizon_days: i64,
    pub default_safety_ratio: f64,
    /// Maximum number of fitted models kept in memory.
    pub cache_capacity: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            model: SeasonalTrendConfig::default(),
            gap_policy: GapPolicy::Absent,
            default_horizon_days: 90,
            default_safety_ratio: 0.2,
            cache_capacity: 32,
        }
    }
}

impl PlannerConfig {
    pub fn with_model(mut self, model: SeasonalTrendConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_gap_policy(mut self, policy: GapPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    pub fn with_default_horizon_days(mut self, days: i64) -> Self {
        self.default_horizon_days = days;
        self
    }

    pub fn with_default_safety_ratio(mut self, ratio: f64) -> Self {
        self.default_safety_ratio = ratio;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.default_horizon()?;
        self.default_safety_ratio()?;
        if self.cache_capacity == 0 {
            return Err(ForecastError::InvalidInput(
                "cache_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn default_horizon(&self) -> Result<Horizon> {
        Horizon::new(self.default_horizon_days)
    }

    pub fn default_safety_ratio(&self) -> Result<SafetyRatio> {
        SafetyRatio::new(self.default_safety_ratio)
    }

    /// Hash of every setting that changes a fitted model.
    ///
    /// Horizon, ratio and cache size are excluded: they only affect how a
    /// fitted model is used.
    pub fn fit_fingerprint(&self) -> u64 {
        let m = &self.model;
        let mut hasher = DefaultHasher::new();
        self.gap_policy.hash(&mut hasher);
        m.n_changepoints.hash(&mut hasher);
        m.changepoint_range.to_bits().hash(&mut hasher);
        m.changepoint_prior_scale.to_bits().hash(&mut hasher);
        m.seasonality_prior_scale.to_bits().hash(&mut hasher);
        m.yearly_order.hash(&mut hasher);
        m.weekly_order.hash(&mut hasher);
        m.min_weekly_span_days.hash(&mut hasher);
        m.min_yearly_span_days.hash(&mut hasher);
        m.interval_width.to_bits().hash(&mut hasher);
        hasher.finish()
    }
}
