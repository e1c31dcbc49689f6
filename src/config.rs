//! Pipeline configuration

use crate::error::{ChronoError, Result};
use crate::imputation::ValueImputeStrategy;
use crate::selection::SelectorModel;
use crate::training::XGBoostConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for the time series feature pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Strategy for filling missing values in the value columns
    pub impute_missing_steps: ValueImputeStrategy,

    /// Largest trailing window; windows `1..=max_window_size` are generated
    pub max_window_size: usize,

    /// Importance model used for selection
    pub feature_selector_model: SelectorModel,

    /// Number of generated features kept
    pub max_features: usize,

    /// Strategy for filling the undefined prefix of generated features
    pub feature_impute_strategy: ValueImputeStrategy,

    /// Boosting parameters for the importance model
    pub xgboost: XGBoostConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            impute_missing_steps: ValueImputeStrategy::Last,
            max_window_size: 10,
            feature_selector_model: SelectorModel::Xgb,
            max_features: 10,
            feature_impute_strategy: ValueImputeStrategy::Last,
            xgboost: XGBoostConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the value imputation strategy
    pub fn with_impute_missing_steps(mut self, strategy: ValueImputeStrategy) -> Self {
        self.impute_missing_steps = strategy;
        self
    }

    pub fn with_max_window_size(mut self, size: usize) -> Self {
        self.max_window_size = size;
        self
    }

    pub fn with_selector_model(mut self, model: SelectorModel) -> Self {
        self.feature_selector_model = model;
        self
    }

    pub fn with_max_features(mut self, n: usize) -> Self {
        self.max_features = n;
        self
    }

    pub fn with_feature_impute_strategy(mut self, strategy: ValueImputeStrategy) -> Self {
        self.feature_impute_strategy = strategy;
        self
    }

    pub fn with_xgboost(mut self, config: XGBoostConfig) -> Self {
        self.xgboost = config;
        self
    }

    /// Check option ranges
    pub fn validate(&self) -> Result<()> {
        if self.max_window_size == 0 {
            return Err(ChronoError::ConfigError(
                "max_window_size must be at least 1".to_string(),
            ));
        }
        if self.max_features == 0 {
            return Err(ChronoError::ConfigError(
                "max_features must be at least 1".to_string(),
            ));
        }
        if self.xgboost.n_estimators == 0 {
            return Err(ChronoError::ConfigError(
                "xgboost.n_estimators must be at least 1".to_string(),
            ));
        }
        if !(self.xgboost.subsample > 0.0 && self.xgboost.subsample <= 1.0) {
            return Err(ChronoError::ConfigError(format!(
                "xgboost.subsample must be in (0, 1], got {}",
                self.xgboost.subsample
            )));
        }
        Ok(())
    }

    /// Load and validate a JSON config; missing fields take their defaults.
    ///
    /// Strategy and model names go through the same lookup as everywhere
    /// else, so an unknown name is an `UnsupportedStrategy` error.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        check_strategy_names(&value)?;
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }
}

fn check_strategy_names(value: &serde_json::Value) -> Result<()> {
    for key in ["impute_missing_steps", "feature_impute_strategy"] {
        if let Some(name) = value.get(key).and_then(serde_json::Value::as_str) {
            name.parse::<ValueImputeStrategy>()?;
        }
    }
    if let Some(name) = value
        .get("feature_selector_model")
        .and_then(serde_json::Value::as_str)
    {
        name.parse::<SelectorModel>()?;
    }
    Ok(())
}
