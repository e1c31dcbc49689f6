//! Feature selection
//!
//! Ranks candidate feature columns by importance against a target and prunes
//! the table down to the timestep, the top-ranked features, the target and
//! any columns the caller asks to keep.

mod xgb;

pub use xgb::XGBoostFeatureSelector;

use crate::error::{ChronoError, Result};
use crate::training::XGBoostConfig;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Columns involved in one selection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Candidate feature columns to rank
    pub feature_columns: Vec<String>,
    pub target_column: String,
    pub timestep_column: String,
    /// Columns kept regardless of ranking
    pub retain_columns: Vec<String>,
}

impl SelectionRequest {
    pub fn new(
        feature_columns: Vec<String>,
        target_column: impl Into<String>,
        timestep_column: impl Into<String>,
    ) -> Self {
        Self {
            feature_columns,
            target_column: target_column.into(),
            timestep_column: timestep_column.into(),
            retain_columns: Vec::new(),
        }
    }

    /// Set columns to keep whatever the ranking says
    pub fn with_retained(mut self, columns: Vec<String>) -> Self {
        self.retain_columns = columns;
        self
    }

    /// Fail with a schema error on the first referenced column `data` lacks
    pub fn validate(&self, data: &DataFrame) -> Result<()> {
        let referenced = self
            .feature_columns
            .iter()
            .chain(self.retain_columns.iter())
            .map(String::as_str)
            .chain([self.target_column.as_str(), self.timestep_column.as_str()]);

        for name in referenced {
            if data.column(name).is_err() {
                return Err(ChronoError::missing_column(name));
            }
        }
        Ok(())
    }
}

/// Feature paired with its importance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    pub name: String,
    pub importance: f64,
}

/// Trait for importance-based feature selectors
pub trait FeatureSelectionStrategy {
    /// Maximum number of candidate features kept
    fn max_features(&self) -> usize;

    /// Score every candidate in `request`, best first.
    ///
    /// Equal scores keep the order of `request.feature_columns`.
    fn rank_features(&self, data: &DataFrame, request: &SelectionRequest) -> Result<Vec<FeatureScore>>;

    /// Prune `data` in place and return the kept features, best first.
    ///
    /// The table keeps its column order; non-selected candidates are dropped
    /// and cannot be recovered afterwards.
    fn select_features(&self, data: &mut DataFrame, request: &SelectionRequest) -> Result<Vec<String>> {
        request.validate(data)?;
        let ranking = self.rank_features(data, request)?;
        let selected: Vec<String> = ranking
            .into_iter()
            .take(self.max_features())
            .map(|score| score.name)
            .collect();

        let keep: HashSet<&str> = selected
            .iter()
            .chain(request.retain_columns.iter())
            .map(String::as_str)
            .chain([request.timestep_column.as_str(), request.target_column.as_str()])
            .collect();

        let columns: Vec<String> = data
            .get_column_names()
            .into_iter()
            .filter(|name| keep.contains(name.as_str()))
            .map(|name| name.to_string())
            .collect();
        let dropped = data.width() - columns.len();
        *data = data.select(columns)?;

        info!(
            target = %request.target_column,
            n_candidates = request.feature_columns.len(),
            n_selected = selected.len(),
            n_dropped = dropped,
            "selected features"
        );
        Ok(selected)
    }
}

/// Importance models available for selection, keyed by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectorModel {
    #[default]
    #[serde(rename = "XGB")]
    Xgb,
}

impl SelectorModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorModel::Xgb => "XGB",
        }
    }
}

impl fmt::Display for SelectorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectorModel {
    type Err = ChronoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "XGB" => Ok(SelectorModel::Xgb),
            other => Err(ChronoError::UnsupportedStrategy(format!(
                "feature selector '{}' not available",
                other
            ))),
        }
    }
}

/// Closed set of concrete selectors
#[derive(Debug, Clone)]
pub enum FeatureSelector {
    XGBoost(XGBoostFeatureSelector),
}

impl FeatureSelector {
    pub fn new(model: SelectorModel, max_features: usize, config: XGBoostConfig) -> Self {
        match model {
            SelectorModel::Xgb => {
                FeatureSelector::XGBoost(XGBoostFeatureSelector::with_config(max_features, config))
            }
        }
    }
}

impl FeatureSelectionStrategy for FeatureSelector {
    fn max_features(&self) -> usize {
        match self {
            FeatureSelector::XGBoost(selector) => selector.max_features(),
        }
    }

    fn rank_features(&self, data: &DataFrame, request: &SelectionRequest) -> Result<Vec<FeatureScore>> {
        match self {
            FeatureSelector::XGBoost(selector) => selector.rank_features(data, request),
        }
    }
}

/// Look up a selector by model name
pub fn get_feature_selector(selector_model: &str, max_features: usize) -> Result<FeatureSelector> {
    let model: SelectorModel = selector_model.parse()?;
    Ok(FeatureSelector::new(model, max_features, XGBoostConfig::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_lookup() {
        let selector = get_feature_selector("XGB", 3).unwrap();
        assert_eq!(selector.max_features(), 3);
        assert!(matches!(
            get_feature_selector("bogus", 3),
            Err(ChronoError::UnsupportedStrategy(_))
        ));
    }

    #[test]
    fn test_request_validation() {
        let df = df!("ts" => &[1i64, 2], "y" => &[1.0, 2.0], "f" => &[0.5, 0.1]).unwrap();
        let ok = SelectionRequest::new(vec!["f".to_string()], "y", "ts");
        assert!(ok.validate(&df).is_ok());

        let bad = ok.clone().with_retained(vec!["gone".to_string()]);
        assert!(matches!(bad.validate(&df), Err(ChronoError::SchemaError(_))));
    }

    #[test]
    fn test_model_serde_key() {
        let json = serde_json::to_string(&SelectorModel::Xgb).unwrap();
        assert_eq!(json, "\"XGB\"");
    }
}
