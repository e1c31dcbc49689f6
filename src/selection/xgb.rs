//! Gradient-boosted importance selector

use super::{FeatureScore, FeatureSelectionStrategy, SelectionRequest};
use crate::error::{ChronoError, Result};
use crate::imputation::is_missing;
use crate::timeseries::timestep::is_numeric_dtype;
use crate::training::{XGBoostConfig, XGBoostRegressor};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Ranks features by the split gain a boosted regressor assigns them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XGBoostFeatureSelector {
    max_features: usize,
    config: XGBoostConfig,
}

impl XGBoostFeatureSelector {
    pub fn new(max_features: usize) -> Self {
        Self::with_config(max_features, XGBoostConfig::default())
    }

    pub fn with_config(max_features: usize, config: XGBoostConfig) -> Self {
        Self { max_features, config }
    }

    pub fn config(&self) -> &XGBoostConfig {
        &self.config
    }
}

/// Numeric column as optional floats, NaN folded into missing
fn numeric_values(data: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = data.column(name).map_err(|_| ChronoError::missing_column(name))?;
    if !is_numeric_dtype(column.dtype()) {
        return Err(ChronoError::TypeError(format!(
            "feature selection needs numeric columns, '{}' is {}",
            name,
            column.dtype()
        )));
    }
    let values = column
        .as_materialized_series()
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !is_missing(*x)))
        .collect();
    Ok(values)
}

impl FeatureSelectionStrategy for XGBoostFeatureSelector {
    fn max_features(&self) -> usize {
        self.max_features
    }

    fn rank_features(&self, data: &DataFrame, request: &SelectionRequest) -> Result<Vec<FeatureScore>> {
        let target = numeric_values(data, &request.target_column)?;
        let candidates: Vec<(String, Vec<Option<f64>>)> = request
            .feature_columns
            .iter()
            .map(|name| numeric_values(data, name).map(|values| (name.clone(), values)))
            .collect::<Result<_>>()?;

        // Candidates with no observed value cannot be fitted and score zero
        let fitted: Vec<usize> = candidates
            .iter()
            .enumerate()
            .filter(|(_, (_, values))| values.iter().any(Option::is_some))
            .map(|(i, _)| i)
            .collect();
        if fitted.len() < candidates.len() {
            debug!(
                n_skipped = candidates.len() - fitted.len(),
                "skipping candidates with no observed values"
            );
        }

        let rows: Vec<usize> = (0..data.height())
            .filter(|&r| {
                target[r].is_some() && fitted.iter().all(|&c| candidates[c].1[r].is_some())
            })
            .collect();

        let mut scores = vec![0.0f64; candidates.len()];
        if rows.is_empty() || fitted.is_empty() {
            warn!(
                target = %request.target_column,
                "nothing to fit, keeping candidate order"
            );
        } else {
            let x = Array2::from_shape_fn((rows.len(), fitted.len()), |(i, j)| {
                candidates[fitted[j]].1[rows[i]].unwrap_or(0.0)
            });
            let y: Array1<f64> = rows.iter().map(|&r| target[r].unwrap_or(0.0)).collect();

            let mut model = XGBoostRegressor::new(self.config.clone());
            model.fit(&x, &y)?;
            if let Some(importances) = model.feature_importances() {
                for (j, &c) in fitted.iter().enumerate() {
                    scores[c] = importances[j];
                }
            }
            debug!(n_rows = rows.len(), n_features = fitted.len(), "fitted importance model");
        }

        let mut ranking: Vec<FeatureScore> = candidates
            .into_iter()
            .zip(scores)
            .map(|((name, _), importance)| FeatureScore { name, importance })
            .collect();
        // Stable, so ties keep candidate order
        ranking.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(ranking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(features: &[&str]) -> SelectionRequest {
        SelectionRequest::new(
            features.iter().map(|s| s.to_string()).collect(),
            "target",
            "timestamp",
        )
    }

    fn signal_data() -> DataFrame {
        let n = 40;
        let timestamp: Vec<i64> = (0..n).collect();
        let feature1: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let feature2: Vec<f64> = (0..n).map(|i| ((i * 7) % 5) as f64).collect();
        let target: Vec<f64> = feature1.iter().map(|v| 2.0 * v + 1.0).collect();
        df!(
            "timestamp" => timestamp,
            "feature1" => feature1,
            "feature2" => feature2,
            "target" => target
        )
        .unwrap()
    }

    #[test]
    fn test_selects_signal_feature() {
        let mut df = signal_data();
        let selector = XGBoostFeatureSelector::new(1);
        let selected = selector
            .select_features(&mut df, &request(&["feature1", "feature2"]))
            .unwrap();

        assert_eq!(selected, vec!["feature1".to_string()]);
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["timestamp", "feature1", "target"]);
    }

    #[test]
    fn test_keeps_all_when_budget_allows() {
        let mut df = signal_data();
        let selector = XGBoostFeatureSelector::new(2);
        let selected = selector
            .select_features(&mut df, &request(&["feature1", "feature2"]))
            .unwrap();

        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0], "feature1");
        assert_eq!(df.width(), 4);
    }

    #[test]
    fn test_non_candidates_untouched() {
        let mut df = signal_data();
        df.with_column(Series::new("note".into(), vec!["x"; 40])).unwrap();
        let req = request(&["feature1", "feature2"]).with_retained(vec!["note".to_string()]);
        XGBoostFeatureSelector::new(1).select_features(&mut df, &req).unwrap();

        assert!(df.column("note").is_ok());
        assert!(df.column("feature2").is_err());
    }

    #[test]
    fn test_all_missing_candidate_scores_zero() {
        let mut df = signal_data();
        df.with_column(Series::new("empty".into(), vec![None::<f64>; 40])).unwrap();
        let ranking = XGBoostFeatureSelector::new(3)
            .rank_features(&df, &request(&["empty", "feature1"]))
            .unwrap();

        assert_eq!(ranking[0].name, "feature1");
        assert_eq!(ranking[1].name, "empty");
        assert_eq!(ranking[1].importance, 0.0);
    }

    #[test]
    fn test_no_complete_rows_keeps_order() {
        let df = df!(
            "timestamp" => &[1i64, 2, 3],
            "a" => &[Some(1.0), None, None],
            "b" => &[None, Some(2.0), None],
            "target" => &[1.0, 2.0, 3.0]
        )
        .unwrap();
        let ranking = XGBoostFeatureSelector::new(1)
            .rank_features(&df, &request(&["b", "a"]))
            .unwrap();
        let names: Vec<&str> = ranking.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_rejects_bad_columns() {
        let mut df = signal_data();
        assert!(matches!(
            XGBoostFeatureSelector::new(1).select_features(&mut df, &request(&["nope"])),
            Err(ChronoError::SchemaError(_))
        ));
        assert_eq!(df.width(), 4);

        df.with_column(Series::new("label".into(), vec!["x"; 40])).unwrap();
        assert!(matches!(
            XGBoostFeatureSelector::new(1).rank_features(&df, &request(&["label"])),
            Err(ChronoError::TypeError(_))
        ));
    }
}
