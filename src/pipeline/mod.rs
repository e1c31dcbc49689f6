//! Multi-column feature pipeline
//!
//! Each value column gets its own window features and its own selection
//! round against the target; the survivors are joined back onto the working
//! table by the timestep column.

mod output;

pub use output::OutputFormatter;

use crate::config::PipelineConfig;
use crate::error::{ChronoError, Result};
use crate::imputation::{impute_timesteps, impute_value_columns};
use crate::selection::{FeatureSelectionStrategy, FeatureSelector, SelectionRequest};
use crate::timeseries::features::WindowFeatureGenerator;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Per-column generate, select and merge
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    timestep_column: String,
    value_columns: Vec<String>,
    target_column: String,
    config: PipelineConfig,
}

impl FeaturePipeline {
    pub fn new(
        timestep_column: impl Into<String>,
        value_columns: Vec<String>,
        target_column: impl Into<String>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            timestep_column: timestep_column.into(),
            value_columns,
            target_column: target_column.into(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// Run the pipeline over `data`.
    ///
    /// With `preprocess`, gaps in the timestep axis are filled and the value
    /// columns imputed first. With `output`, the result is also written as CSV.
    pub fn execute(&self, data: DataFrame, preprocess: bool, output: Option<&Path>) -> Result<DataFrame> {
        self.config.validate()?;
        for name in self
            .value_columns
            .iter()
            .chain([&self.timestep_column, &self.target_column])
        {
            if data.column(name).is_err() {
                return Err(ChronoError::missing_column(name));
            }
        }

        let mut processed = if preprocess {
            let mut imputed = impute_timesteps(data, &self.timestep_column)?;
            impute_value_columns(&mut imputed, &self.value_columns, self.config.impute_missing_steps)?;
            imputed
        } else {
            data
        };

        for value_column in &self.value_columns {
            let selected = self.select_for_column(&processed, value_column)?;
            processed = processed.left_join(
                &selected,
                [self.timestep_column.as_str()],
                [self.timestep_column.as_str()],
            )?;
        }

        info!(
            rows = processed.height(),
            columns = processed.width(),
            n_value_columns = self.value_columns.len(),
            "feature pipeline finished"
        );

        let mut formatter = OutputFormatter::new(processed);
        if let Some(path) = output {
            formatter.save_to_csv(path)?;
        }
        Ok(formatter.into_inner())
    }

    /// Timestep column plus the selected features of `value_column`
    fn select_for_column(&self, data: &DataFrame, value_column: &str) -> Result<DataFrame> {
        let mut base = vec![self.timestep_column.clone(), value_column.to_string()];
        if !base.contains(&self.target_column) {
            base.push(self.target_column.clone());
        }
        let mut work = data.select(base)?;

        let candidates = WindowFeatureGenerator::new(self.config.max_window_size).generate(&mut work, value_column)?;
        impute_value_columns(&mut work, &candidates, self.config.feature_impute_strategy)?;

        let selector = FeatureSelector::new(
            self.config.feature_selector_model,
            self.config.max_features,
            self.config.xgboost.clone(),
        );
        let request = SelectionRequest::new(candidates, self.target_column.as_str(), self.timestep_column.as_str());
        let selected = selector.select_features(&mut work, &request)?;
        debug!(column = value_column, selected = ?selected, "selected column features");

        let mut keep = vec![self.timestep_column.clone()];
        keep.extend(selected);
        Ok(work.select(keep)?)
    }
}
