//! Owned time series table with the preprocessing chain attached

use crate::config::PipelineConfig;
use crate::error::{ChronoError, Result};
use crate::imputation::{impute_timesteps, impute_value_columns, ValueImputeStrategy};
use crate::selection::{FeatureSelectionStrategy, FeatureSelector, SelectionRequest, SelectorModel};
use crate::timeseries::features::WindowFeatureGenerator;
use crate::training::XGBoostConfig;
use polars::prelude::*;
use tracing::info;

/// A table and the name of its timestep column
#[derive(Debug, Clone)]
pub struct TimeSeriesDataset {
    data: DataFrame,
    timestep_column: String,
}

impl TimeSeriesDataset {
    /// Take ownership of `data`; fails if `timestep_column` is absent
    pub fn new(data: DataFrame, timestep_column: impl Into<String>) -> Result<Self> {
        let timestep_column = timestep_column.into();
        if data.column(&timestep_column).is_err() {
            return Err(ChronoError::SchemaError(format!(
                "timestep column '{}' is not in the DataFrame",
                timestep_column
            )));
        }
        Ok(Self { data, timestep_column })
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn timestep_column(&self) -> &str {
        &self.timestep_column
    }

    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Insert rows for every gap in the timestep axis
    pub fn impute_timesteps(&mut self) -> Result<()> {
        self.data = impute_timesteps(self.data.clone(), &self.timestep_column)?;
        Ok(())
    }

    /// Fill missing values of `value_columns` with the strategy named `strategy`.
    ///
    /// The strategy name and all columns are checked before anything is
    /// written.
    pub fn impute_values<S: AsRef<str>>(&mut self, value_columns: &[S], strategy: &str) -> Result<()> {
        let strategy: ValueImputeStrategy = strategy.parse()?;
        impute_value_columns(&mut self.data, value_columns, strategy)
    }

    /// Append window features of `value_column`, returning their names
    pub fn generate_features(&mut self, value_column: &str, max_window_size: usize) -> Result<Vec<String>> {
        WindowFeatureGenerator::new(max_window_size).generate(&mut self.data, value_column)
    }

    /// Keep the top `max_features` of `candidates` against `target_column`.
    ///
    /// The timestep, the target and `retain_columns` survive; other
    /// candidates are dropped.
    pub fn select_features(
        &mut self,
        candidates: &[String],
        target_column: &str,
        max_features: usize,
        model: SelectorModel,
        retain_columns: &[String],
    ) -> Result<Vec<String>> {
        let selector = FeatureSelector::new(model, max_features, XGBoostConfig::default());
        let request = SelectionRequest::new(candidates.to_vec(), target_column, self.timestep_column.as_str())
            .with_retained(retain_columns.to_vec());
        selector.select_features(&mut self.data, &request)
    }

    /// Run the whole chain and return the final table.
    ///
    /// Timestep imputation, value imputation of `value_columns`, window
    /// features per value column, imputation of the generated features, then
    /// selection of the best `config.max_features`. Every original column is
    /// kept.
    pub fn process_timeseries_features<S: AsRef<str>>(
        mut self,
        value_columns: &[S],
        target_column: &str,
        config: &PipelineConfig,
    ) -> Result<DataFrame> {
        config.validate()?;
        if self.data.column(target_column).is_err() {
            return Err(ChronoError::missing_column(target_column));
        }
        let value_columns: Vec<String> = value_columns.iter().map(|c| c.as_ref().to_string()).collect();

        self.impute_timesteps()?;
        impute_value_columns(&mut self.data, &value_columns, config.impute_missing_steps)?;
        let original: Vec<String> = self
            .data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();

        let mut generator = WindowFeatureGenerator::new(config.max_window_size);
        let mut candidates = Vec::new();
        for column in &value_columns {
            candidates.extend(generator.generate(&mut self.data, column)?);
        }
        impute_value_columns(&mut self.data, &candidates, config.feature_impute_strategy)?;

        let selector = FeatureSelector::new(
            config.feature_selector_model,
            config.max_features,
            config.xgboost.clone(),
        );
        let request = SelectionRequest::new(candidates, target_column, self.timestep_column.as_str())
            .with_retained(original);
        let selected = selector.select_features(&mut self.data, &request)?;

        info!(
            rows = self.data.height(),
            columns = self.data.width(),
            n_selected = selected.len(),
            "processed time series features"
        );
        Ok(self.data)
    }
}
