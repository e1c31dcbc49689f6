//! Rolling-window feature generation
//!
//! For every window size `w` in `1..=max_window_size` four trailing-window
//! columns are appended to the table: `min`, `max`, `avg` and `nth` (the value
//! `w - 1` rows back). Windows are positional, so the value column should be
//! timestep-imputed first for the features to be temporally meaningful.

use crate::error::{ChronoError, Result};
use crate::imputation::is_missing;
use crate::timeseries::timestep::is_numeric_dtype;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::info;

/// Rolling statistics, in the order they are emitted per window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStat {
    Min,
    Max,
    Avg,
    Nth,
}

impl WindowStat {
    pub const ALL: [WindowStat; 4] = [WindowStat::Min, WindowStat::Max, WindowStat::Avg, WindowStat::Nth];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowStat::Min => "min",
            WindowStat::Max => "max",
            WindowStat::Avg => "avg",
            WindowStat::Nth => "nth",
        }
    }
}

/// Name of the generated column `{value_column}_{stat}_{window_size}`
pub fn feature_name(value_column: &str, stat: WindowStat, window_size: usize) -> String {
    format!("{}_{}_{}", value_column, stat.as_str(), window_size)
}

/// Rolling-window feature generator
#[derive(Debug, Clone)]
pub struct WindowFeatureGenerator {
    max_window_size: usize,
    generated_features: Vec<String>,
}

impl WindowFeatureGenerator {
    pub fn new(max_window_size: usize) -> Self {
        Self {
            max_window_size,
            generated_features: Vec::new(),
        }
    }

    pub fn max_window_size(&self) -> usize {
        self.max_window_size
    }

    /// Names produced by the most recent call to [`generate`](Self::generate)
    pub fn generated_features(&self) -> &[String] {
        &self.generated_features
    }

    /// Append the rolling features of `value_column` to `data`.
    ///
    /// Returns the new column names ordered by window size, then by
    /// `min, max, avg, nth`. Columns that already exist under a generated
    /// name are overwritten, so regenerating is idempotent.
    pub fn generate(&mut self, data: &mut DataFrame, value_column: &str) -> Result<Vec<String>> {
        if self.max_window_size == 0 {
            return Err(ChronoError::ConfigError(
                "max_window_size must be at least 1".to_string(),
            ));
        }

        let column = data
            .column(value_column)
            .map_err(|_| ChronoError::missing_column(value_column))?;
        if !is_numeric_dtype(column.dtype()) {
            return Err(ChronoError::TypeError(format!(
                "window features need a numeric column, '{}' is {}",
                value_column,
                column.dtype()
            )));
        }

        let values: Vec<Option<f64>> = column
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !is_missing(*x)))
            .collect();

        // Each window size only reads `values` and owns its output columns
        let per_window: Vec<[Vec<Option<f64>>; 4]> = (1..=self.max_window_size)
            .into_par_iter()
            .map(|w| {
                [
                    rolling_extreme(&values, w, |a, b| a <= b),
                    rolling_extreme(&values, w, |a, b| a >= b),
                    rolling_mean(&values, w),
                    lagged(&values, w - 1),
                ]
            })
            .collect();

        let mut names = Vec::with_capacity(self.max_window_size * WindowStat::ALL.len());
        for (offset, columns) in per_window.into_iter().enumerate() {
            let window_size = offset + 1;
            for (stat, feature) in WindowStat::ALL.iter().zip(columns) {
                let name = feature_name(value_column, *stat, window_size);
                data.with_column(Series::new(name.as_str().into(), feature))?;
                names.push(name);
            }
        }

        info!(
            column = value_column,
            max_window_size = self.max_window_size,
            n_features = names.len(),
            "generated window features"
        );
        self.generated_features = names.clone();
        Ok(names)
    }
}

/// Trailing-window extreme using a monotonic deque of indices.
///
/// `keep(a, b)` is true when an older value `a` still dominates a newer `b`
/// (`<=` gives the minimum, `>=` the maximum). A window holding a missing
/// value, or fewer than `window` rows, yields `None`.
fn rolling_extreme<F>(values: &[Option<f64>], window: usize, keep: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> bool,
{
    let mut out = Vec::with_capacity(values.len());
    let mut deque: VecDeque<(usize, f64)> = VecDeque::with_capacity(window);
    let mut missing = 0usize;

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) => {
                while deque.back().map_or(false, |&(_, last)| !keep(last, *v)) {
                    deque.pop_back();
                }
                deque.push_back((i, *v));
            }
            None => missing += 1,
        }

        if i >= window {
            if values[i - window].is_none() {
                missing -= 1;
            }
            while deque.front().map_or(false, |&(idx, _)| idx + window <= i) {
                deque.pop_front();
            }
        }

        let full = i + 1 >= window && missing == 0;
        out.push(if full { deque.front().map(|&(_, v)| v) } else { None });
    }
    out
}

/// Trailing-window mean. Each window is summed on its own, so a huge or
/// infinite value only affects the windows that contain it.
fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i]
                .iter()
                .try_fold(0.0, |sum, v| v.map(|x| sum + x))
                .map(|sum| sum / window as f64)
        })
        .collect()
}

/// Value `lag` rows back
fn lagged(values: &[Option<f64>], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| if i >= lag { values[i - lag] } else { None })
        .collect()
}
