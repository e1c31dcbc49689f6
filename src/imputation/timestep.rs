//! Timestep imputation
//!
//! Rebuilds a dense, evenly stepped axis for each kind of timestep column
//! and joins the original rows back onto it, so that missing positions show
//! up as explicit rows of nulls.

use crate::error::{ChronoError, Result};
use crate::timeseries::timestep::{
    classify_timestep, is_float_dtype, is_integer_dtype, units_per_second, TimestepType,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Step of the reconstructed float axis
pub const FLOAT_STEP: f64 = 0.1;

/// Grid values are snapped to this many decimals before joining
const FLOAT_GRID_DECIMALS: i32 = 10;

/// Trait for timestep reconstruction strategies
pub trait TimestepImputer {
    /// Build the dense index spanning the values of `timestep_column`.
    ///
    /// The returned table has a single column with the same name and dtype
    /// as the input column, sorted ascending with no duplicates.
    fn impute(&self, data: &DataFrame, timestep_column: &str) -> Result<DataFrame>;
}

/// Integer axis, step 1, inclusive range
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerImputation;

/// Float axis, step 0.1, half-open range `[min, max)`
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatImputation;

/// Date axis, step one day, inclusive range
#[derive(Debug, Clone, Copy, Default)]
pub struct DateImputation;

/// Datetime axis, step one second, inclusive range
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeImputation;

fn axis_series<'a>(data: &'a DataFrame, column: &str) -> Result<&'a Series> {
    let col = data
        .column(column)
        .map_err(|_| ChronoError::missing_column(column))?;
    if col.null_count() > 0 {
        return Err(ChronoError::TypeError(format!(
            "timestep column '{}' contains {} missing values",
            column,
            col.null_count()
        )));
    }
    Ok(col.as_materialized_series())
}

fn unsupported(strategy: &str, series: &Series) -> ChronoError {
    ChronoError::UnsupportedType(format!(
        "{} imputation cannot reconstruct column '{}' of type {}",
        strategy,
        series.name(),
        series.dtype()
    ))
}

fn index_frame(series: Series) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![series.into()])?)
}

impl TimestepImputer for IntegerImputation {
    fn impute(&self, data: &DataFrame, timestep_column: &str) -> Result<DataFrame> {
        let series = axis_series(data, timestep_column)?;
        if !is_integer_dtype(series.dtype()) {
            return Err(unsupported("integer", series));
        }

        let physical = series.cast(&DataType::Int64)?;
        let ca = physical.i64()?;
        let values: Vec<i64> = match (ca.min(), ca.max()) {
            (Some(min), Some(max)) => (min..=max).collect(),
            _ => Vec::new(),
        };

        let index = Series::new(series.name().clone(), values).cast(series.dtype())?;
        index_frame(index)
    }
}

impl TimestepImputer for FloatImputation {
    fn impute(&self, data: &DataFrame, timestep_column: &str) -> Result<DataFrame> {
        let series = axis_series(data, timestep_column)?;
        if !is_float_dtype(series.dtype()) {
            return Err(unsupported("float", series));
        }

        let physical = series.cast(&DataType::Float64)?;
        let ca = physical.f64()?;
        let values: Vec<f64> = match (ca.min(), ca.max()) {
            (Some(min), Some(max)) => float_grid(min, max, FLOAT_STEP),
            _ => Vec::new(),
        };

        let index = Series::new(series.name().clone(), values).cast(series.dtype())?;
        index_frame(index)
    }
}

/// Arithmetic grid `start + k * step` for `k < ceil((stop - start) / step)`,
/// snapped to [`FLOAT_GRID_DECIMALS`] decimals. `stop` is left out when the
/// span is an exact multiple of `step`; when floating-point error rounds the
/// count up, the last point lands on `stop`.
fn float_grid(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let len = ((stop - start) / step).ceil();
    if !len.is_finite() || len <= 0.0 {
        return Vec::new();
    }
    let scale = 10f64.powi(FLOAT_GRID_DECIMALS);
    (0..len as usize)
        .map(|k| ((start + k as f64 * step) * scale).round() / scale)
        .collect()
}

impl TimestepImputer for DateImputation {
    fn impute(&self, data: &DataFrame, timestep_column: &str) -> Result<DataFrame> {
        let series = axis_series(data, timestep_column)?;
        if series.dtype() != &DataType::Date {
            return Err(unsupported("date", series));
        }

        let physical = series.cast(&DataType::Int32)?;
        let ca = physical.i32()?;
        let days: Vec<i32> = match (ca.min(), ca.max()) {
            (Some(min), Some(max)) => (min..=max).collect(),
            _ => Vec::new(),
        };

        let index = Series::new(series.name().clone(), days).cast(&DataType::Date)?;
        index_frame(index)
    }
}

impl TimestepImputer for DateTimeImputation {
    fn impute(&self, data: &DataFrame, timestep_column: &str) -> Result<DataFrame> {
        let series = axis_series(data, timestep_column)?;
        let (unit, dtype) = match series.dtype() {
            DataType::Datetime(unit, _) => (*unit, series.dtype().clone()),
            _ => return Err(unsupported("datetime", series)),
        };

        let physical = series.cast(&DataType::Int64)?;
        let ca = physical.i64()?;
        let step = units_per_second(unit);
        let stamps: Vec<i64> = match (ca.min(), ca.max()) {
            (Some(min), Some(max)) => (min..=max).step_by(step as usize).collect(),
            _ => Vec::new(),
        };

        let index = Series::new(series.name().clone(), stamps).cast(&dtype)?;
        index_frame(index)
    }
}

/// Closed set of timestep strategies, one per [`TimestepType`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestepStrategy {
    Integer,
    Float,
    Date,
    Datetime,
}

impl TimestepStrategy {
    /// Classify `timestep_column` and pick the matching strategy.
    ///
    /// Classification may rewrite a textual column into its temporal form.
    pub fn for_column(data: &mut DataFrame, timestep_column: &str) -> Result<Self> {
        classify_timestep(data, timestep_column).map(Self::from)
    }

    pub fn timestep_type(&self) -> TimestepType {
        match self {
            TimestepStrategy::Integer => TimestepType::Integer,
            TimestepStrategy::Float => TimestepType::Float,
            TimestepStrategy::Date => TimestepType::Date,
            TimestepStrategy::Datetime => TimestepType::Datetime,
        }
    }
}

impl From<TimestepType> for TimestepStrategy {
    fn from(kind: TimestepType) -> Self {
        match kind {
            TimestepType::Integer => TimestepStrategy::Integer,
            TimestepType::Float => TimestepStrategy::Float,
            TimestepType::Date => TimestepStrategy::Date,
            TimestepType::Datetime => TimestepStrategy::Datetime,
        }
    }
}

impl std::str::FromStr for TimestepStrategy {
    type Err = ChronoError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<TimestepType>().map(Self::from).map_err(|_| {
            ChronoError::UnsupportedStrategy(format!(
                "timestep imputation '{}' (choose 'integer', 'float', 'date', or 'datetime')",
                s
            ))
        })
    }
}

impl TimestepImputer for TimestepStrategy {
    fn impute(&self, data: &DataFrame, timestep_column: &str) -> Result<DataFrame> {
        match self {
            TimestepStrategy::Integer => IntegerImputation.impute(data, timestep_column),
            TimestepStrategy::Float => FloatImputation.impute(data, timestep_column),
            TimestepStrategy::Date => DateImputation.impute(data, timestep_column),
            TimestepStrategy::Datetime => DateTimeImputation.impute(data, timestep_column),
        }
    }
}

/// Fill the gaps of the timestep axis of `data`.
///
/// The table is sorted by `timestep_column`, the dense index is rebuilt, and
/// every original row is left-joined onto it. The timestep column comes
/// first in the result; rows introduced for missing positions carry nulls in
/// all other columns. Duplicate timesteps are rejected.
pub fn impute_timesteps(mut data: DataFrame, timestep_column: &str) -> Result<DataFrame> {
    let strategy = TimestepStrategy::for_column(&mut data, timestep_column)?;
    let data = data.sort([timestep_column], SortMultipleOptions::default())?;

    let series = axis_series(&data, timestep_column)?;
    let n_unique = series.n_unique()?;
    if n_unique != data.height() {
        return Err(ChronoError::SchemaError(format!(
            "timestep column '{}' has {} duplicate values",
            timestep_column,
            data.height() - n_unique
        )));
    }

    let axis = data.select([timestep_column])?;
    let index = strategy.impute(&axis, timestep_column)?;
    debug!(
        column = timestep_column,
        strategy = %strategy.timestep_type(),
        index_len = index.height(),
        "reconstructed timestep index"
    );

    let joined = index
        .left_join(&data, [timestep_column], [timestep_column])?
        .sort([timestep_column], SortMultipleOptions::default())?;

    info!(
        column = timestep_column,
        rows_before = data.height(),
        rows_after = joined.height(),
        "imputed missing timesteps"
    );
    Ok(joined)
}
