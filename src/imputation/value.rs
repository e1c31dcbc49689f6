//! Value imputation strategies

use crate::error::{ChronoError, Result};
use crate::imputation::is_missing;
use crate::timeseries::timestep::{is_float_dtype, is_numeric_dtype};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Trait for per-column value imputers
pub trait ValueImputer {
    /// Return a copy of `data` with missing values filled.
    ///
    /// Output has the same name and length as the input.
    fn impute(&self, data: &Series) -> Result<Series>;
}

/// Forward fill, then back fill the leading run
#[derive(Debug, Clone, Copy, Default)]
pub struct LastValueImputation;

/// Replace missing values with 0
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroImputation;

/// Linear interpolation by position, forward/back fill at the edges
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearImputation;

/// Turn NaN into null so that float gaps look like any other gap.
///
/// The result keeps the dtype of `data`.
fn nan_as_null(data: &Series) -> Result<Series> {
    if !is_float_dtype(data.dtype()) {
        return Ok(data.clone());
    }
    let values = data.cast(&DataType::Float64)?;
    let ca = values.f64()?;
    if !ca.into_iter().flatten().any(is_missing) {
        return Ok(data.clone());
    }
    let cleaned: Float64Chunked = ca
        .into_iter()
        .map(|v| v.filter(|x| !is_missing(*x)))
        .collect();
    Ok(cleaned
        .with_name(data.name().clone())
        .into_series()
        .cast(data.dtype())?)
}

fn require_numeric(strategy: &str, data: &Series) -> Result<()> {
    if is_numeric_dtype(data.dtype()) {
        Ok(())
    } else {
        Err(ChronoError::TypeError(format!(
            "{} imputation does not apply to non-numeric column '{}' of type {}",
            strategy,
            data.name(),
            data.dtype()
        )))
    }
}

impl ValueImputer for LastValueImputation {
    fn impute(&self, data: &Series) -> Result<Series> {
        let filled = nan_as_null(data)?
            .fill_null(FillNullStrategy::Forward(None))?
            .fill_null(FillNullStrategy::Backward(None))?;
        Ok(filled)
    }
}

impl ValueImputer for ZeroImputation {
    fn impute(&self, data: &Series) -> Result<Series> {
        require_numeric("zero", data)?;
        Ok(nan_as_null(data)?.fill_null(FillNullStrategy::Zero)?)
    }
}

impl ValueImputer for LinearImputation {
    fn impute(&self, data: &Series) -> Result<Series> {
        require_numeric("linear", data)?;
        let values = nan_as_null(data)?.cast(&DataType::Float64)?;
        let mut filled: Vec<Option<f64>> = values.f64()?.into_iter().collect();
        interpolate_linear(&mut filled);
        Ok(Series::new(data.name().clone(), filled))
    }
}

/// Fill interior gaps by linear interpolation against position; leading and
/// trailing gaps take the nearest observed value.
pub(crate) fn interpolate_linear(values: &mut [Option<f64>]) {
    let known: Vec<usize> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    let (first, last) = match (known.first(), known.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return,
    };

    for pair in known.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hi - lo < 2 {
            continue;
        }
        let (y0, y1) = match (values[lo], values[hi]) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        let span = (hi - lo) as f64;
        for k in lo + 1..hi {
            values[k] = Some(y0 + (y1 - y0) * (k - lo) as f64 / span);
        }
    }

    let head = values[first];
    values[..first].iter_mut().for_each(|v| *v = head);
    let tail = values[last];
    values[last + 1..].iter_mut().for_each(|v| *v = tail);
}

/// Closed set of value imputation strategies, selected by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueImputeStrategy {
    #[default]
    Last,
    Zero,
    Linear,
}

impl ValueImputeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueImputeStrategy::Last => "last",
            ValueImputeStrategy::Zero => "zero",
            ValueImputeStrategy::Linear => "linear",
        }
    }
}

impl fmt::Display for ValueImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueImputeStrategy {
    type Err = ChronoError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "last" => Ok(ValueImputeStrategy::Last),
            "zero" => Ok(ValueImputeStrategy::Zero),
            "linear" => Ok(ValueImputeStrategy::Linear),
            other => Err(ChronoError::UnsupportedStrategy(format!(
                "value imputation '{}' (choose 'last', 'zero', or 'linear')",
                other
            ))),
        }
    }
}

impl ValueImputer for ValueImputeStrategy {
    fn impute(&self, data: &Series) -> Result<Series> {
        match self {
            ValueImputeStrategy::Last => LastValueImputation.impute(data),
            ValueImputeStrategy::Zero => ZeroImputation.impute(data),
            ValueImputeStrategy::Linear => LinearImputation.impute(data),
        }
    }
}

/// Look up a value imputation strategy by name
pub fn get_value_imputer(name: &str) -> Result<ValueImputeStrategy> {
    name.parse()
}

/// Impute every column in `columns` in place.
///
/// All names are checked before anything is written, so a missing column
/// leaves `data` untouched.
pub fn impute_value_columns<S: AsRef<str>>(
    data: &mut DataFrame,
    columns: &[S],
    strategy: ValueImputeStrategy,
) -> Result<()> {
    for name in columns {
        let name = name.as_ref();
        if data.column(name).is_err() {
            return Err(ChronoError::SchemaError(format!(
                "column '{}' not in input dataframe columns {:?}",
                name,
                data.get_column_names()
            )));
        }
    }

    let imputed = columns
        .iter()
        .map(|name| {
            let series = data.column(name.as_ref())?.as_materialized_series();
            strategy.impute(series)
        })
        .collect::<Result<Vec<_>>>()?;

    for series in imputed {
        debug!(
            column = %series.name(),
            %strategy,
            remaining_nulls = series.null_count(),
            "imputed value column"
        );
        data.with_column(series)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_values(series: &Series) -> Vec<Option<f64>> {
        series.f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_strategy_lookup() {
        assert_eq!(get_value_imputer("last").unwrap(), ValueImputeStrategy::Last);
        assert_eq!(get_value_imputer("zero").unwrap(), ValueImputeStrategy::Zero);
        assert_eq!(get_value_imputer("linear").unwrap(), ValueImputeStrategy::Linear);
        assert!(matches!(
            get_value_imputer("unknown"),
            Err(ChronoError::UnsupportedStrategy(_))
        ));
    }

    #[test]
    fn test_last_value_imputation() {
        let series = Series::new("col1".into(), &[Some(1.0), Some(2.0), None, Some(4.0)]);
        let imputed = LastValueImputation.impute(&series).unwrap();
        assert_eq!(imputed.null_count(), 0);
        assert_eq!(float_values(&imputed), vec![Some(1.0), Some(2.0), Some(2.0), Some(4.0)]);
    }

    #[test]
    fn test_last_value_back_fills_leading_gap() {
        let series = Series::new("col1".into(), &[None, None, Some(3i64), None]);
        let imputed = LastValueImputation.impute(&series).unwrap();
        let values: Vec<Option<i64>> = imputed.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(3), Some(3), Some(3), Some(3)]);
    }

    #[test]
    fn test_last_value_on_strings() {
        let series = Series::new("label".into(), &[None, Some("a"), None]);
        let imputed = LastValueImputation.impute(&series).unwrap();
        assert_eq!(imputed.null_count(), 0);
    }

    #[test]
    fn test_zero_imputation_is_exact() {
        let series = Series::new("col1".into(), &[Some(1.0), None, Some(3.0), Some(4.0)]);
        let imputed = ZeroImputation.impute(&series).unwrap();
        assert_eq!(float_values(&imputed), vec![Some(1.0), Some(0.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_zero_imputation_keeps_integer_dtype() {
        let series = Series::new("col1".into(), &[Some(1i64), None, Some(3)]);
        let imputed = ZeroImputation.impute(&series).unwrap();
        assert_eq!(imputed.dtype(), &DataType::Int64);
        let values: Vec<Option<i64>> = imputed.i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1), Some(0), Some(3)]);
    }

    #[test]
    fn test_float32_dtype_is_kept() {
        let series = Series::new("col1".into(), &[Some(1.0f32), None, Some(3.0)]);
        let zero = ZeroImputation.impute(&series).unwrap();
        let last = LastValueImputation.impute(&series).unwrap();
        assert_eq!(zero.dtype(), &DataType::Float32);
        assert_eq!(last.dtype(), &DataType::Float32);

        let values: Vec<Option<f32>> = zero.f32().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(0.0), Some(3.0)]);

        let with_nan = Series::new("col1".into(), &[1.0f32, f32::NAN, 3.0]);
        let filled = LastValueImputation.impute(&with_nan).unwrap();
        assert_eq!(filled.dtype(), &DataType::Float32);
        let values: Vec<Option<f32>> = filled.f32().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1.0), Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_zero_treats_nan_as_missing() {
        let series = Series::new("col1".into(), &[1.0, f64::NAN, 3.0]);
        let imputed = ZeroImputation.impute(&series).unwrap();
        assert_eq!(float_values(&imputed), vec![Some(1.0), Some(0.0), Some(3.0)]);
    }

    #[test]
    fn test_linear_imputation_midpoint() {
        let series = Series::new("col1".into(), &[Some(1.0), None, Some(3.0), Some(4.0)]);
        let imputed = LinearImputation.impute(&series).unwrap();
        assert_eq!(float_values(&imputed), vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_linear_imputation_edges_fall_back_to_nearest() {
        let series = Series::new(
            "col1".into(),
            &[None, Some(1i64), None, None, Some(4), None],
        );
        let imputed = LinearImputation.impute(&series).unwrap();
        assert_eq!(
            float_values(&imputed),
            vec![Some(1.0), Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(4.0)]
        );
    }

    #[test]
    fn test_linear_rejects_non_numeric() {
        let series = Series::new("label".into(), &["a", "b"]);
        let err = LinearImputation.impute(&series).unwrap_err();
        assert!(matches!(err, ChronoError::TypeError(_)));
    }

    #[test]
    fn test_all_missing_stays_missing() {
        let series = Series::new("col1".into(), &[None::<f64>, None]);
        let imputed = LinearImputation.impute(&series).unwrap();
        assert_eq!(imputed.null_count(), 2);
    }

    #[test]
    fn test_impute_value_columns_checks_names_first() {
        let mut df = df!(
            "a" => &[Some(1.0), None],
            "b" => &[None, Some(2.0)]
        )
        .unwrap();

        let err = impute_value_columns(&mut df, &["a", "missing"], ValueImputeStrategy::Zero)
            .unwrap_err();
        assert!(matches!(err, ChronoError::SchemaError(_)));
        assert_eq!(df.column("a").unwrap().null_count(), 1);

        impute_value_columns(&mut df, &["a", "b"], ValueImputeStrategy::Last).unwrap();
        assert_eq!(df.column("a").unwrap().null_count(), 0);
        assert_eq!(df.column("b").unwrap().null_count(), 0);
    }
}
