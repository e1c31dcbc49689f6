//! Timestep axis classification
//!
//! Decides whether a column can act as the position axis of a series and,
//! for textual columns, converts it in place to a typed temporal column.

use crate::error::{ChronoError, Result};
use chrono::{Datelike, DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub(crate) const MILLIS_PER_DAY: i64 = 86_400_000;

/// Kind of position axis held by a timestep column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestepType {
    Integer,
    Float,
    Date,
    Datetime,
}

impl TimestepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestepType::Integer => "integer",
            TimestepType::Float => "float",
            TimestepType::Date => "date",
            TimestepType::Datetime => "datetime",
        }
    }
}

impl fmt::Display for TimestepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestepType {
    type Err = ChronoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "integer" => Ok(TimestepType::Integer),
            "float" => Ok(TimestepType::Float),
            "date" => Ok(TimestepType::Date),
            "datetime" => Ok(TimestepType::Datetime),
            other => Err(ChronoError::UnsupportedType(other.to_string())),
        }
    }
}

pub(crate) fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

pub(crate) fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

pub(crate) fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Number of physical units in one second for a datetime column
pub(crate) fn units_per_second(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    }
}

/// Classify the timestep column of `df`.
///
/// Integer, float and date columns are returned as-is. A datetime column
/// whose values all fall on midnight is narrowed to `Date`. String columns
/// are parsed value by value; on success the column is replaced by its typed
/// form (`Date` when every value falls on midnight, `Datetime(ms)`
/// otherwise), so callers must expect the column's dtype to change.
pub fn classify_timestep(df: &mut DataFrame, column: &str) -> Result<TimestepType> {
    let col = df
        .column(column)
        .map_err(|_| ChronoError::missing_column(column))?;
    let dtype = col.dtype().clone();

    let kind = match &dtype {
        d if is_integer_dtype(d) => TimestepType::Integer,
        d if is_float_dtype(d) => TimestepType::Float,
        DataType::Date => TimestepType::Date,
        DataType::Datetime(unit, _) => {
            let per_day = MILLIS_PER_DAY / 1_000 * units_per_second(*unit);
            let physical = col.as_materialized_series().cast(&DataType::Int64)?;
            let all_midnight = physical
                .i64()?
                .into_iter()
                .flatten()
                .all(|v| v.rem_euclid(per_day) == 0);
            if all_midnight {
                let dates = col.as_materialized_series().cast(&DataType::Date)?;
                df.with_column(dates)?;
                TimestepType::Date
            } else {
                TimestepType::Datetime
            }
        }
        DataType::String => {
            let parsed = parse_string_column(col.as_materialized_series())?;
            let name = col.name().clone();
            let all_midnight = parsed.iter().all(|dt| dt.time() == NaiveTime::MIN);

            let typed = if all_midnight {
                let days: Vec<i32> = parsed
                    .iter()
                    .map(|dt| dt.date().num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
                    .collect();
                Series::new(name, days).cast(&DataType::Date)?
            } else {
                let millis: Vec<i64> = parsed
                    .iter()
                    .map(|dt| dt.and_utc().timestamp_millis())
                    .collect();
                Series::new(name, millis)
                    .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
            };
            df.with_column(typed)?;

            if all_midnight {
                TimestepType::Date
            } else {
                TimestepType::Datetime
            }
        }
        other => {
            return Err(ChronoError::TypeError(format!(
                "column '{}' of type {} is not integer, float, or date/datetime-convertible",
                column, other
            )))
        }
    };

    debug!(column, timestep_type = %kind, "classified timestep column");
    Ok(kind)
}

fn parse_string_column(series: &Series) -> Result<Vec<NaiveDateTime>> {
    let ca = series.str()?;
    ca.into_iter()
        .map(|value| {
            value.and_then(parse_datetime).ok_or_else(|| {
                ChronoError::TypeError(format!(
                    "column '{}' is not integer, float, or date/datetime-convertible (value {:?})",
                    series.name(),
                    value
                ))
            })
        })
        .collect()
}

/// Parse a single textual timestamp.
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    const DATETIME_FORMATS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_and_float_columns() {
        let mut df = df!(
            "integer" => &[1i64, 2, 4, 5],
            "float" => &[1.0, 2.0, 4.0, 5.0]
        )
        .unwrap();

        assert_eq!(classify_timestep(&mut df, "integer").unwrap(), TimestepType::Integer);
        assert_eq!(classify_timestep(&mut df, "float").unwrap(), TimestepType::Float);
    }

    #[test]
    fn test_string_dates_become_date_column() {
        let mut df = df!("date" => &["2020-01-01", "2020-01-03", "2020-01-05"]).unwrap();

        assert_eq!(classify_timestep(&mut df, "date").unwrap(), TimestepType::Date);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_string_times_become_datetime_column() {
        let mut df = df!("ts" => &["2020-01-01 00:00:00", "2020-01-01 02:00:00"]).unwrap();

        assert_eq!(classify_timestep(&mut df, "ts").unwrap(), TimestepType::Datetime);
        assert_eq!(
            df.column("ts").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
    }

    #[test]
    fn test_midnight_datetime_is_date() {
        let millis: Vec<i64> = (0..3).map(|d| d * MILLIS_PER_DAY).collect();
        let series = Series::new("ts".into(), millis)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .unwrap();
        let mut df = DataFrame::new(vec![series.into()]).unwrap();

        assert_eq!(classify_timestep(&mut df, "ts").unwrap(), TimestepType::Date);
        assert_eq!(df.column("ts").unwrap().dtype(), &DataType::Date);
    }

    #[test]
    fn test_unparseable_strings_are_type_errors() {
        for values in [["a", "b", "c"], ["1.1", "2.2", "3.3"]] {
            let mut df = df!("col" => &values).unwrap();
            let err = classify_timestep(&mut df, "col").unwrap_err();
            assert!(matches!(err, ChronoError::TypeError(_)));
            assert_eq!(df.column("col").unwrap().dtype(), &DataType::String);
        }
    }

    #[test]
    fn test_missing_column() {
        let mut df = df!("a" => &[1i64, 2]).unwrap();
        let err = classify_timestep(&mut df, "nonexistent_column").unwrap_err();
        assert!(matches!(err, ChronoError::SchemaError(_)));
    }

    #[test]
    fn test_type_key_parsing() {
        assert_eq!("Datetime".parse::<TimestepType>().unwrap(), TimestepType::Datetime);
        assert!(matches!(
            "weekly".parse::<TimestepType>(),
            Err(ChronoError::UnsupportedType(_))
        ));
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert!(parse_datetime("2022-01-04").is_some());
        assert!(parse_datetime("2022-01-04T10:11:12").is_some());
        assert!(parse_datetime("2022-01-04T10:11:12Z").is_some());
        assert!(parse_datetime("01/04/2022").is_some());
        assert!(parse_datetime("yesterday").is_none());
    }
}
