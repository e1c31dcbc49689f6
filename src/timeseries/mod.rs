//! Time series module
//!
//! Provides the timestep axis handling and feature engineering:
//! - Timestep type classification
//! - Rolling window features
//! - An owned dataset wrapping the full preprocessing chain

pub mod dataset;
pub mod features;
pub mod timestep;

pub use dataset::TimeSeriesDataset;
pub use features::{feature_name, WindowFeatureGenerator, WindowStat};
pub use timestep::{classify_timestep, parse_datetime, TimestepType};
