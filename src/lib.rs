//! Kolosal Chrono - Time series feature engineering
//!
//! This crate turns an irregular time series table into a compact feature
//! table:
//! - Timestep gap filling on integer, float, date and datetime axes
//! - Missing value imputation (last, zero, linear)
//! - Rolling window features (min, max, avg, nth)
//! - Feature selection by boosted-tree importance
//!
//! # Modules
//!
//! ## Core
//! - [`imputation`] - Timestep and value imputation strategies
//! - [`timeseries`] - Timestep classification, window features, datasets
//! - [`selection`] - Importance-based feature selection
//! - [`training`] - Gradient-boosted regressor behind the selector
//!
//! ## Orchestration
//! - [`pipeline`] - Multi-column pipeline and CSV output
//! - [`config`] - Pipeline options
//!
//! ## Services
//! - [`cli`] - Command-line interface
//! - [`utils`] - CSV loading and saving

// Core error handling
pub mod error;

// Core modules
pub mod imputation;
pub mod selection;
pub mod timeseries;
pub mod training;

// Orchestration
pub mod config;
pub mod pipeline;

// Services
pub mod cli;
pub mod utils;

pub use error::{ChronoError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{ChronoError, Result};

    // Configuration
    pub use crate::config::PipelineConfig;

    // Imputation
    pub use crate::imputation::{
        impute_timesteps, impute_value_columns, TimestepImputer, TimestepStrategy, ValueImputeStrategy,
        ValueImputer,
    };

    // Time series
    pub use crate::timeseries::{TimeSeriesDataset, TimestepType, WindowFeatureGenerator, WindowStat};

    // Selection
    pub use crate::selection::{
        get_feature_selector, FeatureSelectionStrategy, FeatureSelector, SelectionRequest, SelectorModel,
        XGBoostFeatureSelector,
    };

    // Pipeline
    pub use crate::pipeline::{FeaturePipeline, OutputFormatter};

    // I/O
    pub use crate::utils::{DataLoader, DataSaver};
}
