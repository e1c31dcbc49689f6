//! Model training module
//!
//! Provides the boosted-tree regressor used to score feature importance.

pub mod xgboost;

pub use xgboost::{XGBoostConfig, XGBoostRegressor};
