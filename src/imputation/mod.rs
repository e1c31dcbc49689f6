//! Imputation module
//!
//! Provides the two gap-filling families used before feature generation:
//! - Timestep imputation (integer, float, date, datetime axes)
//! - Value imputation (last, zero, linear)

pub mod timestep;
pub mod value;

pub use timestep::{
    impute_timesteps, DateImputation, DateTimeImputation, FloatImputation, IntegerImputation,
    TimestepImputer, TimestepStrategy, FLOAT_STEP,
};
pub use value::{
    get_value_imputer, impute_value_columns, LastValueImputation, LinearImputation,
    ValueImputeStrategy, ValueImputer, ZeroImputation,
};

/// Check if value is missing (NaN)
#[inline]
pub fn is_missing(v: f64) -> bool {
    v.is_nan()
}
