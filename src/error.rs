//! Error types for the Kolosal Chrono feature toolkit

use thiserror::Error;

/// Result type alias for Kolosal Chrono operations
pub type Result<T> = std::result::Result<T, ChronoError>;

/// Main error type for the toolkit
#[derive(Error, Debug)]
pub enum ChronoError {
    /// A referenced column is missing or the container is unusable
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// The operation needs numeric or temporal data the column doesn't hold
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Unsupported timestep type: {0}")]
    UnsupportedType(String),

    #[error("Unsupported strategy: {0}")]
    UnsupportedStrategy(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },
}

impl ChronoError {
    /// Shorthand for the "column not in table" case
    pub fn missing_column(column: &str) -> Self {
        ChronoError::SchemaError(format!("column '{}' is not in the DataFrame", column))
    }
}

impl From<polars::error::PolarsError> for ChronoError {
    fn from(err: polars::error::PolarsError) -> Self {
        ChronoError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ChronoError {
    fn from(err: serde_json::Error) -> Self {
        ChronoError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ChronoError {
    fn from(err: ndarray::ShapeError) -> Self {
        ChronoError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChronoError::UnsupportedStrategy("bogus".to_string());
        assert_eq!(err.to_string(), "Unsupported strategy: bogus");
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let err = ChronoError::missing_column("ts");
        assert!(matches!(err, ChronoError::SchemaError(_)));
        assert!(err.to_string().contains("'ts'"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChronoError = io_err.into();
        assert!(matches!(err, ChronoError::IoError(_)));
    }
}
