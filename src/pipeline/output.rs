//! Final table output

use crate::error::Result;
use crate::utils::DataSaver;
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Holds the finished table for hand-off or writing
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    data: DataFrame,
}

impl OutputFormatter {
    pub fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// The table as produced by the pipeline
    pub fn format_output(&self) -> &DataFrame {
        &self.data
    }

    pub fn into_inner(self) -> DataFrame {
        self.data
    }

    /// Write the table as CSV with a header row
    pub fn save_to_csv(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        DataSaver::save_csv(&mut self.data, path)?;
        info!(
            path = %path.display(),
            rows = self.data.height(),
            columns = self.data.width(),
            "wrote output csv"
        );
        Ok(())
    }
}
