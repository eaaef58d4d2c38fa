//! CSV report sink: one file per run inside a directory.

use async_trait::async_trait;
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{HarvestError, Result};
use crate::traits::report::{ReportSink, ReportTable};

/// Writes each table to `<dir>/<sanitized table name>.csv`.
#[derive(Debug, Clone)]
pub struct CsvReportSink {
    dir: PathBuf,
}

impl CsvReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File the given table name is written to.
    pub fn path_for(&self, table_name: &str) -> PathBuf {
        let file_name: String = table_name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.csv", file_name))
    }

    fn write_blocking(path: &Path, table: &ReportTable) -> Result<()> {
        let mut writer = WriterBuilder::new().flexible(true).from_path(path)?;
        for row in &table.rows {
            if row.is_empty() {
                writer.write_record([""])?;
            } else {
                writer.write_record(row)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl ReportSink for CsvReportSink {
    async fn write_table(&self, table: &ReportTable) -> Result<()> {
        if !self.dir.is_dir() {
            return Err(HarvestError::ReportSink(format!(
                "report directory does not exist: {}",
                self.dir.display()
            )));
        }
        let path = self.path_for(&table.name);
        if path.exists() {
            return Err(HarvestError::ReportSink(format!(
                "report already exists: {}",
                path.display()
            )));
        }

        Self::write_blocking(&path, table)?;
        debug!(path = %path.display(), rows = table.rows.len(), "Wrote CSV report");
        Ok(())
    }
}
