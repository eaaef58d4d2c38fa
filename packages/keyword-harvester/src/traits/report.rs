//! Report sink trait.

use async_trait::async_trait;

use crate::error::Result;

/// A named table of string cells, written once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTable {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }
}

/// Destination for the run report (a spreadsheet, a CSV file, ...).
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write_table(&self, table: &ReportTable) -> Result<()>;
}
