//! In-memory report sink for tests and dry runs.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::{HarvestError, Result};
use crate::traits::report::{ReportSink, ReportTable};

/// Keeps every written table in memory. Clones share storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryReportSink {
    tables: Arc<RwLock<Vec<ReportTable>>>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All tables written so far, oldest first.
    pub fn tables(&self) -> Vec<ReportTable> {
        self.tables
            .read()
            .map(|tables| tables.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReportSink for MemoryReportSink {
    async fn write_table(&self, table: &ReportTable) -> Result<()> {
        self.tables
            .write()
            .map_err(|_| HarvestError::ReportSink("report store lock poisoned".into()))?
            .push(table.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_tables() {
        let sink = MemoryReportSink::new();
        let handle = sink.clone();

        let mut table = ReportTable::new("Acme 2025-06-10 08:00");
        table.push_row(["Campaign Name"]);
        tokio_test::block_on(sink.write_table(&table)).unwrap();

        let tables = handle.tables();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0], table);
    }
}
