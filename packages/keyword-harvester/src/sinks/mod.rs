//! Report sink implementations.

pub mod csv;
pub mod memory;

pub use self::csv::CsvReportSink;
pub use self::memory::MemoryReportSink;
