pub mod report;
pub mod ts_writer;

pub use report::{CheckReport, ReportFormatter};
pub use ts_writer::TsWriter;
