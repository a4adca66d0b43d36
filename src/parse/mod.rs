pub mod diagnostic;
pub mod ts_parser;

pub use diagnostic::{Diagnostic, TextPosition};
pub use ts_parser::TsParser;
