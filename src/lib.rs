pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod lookup;
pub mod output;
pub mod parse;

use std::path::Path;

// Re-export commonly used types
pub use catalog::{
    merge, purge_vanished, Catalog, CatalogStats, Context, ExtractedMessage, Location,
    MergeSummary, Message, Translation, TranslationContent, TranslationEntry, TranslationStatus,
};
pub use config::{LanguageSetting, LocaleTag, Settings};
pub use error::{CatalogError, Result};
pub use loader::{CatalogLoader, LoadOutcome};
pub use lookup::{arg, Args, Translator, TranslatorStack};
pub use output::{CheckReport, ReportFormatter, TsWriter};
pub use parse::{Diagnostic, TsParser};

/// Parameters for resolving one UI string
#[derive(Debug, Clone)]
pub struct LookupQuery {
    pub context: String,
    pub source: String,
    pub comment: Option<String>,
    /// Count for numerus messages
    pub count: Option<u64>,
    /// Values substituted for `%0`, `%1`, ... after translation
    pub args: Vec<String>,
}

impl LookupQuery {
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            comment: None,
            count: None,
            args: Vec::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

/// Resolve a query against a translator.
///
/// Translation never fails: a missing or vanished entry yields the source
/// string, which then goes through the same count and argument substitution.
pub fn run_lookup(translator: &Translator, query: &LookupQuery) -> String {
    let comment = query.comment.as_deref();
    let translated = match query.count {
        Some(n) => translator
            .find_plural(&query.context, &query.source, comment, n)
            .unwrap_or_else(|| lookup::plural::substitute_count(&query.source, n)),
        None => translator
            .find(&query.context, &query.source, comment)
            .unwrap_or(&query.source)
            .to_string(),
    };

    query
        .args
        .iter()
        .fold(Args::new(translated), |acc, value| acc.arg(value))
        .finish()
}

/// Strictly parse a catalog and report its completeness
#[must_use = "this function returns a Result that should be handled"]
pub fn check_catalog(path: &Path) -> Result<CheckReport> {
    let catalog = TsParser::parse_file(path)?;
    Ok(CheckReport::new(path.to_path_buf(), &catalog))
}

/// Parse `path` and write it back in canonical layout to `out`
#[must_use = "this function returns a Result that should be handled"]
pub fn normalize_catalog(path: &Path, out: &Path) -> Result<Catalog> {
    let catalog = TsParser::parse_file(path)?;
    TsWriter::write_file(&catalog, out)?;
    Ok(catalog)
}
