use colored::{Color, Colorize};
use serde::Serialize;
use std::path::PathBuf;

use crate::catalog::{Catalog, CatalogStats, MergeSummary, TranslationEntry};
use crate::parse::Diagnostic;

/// Result of checking one catalog for completeness
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub file: PathBuf,
    pub language: Option<String>,
    pub stats: CatalogStats,
    pub incomplete: Vec<TranslationEntry>,
}

impl CheckReport {
    pub fn new(file: PathBuf, catalog: &Catalog) -> Self {
        Self {
            file,
            language: catalog.language.clone(),
            stats: catalog.stats(),
            incomplete: catalog.incomplete_entries(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }
}

/// Formatter for human-readable catalog reports
pub struct ReportFormatter {
    use_color: bool,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self { use_color: true }
    }

    /// Disable ANSI colors regardless of terminal detection
    pub fn plain() -> Self {
        Self { use_color: false }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.use_color {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.use_color {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// Summary of per-status counts
    pub fn format_stats(&self, file: &str, language: Option<&str>, stats: &CatalogStats) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} ({})\n",
            self.bold(file),
            language.unwrap_or("no language")
        ));
        output.push_str(&format!("  contexts:   {}\n", stats.contexts));
        output.push_str(&format!("  messages:   {}\n", stats.total));
        output.push_str(&format!(
            "  finished:   {}\n",
            self.paint(&stats.finished.to_string(), Color::Green)
        ));
        output.push_str(&format!(
            "  unfinished: {}\n",
            self.paint(&stats.unfinished.to_string(), Color::Yellow)
        ));
        output.push_str(&format!("  vanished:   {}\n", stats.vanished));
        output.push_str(&format!(
            "  complete:   {:.1}%\n",
            stats.completion_ratio() * 100.0
        ));
        output
    }

    /// Completeness verdict followed by one `file:line:context: 'source'` row
    /// per untranslated entry
    pub fn format_check(&self, report: &CheckReport) -> String {
        let file = report.file.display().to_string();
        let mut output = String::new();

        if report.is_complete() {
            output.push_str(&format!(
                "{} {}: {} active messages translated\n",
                self.paint("OK", Color::Green),
                file,
                report.stats.active()
            ));
            return output;
        }

        output.push_str(&format!(
            "{} {}: {} of {} active messages untranslated\n",
            self.paint("INCOMPLETE", Color::Red),
            file,
            report.incomplete.len(),
            report.stats.active()
        ));
        for entry in &report.incomplete {
            let location = entry.primary_location().unwrap_or_else(|| file.clone());
            output.push_str(&format!(
                "{}:{}: '{}'\n",
                location,
                entry.context,
                entry.source_text.replace('\n', "\\n")
            ));
        }
        output
    }

    /// One line per diagnostic, warning-colored
    pub fn format_diagnostics(&self, diagnostics: &[Diagnostic]) -> String {
        let mut output = String::new();
        for diagnostic in diagnostics {
            output.push_str(&format!(
                "{} {}\n",
                self.paint("warning:", Color::Yellow),
                diagnostic
            ));
        }
        output
    }

    pub fn format_merge(&self, summary: &MergeSummary) -> String {
        format!(
            "{} new, {} updated, {} revived, {} vanished, {} removed\n",
            self.paint(&summary.added.to_string(), Color::Green),
            summary.updated,
            summary.revived,
            self.paint(&summary.vanished.to_string(), Color::Yellow),
            summary.removed
        )
    }

    /// Pretty JSON for any serializable report
    pub fn to_json<T: Serialize>(value: &T) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}
