use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::parse::Diagnostic;

/// Custom error type for catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not well-formed XML
    #[error("Failed to parse catalog{}:\n{reason}\n\nTip: Verify the XML syntax is correct", describe_file(.file))]
    Xml {
        file: Option<PathBuf>,
        reason: String,
    },

    /// The document is XML but the root element is not a translation catalog
    #[error("Not a translation catalog{}: root element is <{found}>, expected <TS>", describe_file(.file))]
    InvalidRoot {
        file: Option<PathBuf>,
        found: String,
    },

    /// A context or message violates the catalog structure
    #[error("Malformed catalog{}: {diagnostic}", describe_file(.file))]
    Malformed {
        file: Option<PathBuf>,
        diagnostic: Diagnostic,
    },

    /// The settings file could not be parsed or holds an invalid value
    #[error("Invalid settings{}: {reason}", describe_file(.file))]
    Settings {
        file: Option<PathBuf>,
        reason: String,
    },

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_file(file: &Option<PathBuf>) -> String {
    match file {
        Some(path) => format!(" {}", path.display()),
        None => String::new(),
    }
}

impl CatalogError {
    /// Create an Xml error for in-memory input
    pub fn xml(reason: impl Into<String>) -> Self {
        Self::Xml {
            file: None,
            reason: reason.into(),
        }
    }

    /// Create a Malformed error for in-memory input
    pub fn malformed(diagnostic: Diagnostic) -> Self {
        Self::Malformed {
            file: None,
            diagnostic,
        }
    }

    /// Create a Settings error
    pub fn settings(file: Option<&Path>, reason: impl Into<String>) -> Self {
        Self::Settings {
            file: file.map(Path::to_path_buf),
            reason: reason.into(),
        }
    }

    /// Attach the originating file to errors produced from in-memory parsing
    pub fn with_file(self, path: &Path) -> Self {
        let path = Some(path.to_path_buf());
        match self {
            Self::Xml { reason, .. } => Self::Xml { file: path, reason },
            Self::InvalidRoot { found, .. } => Self::InvalidRoot { file: path, found },
            Self::Malformed { diagnostic, .. } => Self::Malformed {
                file: path,
                diagnostic,
            },
            Self::Settings { reason, .. } => Self::Settings { file: path, reason },
            other => other,
        }
    }

    /// The structural diagnostic, if this is a Malformed error
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Malformed { diagnostic, .. } => Some(diagnostic),
            _ => None,
        }
    }
}

/// Result type alias for CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;
