use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use toml_edit::{DocumentMut, Item, Value};

use crate::error::{CatalogError, Result};

/// Environment variable that overrides the configured language
pub const LANGUAGE_ENV_VAR: &str = "TSCAT_LANGUAGE";

const DEFAULT_CATALOG_DIR: &str = "i18n";
const DEFAULT_PREFIX: &str = "dd";

/// Which catalog language to use
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LanguageSetting {
    /// Follow the system locale
    #[default]
    Auto,
    Code(String),
}

impl FromStr for LanguageSetting {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else {
            Ok(Self::Code(trimmed.to_string()))
        }
    }
}

impl fmt::Display for LanguageSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Code(code) => f.write_str(code),
        }
    }
}

/// Persisted localization settings.
///
/// Edits go through the underlying TOML document so comments and layout in
/// the user's file survive a save.
#[derive(Debug, Clone)]
pub struct Settings {
    pub language: LanguageSetting,
    pub catalog_dir: PathBuf,
    pub prefix: String,
    path: Option<PathBuf>,
    document: DocumentMut,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: LanguageSetting::Auto,
            catalog_dir: PathBuf::from(DEFAULT_CATALOG_DIR),
            prefix: DEFAULT_PREFIX.to_string(),
            path: None,
            document: DocumentMut::new(),
        }
    }
}

impl Settings {
    /// Load settings from `path`; a missing file yields defaults bound to that path
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "settings file not found, using defaults");
            return Ok(Self {
                path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(path)?;
        let mut settings = Self::parse(&content).map_err(|e| e.with_file(path))?;
        settings.path = Some(path.to_path_buf());
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let document = content
            .parse::<DocumentMut>()
            .map_err(|e| CatalogError::settings(None, e.to_string()))?;

        let mut settings = Self::default();
        if let Some(language) = string_key(&document, "language")? {
            settings.language = language.parse().unwrap_or_default();
        }
        if let Some(dir) = string_key(&document, "catalog_dir")? {
            settings.catalog_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = string_key(&document, "prefix")? {
            if prefix.is_empty() {
                return Err(CatalogError::settings(None, "`prefix` must not be empty"));
            }
            settings.prefix = prefix.to_string();
        }
        settings.document = document;
        Ok(settings)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Catalog directory; relative paths are taken from the settings file's directory
    pub fn resolved_catalog_dir(&self) -> PathBuf {
        match self.path.as_deref().and_then(Path::parent) {
            Some(parent) if self.catalog_dir.is_relative() => parent.join(&self.catalog_dir),
            _ => self.catalog_dir.clone(),
        }
    }

    /// Effective language, honouring an override such as `TSCAT_LANGUAGE`
    pub fn effective_language(&self, override_value: Option<&str>) -> LanguageSetting {
        match override_value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => value.parse().unwrap_or_default(),
            None => self.language.clone(),
        }
    }

    /// Effective language using the process environment
    pub fn language_from_env(&self) -> LanguageSetting {
        let env_value = std::env::var(LANGUAGE_ENV_VAR).ok();
        self.effective_language(env_value.as_deref())
    }

    pub fn set_language(&mut self, language: LanguageSetting) {
        let mut new_value = Value::from(language.to_string());
        // keep the spacing and trailing comment of the line being replaced
        if let Some(old) = self.document.get("language").and_then(Item::as_value) {
            *new_value.decor_mut() = old.decor().clone();
        }
        self.document["language"] = Item::Value(new_value);
        self.language = language;
    }

    /// Write back to the file the settings were loaded from
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| CatalogError::settings(None, "settings were not loaded from a file"))?;
        self.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.document.to_string())?;
        Ok(())
    }
}

fn string_key<'a>(document: &'a DocumentMut, key: &str) -> Result<Option<&'a str>> {
    match document.get(key) {
        None | Some(Item::None) => Ok(None),
        Some(item) => item
            .as_str()
            .map(Some)
            .ok_or_else(|| CatalogError::settings(None, format!("`{}` must be a string", key))),
    }
}
