use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{system_locale, LanguageSetting, LocaleTag, Settings};
use crate::lookup::Translator;
use crate::parse::{Diagnostic, TsParser};

/// Catalog file extension
pub const CATALOG_EXTENSION: &str = "ts";

/// What a load attempt produced. The translator is always usable.
#[derive(Debug)]
pub struct LoadOutcome {
    pub translator: Translator,
    /// The catalog file that was read, if any
    pub path: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadOutcome {
    fn empty(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            translator: Translator::empty(),
            path: None,
            diagnostics,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.path.is_some()
    }
}

/// Locates `<prefix>_<locale>.ts` catalogs in a directory and loads them
/// without ever failing the caller.
pub struct CatalogLoader {
    dir: PathBuf,
    prefix: String,
}

impl CatalogLoader {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.resolved_catalog_dir(), settings.prefix.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(&self, suffix: &str) -> String {
        format!("{}_{}.{}", self.prefix, suffix, CATALOG_EXTENSION)
    }

    /// Locale to load for a setting; `None` when `auto` finds no system locale
    pub fn locale_for(setting: &LanguageSetting) -> Option<LocaleTag> {
        match setting {
            LanguageSetting::Auto => system_locale(),
            LanguageSetting::Code(code) => LocaleTag::parse(code),
        }
    }

    /// Files to try for a setting, most specific first
    pub fn candidate_paths(&self, setting: &LanguageSetting) -> Vec<PathBuf> {
        match Self::locale_for(setting) {
            Some(tag) => tag
                .candidates()
                .iter()
                .map(|suffix| self.dir.join(self.file_name(suffix)))
                .collect(),
            // an unparseable explicit code is still tried verbatim
            None => match setting {
                LanguageSetting::Code(code) => vec![self.dir.join(self.file_name(code))],
                LanguageSetting::Auto => Vec::new(),
            },
        }
    }

    /// Load the best matching catalog.
    ///
    /// Missing files and unreadable or malformed catalogs degrade to an empty
    /// (or partially filled) translator; problems are logged and reported in
    /// the outcome's diagnostics.
    pub fn load(&self, setting: &LanguageSetting) -> LoadOutcome {
        let candidates = self.candidate_paths(setting);
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            tracing::warn!(
                language = %setting,
                dir = %self.dir.display(),
                "no translation catalog found, using source strings"
            );
            return LoadOutcome::empty(Vec::new());
        };

        let (catalog, diagnostics) = match TsParser::parse_file_lenient(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read translation catalog");
                return LoadOutcome::empty(vec![Diagnostic::new(e.to_string())]);
            }
        };

        if !diagnostics.is_empty() {
            tracing::warn!(
                path = %path.display(),
                problems = diagnostics.len(),
                "translation catalog partially loaded"
            );
        }

        let translator = Translator::from_catalog(&catalog);
        tracing::info!(
            path = %path.display(),
            language = catalog.language.as_deref().unwrap_or("?"),
            messages = translator.len(),
            "loaded translation catalog"
        );

        LoadOutcome {
            translator,
            path: Some(path.clone()),
            diagnostics,
        }
    }

    /// Language codes with a catalog in the directory, sorted
    pub fn available_languages(&self) -> Vec<String> {
        let marker = format!("{}_", self.prefix);
        let mut languages: Vec<String> = WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let path = e.path();
                if path.extension()? != CATALOG_EXTENSION {
                    return None;
                }
                let stem = path.file_stem()?.to_str()?;
                let language = stem.strip_prefix(&marker)?;
                (!language.is_empty()).then(|| language.to_string())
            })
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }
}
