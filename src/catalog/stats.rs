use serde::Serialize;

use super::{Catalog, TranslationStatus};

/// Per-status message counts for a catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub contexts: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    pub total: usize,
}

impl CatalogStats {
    pub fn collect(catalog: &Catalog) -> Self {
        let mut stats = Self {
            contexts: catalog.contexts.len(),
            ..Self::default()
        };

        let language = catalog.language.as_deref();
        for message in catalog.contexts.iter().flat_map(|c| c.messages.iter()) {
            stats.total += 1;
            match message.translation.status {
                TranslationStatus::Vanished | TranslationStatus::Obsolete => stats.vanished += 1,
                _ if message.is_complete(language) => stats.finished += 1,
                // finished but missing text counts as untranslated
                _ => stats.unfinished += 1,
            }
        }

        stats
    }

    /// Entries that take part in lookup
    pub fn active(&self) -> usize {
        self.finished + self.unfinished
    }

    /// Share of active entries that are translated, 1.0 for an empty catalog
    pub fn completion_ratio(&self) -> f64 {
        if self.active() == 0 {
            1.0
        } else {
            self.finished as f64 / self.active() as f64
        }
    }
}
