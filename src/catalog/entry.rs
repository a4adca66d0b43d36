use serde::{Deserialize, Serialize};

use super::{Location, Message};

/// Flat view of one catalog message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Name of the owning context (e.g., "PreferencesDialog")
    pub context: String,
    /// The untranslated UI string
    pub source_text: String,
    /// Singular translation text; empty when untranslated
    pub translation_text: String,
    /// Superseded entry kept for reference (`vanished` or `obsolete`)
    pub vanished: bool,
    pub locations: Vec<Location>,
}

impl TranslationEntry {
    pub fn from_message(context: &str, message: &Message) -> Self {
        Self {
            context: context.to_string(),
            source_text: message.source.clone(),
            translation_text: message.translation.text().to_string(),
            vanished: message.translation.status.is_vanished(),
            locations: message.locations.clone(),
        }
    }

    /// First location rendered as `file:line`, if any
    pub fn primary_location(&self) -> Option<String> {
        self.locations.first().map(|loc| match loc.line {
            Some(line) => format!("{}:{}", loc.filename, line),
            None => loc.filename.clone(),
        })
    }
}
