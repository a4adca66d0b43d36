pub mod entry;
pub mod merge;
pub mod stats;

use serde::{Deserialize, Serialize};

use crate::lookup::plural;

pub use entry::TranslationEntry;
pub use merge::{merge, purge_vanished, ExtractedMessage, MergeSummary};
pub use stats::CatalogStats;

/// Schema version written by current catalog tooling
pub const DEFAULT_VERSION: &str = "2.1";

/// A full set of translation entries for one target locale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Declared schema version (e.g., "2.1")
    pub version: String,
    /// Target locale identifier (e.g., "zh_CN")
    pub language: Option<String>,
    /// Locale of the source strings, when declared
    pub source_language: Option<String>,
    pub contexts: Vec<Context>,
}

/// Logical grouping of messages, usually one dialog or a global scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub comment: Option<String>,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub source: String,
    /// Disambiguation comment; distinguishes equal sources within a context
    pub comment: Option<String>,
    pub extra_comment: Option<String>,
    pub translator_comment: Option<String>,
    pub locations: Vec<Location>,
    pub numerus: bool,
    pub translation: Translation,
}

/// Provenance pointer into a UI definition or source file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filename: String,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub status: TranslationStatus,
    pub content: TranslationContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    Finished,
    Unfinished,
    Vanished,
    Obsolete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationContent {
    Single(String),
    Plural(Vec<String>),
}

impl TranslationStatus {
    /// Value of the `type` attribute, `None` for finished translations
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            Self::Finished => None,
            Self::Unfinished => Some("unfinished"),
            Self::Vanished => Some("vanished"),
            Self::Obsolete => Some("obsolete"),
        }
    }

    pub fn from_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None => Some(Self::Finished),
            Some("unfinished") => Some(Self::Unfinished),
            Some("vanished") => Some(Self::Vanished),
            Some("obsolete") => Some(Self::Obsolete),
            Some(_) => None,
        }
    }

    /// Superseded entries kept only for reference
    pub fn is_vanished(self) -> bool {
        matches!(self, Self::Vanished | Self::Obsolete)
    }
}

impl Translation {
    pub fn finished(text: impl Into<String>) -> Self {
        Self {
            status: TranslationStatus::Finished,
            content: TranslationContent::Single(text.into()),
        }
    }

    pub fn unfinished() -> Self {
        Self {
            status: TranslationStatus::Unfinished,
            content: TranslationContent::Single(String::new()),
        }
    }

    pub fn vanished(text: impl Into<String>) -> Self {
        Self {
            status: TranslationStatus::Vanished,
            content: TranslationContent::Single(text.into()),
        }
    }

    /// The singular text; for plural content the first form
    pub fn text(&self) -> &str {
        match &self.content {
            TranslationContent::Single(text) => text,
            TranslationContent::Plural(forms) => forms.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// Finished with every form a reader of `language` can be shown
    pub fn is_complete(&self, language: Option<&str>) -> bool {
        if self.status != TranslationStatus::Finished {
            return false;
        }
        match &self.content {
            TranslationContent::Single(text) => !text.is_empty(),
            TranslationContent::Plural(forms) => {
                forms.len() >= plural::form_count(language) && forms.iter().all(|f| !f.is_empty())
            }
        }
    }

    /// True when there is no usable text at all
    pub fn is_empty(&self) -> bool {
        match &self.content {
            TranslationContent::Single(text) => text.is_empty(),
            TranslationContent::Plural(forms) => forms.iter().all(String::is_empty),
        }
    }
}

impl Location {
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self {
            filename: filename.into(),
            line: Some(line),
        }
    }
}

impl Message {
    pub fn new(source: impl Into<String>, translation: Translation) -> Self {
        Self {
            source: source.into(),
            comment: None,
            extra_comment: None,
            translator_comment: None,
            locations: Vec::new(),
            numerus: false,
            translation,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.locations.push(location);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Active entries take part in lookup and completeness checks
    pub fn is_active(&self) -> bool {
        !self.translation.status.is_vanished()
    }

    /// Finished, with text in every numerus form `language` needs
    pub fn is_complete(&self, language: Option<&str>) -> bool {
        self.translation.is_complete(language)
    }
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: None,
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Find a message by source and disambiguation comment
    pub fn find(&self, source: &str, comment: Option<&str>) -> Option<&Message> {
        self.messages
            .iter()
            .find(|m| m.source == source && m.comment.as_deref() == comment)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Catalog {
    pub fn new(language: Option<String>) -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            language,
            source_language: None,
            contexts: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.contexts.push(context);
        self
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Flat view over every message in document order
    pub fn entries(&self) -> impl Iterator<Item = TranslationEntry> + '_ {
        self.contexts.iter().flat_map(|context| {
            context
                .messages
                .iter()
                .map(move |message| TranslationEntry::from_message(&context.name, message))
        })
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }

    /// Active entries that are unfinished or have no translation text
    pub fn incomplete_entries(&self) -> Vec<TranslationEntry> {
        let language = self.language.as_deref();
        self.contexts
            .iter()
            .flat_map(|context| {
                context
                    .messages
                    .iter()
                    .filter(|m| m.is_active() && !m.is_complete(language))
                    .map(move |m| TranslationEntry::from_message(&context.name, m))
            })
            .collect()
    }

    /// Every non-vanished entry is finished and translated
    pub fn is_complete(&self) -> bool {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter())
            .filter(|m| m.is_active())
            .all(|m| m.is_complete(self.language.as_deref()))
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::collect(self)
    }
}
