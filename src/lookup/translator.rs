use hashbrown::{Equivalent, HashMap};

use super::plural;
use crate::catalog::{Catalog, TranslationContent};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MessageKey {
    context: String,
    source: String,
    comment: String,
}

/// Borrowed form of `MessageKey`; hashes identically so lookups don't allocate
#[derive(Hash)]
struct KeyRef<'a> {
    context: &'a str,
    source: &'a str,
    comment: &'a str,
}

impl Equivalent<MessageKey> for KeyRef<'_> {
    fn equivalent(&self, key: &MessageKey) -> bool {
        self.context == key.context && self.source == key.source && self.comment == key.comment
    }
}

/// Read-only lookup table built from one catalog.
///
/// Only active entries with translation text are indexed; everything else
/// resolves to the source string.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    language: Option<String>,
    index: HashMap<MessageKey, TranslationContent>,
}

impl Translator {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let mut index = HashMap::with_capacity(catalog.message_count());
        let mut skipped = 0usize;

        for context in &catalog.contexts {
            for message in &context.messages {
                if !message.is_active() || message.translation.is_empty() {
                    skipped += 1;
                    continue;
                }
                let key = MessageKey {
                    context: context.name.clone(),
                    source: message.source.clone(),
                    comment: message.comment.clone().unwrap_or_default(),
                };
                if index.contains_key(&key) {
                    tracing::debug!(
                        context = %context.name,
                        source = %message.source,
                        "duplicate message, keeping the first"
                    );
                    continue;
                }
                index.insert(key, message.translation.content.clone());
            }
        }

        tracing::debug!(
            language = catalog.language.as_deref().unwrap_or("?"),
            indexed = index.len(),
            skipped,
            "built translator"
        );

        Self {
            language: catalog.language.clone(),
            index,
        }
    }

    /// Empty translator; every lookup falls back to the source
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn content(&self, context: &str, source: &str, comment: &str) -> Option<&TranslationContent> {
        self.index.get(&KeyRef {
            context,
            source,
            comment,
        })
    }

    /// Disambiguated entry first, then the entry without a comment
    fn content_with_fallback(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
    ) -> Option<&TranslationContent> {
        let comment = comment.unwrap_or_default();
        self.content(context, source, comment).or_else(|| {
            if comment.is_empty() {
                None
            } else {
                self.content(context, source, "")
            }
        })
    }

    /// Stored translation, if any
    pub fn find(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&str> {
        match self.content_with_fallback(context, source, comment)? {
            TranslationContent::Single(text) => Some(text.as_str()),
            TranslationContent::Plural(forms) => forms
                .iter()
                .find(|f| !f.is_empty())
                .map(String::as_str),
        }
    }

    /// Translation of `source` in `context`, or `source` itself when there is none
    pub fn translate<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.find(context, source, None).unwrap_or(source)
    }

    /// Like `translate`, preferring the entry with a matching disambiguation comment
    pub fn translate_disambiguated<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: &str,
    ) -> &'a str {
        self.find(context, source, Some(comment)).unwrap_or(source)
    }

    /// Plural-aware form for count `n`, with `%n` replaced, if an entry exists
    pub fn find_plural(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: u64,
    ) -> Option<String> {
        let text = match self.content_with_fallback(context, source, comment)? {
            TranslationContent::Single(text) => text.as_str(),
            TranslationContent::Plural(forms) => {
                let index = plural::plural_index(self.language(), n);
                match forms.get(index).filter(|f| !f.is_empty()) {
                    Some(form) => form.as_str(),
                    // fewer forms than the rule expects: use the last usable one
                    None => forms.iter().rev().find(|f| !f.is_empty())?.as_str(),
                }
            }
        };
        Some(plural::substitute_count(text, n))
    }

    /// Plural-aware translation, falling back to `source` with `%n` replaced
    pub fn translate_plural(&self, context: &str, source: &str, n: u64) -> String {
        self.find_plural(context, source, None, n)
            .unwrap_or_else(|| plural::substitute_count(source, n))
    }
}
