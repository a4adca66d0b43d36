use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use super::{Catalog, Context, Location, Message, Translation, TranslationContent, TranslationStatus};

/// A UI string as found by an upstream extraction pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMessage {
    pub context: String,
    pub source: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub numerus: bool,
}

/// What a merge changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
    pub revived: usize,
    pub vanished: usize,
    pub removed: usize,
}

type MessageKey = (String, String, Option<String>);

fn key_of(context: &str, message: &Message) -> MessageKey {
    (
        context.to_string(),
        message.source.clone(),
        message.comment.clone(),
    )
}

/// Bring `catalog` in line with a fresh extraction.
///
/// Known strings get their locations replaced, new strings are appended as
/// unfinished, and strings no longer extracted are marked vanished when they
/// carry a translation or dropped when they don't.
pub fn merge(catalog: &mut Catalog, extracted: &[ExtractedMessage]) -> MergeSummary {
    let mut summary = MergeSummary::default();

    // Collapse duplicate extractions, keeping first-seen order
    let mut order: Vec<MessageKey> = Vec::new();
    let mut wanted: HashMap<MessageKey, ExtractedMessage> = HashMap::new();
    for item in extracted {
        let key = (item.context.clone(), item.source.clone(), item.comment.clone());
        match wanted.get_mut(&key) {
            Some(existing) => {
                for loc in &item.locations {
                    if !existing.locations.contains(loc) {
                        existing.locations.push(loc.clone());
                    }
                }
                existing.numerus |= item.numerus;
            }
            None => {
                order.push(key.clone());
                wanted.insert(key, item.clone());
            }
        }
    }

    let mut seen: HashSet<MessageKey> = HashSet::new();
    for context in &mut catalog.contexts {
        let name = context.name.clone();
        let before = context.messages.len();
        context.messages.retain_mut(|message| {
            let key = key_of(&name, message);
            if let Some(item) = wanted.get(&key) {
                if seen.insert(key) {
                    message.locations = item.locations.clone();
                    if message.translation.status.is_vanished() {
                        message.translation.status = TranslationStatus::Unfinished;
                        summary.revived += 1;
                    } else {
                        summary.updated += 1;
                    }
                    return true;
                }
                // a second copy of an extracted message is redundant
                return false;
            }

            if message.translation.status.is_vanished() {
                return true;
            }
            if message.translation.is_empty() {
                return false;
            }
            message.translation.status = TranslationStatus::Vanished;
            message.locations.clear();
            summary.vanished += 1;
            true
        });
        summary.removed += before - context.messages.len();
    }

    for key in order {
        if seen.contains(&key) {
            continue;
        }
        let Some(item) = wanted.remove(&key) else {
            continue;
        };
        let message = new_message(&item);
        match catalog.context_mut(&item.context) {
            Some(context) => context.messages.push(message),
            None => catalog
                .contexts
                .push(Context::new(item.context.clone()).with_message(message)),
        }
        summary.added += 1;
    }

    tracing::debug!(
        added = summary.added,
        updated = summary.updated,
        revived = summary.revived,
        vanished = summary.vanished,
        removed = summary.removed,
        "merged extracted messages"
    );

    summary
}

fn new_message(item: &ExtractedMessage) -> Message {
    let translation = if item.numerus {
        Translation {
            status: TranslationStatus::Unfinished,
            content: TranslationContent::Plural(vec![String::new()]),
        }
    } else {
        Translation::unfinished()
    };

    Message {
        source: item.source.clone(),
        comment: item.comment.clone(),
        extra_comment: None,
        translator_comment: None,
        locations: item.locations.clone(),
        numerus: item.numerus,
        translation,
    }
}

/// Drop vanished and obsolete entries, then any context left empty.
/// Returns the number of messages removed.
pub fn purge_vanished(catalog: &mut Catalog) -> usize {
    let mut removed = 0;
    for context in &mut catalog.contexts {
        let before = context.messages.len();
        context.messages.retain(Message::is_active);
        removed += before - context.messages.len();
    }
    catalog.contexts.retain(|c| !c.messages.is_empty());
    removed
}
