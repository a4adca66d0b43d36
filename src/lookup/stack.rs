use super::plural;
use super::translator::Translator;

/// Installed translators, consulted newest first
#[derive(Debug, Clone, Default)]
pub struct TranslatorStack {
    translators: Vec<Translator>,
}

impl TranslatorStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a translator on top of the stack
    pub fn install(&mut self, translator: Translator) {
        tracing::debug!(
            language = translator.language().unwrap_or("?"),
            messages = translator.len(),
            "installing translator"
        );
        self.translators.push(translator);
    }

    /// Remove every translator for `language`; returns whether any was removed
    pub fn remove(&mut self, language: &str) -> bool {
        let before = self.translators.len();
        self.translators
            .retain(|t| t.language() != Some(language));
        before != self.translators.len()
    }

    pub fn clear(&mut self) {
        self.translators.clear();
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }

    pub fn translate<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.translators
            .iter()
            .rev()
            .find_map(|t| t.find(context, source, None))
            .unwrap_or(source)
    }

    pub fn translate_disambiguated<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: &str,
    ) -> &'a str {
        self.translators
            .iter()
            .rev()
            .find_map(|t| t.find(context, source, Some(comment)))
            .unwrap_or(source)
    }

    pub fn translate_plural(&self, context: &str, source: &str, n: u64) -> String {
        self.translators
            .iter()
            .rev()
            .find_map(|t| t.find_plural(context, source, None, n))
            .unwrap_or_else(|| plural::substitute_count(source, n))
    }
}
