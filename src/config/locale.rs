use std::fmt;

/// A parsed locale identifier such as `zh_CN` or `sr-Latn-RS`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocaleTag {
    /// Lowercase language code (e.g., "zh")
    pub language: String,
    /// Title-case script (e.g., "Hans")
    pub script: Option<String>,
    /// Uppercase territory (e.g., "CN")
    pub territory: Option<String>,
}

impl LocaleTag {
    /// Parse POSIX (`zh_CN.UTF-8@euro`) or BCP 47 (`zh-Hans-CN`) style identifiers
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let base = trimmed
            .split(['.', '@'])
            .next()
            .unwrap_or_default();
        if base.is_empty() {
            return None;
        }
        if base == "C" || base == "POSIX" {
            return Some(Self::language_only("en"));
        }

        let mut parts = base.split(['_', '-']);
        let language = parts.next()?.to_ascii_lowercase();
        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }

        let mut tag = Self::language_only(&language);
        for part in parts {
            if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) && tag.script.is_none() {
                let mut script = part.to_ascii_lowercase();
                script[..1].make_ascii_uppercase();
                tag.script = Some(script);
            } else if (part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()))
                || (part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()))
            {
                tag.territory = Some(part.to_ascii_uppercase());
                break;
            } else {
                // variants and extensions carry nothing we match on
                break;
            }
        }
        Some(tag)
    }

    fn language_only(language: &str) -> Self {
        Self {
            language: language.to_string(),
            script: None,
            territory: None,
        }
    }

    /// Catalog name suffixes to try, most specific first
    pub fn candidates(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::with_capacity(4);
        let mut push = |candidate: String| {
            if !out.contains(&candidate) {
                out.push(candidate);
            }
        };

        match (&self.script, &self.territory) {
            (Some(script), Some(territory)) => {
                push(format!("{}_{}_{}", self.language, script, territory));
                push(format!("{}_{}", self.language, territory));
                push(format!("{}_{}", self.language, script));
            }
            (Some(script), None) => push(format!("{}_{}", self.language, script)),
            (None, Some(territory)) => push(format!("{}_{}", self.language, territory)),
            (None, None) => {}
        }
        push(self.language.clone());
        out
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(script) = &self.script {
            write!(f, "_{}", script)?;
        }
        if let Some(territory) = &self.territory {
            write!(f, "_{}", territory)?;
        }
        Ok(())
    }
}

const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Locale of the running user, from the OS and then the environment
pub fn system_locale() -> Option<LocaleTag> {
    if let Some(tag) = sys_locale::get_locale().as_deref().and_then(LocaleTag::parse) {
        return Some(tag);
    }
    LOCALE_ENV_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| LocaleTag::parse(&value))
}
