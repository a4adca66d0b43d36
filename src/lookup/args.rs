use regex::{Captures, Regex};
use std::fmt::Display;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"%(\d{1,2})").unwrap())
}

/// Replace every occurrence of the lowest-numbered `%N` placeholder with `value`.
///
/// Higher-numbered placeholders are left for later calls, so chained calls
/// fill `%0`, `%1`, ... in order. `value` itself is never rescanned.
pub fn arg(template: &str, value: &str) -> String {
    let re = placeholder();
    let lowest = re
        .captures_iter(template)
        .filter_map(|caps| caps[1].parse::<u8>().ok())
        .min();

    let Some(lowest) = lowest else {
        tracing::debug!(template, "arg() called on a string without placeholders");
        return template.to_string();
    };

    re.replace_all(template, |caps: &Captures| {
        if caps[1].parse::<u8>().ok() == Some(lowest) {
            value.to_string()
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

/// Builder for chained substitution: `Args::new(t).arg(a).arg(b).finish()`
#[derive(Debug, Clone)]
pub struct Args {
    text: String,
}

impl Args {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            text: template.into(),
        }
    }

    pub fn arg(self, value: impl Display) -> Self {
        Self {
            text: arg(&self.text, &value.to_string()),
        }
    }

    pub fn finish(self) -> String {
        self.text
    }
}
