use serde::Serialize;
use std::fmt;

/// 1-based row/column into the catalog text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextPosition {
    pub row: u32,
    pub col: u32,
}

/// Description of a structural problem, naming the offending entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub reason: String,
    pub context: Option<String>,
    /// 1-based ordinal of the message within its context
    pub message: Option<usize>,
    pub source: Option<String>,
    pub position: Option<TextPosition>,
}

const SOURCE_PREVIEW_CHARS: usize = 40;

impl Diagnostic {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            context: None,
            message: None,
            source: None,
            position: None,
        }
    }

    pub fn in_context(mut self, name: impl Into<String>) -> Self {
        self.context = Some(name.into());
        self
    }

    pub fn at_message(mut self, ordinal: usize, source: Option<&str>) -> Self {
        self.message = Some(ordinal);
        self.source = source.map(str::to_string);
        self
    }

    pub fn at(mut self, position: TextPosition) -> Self {
        self.position = Some(position);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_location = false;
        if let Some(context) = &self.context {
            write!(f, "context '{}'", context)?;
            wrote_location = true;
        }
        if let Some(ordinal) = self.message {
            if wrote_location {
                f.write_str(", ")?;
            }
            write!(f, "message #{}", ordinal)?;
            if let Some(source) = &self.source {
                let preview: String = source.chars().take(SOURCE_PREVIEW_CHARS).collect();
                let ellipsis = if source.chars().count() > SOURCE_PREVIEW_CHARS {
                    "..."
                } else {
                    ""
                };
                write!(f, " ({:?}{})", preview, ellipsis)?;
            }
            wrote_location = true;
        }
        if let Some(pos) = self.position {
            if wrote_location {
                f.write_str(" ")?;
            }
            write!(f, "at {}:{}", pos.row, pos.col)?;
            wrote_location = true;
        }
        if wrote_location {
            f.write_str(": ")?;
        }
        f.write_str(&self.reason)
    }
}
