use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::catalog::{Catalog, Context, Message, Translation, TranslationContent};
use crate::error::Result;

const INDENT: &str = "    ";

/// Serializer producing the layout catalog tooling generates
pub struct TsWriter;

impl TsWriter {
    /// Render a catalog as TS XML text
    pub fn write_string(catalog: &Catalog) -> String {
        let mut out = String::with_capacity(256 + catalog.message_count() * 160);
        out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        out.push_str("<!DOCTYPE TS>\n");

        out.push_str("<TS version=\"");
        escape_attr(&catalog.version, &mut out);
        out.push('"');
        if let Some(language) = &catalog.language {
            out.push_str(" language=\"");
            escape_attr(language, &mut out);
            out.push('"');
        }
        if let Some(source_language) = &catalog.source_language {
            out.push_str(" sourcelanguage=\"");
            escape_attr(source_language, &mut out);
            out.push('"');
        }
        out.push_str(">\n");

        for context in &catalog.contexts {
            Self::write_context(context, &mut out);
        }

        out.push_str("</TS>\n");
        out
    }

    /// Write a catalog to `path`, replacing any existing file
    pub fn write_file(catalog: &Catalog, path: &Path) -> Result<()> {
        fs::write(path, Self::write_string(catalog))?;
        tracing::debug!(path = %path.display(), messages = catalog.message_count(), "wrote catalog");
        Ok(())
    }

    fn write_context(context: &Context, out: &mut String) {
        out.push_str("<context>\n");
        write_element(1, "name", &context.name, out);
        if let Some(comment) = &context.comment {
            write_element(1, "comment", comment, out);
        }
        for message in &context.messages {
            Self::write_message(message, out);
        }
        out.push_str("</context>\n");
    }

    fn write_message(message: &Message, out: &mut String) {
        out.push_str(INDENT);
        if message.numerus {
            out.push_str("<message numerus=\"yes\">\n");
        } else {
            out.push_str("<message>\n");
        }

        for location in &message.locations {
            out.push_str(INDENT);
            out.push_str(INDENT);
            out.push_str("<location filename=\"");
            escape_attr(&location.filename, out);
            out.push('"');
            if let Some(line) = location.line {
                let _ = write!(out, " line=\"{}\"", line);
            }
            out.push_str("/>\n");
        }

        write_element(2, "source", &message.source, out);
        if let Some(comment) = &message.comment {
            write_element(2, "comment", comment, out);
        }
        if let Some(extra) = &message.extra_comment {
            write_element(2, "extracomment", extra, out);
        }
        if let Some(note) = &message.translator_comment {
            write_element(2, "translatorcomment", note, out);
        }
        Self::write_translation(&message.translation, out);

        out.push_str(INDENT);
        out.push_str("</message>\n");
    }

    fn write_translation(translation: &Translation, out: &mut String) {
        out.push_str(INDENT);
        out.push_str(INDENT);
        match translation.status.as_attr() {
            Some(kind) => {
                let _ = write!(out, "<translation type=\"{}\">", kind);
            }
            None => out.push_str("<translation>"),
        }

        match &translation.content {
            TranslationContent::Single(text) => escape_text(text, out),
            TranslationContent::Plural(forms) if !forms.is_empty() => {
                out.push('\n');
                for form in forms {
                    write_element(3, "numerusform", form, out);
                }
                out.push_str(INDENT);
                out.push_str(INDENT);
            }
            TranslationContent::Plural(_) => {}
        }

        out.push_str("</translation>\n");
    }
}

fn write_element(depth: usize, tag: &str, text: &str, out: &mut String) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    let _ = write!(out, "<{}>", tag);
    escape_text(text, out);
    let _ = writeln!(out, "</{}>", tag);
}

/// Escape element text. Newlines stay literal; control characters that XML
/// cannot carry are written as `<byte value="xNN"/>`.
pub(crate) fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // a literal CR would be normalized away by any reader
            '\r' => out.push_str("&#xd;"),
            '\n' | '\t' => out.push(ch),
            c if !is_xml_char(c) => {
                let _ = write!(out, "<byte value=\"x{:x}\"/>", c as u32);
            }
            c => out.push(c),
        }
    }
}

/// Attributes have no `<byte>` escape, so characters XML cannot
/// represent are dropped with a warning.
pub(crate) fn escape_attr(text: &str, out: &mut String) {
    let mut dropped = 0usize;
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => {
                let _ = write!(out, "&#x{:x};", ch as u32);
            }
            c if !is_xml_char(c) => dropped += 1,
            c => out.push(c),
        }
    }
    if dropped > 0 {
        tracing::warn!(value = %text.escape_debug(), dropped, "dropped characters an XML attribute cannot hold");
    }
}

/// XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}
