use roxmltree::{Document, Node, NodeType, ParsingOptions};
use std::fs;
use std::path::Path;

use super::diagnostic::{Diagnostic, TextPosition};
use crate::catalog::{
    Catalog, Context, Location, Message, Translation, TranslationContent, TranslationStatus,
    DEFAULT_VERSION,
};
use crate::error::{CatalogError, Result};

/// Parser for TS translation catalogs
pub struct TsParser;

impl TsParser {
    /// Read and strictly parse a catalog file
    pub fn parse_file(path: &Path) -> Result<Catalog> {
        let content = fs::read_to_string(path)?;
        Self::parse_str(&content).map_err(|e| e.with_file(path))
    }

    /// Strictly parse catalog text; the first structural problem is an error
    pub fn parse_str(content: &str) -> Result<Catalog> {
        let doc = open_document(content)?;
        let mut walker = Walker::new(&doc, false);
        walker.catalog().map_err(CatalogError::malformed)
    }

    /// Parse as much as possible, skipping malformed contexts and messages.
    ///
    /// A document that is not XML, or not a catalog, yields an empty catalog
    /// with a single diagnostic.
    pub fn parse_lenient(content: &str) -> (Catalog, Vec<Diagnostic>) {
        let doc = match open_document(content) {
            Ok(doc) => doc,
            Err(e) => return (Catalog::default(), vec![Diagnostic::new(e.to_string())]),
        };

        let mut walker = Walker::new(&doc, true);
        match walker.catalog() {
            Ok(catalog) => (catalog, walker.diagnostics),
            Err(diagnostic) => {
                walker.diagnostics.push(diagnostic);
                (Catalog::default(), walker.diagnostics)
            }
        }
    }

    /// Lenient variant of `parse_file`; IO failures still surface as errors
    pub fn parse_file_lenient(path: &Path) -> Result<(Catalog, Vec<Diagnostic>)> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse_lenient(&content))
    }
}

fn open_document(content: &str) -> Result<Document<'_>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let doc = Document::parse_with_options(content, options)
        .map_err(|e| CatalogError::xml(e.to_string()))?;

    let root = doc.root_element();
    if !root.has_tag_name("TS") {
        return Err(CatalogError::InvalidRoot {
            file: None,
            found: root.tag_name().name().to_string(),
        });
    }
    Ok(doc)
}

/// Walks a parsed document; in lenient mode element-level failures are
/// collected instead of aborting.
struct Walker<'d, 'input> {
    doc: &'d Document<'input>,
    lenient: bool,
    diagnostics: Vec<Diagnostic>,
}

type Parsed<T> = std::result::Result<T, Diagnostic>;

impl<'d, 'input> Walker<'d, 'input> {
    fn new(doc: &'d Document<'input>, lenient: bool) -> Self {
        Self {
            doc,
            lenient,
            diagnostics: Vec::new(),
        }
    }

    fn position(&self, node: Node) -> TextPosition {
        let pos = self.doc.text_pos_at(node.range().start);
        TextPosition {
            row: pos.row,
            col: pos.col,
        }
    }

    fn error(&self, node: Node, reason: impl Into<String>) -> Diagnostic {
        Diagnostic::new(reason).at(self.position(node))
    }

    /// Record a recoverable problem, or fail in strict mode
    fn recover(&mut self, diagnostic: Diagnostic) -> Parsed<()> {
        if self.lenient {
            tracing::warn!(%diagnostic, "skipping malformed catalog entry");
            self.diagnostics.push(diagnostic);
            Ok(())
        } else {
            Err(diagnostic)
        }
    }

    fn catalog(&mut self) -> Parsed<Catalog> {
        let root = self.doc.root_element();
        let mut catalog = Catalog {
            version: root
                .attribute("version")
                .unwrap_or(DEFAULT_VERSION)
                .to_string(),
            language: root.attribute("language").map(str::to_string),
            source_language: root.attribute("sourcelanguage").map(str::to_string),
            contexts: Vec::new(),
        };

        for node in self.element_children(root)? {
            if node.has_tag_name("context") {
                match self.context(node) {
                    Ok(context) => catalog.contexts.push(context),
                    Err(diagnostic) => self.recover(diagnostic)?,
                }
            } else {
                let diagnostic = self.error(
                    node,
                    format!("unexpected <{}> in <TS>", node.tag_name().name()),
                );
                self.recover(diagnostic)?;
            }
        }

        Ok(catalog)
    }

    fn context(&mut self, node: Node) -> Parsed<Context> {
        let children = self.element_children(node)?;

        let mut names = children.iter().filter(|n| n.has_tag_name("name"));
        let name_node = names
            .next()
            .ok_or_else(|| self.error(node, "context has no <name>"))?;
        if let Some(extra) = names.next() {
            return Err(self.error(*extra, "context has more than one <name>"));
        }
        let name = self.text(*name_node)?;

        let mut context = Context::new(name.clone());
        let mut ordinal = 0;
        for child in children {
            match child.tag_name().name() {
                "name" => {}
                "comment" => context.comment = Some(self.text(child).map_err(|d| d.in_context(&name))?),
                "message" => {
                    ordinal += 1;
                    match self.message(child) {
                        Ok(message) => context.messages.push(message),
                        Err(diagnostic) => {
                            let source = self.peek_source(child);
                            let diagnostic = Diagnostic {
                                context: Some(name.clone()),
                                message: Some(ordinal),
                                source,
                                ..diagnostic
                            };
                            self.recover(diagnostic)?;
                        }
                    }
                }
                other => {
                    return Err(self
                        .error(child, format!("unexpected <{}> in <context>", other))
                        .in_context(&name))
                }
            }
        }

        Ok(context)
    }

    /// Best-effort source text of a message, for diagnostics
    fn peek_source(&self, node: Node) -> Option<String> {
        node.children()
            .find(|n| n.has_tag_name("source"))
            .and_then(|n| self.text(n).ok())
    }

    fn message(&self, node: Node) -> Parsed<Message> {
        let numerus = node.attribute("numerus") == Some("yes");
        let mut source = None;
        let mut translation = None;
        let mut message = Message::new(String::new(), Translation::unfinished());
        message.numerus = numerus;

        for child in self.element_children(node)? {
            match child.tag_name().name() {
                "location" => message.locations.push(self.location(child)?),
                "source" => {
                    if source.is_some() {
                        return Err(self.error(child, "message has more than one <source>"));
                    }
                    source = Some(self.text(child)?);
                }
                "comment" => message.comment = Some(self.text(child)?),
                "extracomment" => message.extra_comment = Some(self.text(child)?),
                "translatorcomment" => message.translator_comment = Some(self.text(child)?),
                "translation" => {
                    if translation.is_some() {
                        return Err(self.error(child, "message has more than one <translation>"));
                    }
                    translation = Some(self.translation(child, numerus)?);
                }
                other => {
                    return Err(self.error(child, format!("unsupported <{}> in <message>", other)))
                }
            }
        }

        message.source = source.ok_or_else(|| self.error(node, "message has no <source>"))?;
        message.translation = translation.unwrap_or_else(|| Translation {
            status: TranslationStatus::Unfinished,
            content: if numerus {
                TranslationContent::Plural(Vec::new())
            } else {
                TranslationContent::Single(String::new())
            },
        });
        Ok(message)
    }

    fn location(&self, node: Node) -> Parsed<Location> {
        let filename = node
            .attribute("filename")
            .ok_or_else(|| self.error(node, "<location> has no filename"))?;
        let line = match node.attribute("line") {
            Some(raw) => Some(parse_line(raw).ok_or_else(|| {
                self.error(node, format!("invalid line number '{}' in <location>", raw))
            })?),
            None => None,
        };
        Ok(Location {
            filename: filename.to_string(),
            line,
        })
    }

    fn translation(&self, node: Node, numerus: bool) -> Parsed<Translation> {
        let status = TranslationStatus::from_attr(node.attribute("type")).ok_or_else(|| {
            self.error(
                node,
                format!(
                    "unknown translation type '{}'",
                    node.attribute("type").unwrap_or_default()
                ),
            )
        })?;

        let content = if numerus {
            let mut forms = Vec::new();
            for child in self.element_children(node)? {
                if !child.has_tag_name("numerusform") {
                    return Err(self.error(
                        child,
                        format!("unsupported <{}> in numerus <translation>", child.tag_name().name()),
                    ));
                }
                forms.push(self.text(child)?);
            }
            TranslationContent::Plural(forms)
        } else {
            if let Some(form) = node.children().find(|n| n.has_tag_name("numerusform")) {
                return Err(self.error(form, "<numerusform> in a message without numerus=\"yes\""));
            }
            TranslationContent::Single(self.text(node)?)
        };

        Ok(Translation { status, content })
    }

    /// Element children of a structural node; stray text is an error
    fn element_children<'a>(&self, node: Node<'a, 'input>) -> Parsed<Vec<Node<'a, 'input>>> {
        let mut out = Vec::new();
        for child in node.children() {
            match child.node_type() {
                NodeType::Element => out.push(child),
                NodeType::Text => {
                    if !child.text().unwrap_or_default().trim().is_empty() {
                        return Err(self.error(
                            child,
                            format!("unexpected text in <{}>", node.tag_name().name()),
                        ));
                    }
                }
                _ => {}
            }
        }
        Ok(out)
    }

    /// Text content of a leaf element, decoding `<byte value="..."/>` escapes
    fn text(&self, node: Node) -> Parsed<String> {
        let mut out = String::new();
        for child in node.children() {
            match child.node_type() {
                NodeType::Text => out.push_str(child.text().unwrap_or_default()),
                NodeType::Element if child.has_tag_name("byte") => {
                    let raw = child
                        .attribute("value")
                        .ok_or_else(|| self.error(child, "<byte> has no value"))?;
                    let ch = decode_byte(raw).ok_or_else(|| {
                        self.error(child, format!("invalid <byte> value '{}'", raw))
                    })?;
                    out.push(ch);
                }
                NodeType::Element => {
                    return Err(self.error(
                        child,
                        format!(
                            "unexpected <{}> in <{}>",
                            child.tag_name().name(),
                            node.tag_name().name()
                        ),
                    ))
                }
                _ => {}
            }
        }
        Ok(out)
    }
}

/// `x1b` is hexadecimal, plain digits are decimal
/// Canonical decimal only, since a sign or padding would not survive a rewrite
fn parse_line(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if raw.len() > 1 && raw.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

fn decode_byte(raw: &str) -> Option<char> {
    let value = match raw.strip_prefix('x').or_else(|| raw.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => raw.parse::<u32>().ok()?,
    };
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SIMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="zh_CN">
<context>
    <name>PreferencesDialog</name>
    <message>
        <location filename="../forms/preferencesdialog.ui" line="20"/>
        <source>Preferences</source>
        <translation>首选项</translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn test_parse_simple_catalog() {
        let catalog = TsParser::parse_str(SIMPLE).unwrap();
        assert_eq!(catalog.version, "2.1");
        assert_eq!(catalog.language.as_deref(), Some("zh_CN"));
        assert_eq!(catalog.contexts.len(), 1);

        let message = &catalog.contexts[0].messages[0];
        assert_eq!(message.source, "Preferences");
        assert_eq!(message.translation, Translation::finished("首选项"));
        assert_eq!(
            message.locations,
            vec![Location::new("../forms/preferencesdialog.ui", 20)]
        );
    }

    #[test]
    fn test_parse_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SIMPLE).unwrap();
        let catalog = TsParser::parse_file(file.path()).unwrap();
        assert_eq!(catalog.message_count(), 1);
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let err = TsParser::parse_file(Path::new("/nonexistent/dd_xx.ts")).unwrap_err();
        assert!(matches!(err, CatalogError::Io(_)));
    }

    #[test]
    fn test_parse_entities_and_newlines() {
        let xml = r#"<TS version="2.1"><context><name>C</name><message>
<source>Restart.
Make sure it runs in your GPU&apos;s Optimus mode.</source>
<translation>A &amp; B &lt;x&gt;</translation>
</message></context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        let message = &catalog.contexts[0].messages[0];
        assert_eq!(
            message.source,
            "Restart.\nMake sure it runs in your GPU's Optimus mode."
        );
        assert_eq!(message.translation.text(), "A & B <x>");
    }

    #[test]
    fn test_parse_byte_escape() {
        let xml = r#"<TS version="2.1"><context><name>C</name><message>
<source>a<byte value="x1b"/>b<byte value="7"/></source>
<translation></translation>
</message></context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        assert_eq!(catalog.contexts[0].messages[0].source, "a\u{1b}b\u{7}");
    }

    #[test]
    fn test_parse_statuses() {
        let xml = r#"<TS version="2.1"><context><name>QObject</name>
<message><source>a</source><translation type="vanished">A</translation></message>
<message><source>b</source><translation type="obsolete">B</translation></message>
<message><source>c</source><translation type="unfinished"></translation></message>
</context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        let statuses: Vec<_> = catalog.contexts[0]
            .messages
            .iter()
            .map(|m| m.translation.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                TranslationStatus::Vanished,
                TranslationStatus::Obsolete,
                TranslationStatus::Unfinished
            ]
        );
    }

    #[test]
    fn test_parse_numerus() {
        let xml = r#"<TS version="2.1" language="en"><context><name>C</name>
<message numerus="yes"><source>%n file(s)</source>
<translation>
    <numerusform>%n file</numerusform>
    <numerusform>%n files</numerusform>
</translation></message></context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        let message = &catalog.contexts[0].messages[0];
        assert!(message.numerus);
        assert_eq!(
            message.translation.content,
            TranslationContent::Plural(vec!["%n file".into(), "%n files".into()])
        );
    }

    #[test]
    fn test_parse_comments() {
        let xml = r#"<TS version="2.1"><context><name>C</name><comment>ctx note</comment>
<message><source>Open</source><comment>menu</comment><extracomment>for devs</extracomment>
<translatorcomment>checked</translatorcomment><translation>打开</translation></message>
</context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        let context = &catalog.contexts[0];
        assert_eq!(context.comment.as_deref(), Some("ctx note"));
        let message = &context.messages[0];
        assert_eq!(message.comment.as_deref(), Some("menu"));
        assert_eq!(message.extra_comment.as_deref(), Some("for devs"));
        assert_eq!(message.translator_comment.as_deref(), Some("checked"));
    }

    #[test]
    fn test_missing_translation_is_unfinished() {
        let xml = r#"<TS version="2.1"><context><name>C</name><message><source>x</source></message></context></TS>"#;
        let catalog = TsParser::parse_str(xml).unwrap();
        assert_eq!(
            catalog.contexts[0].messages[0].translation,
            Translation::unfinished()
        );
    }

    #[test]
    fn test_missing_version_defaults() {
        let catalog = TsParser::parse_str("<TS/>").unwrap();
        assert_eq!(catalog.version, DEFAULT_VERSION);
        assert!(catalog.contexts.is_empty());
    }

    #[test]
    fn test_reject_wrong_root() {
        let err = TsParser::parse_str("<html/>").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRoot { .. }));
    }

    #[test]
    fn test_reject_invalid_xml() {
        let err = TsParser::parse_str("<TS><context>").unwrap_err();
        assert!(matches!(err, CatalogError::Xml { .. }));
    }

    #[test]
    fn test_reject_message_without_source_names_entry() {
        let xml = r#"<TS version="2.1"><context><name>QObject</name>
<message><source>ok</source><translation>好</translation></message>
<message><translation>坏</translation></message>
</context></TS>"#;
        let err = TsParser::parse_str(xml).unwrap_err();
        let diagnostic = err.diagnostic().unwrap();
        assert_eq!(diagnostic.context.as_deref(), Some("QObject"));
        assert_eq!(diagnostic.message, Some(2));
        assert_eq!(diagnostic.position.unwrap().row, 3);
        assert!(err.to_string().contains("no <source>"));
    }

    #[test]
    fn test_reject_unknown_type() {
        let xml = r#"<TS version="2.1"><context><name>C</name>
<message><source>x</source><translation type="done">y</translation></message></context></TS>"#;
        let err = TsParser::parse_str(xml).unwrap_err();
        assert!(err.to_string().contains("unknown translation type 'done'"));
    }

    #[test]
    fn test_reject_bad_line_number() {
        let xml = r#"<TS version="2.1"><context><name>C</name>
<message><location filename="a.cpp" line="-3"/><source>x</source><translation>y</translation></message></context></TS>"#;
        let err = TsParser::parse_str(xml).unwrap_err();
        assert!(err.to_string().contains("invalid line number '-3'"));

        for raw in ["+5", " 5", "5 ", "", "05"] {
            let xml = xml.replace("line=\"-3\"", &format!("line=\"{}\"", raw));
            let err = TsParser::parse_str(&xml).unwrap_err();
            assert!(
                err.to_string().contains(&format!("invalid line number '{}'", raw)),
                "{}",
                err
            );
        }
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("136"), Some(136));
        assert_eq!(parse_line("0"), Some(0));
        assert_eq!(parse_line("007"), None);
        assert_eq!(parse_line("+5"), None);
        assert_eq!(parse_line("4294967296"), None);
    }

    #[test]
    fn test_reject_context_without_name() {
        let xml = r#"<TS version="2.1"><context><message><source>x</source></message></context></TS>"#;
        let err = TsParser::parse_str(xml).unwrap_err();
        assert!(err.to_string().contains("context has no <name>"));
    }

    #[test]
    fn test_reject_numerusform_without_numerus() {
        let xml = r#"<TS version="2.1"><context><name>C</name>
<message><source>x</source><translation><numerusform>y</numerusform></translation></message></context></TS>"#;
        assert!(TsParser::parse_str(xml).is_err());
    }

    #[test]
    fn test_lenient_skips_bad_messages() {
        let xml = r#"<TS version="2.1" language="zh_CN"><context><name>QObject</name>
<message><source>Exit</source><translation>退出</translation></message>
<message><source>Bad</source><translation type="nope">?</translation></message>
<message><source>Mute</source><translation>静音</translation></message>
</context></TS>"#;
        let (catalog, diagnostics) = TsParser::parse_lenient(xml);
        assert_eq!(catalog.message_count(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, Some(2));
        assert_eq!(diagnostics[0].source.as_deref(), Some("Bad"));
    }

    #[test]
    fn test_lenient_skips_bad_context() {
        let xml = r#"<TS version="2.1"><context><message><source>x</source></message></context>
<context><name>QObject</name><message><source>Exit</source><translation>退出</translation></message></context>
</TS>"#;
        let (catalog, diagnostics) = TsParser::parse_lenient(xml);
        assert_eq!(catalog.contexts.len(), 1);
        assert_eq!(catalog.contexts[0].name, "QObject");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_lenient_invalid_xml_gives_empty_catalog() {
        let (catalog, diagnostics) = TsParser::parse_lenient("not xml at all");
        assert!(catalog.contexts.is_empty());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_decode_byte() {
        assert_eq!(decode_byte("x41"), Some('A'));
        assert_eq!(decode_byte("65"), Some('A'));
        assert_eq!(decode_byte("xZZ"), None);
    }
}
