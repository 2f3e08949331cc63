//! XML Grammar Engine
//!
//! Recursive-descent scanner driven by a state machine over document regions:
//!
//! ```text
//! XmlDecl -> Prolog -> (PrologDoctypeDeclared) -> RootElement -> Content -> TrailingMisc
//!                              ExternalEntity (while an external entity's text declaration is read)
//! ```
//!
//! The scanner pulls characters from a [`Cursor`], splices entity replacement
//! text back into it, and reports one event per construct to an
//! [`EventSink`]. Reaching the end of input is signalled with
//! [`Interrupt::EndOfInput`] and only the driver decides whether that ended
//! the document cleanly.
//!
//! Submodules:
//! - `content`: start/end tags, attributes, character data, references
//! - `subset`: DOCTYPE, internal and external DTD subsets

mod content;
mod subset;

use super::cursor::Cursor;
use super::dtd::DtdDeclarations;
use super::entities::{EntityTable, ExternalId};
use super::namespace::NamespaceContext;
use super::qname::QName;
use super::resolver::EntityCache;
use super::unicode::{find_invalid_char, is_name_char, is_name_start_char, is_whitespace};
use crate::config::ParserConfig;
use crate::error::{Interrupt, SaxError, ScanResult};
use crate::sax::EventSink;

/// Region of the document the scanner is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScannerState {
    /// Start of input, where an XML declaration may appear
    XmlDecl,
    /// Before the root element, no DOCTYPE seen yet
    Prolog,
    /// Before the root element, after the DOCTYPE
    PrologDoctypeDeclared,
    /// At the start of an external entity, where a text declaration may appear
    ExternalEntity,
    /// Expecting the root element
    RootElement,
    /// Inside the root element
    Content,
    /// After the root element
    TrailingMisc,
}

/// Values of an XML or text declaration
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct DeclInfo {
    version: Option<String>,
    encoding: Option<String>,
    standalone: Option<bool>,
}

/// An element whose end tag has not been seen yet
#[derive(Debug)]
struct OpenElement {
    qname: QName,
    uri: Option<String>,
}

/// Scanner for one document
pub struct XmlScanner<'a, 's, S: EventSink + ?Sized> {
    cursor: Cursor<'a>,
    sink: &'s mut S,
    config: &'s ParserConfig,
    state: ScannerState,
    elements: Vec<OpenElement>,
    namespaces: NamespaceContext,
    entities: EntityTable,
    dtd: DtdDeclarations,
    cache: EntityCache,
    base_uri: Option<&'s str>,
    /// The document declared `version="1.1"`
    xml11: bool,
}

impl<'a, 's, S: EventSink + ?Sized> XmlScanner<'a, 's, S> {
    pub fn new(input: &'a str, sink: &'s mut S, config: &'s ParserConfig, base_uri: Option<&'s str>) -> Self {
        XmlScanner {
            cursor: Cursor::new(input),
            sink,
            config,
            state: ScannerState::XmlDecl,
            elements: Vec::new(),
            namespaces: NamespaceContext::new(),
            entities: EntityTable::new(),
            dtd: DtdDeclarations::new(),
            cache: EntityCache::new(config.entity_cache_capacity),
            base_uri,
            xml11: false,
        }
    }

    /// Scan the whole document
    pub fn run(mut self) -> Result<(), SaxError> {
        match self.scan_document() {
            Ok(()) => Ok(()),
            Err(Interrupt::Abort(err)) => Err(err),
            Err(Interrupt::EndOfInput) => Err(self.report_fatal("unexpected end of input")),
        }
    }

    fn scan_document(&mut self) -> ScanResult<()> {
        self.sink.start_document()?;
        match self.scan_xml_decl() {
            Err(Interrupt::EndOfInput) => return Err(self.unclosed("xml declaration")),
            other => other?,
        }
        loop {
            match self.step() {
                Ok(()) => {}
                Err(Interrupt::EndOfInput) => return self.finish(),
                Err(err) => return Err(err),
            }
        }
    }

    /// End of input: decide whether the document is complete
    fn finish(&mut self) -> ScanResult<()> {
        self.emit_entity_ends()?;
        if let Some(open) = self.elements.last() {
            let message = format!("the markup {} has not been closed", open.qname);
            return Err(self.fatal(message));
        }
        if self.state != ScannerState::TrailingMisc {
            return Err(self.fatal("document is empty, no root element detected"));
        }
        log::debug!("end of document");
        self.sink.end_document()?;
        Ok(())
    }

    /// Scan one construct
    fn step(&mut self) -> ScanResult<()> {
        self.emit_entity_ends()?;
        if self.elements.is_empty() {
            self.cursor.skip_whitespace();
            let c = self.current()?;
            if c != '<' {
                return Err(self.fatal("can not have text at root level"));
            }
            self.cursor.advance(false);
            return self.scan_markup();
        }
        if self.current()? == '<' {
            self.cursor.advance(false);
            self.scan_markup()
        } else {
            self.scan_text()
        }
    }

    /// Dispatch on the character after `<`
    fn scan_markup(&mut self) -> ScanResult<()> {
        let c = self.current()?;
        match self.state {
            ScannerState::XmlDecl
            | ScannerState::Prolog
            | ScannerState::PrologDoctypeDeclared
            | ScannerState::RootElement => match c {
                '!' => {
                    self.cursor.advance(false);
                    if self.cursor.consume_literal("--") {
                        self.scan_comment()
                    } else if self.cursor.consume_literal("DOCTYPE") {
                        if self.state == ScannerState::PrologDoctypeDeclared {
                            return Err(self.fatal("can not have two doctype declarations"));
                        }
                        self.scan_doctype()?;
                        self.set_state(ScannerState::PrologDoctypeDeclared);
                        Ok(())
                    } else {
                        Err(self.fatal("invalid declaration in prolog, expected comment or DOCTYPE"))
                    }
                }
                '?' => {
                    self.cursor.advance(false);
                    self.scan_pi()
                }
                _ => {
                    self.set_state(ScannerState::RootElement);
                    self.scan_start_tag()
                }
            },
            ScannerState::Content | ScannerState::ExternalEntity => match c {
                '!' => {
                    self.cursor.advance(false);
                    if self.cursor.consume_literal("--") {
                        self.scan_comment()
                    } else if self.cursor.consume_literal("[CDATA[") {
                        self.scan_cdata()
                    } else {
                        Err(self.fatal("invalid markup, expected comment or CDATA section"))
                    }
                }
                '?' => {
                    self.cursor.advance(false);
                    self.scan_pi()
                }
                '/' => {
                    self.cursor.advance(false);
                    self.scan_end_tag()
                }
                _ => self.scan_start_tag(),
            },
            ScannerState::TrailingMisc => match c {
                '!' if self.cursor.consume_literal("!--") => self.scan_comment(),
                '?' => {
                    self.cursor.advance(false);
                    self.scan_pi()
                }
                _ => Err(self.fatal("only one document element is allowed")),
            },
        }
    }

    fn set_state(&mut self, state: ScannerState) {
        if self.state != state {
            log::debug!("scanner state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    fn located(&self, err: SaxError) -> SaxError {
        err.at(self.cursor.position(), self.cursor.current())
    }

    /// Report a fatal error to the sink and build the interrupt that aborts the parse
    fn fatal(&mut self, message: impl Into<String>) -> Interrupt {
        Interrupt::Abort(self.report_fatal(message))
    }

    fn report_fatal(&mut self, message: impl Into<String>) -> SaxError {
        let err = self.located(SaxError::fatal(message));
        log::debug!("{}", err);
        self.sink.fatal_error(&err);
        err
    }

    /// Report a recoverable error; the sink may still stop the parse
    fn error(&mut self, message: impl Into<String>) -> ScanResult<()> {
        let err = self.located(SaxError::error(message));
        log::debug!("{}", err);
        self.sink.error(&err)?;
        Ok(())
    }

    fn warning(&mut self, message: impl Into<String>) -> ScanResult<()> {
        let err = self.located(SaxError::warning(message));
        log::warn!("{}", err);
        self.sink.warning(&err)?;
        Ok(())
    }

    /// Fatal error for a construct cut off by the end of input
    fn unclosed(&mut self, what: &str) -> Interrupt {
        self.fatal(format!("the markup {} has not been closed", what))
    }

    // ------------------------------------------------------------------
    // Cursor helpers
    // ------------------------------------------------------------------

    #[inline]
    fn current(&self) -> ScanResult<char> {
        self.cursor.current().ok_or(Interrupt::EndOfInput)
    }

    /// Consume `literal` or fail with `message`
    fn expect(&mut self, literal: &str, message: &str) -> ScanResult<()> {
        if self.cursor.consume_literal(literal) {
            Ok(())
        } else if self.cursor.at_end() {
            Err(Interrupt::EndOfInput)
        } else {
            Err(self.fatal(message))
        }
    }

    fn require_whitespace(&mut self, context: &str) -> ScanResult<()> {
        if self.cursor.skip_whitespace() {
            Ok(())
        } else {
            Err(self.fatal(format!("whitespace required {}", context)))
        }
    }

    /// Scan a Name
    fn scan_name(&mut self, what: &str) -> ScanResult<String> {
        let c = self.current()?;
        if !is_name_start_char(c) {
            return Err(self.fatal(format!("invalid starting character in {} name", what)));
        }
        Ok(self.cursor.consume_while(is_name_char))
    }

    /// Scan a quoted literal without reference handling
    fn scan_quoted(&mut self, what: &str) -> ScanResult<String> {
        let quote = self.current()?;
        if quote != '"' && quote != '\'' {
            return Err(self.fatal(format!("{} must be quoted", what)));
        }
        self.cursor.advance(false);
        let mut delimiter = [0u8; 4];
        match self.cursor.consume_until(quote.encode_utf8(&mut delimiter)) {
            Some(value) => Ok(value),
            None => Err(self.unclosed(what)),
        }
    }

    /// Validate characters in strict mode
    fn check_chars(&mut self, text: &str) -> ScanResult<()> {
        if !self.config.strict_char_data {
            return Ok(());
        }
        match find_invalid_char(text, self.xml11) {
            Some(c) => Err(self.fatal(format!(
                "invalid XML character, decimal code number '{}'",
                c as u32
            ))),
            None => Ok(()),
        }
    }

    /// Announce the end of every entity whose replacement text has been read
    fn emit_entity_ends(&mut self) -> ScanResult<()> {
        self.cursor.pop_exhausted();
        for name in self.cursor.take_ended() {
            self.sink.end_entity(&name)?;
        }
        Ok(())
    }

    /// Fetch external text through the cache or the sink
    fn resolve_external(&mut self, name: &str, id: &ExternalId) -> ScanResult<Option<String>> {
        if let Some(text) = self.cache.get(id) {
            log::trace!("entity {} served from cache", name);
            return Ok(Some(text));
        }
        log::debug!("resolving external entity {} ({:?})", name, id.system_id);
        let text = self.sink.resolve_entity(
            name,
            id.public_id.as_deref(),
            self.base_uri,
            id.system_id.as_deref(),
        )?;
        if let Some(text) = &text {
            self.cache.insert(id.clone(), text.clone());
        }
        Ok(text)
    }

    // ------------------------------------------------------------------
    // XML declaration, comments, processing instructions, CDATA
    // ------------------------------------------------------------------

    fn at_declaration_start(&self) -> bool {
        self.cursor.starts_with("<?xml") && self.cursor.peek_at(5).is_some_and(is_whitespace)
    }

    /// Optional XML declaration at the very start of the document
    fn scan_xml_decl(&mut self) -> ScanResult<()> {
        self.cursor.consume_literal("\u{FEFF}");
        let leading_whitespace = self.cursor.skip_whitespace();
        if self.cursor.at_end() {
            return Err(self.fatal("empty document"));
        }
        if !leading_whitespace && self.at_declaration_start() {
            self.cursor.consume_literal("<?xml");
            let decl = self.scan_decl_body(false)?;
            let version = decl.version.unwrap_or_default();
            self.xml11 = version == "1.1";
            self.sink
                .xml_declaration(&version, decl.encoding.as_deref(), decl.standalone)?;
        }
        self.set_state(ScannerState::Prolog);
        Ok(())
    }

    /// Optional text declaration at the start of external text
    fn scan_text_decl(&mut self) -> ScanResult<()> {
        let saved = self.state;
        self.set_state(ScannerState::ExternalEntity);
        if self.at_declaration_start() {
            self.cursor.consume_literal("<?xml");
            self.scan_decl_body(true)?;
        }
        self.set_state(saved);
        Ok(())
    }

    /// Pseudo-attributes of an XML or text declaration, up to and including `?>`
    fn scan_decl_body(&mut self, text_decl: bool) -> ScanResult<DeclInfo> {
        let mut decl = DeclInfo::default();
        loop {
            let had_whitespace = self.cursor.skip_whitespace();
            if self.cursor.consume_literal("?>") {
                break;
            }
            if self.cursor.at_end() {
                return Err(self.unclosed("xml declaration"));
            }
            if !had_whitespace {
                return Err(self.fatal("whitespace required between pseudo-attributes"));
            }
            let name = self.cursor.consume_while(is_name_char);
            self.cursor.skip_whitespace();
            self.expect("=", "expected '=' after pseudo-attribute name")?;
            self.cursor.skip_whitespace();
            let value = self.scan_quoted("pseudo-attribute value")?;
            match name.as_str() {
                "version" if decl == DeclInfo::default() => {
                    if !is_version_number(&value) {
                        return Err(self.fatal(format!("invalid XML version [{}]", value)));
                    }
                    if !self.config.supported_versions().contains(&value.as_str()) {
                        return Err(self.fatal(format!("unsupported XML version [{}]", value)));
                    }
                    decl.version = Some(value);
                }
                "encoding" if decl.encoding.is_none() && decl.standalone.is_none() => {
                    if !is_encoding_name(&value) {
                        return Err(self.fatal(format!("invalid encoding name [{}]", value)));
                    }
                    decl.encoding = Some(value);
                }
                "standalone" if !text_decl && decl.standalone.is_none() => {
                    decl.standalone = match value.as_str() {
                        "yes" => Some(true),
                        "no" => Some(false),
                        _ => {
                            return Err(self.fatal(format!(
                                "standalone must be 'yes' or 'no', found [{}]",
                                value
                            )))
                        }
                    };
                }
                _ => {
                    return Err(self.fatal(format!(
                        "unexpected pseudo-attribute [{}] in {} declaration",
                        name,
                        if text_decl { "text" } else { "XML" }
                    )))
                }
            }
        }
        if !text_decl && decl.version.is_none() {
            return Err(self.fatal("An XML Declaration must have version information"));
        }
        if text_decl && decl.encoding.is_none() {
            return Err(self.fatal("a text declaration must have an encoding declaration"));
        }
        Ok(decl)
    }

    /// Comment, after `<!--`
    fn scan_comment(&mut self) -> ScanResult<()> {
        let text = match self.cursor.consume_until("--") {
            Some(text) => text,
            None => return Err(self.unclosed("comment")),
        };
        if !self.cursor.consume_literal(">") {
            if self.cursor.starts_with("->") {
                return Err(self.fatal("a comment must not end with '--->'"));
            }
            return Err(self.fatal("'--' is not allowed inside a comment"));
        }
        self.check_chars(&text)?;
        self.sink.comment(&text)?;
        Ok(())
    }

    /// Processing instruction, after `<?`
    fn scan_pi(&mut self) -> ScanResult<()> {
        let target = self.scan_name("processing instruction target")?;
        if target.eq_ignore_ascii_case("xml") {
            return Err(self.fatal("XML Declaration cannot occur past the very beginning of the document"));
        }
        if self.config.namespaces && target.contains(':') {
            self.error(format!("processing instruction target [{}] must not contain a colon", target))?;
        }
        let data = if self.cursor.consume_literal("?>") {
            String::new()
        } else {
            self.require_whitespace("between processing instruction target and data")?;
            match self.cursor.consume_until("?>") {
                Some(data) => data,
                None => return Err(self.unclosed("processing instruction")),
            }
        };
        self.check_chars(&data)?;
        self.sink.processing_instruction(&target, &data)?;
        Ok(())
    }

    /// CDATA section, after `<![CDATA[`
    fn scan_cdata(&mut self) -> ScanResult<()> {
        let text = match self.cursor.consume_until("]]>") {
            Some(text) => text,
            None => return Err(self.unclosed("CDATA section")),
        };
        self.check_chars(&text)?;
        self.sink.start_cdata()?;
        if !text.is_empty() {
            self.sink.characters(&text)?;
        }
        self.sink.end_cdata()?;
        Ok(())
    }
}

/// `1.` followed by digits
fn is_version_number(value: &str) -> bool {
    value
        .strip_prefix("1.")
        .is_some_and(|minor| !minor.is_empty() && minor.bytes().all(|b| b.is_ascii_digit()))
}

/// `[A-Za-z][A-Za-z0-9._-]*`
fn is_encoding_name(value: &str) -> bool {
    let mut bytes = value.bytes();
    bytes.next().is_some_and(|b| b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sax::{EventCollector, SaxEvent};
    use crate::SaxParser;

    pub(super) fn parse(input: &str) -> (Result<(), SaxError>, Vec<SaxEvent>) {
        parse_with(input, ParserConfig::default())
    }

    pub(super) fn parse_with(input: &str, config: ParserConfig) -> (Result<(), SaxError>, Vec<SaxEvent>) {
        let mut parser = SaxParser::new(EventCollector::new()).with_config(config);
        let result = parser.parse(input);
        (result, parser.into_sink().into_events())
    }

    pub(super) fn fatal_message(input: &str) -> String {
        let (result, events) = parse(input);
        let err = result.expect_err("expected a fatal error");
        assert!(err.is_fatal());
        assert!(matches!(events.last(), Some(SaxEvent::FatalError(e)) if *e == err));
        err.message
    }

    fn start(qname: &str) -> SaxEvent {
        SaxEvent::StartElement {
            uri: None,
            local_name: qname.to_string(),
            qname: qname.to_string(),
            attributes: Default::default(),
        }
    }

    fn end(qname: &str) -> SaxEvent {
        SaxEvent::EndElement {
            uri: None,
            local_name: qname.to_string(),
            qname: qname.to_string(),
        }
    }

    #[test]
    fn test_round_trip_event_order() {
        let (result, events) = parse("<a x=\"1\"><b>text</b></a>");
        result.unwrap();
        assert_eq!(events.len(), 7);
        assert_eq!(events[0], SaxEvent::StartDocument);
        match &events[1] {
            SaxEvent::StartElement { qname, attributes, .. } => {
                assert_eq!(qname, "a");
                assert_eq!(attributes.pairs(), vec![("x".to_string(), "1".to_string())]);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(events[2], start("b"));
        assert_eq!(events[3], SaxEvent::Characters("text".into()));
        assert_eq!(events[4], end("b"));
        assert_eq!(events[5], end("a"));
        assert_eq!(events[6], SaxEvent::EndDocument);
    }

    #[test]
    fn test_xml_declaration() {
        let (result, events) = parse("<?xml version=\"1.0\" encoding='UTF-8' standalone=\"yes\"?><r/>");
        result.unwrap();
        assert_eq!(
            events[1],
            SaxEvent::XmlDeclaration {
                version: "1.0".into(),
                encoding: Some("UTF-8".into()),
                standalone: Some(true),
            }
        );
    }

    #[test]
    fn test_xml_declaration_errors() {
        assert!(fatal_message("<?xml encoding='UTF-8'?><r/>").contains("version"));
        assert!(fatal_message("<?xml version='2.0'?><r/>").contains("invalid XML version"));
        assert!(fatal_message("<?xml version='1.7'?><r/>").contains("unsupported"));
        assert!(fatal_message("<?xml version='1.0' encoding='8bit'?><r/>").contains("encoding"));
        assert!(fatal_message("<?xml version='1.0' standalone='maybe'?><r/>").contains("standalone"));
        assert!(fatal_message("<?xml standalone='yes' version='1.0'?><r/>").contains("unexpected"));
        assert!(fatal_message("<?xml version='1.0'encoding='UTF-8'?><r/>").contains("whitespace"));
    }

    #[test]
    fn test_xml_declaration_cut_off() {
        let (result, events) = parse("<?xml version");
        let err = result.unwrap_err();
        assert_eq!(err.message, "the markup xml declaration has not been closed");
        assert_eq!(err.position.offset, 13);
        assert_eq!(events.last(), Some(&SaxEvent::FatalError(err)));

        assert_eq!(
            fatal_message("<?xml version='1.0'"),
            "the markup xml declaration has not been closed"
        );
    }

    fn parse_with_entities(input: &str, entities: &[(&str, &str)]) -> Result<(), SaxError> {
        let collector = entities
            .iter()
            .fold(EventCollector::new(), |c, (id, text)| c.with_entity(*id, *text));
        let mut parser = SaxParser::new(collector);
        let result = parser.parse(input);
        if let Err(err) = &result {
            assert_eq!(parser.sink().events().last(), Some(&SaxEvent::FatalError(err.clone())));
        }
        result
    }

    #[test]
    fn test_text_declaration_requires_encoding() {
        let doc = "<!DOCTYPE r [<!ENTITY c SYSTEM 'c.xml'>]><r>&c;</r>";
        let err = parse_with_entities(doc, &[("c.xml", "<?xml version='1.0'?>text")]).unwrap_err();
        assert_eq!(err.message, "a text declaration must have an encoding declaration");

        let doc = "<!DOCTYPE r SYSTEM 'r.dtd'><r/>";
        let err = parse_with_entities(doc, &[("r.dtd", "<?xml version='1.0'?><!ELEMENT r ANY>")]).unwrap_err();
        assert_eq!(err.message, "a text declaration must have an encoding declaration");

        let ok = "<?xml version='1.0' encoding='UTF-8'?><!ELEMENT r ANY>";
        parse_with_entities(doc, &[("r.dtd", ok)]).unwrap();
    }

    #[test]
    fn test_text_declaration_rejects_standalone() {
        let doc = "<!DOCTYPE r [<!ENTITY c SYSTEM 'c.xml'>]><r>&c;</r>";
        let text = "<?xml encoding='UTF-8' standalone='yes'?>text";
        let err = parse_with_entities(doc, &[("c.xml", text)]).unwrap_err();
        assert_eq!(err.message, "unexpected pseudo-attribute [standalone] in text declaration");
    }

    #[test]
    fn test_xml_1_1_toggle() {
        let (result, _) = parse("<?xml version='1.1'?><r/>");
        result.unwrap();
        let (result, _) = parse_with("<?xml version='1.1'?><r/>", ParserConfig::default().with_xml_1_1(false));
        assert!(result.unwrap_err().message.contains("unsupported"));
    }

    #[test]
    fn test_late_xml_declaration() {
        assert!(fatal_message("<r/><?xml version='1.0'?>").contains("very beginning"));
        assert!(fatal_message(" <?xml version='1.0'?><r/>").contains("very beginning"));
    }

    #[test]
    fn test_byte_order_mark_skipped() {
        let (result, events) = parse("\u{FEFF}<r/>");
        result.unwrap();
        assert_eq!(events[1], start("r"));
    }

    #[test]
    fn test_empty_documents() {
        assert_eq!(fatal_message(""), "empty document");
        assert_eq!(fatal_message("  \n"), "empty document");
        assert_eq!(
            fatal_message("<?xml version='1.0'?><!-- only -->"),
            "document is empty, no root element detected"
        );
    }

    #[test]
    fn test_comments_and_pis() {
        let (result, events) = parse("<!--head--><?style type='x'?><r><?empty?></r><!--tail-->");
        result.unwrap();
        assert_eq!(events[1], SaxEvent::Comment("head".into()));
        assert_eq!(
            events[2],
            SaxEvent::ProcessingInstruction {
                target: "style".into(),
                data: "type='x'".into(),
            }
        );
        assert_eq!(
            events[4],
            SaxEvent::ProcessingInstruction {
                target: "empty".into(),
                data: String::new(),
            }
        );
        assert_eq!(events[6], SaxEvent::Comment("tail".into()));
        assert_eq!(events[7], SaxEvent::EndDocument);
    }

    #[test]
    fn test_comment_errors() {
        assert!(fatal_message("<r><!-- a -- b --></r>").contains("'--'"));
        assert!(fatal_message("<r><!-- a ---></r>").contains("--->"));
        assert!(fatal_message("<r><!-- never closed").contains("comment"));
    }

    #[test]
    fn test_cdata_section() {
        let (result, events) = parse("<r><![CDATA[<not> &markup;]]></r>");
        result.unwrap();
        assert_eq!(events[2], SaxEvent::StartCData);
        assert_eq!(events[3], SaxEvent::Characters("<not> &markup;".into()));
        assert_eq!(events[4], SaxEvent::EndCData);
    }

    #[test]
    fn test_cdata_not_allowed_in_prolog() {
        assert!(fatal_message("<![CDATA[x]]><r/>").contains("prolog"));
    }

    #[test]
    fn test_trailing_misc() {
        assert_eq!(fatal_message("<a/><b/>"), "only one document element is allowed");
        assert_eq!(fatal_message("<a/>text"), "can not have text at root level");
        assert_eq!(fatal_message("text<a/>"), "can not have text at root level");
        let (result, _) = parse("<a/>\n  <!-- c -->\n<?pi?>\n");
        result.unwrap();
    }

    #[test]
    fn test_unclosed_element() {
        assert_eq!(fatal_message("<a><b></b>"), "the markup a has not been closed");
        assert_eq!(fatal_message("<a>text"), "the markup a has not been closed");
    }

    #[test]
    fn test_mismatched_end_tag() {
        let (result, events) = parse("<a><b></a>");
        let err = result.unwrap_err();
        assert!(err.is_fatal());
        assert!(err.message.contains("does not match"));
        assert!(!events.contains(&end("b")));
        assert!(!events.contains(&SaxEvent::EndDocument));
    }

    #[test]
    fn test_strict_char_data() {
        let input = "<r>bad\u{1}char</r>";
        let (result, _) = parse(input);
        result.unwrap();
        let (result, _) = parse_with(input, ParserConfig::strict());
        assert!(result.unwrap_err().message.contains("decimal code number '1'"));

        let (result, _) = parse_with("<r><![CDATA[\u{FFFF}]]></r>", ParserConfig::strict());
        assert!(result.is_err());
    }

    #[test]
    fn test_error_position() {
        let (result, _) = parse("<a>\n  <b></c>\n</a>");
        let err = result.unwrap_err();
        assert_eq!(err.position.line, 2);
        assert!(err.position.column > 1);
    }

    #[test]
    fn test_sink_error_stops_parse() {
        struct Stop;
        impl EventSink for Stop {
            fn start_element(
                &mut self,
                _: Option<&str>,
                local_name: &str,
                _: &str,
                _: &crate::core::attributes::Attributes,
            ) -> crate::error::SinkResult {
                if local_name == "stop" {
                    return Err(SaxError::fatal("stopped by handler"));
                }
                Ok(())
            }
        }
        let mut parser = SaxParser::new(Stop);
        let err = parser.parse("<a><stop/><never/></a>").unwrap_err();
        assert_eq!(err.message, "stopped by handler");
    }

    #[test]
    fn test_version_and_encoding_grammar() {
        assert!(is_version_number("1.0"));
        assert!(is_version_number("1.10"));
        assert!(!is_version_number("1."));
        assert!(!is_version_number("2.0"));
        assert!(is_encoding_name("ISO-8859-1"));
        assert!(is_encoding_name("x.y_z"));
        assert!(!is_encoding_name("-utf"));
        assert!(!is_encoding_name(""));
    }
}
