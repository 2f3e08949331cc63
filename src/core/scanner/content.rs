//! Element content: start and end tags, attributes, namespace resolution,
//! character data and entity references.

use super::{OpenElement, ScannerState, XmlScanner};
use crate::core::attributes::{Attribute, Attributes};
use crate::core::dtd::{normalize_attribute_value, AttDefault};
use crate::core::entities::{decode_char_ref, predefined, references_itself, CharRefError, EntityDef, ExternalId};
use crate::core::qname::QName;
use crate::core::unicode::is_all_whitespace;
use crate::error::{Interrupt, ScanResult};
use crate::sax::EventSink;

/// What a reference turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Reference {
    /// Character to append to the current text, never re-scanned
    Text(char),
    /// Replacement text was pushed onto the cursor
    Included,
    /// Nothing to append
    Skipped,
    /// Undeclared entity; its literal may be kept
    Unresolved(String),
}

/// Namespace declaration found on a start tag: (prefix, uri)
type NsDecl = (String, String);

/// `xmlns` -> `Some("")`, `xmlns:p` -> `Some("p")`
fn declared_prefix(name: &str) -> Option<&str> {
    if name == "xmlns" {
        Some("")
    } else {
        name.strip_prefix("xmlns:")
    }
}

impl<'a, 's, S: EventSink + ?Sized> XmlScanner<'a, 's, S> {
    /// Start tag, after `<`
    pub(super) fn scan_start_tag(&mut self) -> ScanResult<()> {
        let qname = QName::new(self.scan_name("element")?);
        let (raw, empty) = match self.scan_attribute_list(&qname) {
            Err(Interrupt::EndOfInput) => return Err(self.unclosed(qname.as_str())),
            other => other?,
        };

        if self.config.namespaces {
            self.namespaces.push_context();
        }
        let mut attributes = Attributes::new();
        let mut declarations: Vec<NsDecl> = Vec::new();
        for (name, value) in raw {
            let prefix = declared_prefix(&name).filter(|_| self.config.namespaces);
            let duplicate = match prefix {
                Some(prefix) => {
                    if declarations.iter().any(|(p, _)| p == prefix) {
                        true
                    } else {
                        declarations.push((prefix.to_string(), value));
                        false
                    }
                }
                None => !attributes.push(Attribute::new(name.as_str(), value)),
            };
            if duplicate {
                self.error(format!("multiple declarations for same attribute : [{}]", name))?;
            }
        }

        self.apply_declared_attributes(&qname, &mut attributes, &mut declarations)?;
        for (prefix, uri) in declarations {
            self.declare_namespace(&prefix, &uri)?;
        }
        let uri = self.resolve_names(&qname, &mut attributes)?;

        let local_name = self.local_name(&qname);
        self.sink
            .start_element(uri.as_deref(), local_name, qname.as_str(), &attributes)?;

        let open = OpenElement { qname, uri };
        if empty {
            self.close_element(open)
        } else {
            self.elements.push(open);
            self.set_state(ScannerState::Content);
            Ok(())
        }
    }

    /// Attributes up to and including `>` or `/>`; returns raw pairs and whether the tag was empty
    fn scan_attribute_list(&mut self, element: &QName) -> ScanResult<(Vec<(String, String)>, bool)> {
        let mut raw = Vec::new();
        loop {
            let had_whitespace = self.cursor.skip_whitespace();
            match self.current()? {
                '>' => {
                    self.cursor.advance(false);
                    return Ok((raw, false));
                }
                '/' => {
                    self.cursor.advance(false);
                    self.expect(">", "expected '>' after '/' in empty element tag")?;
                    return Ok((raw, true));
                }
                _ if !had_whitespace => {
                    return Err(self.fatal(format!(
                        "whitespace required between attributes of element [{}]",
                        element
                    )));
                }
                _ => {
                    let name = self.scan_name("attribute")?;
                    self.cursor.skip_whitespace();
                    if self.current()? != '=' {
                        return Err(self.fatal(format!("attribute [{}] has no value", name)));
                    }
                    self.cursor.advance(true);
                    let value = self.scan_attribute_value(&name)?;
                    raw.push((name, value));
                }
            }
        }
    }

    /// Quoted attribute value with references expanded
    fn scan_attribute_value(&mut self, name: &str) -> ScanResult<String> {
        let quote = self.current()?;
        if quote != '"' && quote != '\'' {
            return Err(self.fatal(format!("attribute value of [{}] must be quoted", name)));
        }
        self.cursor.advance(false);
        let base = self.cursor.depth();
        let mut value = String::new();
        loop {
            value.push_str(&self.cursor.consume_while(|c| c != quote && c != '<' && c != '&'));
            let Some(c) = self.cursor.current() else {
                return Err(self.fatal(format!("attribute value of [{}] not closed", name)));
            };
            match c {
                // quotes inside entity replacement text are data
                _ if c == quote && self.cursor.source_depth() <= base => {
                    self.cursor.advance(false);
                    break;
                }
                '<' => {
                    return Err(self.fatal(format!("'<' is not allowed in attribute value of [{}]", name)));
                }
                '&' => {
                    self.cursor.advance(false);
                    match self.scan_reference(true, &mut value)? {
                        Reference::Text(c) => value.push(c),
                        Reference::Included | Reference::Skipped => {}
                        Reference::Unresolved(entity) => {
                            if self.config.preserve_undeclared_entities {
                                value.push('&');
                                value.push_str(&entity);
                                value.push(';');
                            }
                        }
                    }
                }
                _ => {
                    self.cursor.advance(false);
                    value.push(c);
                }
            }
        }
        self.check_chars(&value)?;
        Ok(value)
    }

    /// Attach declared types, synthesize defaults and check DTD constraints
    fn apply_declared_attributes(
        &mut self,
        element: &QName,
        attributes: &mut Attributes,
        declarations: &mut Vec<NsDecl>,
    ) -> ScanResult<()> {
        let mut problems = Vec::new();
        for attr in attributes.iter_mut() {
            let Some(def) = self.dtd.attribute(element.as_str(), attr.name()) else {
                // undeclared attributes are normalized as CDATA
                if self.config.normalize_attributes {
                    attr.value = normalize_attribute_value(&attr.value, None);
                }
                continue;
            };
            attr.att_type = Some(def.att_type.as_str().to_string());
            if self.config.normalize_attributes {
                attr.value = normalize_attribute_value(&attr.value, Some(&def.att_type));
            }
            if let AttDefault::Fixed(fixed) = &def.default {
                if self.config.validation && attr.value != *fixed {
                    problems.push(format!(
                        "attribute [{}] must have the fixed value [{}]",
                        def.name, fixed
                    ));
                }
            }
        }

        let defs = self.dtd.attributes(element.as_str()).to_vec();
        for def in &defs {
            let present = attributes.index_of(&def.name).is_some()
                || declared_prefix(&def.name)
                    .is_some_and(|p| self.config.namespaces && declarations.iter().any(|(d, _)| d == p));
            if present {
                continue;
            }
            match def.default.value() {
                Some(value) => match declared_prefix(&def.name).filter(|_| self.config.namespaces) {
                    Some(prefix) => declarations.push((prefix.to_string(), value.to_string())),
                    None => {
                        attributes.push(Attribute {
                            qname: QName::new(def.name.as_str()),
                            uri: None,
                            att_type: Some(def.att_type.as_str().to_string()),
                            value: value.to_string(),
                            specified: false,
                        });
                    }
                },
                None if def.default == AttDefault::Required && self.config.validation => {
                    problems.push(format!(
                        "attribute [{}] is required for element [{}]",
                        def.name, element
                    ));
                }
                None => {}
            }
        }

        for message in problems {
            self.error(message)?;
        }
        Ok(())
    }

    /// Route one `xmlns` declaration to the namespace context
    fn declare_namespace(&mut self, prefix: &str, uri: &str) -> ScanResult<()> {
        if !prefix.is_empty() && uri.is_empty() {
            return self.error(format!("namespace prefix [{}] can not be undeclared", prefix));
        }
        match self.namespaces.declare_prefix(prefix, uri) {
            Ok(true) => {
                self.sink.start_prefix_mapping(prefix, uri)?;
                Ok(())
            }
            Ok(false) => Ok(()),
            Err(err) => self.error(err.message()),
        }
    }

    /// Resolve the namespace URIs of the element and its prefixed attributes
    fn resolve_names(&mut self, element: &QName, attributes: &mut Attributes) -> ScanResult<Option<String>> {
        if !self.config.namespaces {
            return Ok(None);
        }
        let malformed: Vec<String> = std::iter::once(element)
            .chain(attributes.iter().map(|a| &a.qname))
            .filter(|q| !q.is_ns_valid())
            .map(|q| q.to_string())
            .collect();
        for name in malformed {
            self.error(format!("[{}] is not a valid qualified name", name))?;
        }

        let mut undeclared: Vec<String> = Vec::new();
        let uri = self.namespaces.get_uri(element.prefix()).map(str::to_string);
        if uri.is_none() && element.has_prefix() {
            undeclared.push(element.prefix().to_string());
        }
        for attr in attributes.iter_mut() {
            if !attr.qname.has_prefix() {
                continue;
            }
            attr.uri = self.namespaces.get_uri(attr.prefix()).map(str::to_string);
            if attr.uri.is_none() && !undeclared.iter().any(|p| p == attr.prefix()) {
                undeclared.push(attr.prefix().to_string());
            }
        }
        for prefix in undeclared {
            self.error(format!("namespace prefix [{}] not declared", prefix))?;
        }

        let mut clashes = Vec::new();
        for (i, attr) in attributes.iter().enumerate() {
            if attr.uri.is_some() && attributes.index_of_ns(attr.uri.as_deref(), attr.local_name()) != Some(i) {
                clashes.push(attr.name().to_string());
            }
        }
        for name in clashes {
            self.error(format!("multiple declarations for same attribute : [{}]", name))?;
        }
        Ok(uri)
    }

    fn local_name<'q>(&self, qname: &'q QName) -> &'q str {
        if self.config.namespaces {
            qname.local_name()
        } else {
            qname.as_str()
        }
    }

    /// End tag, after `</`
    pub(super) fn scan_end_tag(&mut self) -> ScanResult<()> {
        let name = self.scan_name("element")?;
        self.cursor.skip_whitespace();
        self.expect(">", "expected '>' at the end of end tag")?;
        let matches = self.elements.last().is_some_and(|open| open.qname == *name.as_str());
        if !matches {
            let current = self
                .elements
                .last()
                .map(|open| open.qname.to_string())
                .unwrap_or_default();
            return Err(self.fatal(format!(
                "invalid ending markup : [{}], markup name does not match current one : [{}]",
                name, current
            )));
        }
        match self.elements.pop() {
            Some(open) => self.close_element(open),
            None => Ok(()),
        }
    }

    fn close_element(&mut self, open: OpenElement) -> ScanResult<()> {
        let local_name = self.local_name(&open.qname);
        self.sink
            .end_element(open.uri.as_deref(), local_name, open.qname.as_str())?;
        if self.config.namespaces {
            for prefix in self.namespaces.pop_context() {
                self.sink.end_prefix_mapping(&prefix)?;
            }
        }
        if self.elements.is_empty() {
            self.set_state(ScannerState::TrailingMisc);
        }
        Ok(())
    }

    /// Character data up to the next markup or the end of the current entity
    pub(super) fn scan_text(&mut self) -> ScanResult<()> {
        let mut text = String::new();
        loop {
            let run = self.cursor.text_run();
            self.check_chars(&run)?;
            text.push_str(&run);
            match self.cursor.current_in_frame() {
                None | Some('<') => break,
                Some(']') => {
                    if self.cursor.consume_literal("]]>") {
                        self.error("Text must not contain a literal ']]>' sequence")?;
                        text.push_str("]]>");
                    } else {
                        self.cursor.advance(false);
                        text.push(']');
                    }
                }
                Some('&') => {
                    self.cursor.advance(false);
                    match self.scan_reference(false, &mut text)? {
                        Reference::Text(c) => text.push(c),
                        Reference::Included | Reference::Skipped => {}
                        Reference::Unresolved(entity) => {
                            if self.config.preserve_undeclared_entities {
                                text.push('&');
                                text.push_str(&entity);
                                text.push(';');
                            }
                        }
                    }
                }
                Some(c) => {
                    self.cursor.advance(false);
                    text.push(c);
                }
            }
        }
        self.flush_text(&mut text)
    }

    /// Report pending character data
    fn flush_text(&mut self, text: &mut String) -> ScanResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let ignorable = is_all_whitespace(text)
            && self
                .elements
                .last()
                .is_some_and(|open| self.dtd.has_element_content(open.qname.as_str()));
        if ignorable {
            self.sink.ignorable_whitespace(text)?;
        } else {
            self.sink.characters(text)?;
        }
        text.clear();
        Ok(())
    }

    /// Reference after `&`, in content or in an attribute value.
    ///
    /// `pending` is the character data read so far; it is flushed before
    /// replacement text of an entity starts in content.
    fn scan_reference(&mut self, in_attribute: bool, pending: &mut String) -> ScanResult<Reference> {
        if self.cursor.consume_literal("#") {
            let body = self.cursor.consume_while(|c| c.is_ascii_alphanumeric());
            self.expect_reference_end(&format!("#{}", body))?;
            return match decode_char_ref(&body, self.xml11) {
                Ok(c) => Ok(Reference::Text(c)),
                Err(err @ CharRefError::NotAChar(_)) => Err(self.fatal(err.message())),
                Err(err) => {
                    self.error(err.message())?;
                    Ok(Reference::Skipped)
                }
            };
        }

        let name = self.scan_name("entity reference")?;
        self.expect_reference_end(&name)?;
        if let Some(c) = predefined(&name) {
            return Ok(Reference::Text(c));
        }

        match self.entities.general(&name).cloned() {
            Some(EntityDef::Internal(value)) => {
                if references_itself('&', &name, &value) || self.cursor.is_expanding(&name) {
                    return Err(self.recursion(&name));
                }
                if in_attribute {
                    self.cursor.push_back(value, Some(name), false);
                } else {
                    self.flush_text(pending)?;
                    self.sink.start_entity(&name)?;
                    self.cursor.push_back(value, Some(name), true);
                }
                Ok(Reference::Included)
            }
            Some(EntityDef::External(id)) => {
                if in_attribute {
                    return Err(self.fatal(format!(
                        "external entity reference [{}] not allowed in attribute value",
                        name
                    )));
                }
                self.flush_text(pending)?;
                self.include_external_entity(&name, &id)
            }
            Some(EntityDef::Unparsed { .. }) => {
                if in_attribute {
                    return Err(self.fatal(format!(
                        "unparsed entity reference [{}] not allowed in attribute value",
                        name
                    )));
                }
                self.error(format!("unparsed entity reference [{}] not allowed in content", name))?;
                Ok(Reference::Skipped)
            }
            None => {
                self.error(format!("entity : [{}] not declared", name))?;
                Ok(Reference::Unresolved(name))
            }
        }
    }

    pub(super) fn expect_reference_end(&mut self, name: &str) -> ScanResult<()> {
        if self.cursor.consume_literal(";") {
            return Ok(());
        }
        self.error(format!(
            "the entity reference [{}] must end with the ';' delimiter",
            name
        ))
    }

    pub(super) fn recursion(&mut self, name: &str) -> Interrupt {
        self.fatal(format!(
            "Recursion detected : [{}] contains a reference to itself",
            name
        ))
    }

    /// Fetch an external parsed entity and splice it into the content
    fn include_external_entity(&mut self, name: &str, id: &ExternalId) -> ScanResult<Reference> {
        if !self.config.resolve_external_entities {
            self.sink.skipped_entity(name)?;
            return Ok(Reference::Skipped);
        }
        if self.cursor.is_expanding(name) {
            return Err(self.recursion(name));
        }
        match self.resolve_external(name, id)? {
            Some(text) => {
                self.sink.start_entity(name)?;
                self.cursor.push_back(text, Some(name.to_string()), true);
                self.scan_text_decl()?;
                Ok(Reference::Included)
            }
            None => {
                self.warning(format!("external entity [{}] could not be resolved", name))?;
                self.sink.skipped_entity(name)?;
                Ok(Reference::Skipped)
            }
        }
    }
}
