//! DOCTYPE declaration and DTD subsets
//!
//! The internal subset, the external subset and external parameter
//! entities share one declaration grammar. Parameter-entity references
//! between declarations are spliced into the cursor padded with spaces;
//! inside literals they are substituted as-is. Conditional sections are
//! only recognized in external text.

use super::XmlScanner;
use crate::core::dtd::{normalize_model, AttDef, AttDefault, AttType, ContentSpec};
use crate::core::entities::{decode_char_ref, references_itself, CharRefError, Declared, EntityDef, ExternalId};
use crate::core::unicode::{is_name, is_name_char, is_name_start_char, is_pubid_char};
use crate::error::{Interrupt, ScanResult};
use crate::sax::EventSink;

/// Entity name the external DTD subset is reported under
const EXTERNAL_SUBSET: &str = "[dtd]";

impl<'a, 's, S: EventSink + ?Sized> XmlScanner<'a, 's, S> {
    /// DOCTYPE declaration, after `<!DOCTYPE`
    pub(super) fn scan_doctype(&mut self) -> ScanResult<()> {
        match self.scan_doctype_body() {
            Err(Interrupt::EndOfInput) => Err(self.unclosed("DOCTYPE")),
            other => other,
        }
    }

    fn scan_doctype_body(&mut self) -> ScanResult<()> {
        self.require_whitespace("after '<!DOCTYPE'")?;
        let name = self.scan_name("document type")?;
        let id = if self.cursor.skip_whitespace() {
            self.scan_external_id(false)?
        } else {
            None
        };
        self.cursor.skip_whitespace();
        log::debug!("DOCTYPE {} {:?}", name, id);
        self.sink.start_dtd(
            &name,
            id.as_ref().and_then(|id| id.public_id.as_deref()),
            id.as_ref().and_then(|id| id.system_id.as_deref()),
        )?;

        if self.cursor.consume_literal("[") {
            self.scan_declarations(0, false)?;
            self.cursor.skip_whitespace();
        }
        self.expect(">", "expected '>' at the end of the DOCTYPE declaration")?;

        if let Some(id) = id.filter(|id| id.system_id.is_some()) {
            if self.config.load_external_dtd {
                self.load_external_subset(&id)?;
            }
        }
        self.sink.end_dtd()?;
        Ok(())
    }

    fn load_external_subset(&mut self, id: &ExternalId) -> ScanResult<()> {
        let Some(text) = self.resolve_external(EXTERNAL_SUBSET, id)? else {
            return self.warning(format!(
                "external DTD subset [{}] could not be resolved",
                id.system_id.as_deref().unwrap_or_default()
            ));
        };
        log::debug!("loading external DTD subset ({} bytes)", text.len());
        self.sink.start_entity(EXTERNAL_SUBSET)?;
        let floor = self.cursor.depth();
        self.cursor
            .push_back(text, Some(EXTERNAL_SUBSET.to_string()), true);
        self.cursor.fence();
        let scanned = self
            .scan_text_decl()
            .and_then(|()| self.scan_declarations(floor, true));
        if let Err(Interrupt::EndOfInput) = scanned {
            return Err(self.unclosed("external DTD subset"));
        }
        scanned?;
        self.cursor.lift_fence();
        self.emit_entity_ends()
    }

    /// Declarations until `]` (internal subset) or until the cursor drops back
    /// to `floor` frames (external text)
    fn scan_declarations(&mut self, floor: usize, external: bool) -> ScanResult<()> {
        let mut open_sections = 0usize;
        loop {
            self.emit_entity_ends()?;
            if external && self.cursor.source_depth() <= floor {
                break;
            }
            if self.skip_decl_space()? {
                continue;
            }
            if !external && self.cursor.consume_literal("]") {
                return Ok(());
            }
            self.current()?;
            if self.cursor.consume_literal("<![") {
                if !external {
                    return Err(self.fatal("conditional sections are only allowed in the external subset"));
                }
                self.scan_conditional_section(&mut open_sections)?;
            } else if open_sections > 0 && self.cursor.consume_literal("]]>") {
                open_sections -= 1;
            } else {
                self.scan_markup_decl()?;
            }
        }
        if open_sections > 0 {
            return Err(self.unclosed("conditional section"));
        }
        Ok(())
    }

    /// `<![INCLUDE[` or `<![IGNORE[ ... ]]>`, after `<![`
    fn scan_conditional_section(&mut self, open_sections: &mut usize) -> ScanResult<()> {
        self.skip_decl_space()?;
        let include = if self.cursor.consume_literal("INCLUDE") {
            true
        } else if self.cursor.consume_literal("IGNORE") {
            false
        } else {
            return Err(self.fatal("conditional section must start with INCLUDE or IGNORE"));
        };
        self.skip_decl_space()?;
        self.expect("[", "expected '[' after conditional section keyword")?;
        if include {
            *open_sections += 1;
            return Ok(());
        }
        let mut depth = 1usize;
        while depth > 0 {
            if self.cursor.consume_literal("<![") {
                depth += 1;
            } else if self.cursor.consume_literal("]]>") {
                depth -= 1;
            } else if self.cursor.next_char().is_none() {
                return Err(self.unclosed("conditional section"));
            }
        }
        Ok(())
    }

    fn scan_markup_decl(&mut self) -> ScanResult<()> {
        if self.cursor.consume_literal("<!--") {
            self.scan_comment()
        } else if self.cursor.consume_literal("<?") {
            self.scan_pi()
        } else if self.cursor.consume_literal("<!ENTITY") {
            self.scan_entity_decl()
        } else if self.cursor.consume_literal("<!ELEMENT") {
            self.scan_element_decl()
        } else if self.cursor.consume_literal("<!ATTLIST") {
            self.scan_attlist_decl()
        } else if self.cursor.consume_literal("<!NOTATION") {
            self.scan_notation_decl()
        } else {
            Err(self.fatal("invalid markup declaration in DTD"))
        }
    }

    // ------------------------------------------------------------------
    // Whitespace and parameter entities
    // ------------------------------------------------------------------

    fn at_pe_reference(&self) -> bool {
        self.cursor.current() == Some('%') && self.cursor.peek_at(1).is_some_and(is_name_start_char)
    }

    /// Skip whitespace and parameter-entity references; true if anything was skipped
    fn skip_decl_space(&mut self) -> ScanResult<bool> {
        let mut skipped = false;
        loop {
            if self.cursor.skip_whitespace() {
                skipped = true;
            } else if self.at_pe_reference() {
                self.cursor.advance(false);
                self.include_parameter_entity(false)?;
                skipped = true;
            } else {
                return Ok(skipped);
            }
        }
    }

    fn require_decl_space(&mut self, context: &str) -> ScanResult<()> {
        if self.skip_decl_space()? {
            Ok(())
        } else {
            self.current()?;
            Err(self.fatal(format!("whitespace required {}", context)))
        }
    }

    /// Parameter-entity reference, after `%`.
    ///
    /// Between declarations the replacement text is reported as an entity and
    /// padded with spaces; inside a literal it is spliced silently.
    fn include_parameter_entity(&mut self, in_literal: bool) -> ScanResult<()> {
        let name = self.scan_name("parameter entity")?;
        self.expect_reference_end(&format!("%{}", name))?;
        let key = format!("%{}", name);
        match self.entities.parameter(&name).cloned() {
            Some(EntityDef::Internal(value)) => {
                if references_itself('%', &name, &value) || self.cursor.is_expanding(&key) {
                    return Err(self.recursion(&key));
                }
                if in_literal {
                    self.cursor.push_back(value, Some(key), false);
                } else {
                    self.sink.start_entity(&key)?;
                    self.cursor.push_back(format!(" {} ", value), Some(key), true);
                }
                Ok(())
            }
            Some(EntityDef::External(id)) | Some(EntityDef::Unparsed { id, .. }) => {
                if !self.config.resolve_external_entities {
                    self.sink.skipped_entity(&key)?;
                    return Ok(());
                }
                if self.cursor.is_expanding(&key) {
                    return Err(self.recursion(&key));
                }
                match self.resolve_external(&key, &id)? {
                    Some(text) => {
                        if in_literal {
                            self.cursor.push_back(text, Some(key), false);
                        } else {
                            self.sink.start_entity(&key)?;
                            // no leading pad, so a text declaration is still recognized
                            self.cursor.push_back(format!("{} ", text), Some(key), true);
                        }
                        self.scan_text_decl()
                    }
                    None => {
                        self.warning(format!("external entity [{}] could not be resolved", key))?;
                        self.sink.skipped_entity(&key)?;
                        Ok(())
                    }
                }
            }
            None => self.error(format!("entity : [{}] not declared", key)),
        }
    }

    /// Quoted literal in a declaration.
    ///
    /// Parameter-entity references are substituted. In entity values character
    /// references are decoded and general entity references kept verbatim; in
    /// attribute defaults every `&` reference is kept for later expansion.
    fn scan_decl_literal(&mut self, what: &str, entity_value: bool) -> ScanResult<String> {
        let quote = self.current()?;
        if quote != '"' && quote != '\'' {
            return Err(self.fatal(format!("{} must be quoted", what)));
        }
        self.cursor.advance(false);
        let base = self.cursor.depth();
        let mut value = String::new();
        loop {
            value.push_str(&self.cursor.consume_while(|c| c != quote && c != '%' && c != '&'));
            let Some(c) = self.cursor.current() else {
                return Err(self.unclosed(what));
            };
            // the closing quote must come from the entity the literal started in
            if self.cursor.source_depth() < base {
                return Err(self.unclosed(what));
            }
            match c {
                _ if c == quote && self.cursor.source_depth() <= base => {
                    self.cursor.advance(false);
                    break;
                }
                '%' if self.at_pe_reference() => {
                    self.cursor.advance(false);
                    self.include_parameter_entity(true)?;
                }
                '&' if entity_value && self.cursor.peek_at(1) == Some('#') => {
                    self.cursor.advance(false);
                    self.cursor.advance(false);
                    let body = self.cursor.consume_while(|c| c.is_ascii_alphanumeric());
                    self.expect_reference_end(&format!("#{}", body))?;
                    match decode_char_ref(&body, self.xml11) {
                        Ok(decoded) => value.push(decoded),
                        Err(err @ CharRefError::NotAChar(_)) => return Err(self.fatal(err.message())),
                        Err(err) => self.error(err.message())?,
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

    /// `SYSTEM "uri"` or `PUBLIC "pubid" "uri"`; with `public_only` the system
    /// literal after PUBLIC is optional (notations)
    fn scan_external_id(&mut self, public_only: bool) -> ScanResult<Option<ExternalId>> {
        if self.cursor.consume_literal("SYSTEM") {
            self.require_decl_space("after SYSTEM")?;
            let system = self.scan_quoted("system literal")?;
            return Ok(Some(ExternalId::system(system)));
        }
        if !self.cursor.consume_literal("PUBLIC") {
            return Ok(None);
        }
        self.require_decl_space("after PUBLIC")?;
        let public = self.scan_quoted("public identifier")?;
        if let Some(c) = public.chars().find(|c| !is_pubid_char(*c)) {
            return Err(self.fatal(format!("invalid character {:?} in public identifier", c)));
        }
        let public = public.split_whitespace().collect::<Vec<_>>().join(" ");
        let had_space = self.skip_decl_space()?;
        let system = match self.cursor.current() {
            Some('"' | '\'') => {
                if !had_space {
                    return Err(self.fatal("whitespace required between public and system identifiers"));
                }
                Some(self.scan_quoted("system literal")?)
            }
            _ if public_only => None,
            _ => return Err(self.fatal("system identifier required after public identifier")),
        };
        Ok(Some(ExternalId {
            public_id: Some(public),
            system_id: system,
        }))
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// `<!ENTITY`
    fn scan_entity_decl(&mut self) -> ScanResult<()> {
        self.require_decl_space("after '<!ENTITY'")?;
        let parameter = self.cursor.current() == Some('%');
        if parameter {
            self.cursor.advance(false);
            self.require_decl_space("after '%' in parameter entity declaration")?;
        }
        let name = self.scan_name("entity")?;
        if self.config.namespaces && name.contains(':') {
            self.error(format!("entity name [{}] must not contain a colon", name))?;
        }
        self.require_decl_space("after the entity name")?;

        let def = match self.current()? {
            '"' | '\'' => EntityDef::Internal(self.scan_decl_literal("entity value", true)?),
            _ => {
                let Some(id) = self.scan_external_id(false)? else {
                    return Err(self.fatal(format!(
                        "expected entity value or external identifier for entity [{}]",
                        name
                    )));
                };
                if self.skip_decl_space()? && self.cursor.consume_literal("NDATA") {
                    if parameter {
                        return Err(self.fatal("a parameter entity can not be unparsed"));
                    }
                    self.require_decl_space("after NDATA")?;
                    let notation = self.scan_name("notation")?;
                    EntityDef::Unparsed { id, notation }
                } else {
                    EntityDef::External(id)
                }
            }
        };
        self.skip_decl_space()?;
        self.expect(">", "expected '>' at the end of the ENTITY declaration")?;
        self.declare_entity(&name, parameter, def)
    }

    fn declare_entity(&mut self, name: &str, parameter: bool, def: EntityDef) -> ScanResult<()> {
        let key = if parameter {
            format!("%{}", name)
        } else {
            name.to_string()
        };
        let declared = if parameter {
            self.entities.declare_parameter(name, def.clone())
        } else {
            self.entities.declare_general(name, def.clone())
        };
        match declared {
            Declared::Added => match &def {
                EntityDef::Internal(value) => self.sink.internal_entity_decl(&key, value)?,
                EntityDef::External(id) => {
                    self.sink
                        .external_entity_decl(&key, id.public_id.as_deref(), id.system_id.as_deref())?
                }
                EntityDef::Unparsed { id, notation } => self.sink.unparsed_entity_decl(
                    &key,
                    id.public_id.as_deref(),
                    id.system_id.as_deref(),
                    notation,
                )?,
            },
            Declared::Duplicate => {
                self.warning(format!(
                    "entity : [{}] declared several times, only the first declaration is binding",
                    key
                ))?;
            }
            Declared::Predefined => log::debug!("ignoring redeclaration of predefined entity {}", name),
        }
        Ok(())
    }

    /// `<!ELEMENT`
    fn scan_element_decl(&mut self) -> ScanResult<()> {
        self.require_decl_space("after '<!ELEMENT'")?;
        let name = self.scan_name("element type")?;
        self.require_decl_space("after the element type")?;
        let mut raw = String::new();
        loop {
            raw.push_str(&self.cursor.consume_while(|c| c != '>' && c != '%'));
            if self.cursor.consume_literal(">") {
                break;
            }
            self.current()?;
            if !self.at_pe_reference() {
                return Err(self.fatal(format!("invalid character '%' in content model of [{}]", name)));
            }
            self.skip_decl_space()?;
            raw.push(' ');
        }
        let model = normalize_model(&raw);
        if ContentSpec::classify(&model).is_none() {
            return Err(self.fatal(format!("invalid content model [{}] for element [{}]", model, name)));
        }
        if self.dtd.add_element(&name, model.clone()) {
            self.sink.element_decl(&name, &model)?;
        } else if self.config.validation {
            self.error(format!("element [{}] declared several times", name))?;
        }
        Ok(())
    }

    /// `<!ATTLIST`
    fn scan_attlist_decl(&mut self) -> ScanResult<()> {
        self.require_decl_space("after '<!ATTLIST'")?;
        let element = self.scan_name("element type")?;
        loop {
            let had_space = self.skip_decl_space()?;
            if self.cursor.consume_literal(">") {
                return Ok(());
            }
            self.current()?;
            if !had_space {
                return Err(self.fatal(format!(
                    "whitespace required before attribute definition in ATTLIST of [{}]",
                    element
                )));
            }
            let name = self.scan_name("attribute")?;
            self.require_decl_space("after the attribute name")?;
            let att_type = self.scan_att_type()?;
            self.require_decl_space("after the attribute type")?;
            let default = self.scan_default_decl()?;

            let declaration = att_type.declaration();
            let def = AttDef {
                name: name.clone(),
                att_type,
                default,
            };
            let mode = def.default.mode();
            let value = def.default.value().map(str::to_string);
            if self.dtd.add_attribute(&element, def) {
                self.sink
                    .attribute_decl(&element, &name, &declaration, mode, value.as_deref())?;
            } else {
                self.warning(format!(
                    "attribute [{}] of element [{}] declared several times, only the first declaration is binding",
                    name, element
                ))?;
            }
        }
    }

    fn scan_att_type(&mut self) -> ScanResult<AttType> {
        if self.current()? == '(' {
            return Ok(AttType::Enumeration(self.scan_token_group("enumeration value", false)?));
        }
        let keyword = self.cursor.consume_while(|c| c.is_ascii_uppercase());
        if keyword == "NOTATION" {
            self.require_decl_space("after NOTATION")?;
            return Ok(AttType::Notation(self.scan_token_group("notation name", true)?));
        }
        match AttType::from_keyword(&keyword) {
            Some(att_type) => Ok(att_type),
            None => Err(self.fatal(format!("invalid attribute type [{}]", keyword))),
        }
    }

    /// `( token | token ... )`
    fn scan_token_group(&mut self, what: &str, names: bool) -> ScanResult<Vec<String>> {
        self.expect("(", &format!("expected '(' before {}", what))?;
        let mut tokens = Vec::new();
        loop {
            self.skip_decl_space()?;
            let token = self.cursor.consume_while(is_name_char);
            if token.is_empty() || (names && !is_name(&token)) {
                self.current()?;
                return Err(self.fatal(format!("invalid {} in enumerated type", what)));
            }
            tokens.push(token);
            self.skip_decl_space()?;
            match self.current()? {
                '|' => self.cursor.advance(false),
                ')' => {
                    self.cursor.advance(false);
                    return Ok(tokens);
                }
                _ => return Err(self.fatal("expected '|' or ')' in enumerated type")),
            }
        }
    }

    fn scan_default_decl(&mut self) -> ScanResult<AttDefault> {
        if self.cursor.consume_literal("#REQUIRED") {
            return Ok(AttDefault::Required);
        }
        if self.cursor.consume_literal("#IMPLIED") {
            return Ok(AttDefault::Implied);
        }
        let fixed = self.cursor.consume_literal("#FIXED");
        if fixed {
            self.require_decl_space("after #FIXED")?;
        } else if self.current()? == '#' {
            return Err(self.fatal("invalid default declaration, expected #REQUIRED, #IMPLIED or #FIXED"));
        }
        let raw = self.scan_decl_literal("attribute default value", false)?;
        if raw.contains('<') {
            return Err(self.fatal("'<' is not allowed in attribute default value"));
        }
        let value = match self.entities.expand_literal(&raw, self.xml11) {
            Ok(expanded) => expanded,
            Err(message) => {
                self.error(message)?;
                raw
            }
        };
        Ok(if fixed {
            AttDefault::Fixed(value)
        } else {
            AttDefault::Default(value)
        })
    }

    /// `<!NOTATION`
    fn scan_notation_decl(&mut self) -> ScanResult<()> {
        self.require_decl_space("after '<!NOTATION'")?;
        let name = self.scan_name("notation")?;
        self.require_decl_space("after the notation name")?;
        let Some(id) = self.scan_external_id(true)? else {
            return Err(self.fatal(format!("expected external or public identifier for notation [{}]", name)));
        };
        self.skip_decl_space()?;
        self.expect(">", "expected '>' at the end of the NOTATION declaration")?;
        if self.dtd.add_notation(&name, id.clone()) {
            self.sink
                .notation_decl(&name, id.public_id.as_deref(), id.system_id.as_deref())?;
        } else if self.config.validation {
            self.error(format!("notation [{}] declared several times", name))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{fatal_message, parse, parse_with};
    use crate::config::ParserConfig;
    use crate::sax::{EventCollector, SaxEvent};
    use crate::SaxParser;

    fn dtd_events(events: &[SaxEvent]) -> Vec<SaxEvent> {
        events
            .iter()
            .skip_while(|e| !matches!(e, SaxEvent::StartDtd { .. }))
            .take_while(|e| **e != SaxEvent::EndDtd)
            .skip(1)
            .cloned()
            .collect()
    }

    #[test]
    fn test_doctype_identifiers() {
        let config = ParserConfig::default().with_load_external_dtd(false);
        let (result, events) = parse_with("<!DOCTYPE r PUBLIC '-//X//DTD \n R//EN' 'r.dtd'><r/>", config);
        result.unwrap();
        assert_eq!(
            events[1],
            SaxEvent::StartDtd {
                name: "r".into(),
                public_id: Some("-//X//DTD R//EN".into()),
                system_id: Some("r.dtd".into()),
            }
        );
        assert_eq!(events[2], SaxEvent::EndDtd);
        assert!(!events.iter().any(|e| e.is_diagnostic()));
    }

    #[test]
    fn test_internal_subset_declarations() {
        let doc = "<!DOCTYPE r [
  <!ELEMENT r ( a | b )* >
  <!ATTLIST r kind (x|y) 'x' id ID #REQUIRED>
  <!ENTITY e \"val\">
  <!ENTITY % pe \"pv\">
  <!ENTITY ext SYSTEM \"ext.xml\">
  <!NOTATION gif PUBLIC \"gif\">
  <!ENTITY pic SYSTEM \"p.gif\" NDATA gif>
  <!-- c -->
  <?pi d?>
]><r id='1'/>";
        let (result, events) = parse(doc);
        result.unwrap();
        assert_eq!(
            dtd_events(&events),
            vec![
                SaxEvent::ElementDecl {
                    name: "r".into(),
                    model: "(a|b)*".into(),
                },
                SaxEvent::AttributeDecl {
                    element_name: "r".into(),
                    attribute_name: "kind".into(),
                    att_type: "(x|y)".into(),
                    mode: None,
                    default_value: Some("x".into()),
                },
                SaxEvent::AttributeDecl {
                    element_name: "r".into(),
                    attribute_name: "id".into(),
                    att_type: "ID".into(),
                    mode: Some("#REQUIRED".into()),
                    default_value: None,
                },
                SaxEvent::InternalEntityDecl {
                    name: "e".into(),
                    value: "val".into(),
                },
                SaxEvent::InternalEntityDecl {
                    name: "%pe".into(),
                    value: "pv".into(),
                },
                SaxEvent::ExternalEntityDecl {
                    name: "ext".into(),
                    public_id: None,
                    system_id: Some("ext.xml".into()),
                },
                SaxEvent::NotationDecl {
                    name: "gif".into(),
                    public_id: Some("gif".into()),
                    system_id: None,
                },
                SaxEvent::UnparsedEntityDecl {
                    name: "pic".into(),
                    public_id: None,
                    system_id: Some("p.gif".into()),
                    notation: "gif".into(),
                },
                SaxEvent::Comment(" c ".into()),
                SaxEvent::ProcessingInstruction {
                    target: "pi".into(),
                    data: "d".into(),
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_entity_warning() {
        let (result, events) = parse("<!DOCTYPE r [<!ENTITY e 'one'><!ENTITY e 'two'>]><r>&e;</r>");
        result.unwrap();
        let warnings: Vec<&SaxEvent> = events.iter().filter(|e| matches!(e, SaxEvent::Warning(_))).collect();
        assert_eq!(warnings.len(), 1);
        match warnings[0] {
            SaxEvent::Warning(err) => assert_eq!(
                err.message,
                "entity : [e] declared several times, only the first declaration is binding"
            ),
            _ => unreachable!(),
        }
        assert!(events.contains(&SaxEvent::Characters("one".into())));
    }

    #[test]
    fn test_parameter_entity_between_declarations() {
        let doc = "<!DOCTYPE r [<!ENTITY % decl \"<!ENTITY e 'from-pe'>\"> %decl; ]><r>&e;</r>";
        let (result, events) = parse(doc);
        result.unwrap();
        let dtd = dtd_events(&events);
        assert_eq!(dtd[1], SaxEvent::StartEntity("%decl".into()));
        assert_eq!(
            dtd[2],
            SaxEvent::InternalEntityDecl {
                name: "e".into(),
                value: "from-pe".into(),
            }
        );
        assert_eq!(dtd[3], SaxEvent::EndEntity("%decl".into()));
        assert!(events.contains(&SaxEvent::Characters("from-pe".into())));
    }

    #[test]
    fn test_parameter_entity_in_entity_value() {
        let doc = "<!DOCTYPE r [<!ENTITY % p \"world\"><!ENTITY e \"hello %p;\">]><r>&e;</r>";
        let (result, events) = parse(doc);
        result.unwrap();
        assert!(events.contains(&SaxEvent::Characters("hello world".into())));
    }

    #[test]
    fn test_entity_value_references() {
        let doc = "<!DOCTYPE r [<!ENTITY lt2 '&#38;#60;'><!ENTITY g 'x'><!ENTITY h '[&g;]'>]><r/>";
        let (result, events) = parse(doc);
        result.unwrap();
        assert!(events.contains(&SaxEvent::InternalEntityDecl {
            name: "lt2".into(),
            value: "&#60;".into(),
        }));
        assert!(events.contains(&SaxEvent::InternalEntityDecl {
            name: "h".into(),
            value: "[&g;]".into(),
        }));
    }

    #[test]
    fn test_parameter_entity_in_content_model() {
        let doc = "<!DOCTYPE r [<!ENTITY % m '(a | b)'><!ELEMENT r %m;>]><r/>";
        let (result, events) = parse(doc);
        result.unwrap();
        assert!(events.contains(&SaxEvent::ElementDecl {
            name: "r".into(),
            model: "(a|b)".into(),
        }));
    }

    #[test]
    fn test_parameter_entity_recursion() {
        let message = fatal_message("<!DOCTYPE r [<!ENTITY % s '&#37;s;'> %s;]><r/>");
        assert_eq!(message, "Recursion detected : [%s] contains a reference to itself");
        let message = fatal_message("<!DOCTYPE r [<!ENTITY % a '&#37;b;'><!ENTITY % b '&#37;a;'> %a;]><r/>");
        assert!(message.starts_with("Recursion detected"));
    }

    #[test]
    fn test_attribute_default_expansion() {
        let doc = "<!DOCTYPE r [<!ENTITY e 'v'><!ATTLIST r a CDATA 'x&e;&#33;' n NOTATION (gif|png) #IMPLIED>]><r/>";
        let (result, events) = parse(doc);
        result.unwrap();
        assert!(events.contains(&SaxEvent::AttributeDecl {
            element_name: "r".into(),
            attribute_name: "a".into(),
            att_type: "CDATA".into(),
            mode: None,
            default_value: Some("xv!".into()),
        }));
        assert!(events.contains(&SaxEvent::AttributeDecl {
            element_name: "r".into(),
            attribute_name: "n".into(),
            att_type: "NOTATION (gif|png)".into(),
            mode: Some("#IMPLIED".into()),
            default_value: None,
        }));
        match events.iter().find(|e| e.is_start_element()) {
            Some(SaxEvent::StartElement { attributes, .. }) => assert_eq!(attributes.value("a"), Some("xv!")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_undeclared_entity_in_default() {
        let (result, events) = parse("<!DOCTYPE r [<!ATTLIST r a CDATA '&nope;'>]><r/>");
        result.unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, SaxEvent::Error(err) if err.message == "entity : [nope] not declared")));
    }

    #[test]
    fn test_external_subset() {
        let dtd = "<?xml version='1.0' encoding='UTF-8'?>
<!ELEMENT r ANY>
<![INCLUDE[<!ENTITY inc 'yes'>]]>
<![IGNORE[<!ENTITY ign 'no'> <![ nested ]]> ]]>
<!ENTITY % ext SYSTEM 'more.ent'>%ext;";
        let sink = EventCollector::new()
            .with_entity("r.dtd", dtd)
            .with_entity("more.ent", "<!ENTITY m 'more'>");
        let mut parser = SaxParser::new(sink);
        parser
            .parse("<!DOCTYPE r SYSTEM 'r.dtd' [<!ENTITY inc 'internal'>]><r>&inc;&m;&ign;</r>")
            .unwrap();
        let collector = parser.into_sink();
        assert_eq!(collector.text(), "internalmore");

        let events = collector.events();
        let dtd = dtd_events(events);
        assert_eq!(dtd[1], SaxEvent::StartEntity("[dtd]".into()));
        assert_eq!(dtd.last(), Some(&SaxEvent::EndEntity("[dtd]".into())));
        assert!(dtd.contains(&SaxEvent::StartEntity("%ext".into())));
        assert!(dtd.contains(&SaxEvent::EndEntity("%ext".into())));

        let diagnostics: Vec<String> = collector.diagnostics().iter().map(|e| e.message.clone()).collect();
        assert_eq!(
            diagnostics,
            vec![
                "entity : [inc] declared several times, only the first declaration is binding".to_string(),
                "entity : [ign] not declared".to_string(),
            ]
        );
    }

    fn external_fatal(doc: &str, entities: &[(&str, &str)]) -> String {
        let sink = entities
            .iter()
            .fold(EventCollector::new(), |sink, (id, text)| sink.with_entity(*id, *text));
        let mut parser = SaxParser::new(sink);
        let err = parser.parse(doc).expect_err("expected a fatal error");
        assert!(err.is_fatal());
        assert_eq!(parser.sink().events().last(), Some(&SaxEvent::FatalError(err.clone())));
        err.message
    }

    #[test]
    fn test_external_subset_must_be_complete() {
        let doc = "<!DOCTYPE r SYSTEM 'r.dtd'>'><r>&e;</r>";
        assert_eq!(
            external_fatal(doc, &[("r.dtd", "<!ENTITY e 'x")]),
            "the markup entity value has not been closed"
        );

        let doc = "<!DOCTYPE r SYSTEM 'r.dtd'><!-- c --><r/>";
        assert_eq!(
            external_fatal(doc, &[("r.dtd", "<!-- open")]),
            "the markup comment has not been closed"
        );

        let doc = "<!DOCTYPE r SYSTEM 'r.dtd'>><r/>";
        assert!(external_fatal(doc, &[("r.dtd", "<!ELEMENT r ANY")]).contains("has not been closed"));
    }

    #[test]
    fn test_literal_must_close_in_its_own_entity() {
        let doc = "<!DOCTYPE r [<!ENTITY % p SYSTEM 'p.ent'>%p;'>]><r/>";
        assert_eq!(
            external_fatal(doc, &[("p.ent", "<!ENTITY e 'x")]),
            "the markup entity value has not been closed"
        );
    }

    #[test]
    fn test_prolog_after_external_subset() {
        let sink = EventCollector::new().with_entity("r.dtd", "<!ELEMENT r ANY>\n");
        let mut parser = SaxParser::new(sink);
        parser.parse("<!DOCTYPE r SYSTEM 'r.dtd'> <!--after--><r/>").unwrap();
        let events = parser.into_sink().into_events();
        let end_dtd = events.iter().position(|e| *e == SaxEvent::EndDtd).unwrap();
        assert_eq!(events[end_dtd - 1], SaxEvent::EndEntity("[dtd]".into()));
        assert_eq!(events[end_dtd + 1], SaxEvent::Comment("after".into()));
    }

    #[test]
    fn test_external_subset_not_loaded() {
        let doc = "<!DOCTYPE r SYSTEM 'r.dtd'><r/>";
        let (result, events) = parse(doc);
        result.unwrap();
        assert!(events.iter().any(|e| matches!(e, SaxEvent::Warning(_))));

        let config = ParserConfig::default().with_load_external_dtd(false);
        let (result, events) = parse_with(doc, config);
        result.unwrap();
        assert!(!events.iter().any(|e| e.is_diagnostic()));
    }

    #[test]
    fn test_doctype_errors() {
        assert_eq!(
            fatal_message("<!DOCTYPE r><!DOCTYPE r><r/>"),
            "can not have two doctype declarations"
        );
        assert!(fatal_message("<!DOCTYPE r [<!FOO>]><r/>").contains("invalid markup declaration"));
        assert!(fatal_message("<!DOCTYPE r [<!ELEMENT r foo>]><r/>").contains("invalid content model"));
        assert!(fatal_message("<!DOCTYPE r [<![INCLUDE[]]>]><r/>").contains("conditional"));
        assert!(fatal_message("<!DOCTYPE r [<!ATTLIST r a STRING #IMPLIED>]><r/>").contains("invalid attribute type"));
        assert!(fatal_message("<!DOCTYPE r PUBLIC 'a{b' 'x'><r/>").contains("public identifier"));
        assert_eq!(
            fatal_message("<!DOCTYPE r [<!ELEMENT r ANY>"),
            "the markup DOCTYPE has not been closed"
        );
    }
}
