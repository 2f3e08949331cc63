//! Event Collector
//!
//! An [`EventSink`] that records every callback as an owned [`SaxEvent`].
//! Used by the convenience parse functions, batch parsing and the NIF layer.
//! External entities can be served from an in-memory map keyed by system id.

use std::collections::HashMap;

use super::events::SaxEvent;
use super::handler::EventSink;
use crate::core::attributes::Attributes;
use crate::error::{SaxError, SinkResult};

/// Collector that gathers SAX events during scanning
#[derive(Debug, Default)]
pub struct EventCollector {
    /// Collected events
    events: Vec<SaxEvent>,
    /// Replacement text served to `resolve_entity`, by system id
    external: HashMap<String, String>,
}

impl EventCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(64),
            external: HashMap::new(),
        }
    }

    /// Serve `text` whenever an external entity with this system id is resolved
    pub fn with_entity(mut self, system_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.external.insert(system_id.into(), text.into());
        self
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn into_events(self) -> Vec<SaxEvent> {
        self.events
    }

    /// Get number of collected events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// All character data, concatenated
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                SaxEvent::Characters(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Recoverable errors and warnings reported so far
    pub fn diagnostics(&self) -> Vec<&SaxError> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SaxEvent::Warning(err) | SaxEvent::Error(err) | SaxEvent::FatalError(err) => Some(err),
                _ => None,
            })
            .collect()
    }

    #[inline]
    fn push(&mut self, event: SaxEvent) -> SinkResult {
        self.events.push(event);
        Ok(())
    }
}

fn owned(s: Option<&str>) -> Option<String> {
    s.map(str::to_string)
}

impl EventSink for EventCollector {
    fn start_document(&mut self) -> SinkResult {
        self.push(SaxEvent::StartDocument)
    }

    fn end_document(&mut self) -> SinkResult {
        self.push(SaxEvent::EndDocument)
    }

    fn xml_declaration(&mut self, version: &str, encoding: Option<&str>, standalone: Option<bool>) -> SinkResult {
        self.push(SaxEvent::XmlDeclaration {
            version: version.to_string(),
            encoding: owned(encoding),
            standalone,
        })
    }

    fn start_element(
        &mut self,
        uri: Option<&str>,
        local_name: &str,
        qname: &str,
        attributes: &Attributes,
    ) -> SinkResult {
        self.push(SaxEvent::StartElement {
            uri: owned(uri),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
            attributes: attributes.clone(),
        })
    }

    fn end_element(&mut self, uri: Option<&str>, local_name: &str, qname: &str) -> SinkResult {
        self.push(SaxEvent::EndElement {
            uri: owned(uri),
            local_name: local_name.to_string(),
            qname: qname.to_string(),
        })
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> SinkResult {
        self.push(SaxEvent::StartPrefixMapping {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        })
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> SinkResult {
        self.push(SaxEvent::EndPrefixMapping {
            prefix: prefix.to_string(),
        })
    }

    fn characters(&mut self, text: &str) -> SinkResult {
        self.push(SaxEvent::Characters(text.to_string()))
    }

    fn ignorable_whitespace(&mut self, text: &str) -> SinkResult {
        self.push(SaxEvent::IgnorableWhitespace(text.to_string()))
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> SinkResult {
        self.push(SaxEvent::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        })
    }

    fn skipped_entity(&mut self, name: &str) -> SinkResult {
        self.push(SaxEvent::SkippedEntity(name.to_string()))
    }

    fn comment(&mut self, text: &str) -> SinkResult {
        self.push(SaxEvent::Comment(text.to_string()))
    }

    fn start_cdata(&mut self) -> SinkResult {
        self.push(SaxEvent::StartCData)
    }

    fn end_cdata(&mut self) -> SinkResult {
        self.push(SaxEvent::EndCData)
    }

    fn start_dtd(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
        self.push(SaxEvent::StartDtd {
            name: name.to_string(),
            public_id: owned(public_id),
            system_id: owned(system_id),
        })
    }

    fn end_dtd(&mut self) -> SinkResult {
        self.push(SaxEvent::EndDtd)
    }

    fn start_entity(&mut self, name: &str) -> SinkResult {
        self.push(SaxEvent::StartEntity(name.to_string()))
    }

    fn end_entity(&mut self, name: &str) -> SinkResult {
        self.push(SaxEvent::EndEntity(name.to_string()))
    }

    fn element_decl(&mut self, name: &str, model: &str) -> SinkResult {
        self.push(SaxEvent::ElementDecl {
            name: name.to_string(),
            model: model.to_string(),
        })
    }

    fn attribute_decl(
        &mut self,
        element_name: &str,
        attribute_name: &str,
        att_type: &str,
        mode: Option<&str>,
        default_value: Option<&str>,
    ) -> SinkResult {
        self.push(SaxEvent::AttributeDecl {
            element_name: element_name.to_string(),
            attribute_name: attribute_name.to_string(),
            att_type: att_type.to_string(),
            mode: owned(mode),
            default_value: owned(default_value),
        })
    }

    fn internal_entity_decl(&mut self, name: &str, value: &str) -> SinkResult {
        self.push(SaxEvent::InternalEntityDecl {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    fn external_entity_decl(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
        self.push(SaxEvent::ExternalEntityDecl {
            name: name.to_string(),
            public_id: owned(public_id),
            system_id: owned(system_id),
        })
    }

    fn notation_decl(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
        self.push(SaxEvent::NotationDecl {
            name: name.to_string(),
            public_id: owned(public_id),
            system_id: owned(system_id),
        })
    }

    fn unparsed_entity_decl(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        notation: &str,
    ) -> SinkResult {
        self.push(SaxEvent::UnparsedEntityDecl {
            name: name.to_string(),
            public_id: owned(public_id),
            system_id: owned(system_id),
            notation: notation.to_string(),
        })
    }

    fn warning(&mut self, err: &SaxError) -> SinkResult {
        self.push(SaxEvent::Warning(err.clone()))
    }

    fn error(&mut self, err: &SaxError) -> SinkResult {
        self.push(SaxEvent::Error(err.clone()))
    }

    fn fatal_error(&mut self, err: &SaxError) {
        self.events.push(SaxEvent::FatalError(err.clone()));
    }

    fn resolve_entity(
        &mut self,
        _name: &str,
        _public_id: Option<&str>,
        _base_uri: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<Option<String>, SaxError> {
        Ok(system_id.and_then(|id| self.external.get(id).cloned()))
    }
}
