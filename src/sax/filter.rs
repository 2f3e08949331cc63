//! Event filter
//!
//! [`XmlFilter`] wraps another sink and forwards events to it, optionally:
//! - escalating recoverable errors to fatal ones
//! - dropping lexical events (comments, CDATA and entity boundaries, DTD bounds)
//! - dropping ignorable whitespace
//!
//! Filters nest: the inner sink may itself be a filter.

use super::handler::EventSink;
use crate::core::attributes::Attributes;
use crate::error::{SaxError, SinkResult};

/// Sink decorator forwarding to an owned inner sink
#[derive(Debug, Default)]
pub struct XmlFilter<S> {
    inner: S,
    escalate_errors: bool,
    skip_lexical: bool,
    skip_ignorable_whitespace: bool,
}

impl<S: EventSink> XmlFilter<S> {
    pub fn new(inner: S) -> Self {
        XmlFilter {
            inner,
            escalate_errors: false,
            skip_lexical: false,
            skip_ignorable_whitespace: false,
        }
    }

    /// Treat every recoverable error as fatal
    pub fn escalate_errors(mut self, enabled: bool) -> Self {
        self.escalate_errors = enabled;
        self
    }

    /// Drop comment, CDATA, entity and DTD boundary events
    pub fn skip_lexical(mut self, enabled: bool) -> Self {
        self.skip_lexical = enabled;
        self
    }

    pub fn skip_ignorable_whitespace(mut self, enabled: bool) -> Self {
        self.skip_ignorable_whitespace = enabled;
        self
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: EventSink> EventSink for XmlFilter<S> {
    fn start_document(&mut self) -> SinkResult {
        self.inner.start_document()
    }

    fn end_document(&mut self) -> SinkResult {
        self.inner.end_document()
    }

    fn xml_declaration(&mut self, version: &str, encoding: Option<&str>, standalone: Option<bool>) -> SinkResult {
        self.inner.xml_declaration(version, encoding, standalone)
    }

    fn start_element(&mut self, uri: Option<&str>, local_name: &str, qname: &str, attributes: &Attributes) -> SinkResult {
        self.inner.start_element(uri, local_name, qname, attributes)
    }

    fn end_element(&mut self, uri: Option<&str>, local_name: &str, qname: &str) -> SinkResult {
        self.inner.end_element(uri, local_name, qname)
    }

    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> SinkResult {
        self.inner.start_prefix_mapping(prefix, uri)
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> SinkResult {
        self.inner.end_prefix_mapping(prefix)
    }

    fn characters(&mut self, text: &str) -> SinkResult {
        self.inner.characters(text)
    }

    fn ignorable_whitespace(&mut self, text: &str) -> SinkResult {
        if self.skip_ignorable_whitespace {
            return Ok(());
        }
        self.inner.ignorable_whitespace(text)
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> SinkResult {
        self.inner.processing_instruction(target, data)
    }

    fn skipped_entity(&mut self, name: &str) -> SinkResult {
        self.inner.skipped_entity(name)
    }

    fn comment(&mut self, text: &str) -> SinkResult {
        if self.skip_lexical {
            return Ok(());
        }
        self.inner.comment(text)
    }

    fn start_cdata(&mut self) -> SinkResult {
        if self.skip_lexical {
            return Ok(());
        }
        self.inner.start_cdata()
    }

    fn end_cdata(&mut self) -> SinkResult {
        if self.skip_lexical {
            return Ok(());
        }
        self.inner.end_cdata()
    }

    fn start_dtd(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
        if self.skip_lexical {
            return Ok(());
        }
        self.inner.start_dtd(name, public_id, system_id)
    }

    fn end_dtd(&mut self) -> SinkResult {
        if self.skip_lexical {
            return Ok(());
        }
        self.inner.end_dtd()
    }

    fn start_entity(&mut self, name: &str) -> SinkResult {
        if self.skip_lexical {
            return Ok(());
        }
        self.inner.start_entity(name)
    }

    fn end_entity(&mut self, name: &str) -> SinkResult {
        if self.skip_lexical {
            return Ok(());
        }
        self.inner.end_entity(name)
    }

    fn element_decl(&mut self, name: &str, model: &str) -> SinkResult {
        self.inner.element_decl(name, model)
    }

    fn attribute_decl(
        &mut self,
        element_name: &str,
        attribute_name: &str,
        att_type: &str,
        mode: Option<&str>,
        default_value: Option<&str>,
    ) -> SinkResult {
        self.inner
            .attribute_decl(element_name, attribute_name, att_type, mode, default_value)
    }

    fn internal_entity_decl(&mut self, name: &str, value: &str) -> SinkResult {
        self.inner.internal_entity_decl(name, value)
    }

    fn external_entity_decl(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
        self.inner.external_entity_decl(name, public_id, system_id)
    }

    fn notation_decl(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
        self.inner.notation_decl(name, public_id, system_id)
    }

    fn unparsed_entity_decl(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        notation: &str,
    ) -> SinkResult {
        self.inner
            .unparsed_entity_decl(name, public_id, system_id, notation)
    }

    fn warning(&mut self, err: &SaxError) -> SinkResult {
        self.inner.warning(err)
    }

    fn error(&mut self, err: &SaxError) -> SinkResult {
        if self.escalate_errors {
            let fatal = err.clone().escalate();
            self.inner.fatal_error(&fatal);
            return Err(fatal);
        }
        self.inner.error(err)
    }

    fn fatal_error(&mut self, err: &SaxError) {
        self.inner.fatal_error(err)
    }

    fn resolve_entity(
        &mut self,
        name: &str,
        public_id: Option<&str>,
        base_uri: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<Option<String>, SaxError> {
        self.inner.resolve_entity(name, public_id, base_uri, system_id)
    }
}
