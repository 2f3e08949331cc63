//! SAX Event Types
//!
//! Owned copies of the callbacks an [`EventSink`](super::EventSink) receives,
//! as recorded by the [`EventCollector`](super::EventCollector).

use crate::core::attributes::Attributes;
use crate::error::SaxError;

/// A SAX parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    StartDocument,
    EndDocument,

    /// XML declaration
    XmlDeclaration {
        version: String,
        encoding: Option<String>,
        standalone: Option<bool>,
    },

    /// Start of an element
    StartElement {
        uri: Option<String>,
        local_name: String,
        qname: String,
        attributes: Attributes,
    },

    /// End of an element
    EndElement {
        uri: Option<String>,
        local_name: String,
        qname: String,
    },

    StartPrefixMapping {
        prefix: String,
        uri: String,
    },
    EndPrefixMapping {
        prefix: String,
    },

    /// Text content
    Characters(String),
    IgnorableWhitespace(String),

    /// Processing instruction
    ProcessingInstruction {
        target: String,
        data: String,
    },

    SkippedEntity(String),

    /// Comment
    Comment(String),
    StartCData,
    EndCData,

    StartDtd {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    EndDtd,

    StartEntity(String),
    EndEntity(String),

    ElementDecl {
        name: String,
        model: String,
    },
    AttributeDecl {
        element_name: String,
        attribute_name: String,
        att_type: String,
        mode: Option<String>,
        default_value: Option<String>,
    },
    InternalEntityDecl {
        name: String,
        value: String,
    },
    ExternalEntityDecl {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    NotationDecl {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
    },
    UnparsedEntityDecl {
        name: String,
        public_id: Option<String>,
        system_id: Option<String>,
        notation: String,
    },

    Warning(SaxError),
    Error(SaxError),
    FatalError(SaxError),
}

impl SaxEvent {
    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    /// Check if this is a text event
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, SaxEvent::Characters(_) | SaxEvent::IgnorableWhitespace(_))
    }

    /// Warnings, errors and fatal errors
    #[inline]
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            SaxEvent::Warning(_) | SaxEvent::Error(_) | SaxEvent::FatalError(_)
        )
    }

    /// Events describing the DTD rather than the document content
    pub fn is_dtd(&self) -> bool {
        matches!(
            self,
            SaxEvent::StartDtd { .. }
                | SaxEvent::EndDtd
                | SaxEvent::ElementDecl { .. }
                | SaxEvent::AttributeDecl { .. }
                | SaxEvent::InternalEntityDecl { .. }
                | SaxEvent::ExternalEntityDecl { .. }
                | SaxEvent::NotationDecl { .. }
                | SaxEvent::UnparsedEntityDecl { .. }
        )
    }

    /// Get the qualified element name if this is a start or end element
    pub fn element_name(&self) -> Option<&str> {
        match self {
            SaxEvent::StartElement { qname, .. } => Some(qname),
            SaxEvent::EndElement { qname, .. } => Some(qname),
            _ => None,
        }
    }

    /// Name of the event kind, as used for NIF atoms
    pub fn kind(&self) -> &'static str {
        match self {
            SaxEvent::StartDocument => "start_document",
            SaxEvent::EndDocument => "end_document",
            SaxEvent::XmlDeclaration { .. } => "xml_declaration",
            SaxEvent::StartElement { .. } => "start_element",
            SaxEvent::EndElement { .. } => "end_element",
            SaxEvent::StartPrefixMapping { .. } => "start_prefix_mapping",
            SaxEvent::EndPrefixMapping { .. } => "end_prefix_mapping",
            SaxEvent::Characters(_) => "characters",
            SaxEvent::IgnorableWhitespace(_) => "ignorable_whitespace",
            SaxEvent::ProcessingInstruction { .. } => "processing_instruction",
            SaxEvent::SkippedEntity(_) => "skipped_entity",
            SaxEvent::Comment(_) => "comment",
            SaxEvent::StartCData => "start_cdata",
            SaxEvent::EndCData => "end_cdata",
            SaxEvent::StartDtd { .. } => "start_dtd",
            SaxEvent::EndDtd => "end_dtd",
            SaxEvent::StartEntity(_) => "start_entity",
            SaxEvent::EndEntity(_) => "end_entity",
            SaxEvent::ElementDecl { .. } => "element_decl",
            SaxEvent::AttributeDecl { .. } => "attribute_decl",
            SaxEvent::InternalEntityDecl { .. } => "internal_entity_decl",
            SaxEvent::ExternalEntityDecl { .. } => "external_entity_decl",
            SaxEvent::NotationDecl { .. } => "notation_decl",
            SaxEvent::UnparsedEntityDecl { .. } => "unparsed_entity_decl",
            SaxEvent::Warning(_) => "warning",
            SaxEvent::Error(_) => "error",
            SaxEvent::FatalError(_) => "fatal_error",
        }
    }
}
