//! Event Sink
//!
//! The single capability interface the scanner reports to. It merges the
//! SAX2 content, lexical, declaration, DTD, error and entity-resolver
//! handlers; every method has a no-op default so implementors only write
//! the callbacks they care about.
//!
//! Every callback returns [`SinkResult`]. Returning `Err` stops the parse
//! immediately with that error, which is the only way to cancel a parse.

use crate::core::attributes::Attributes;
use crate::error::{SaxError, SinkResult};

pub trait EventSink {
    // Content

    fn start_document(&mut self) -> SinkResult {
        Ok(())
    }

    fn end_document(&mut self) -> SinkResult {
        Ok(())
    }

    /// The XML declaration of the document, if it has one
    fn xml_declaration(
        &mut self,
        _version: &str,
        _encoding: Option<&str>,
        _standalone: Option<bool>,
    ) -> SinkResult {
        Ok(())
    }

    fn start_element(
        &mut self,
        _uri: Option<&str>,
        _local_name: &str,
        _qname: &str,
        _attributes: &Attributes,
    ) -> SinkResult {
        Ok(())
    }

    fn end_element(&mut self, _uri: Option<&str>, _local_name: &str, _qname: &str) -> SinkResult {
        Ok(())
    }

    fn start_prefix_mapping(&mut self, _prefix: &str, _uri: &str) -> SinkResult {
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> SinkResult {
        Ok(())
    }

    fn characters(&mut self, _text: &str) -> SinkResult {
        Ok(())
    }

    /// Whitespace inside an element declared with element-only content
    fn ignorable_whitespace(&mut self, _text: &str) -> SinkResult {
        Ok(())
    }

    fn processing_instruction(&mut self, _target: &str, _data: &str) -> SinkResult {
        Ok(())
    }

    /// An entity reference that was not expanded
    fn skipped_entity(&mut self, _name: &str) -> SinkResult {
        Ok(())
    }

    // Lexical

    fn comment(&mut self, _text: &str) -> SinkResult {
        Ok(())
    }

    fn start_cdata(&mut self) -> SinkResult {
        Ok(())
    }

    fn end_cdata(&mut self) -> SinkResult {
        Ok(())
    }

    fn start_dtd(&mut self, _name: &str, _public_id: Option<&str>, _system_id: Option<&str>) -> SinkResult {
        Ok(())
    }

    fn end_dtd(&mut self) -> SinkResult {
        Ok(())
    }

    /// Start of an entity's replacement text. Parameter entities are named
    /// `%name`, the external DTD subset `[dtd]`.
    fn start_entity(&mut self, _name: &str) -> SinkResult {
        Ok(())
    }

    fn end_entity(&mut self, _name: &str) -> SinkResult {
        Ok(())
    }

    // Declarations

    fn element_decl(&mut self, _name: &str, _model: &str) -> SinkResult {
        Ok(())
    }

    fn attribute_decl(
        &mut self,
        _element_name: &str,
        _attribute_name: &str,
        _att_type: &str,
        _mode: Option<&str>,
        _default_value: Option<&str>,
    ) -> SinkResult {
        Ok(())
    }

    fn internal_entity_decl(&mut self, _name: &str, _value: &str) -> SinkResult {
        Ok(())
    }

    fn external_entity_decl(
        &mut self,
        _name: &str,
        _public_id: Option<&str>,
        _system_id: Option<&str>,
    ) -> SinkResult {
        Ok(())
    }

    fn notation_decl(&mut self, _name: &str, _public_id: Option<&str>, _system_id: Option<&str>) -> SinkResult {
        Ok(())
    }

    fn unparsed_entity_decl(
        &mut self,
        _name: &str,
        _public_id: Option<&str>,
        _system_id: Option<&str>,
        _notation: &str,
    ) -> SinkResult {
        Ok(())
    }

    // Errors

    fn warning(&mut self, _err: &SaxError) -> SinkResult {
        Ok(())
    }

    /// A recoverable error. Returning `Err` turns it into a fatal one.
    fn error(&mut self, _err: &SaxError) -> SinkResult {
        Ok(())
    }

    /// Called once before the parse is aborted
    fn fatal_error(&mut self, _err: &SaxError) {}

    // Entity resolution

    /// Fetch the text of an external entity or of the external DTD subset.
    ///
    /// `Ok(None)` means the sink does not resolve it.
    fn resolve_entity(
        &mut self,
        _name: &str,
        _public_id: Option<&str>,
        _base_uri: Option<&str>,
        _system_id: Option<&str>,
    ) -> Result<Option<String>, SaxError> {
        Ok(None)
    }
}

/// Implement `EventSink` for a pointer-like type by forwarding every call
macro_rules! forward_event_sink {
    ($($impl_header:tt)*) => {
        $($impl_header)* {
            fn start_document(&mut self) -> SinkResult {
                (**self).start_document()
            }
            fn end_document(&mut self) -> SinkResult {
                (**self).end_document()
            }
            fn xml_declaration(&mut self, version: &str, encoding: Option<&str>, standalone: Option<bool>) -> SinkResult {
                (**self).xml_declaration(version, encoding, standalone)
            }
            fn start_element(&mut self, uri: Option<&str>, local_name: &str, qname: &str, attributes: &Attributes) -> SinkResult {
                (**self).start_element(uri, local_name, qname, attributes)
            }
            fn end_element(&mut self, uri: Option<&str>, local_name: &str, qname: &str) -> SinkResult {
                (**self).end_element(uri, local_name, qname)
            }
            fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> SinkResult {
                (**self).start_prefix_mapping(prefix, uri)
            }
            fn end_prefix_mapping(&mut self, prefix: &str) -> SinkResult {
                (**self).end_prefix_mapping(prefix)
            }
            fn characters(&mut self, text: &str) -> SinkResult {
                (**self).characters(text)
            }
            fn ignorable_whitespace(&mut self, text: &str) -> SinkResult {
                (**self).ignorable_whitespace(text)
            }
            fn processing_instruction(&mut self, target: &str, data: &str) -> SinkResult {
                (**self).processing_instruction(target, data)
            }
            fn skipped_entity(&mut self, name: &str) -> SinkResult {
                (**self).skipped_entity(name)
            }
            fn comment(&mut self, text: &str) -> SinkResult {
                (**self).comment(text)
            }
            fn start_cdata(&mut self) -> SinkResult {
                (**self).start_cdata()
            }
            fn end_cdata(&mut self) -> SinkResult {
                (**self).end_cdata()
            }
            fn start_dtd(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
                (**self).start_dtd(name, public_id, system_id)
            }
            fn end_dtd(&mut self) -> SinkResult {
                (**self).end_dtd()
            }
            fn start_entity(&mut self, name: &str) -> SinkResult {
                (**self).start_entity(name)
            }
            fn end_entity(&mut self, name: &str) -> SinkResult {
                (**self).end_entity(name)
            }
            fn element_decl(&mut self, name: &str, model: &str) -> SinkResult {
                (**self).element_decl(name, model)
            }
            fn attribute_decl(&mut self, element_name: &str, attribute_name: &str, att_type: &str, mode: Option<&str>, default_value: Option<&str>) -> SinkResult {
                (**self).attribute_decl(element_name, attribute_name, att_type, mode, default_value)
            }
            fn internal_entity_decl(&mut self, name: &str, value: &str) -> SinkResult {
                (**self).internal_entity_decl(name, value)
            }
            fn external_entity_decl(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
                (**self).external_entity_decl(name, public_id, system_id)
            }
            fn notation_decl(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>) -> SinkResult {
                (**self).notation_decl(name, public_id, system_id)
            }
            fn unparsed_entity_decl(&mut self, name: &str, public_id: Option<&str>, system_id: Option<&str>, notation: &str) -> SinkResult {
                (**self).unparsed_entity_decl(name, public_id, system_id, notation)
            }
            fn warning(&mut self, err: &SaxError) -> SinkResult {
                (**self).warning(err)
            }
            fn error(&mut self, err: &SaxError) -> SinkResult {
                (**self).error(err)
            }
            fn fatal_error(&mut self, err: &SaxError) {
                (**self).fatal_error(err)
            }
            fn resolve_entity(&mut self, name: &str, public_id: Option<&str>, base_uri: Option<&str>, system_id: Option<&str>) -> Result<Option<String>, SaxError> {
                (**self).resolve_entity(name, public_id, base_uri, system_id)
            }
        }
    };
}

forward_event_sink!(impl<S: EventSink + ?Sized> EventSink for &mut S);
forward_event_sink!(impl<S: EventSink + ?Sized> EventSink for Box<S>);

/// Sink that ignores every event; useful for well-formedness checks
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        elements: usize,
    }

    impl EventSink for Counter {
        fn start_element(&mut self, _: Option<&str>, _: &str, _: &str, _: &Attributes) -> SinkResult {
            self.elements += 1;
            Ok(())
        }
    }

    fn drive<S: EventSink>(mut sink: S) -> SinkResult {
        sink.start_document()?;
        sink.start_element(None, "a", "a", &Attributes::new())?;
        sink.end_element(None, "a", "a")
    }

    #[test]
    fn test_forwarding_through_mut_ref() {
        let mut counter = Counter { elements: 0 };
        drive(&mut counter).unwrap();
        drive(&mut counter).unwrap();
        assert_eq!(counter.elements, 2);
    }

    #[test]
    fn test_forwarding_through_box() {
        let boxed: Box<dyn EventSink> = Box::new(Counter { elements: 0 });
        assert!(drive(boxed).is_ok());
    }

    #[test]
    fn test_defaults_continue() {
        let mut sink = NullSink;
        assert!(sink.error(&SaxError::error("x")).is_ok());
        assert_eq!(sink.resolve_entity("e", None, None, Some("e.xml")), Ok(None));
    }
}
