//! SAX Parser
//!
//! Owns a sink and a configuration, and runs one scanner per document.

use crate::config::ParserConfig;
use crate::core::encoding;
use crate::core::scanner::XmlScanner;
use crate::error::SaxError;

use super::handler::EventSink;

/// Streaming parser reporting to an [`EventSink`]
///
/// ```
/// use rustysax::{EventCollector, SaxParser};
///
/// let mut parser = SaxParser::new(EventCollector::new());
/// parser.parse("<greeting>hello</greeting>").unwrap();
/// assert_eq!(parser.sink().text(), "hello");
/// ```
#[derive(Debug)]
pub struct SaxParser<S: EventSink> {
    sink: S,
    config: ParserConfig,
    base_uri: Option<String>,
}

impl<S: EventSink> SaxParser<S> {
    pub fn new(sink: S) -> Self {
        SaxParser {
            sink,
            config: ParserConfig::default(),
            base_uri: None,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Base URI passed to `resolve_entity` for external entities
    pub fn with_base_uri(mut self, base_uri: &str) -> Self {
        self.base_uri = Some(base_uri.to_string());
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a complete document.
    ///
    /// Returns the fatal error that stopped the parse, or the error a sink
    /// callback returned. Recoverable problems only reach the sink.
    pub fn parse(&mut self, input: &str) -> Result<(), SaxError> {
        log::debug!("parsing document of {} bytes", input.len());
        let result = XmlScanner::new(input, &mut self.sink, &self.config, self.base_uri.as_deref()).run();
        if let Err(err) = &result {
            log::debug!("parse stopped: {}", err);
        }
        result
    }

    /// Parse a complete document given as bytes (UTF-8 or UTF-16)
    pub fn parse_bytes(&mut self, input: &[u8]) -> Result<(), SaxError> {
        match encoding::decode(input) {
            Ok(text) => self.parse(&text),
            Err(err) => {
                self.sink.fatal_error(&err);
                Err(err)
            }
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkResult;
    use crate::sax::{EventCollector, NullSink, SaxEvent};

    #[test]
    fn test_parse_bytes_utf16() {
        let text = "<a>é</a>";
        let mut bytes = vec![0xFF, 0xFE];
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }

        let mut parser = SaxParser::new(EventCollector::new());
        parser.parse_bytes(&bytes).unwrap();
        assert_eq!(parser.sink().text(), "é");
    }

    #[test]
    fn test_parse_bytes_invalid_utf8() {
        let mut parser = SaxParser::new(EventCollector::new());
        let err = parser.parse_bytes(b"<a>\xC3</a>").unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(parser.sink().events(), [SaxEvent::FatalError(_)]));
    }

    #[test]
    fn test_parser_is_reusable() {
        let mut parser = SaxParser::new(EventCollector::new());
        parser.parse("<a/>").unwrap();
        parser.sink_mut().take_events();
        parser.parse("<b/>").unwrap();
        assert_eq!(parser.sink().events().first(), Some(&SaxEvent::StartDocument));
        assert!(parser.sink().events().iter().any(|e| e.element_name() == Some("b")));
    }

    #[test]
    fn test_null_sink_checks_well_formedness() {
        let mut parser = SaxParser::new(NullSink);
        assert!(parser.parse("<a><b></a>").is_err());
        assert!(parser.parse("<a><b/></a>").is_ok());
    }

    struct Resolver {
        seen_base: Option<String>,
    }

    impl EventSink for Resolver {
        fn resolve_entity(
            &mut self,
            _name: &str,
            _public_id: Option<&str>,
            base_uri: Option<&str>,
            _system_id: Option<&str>,
        ) -> Result<Option<String>, SaxError> {
            self.seen_base = base_uri.map(str::to_string);
            Ok(Some("ext".to_string()))
        }
    }

    #[test]
    fn test_base_uri_reaches_resolver() {
        let mut parser = SaxParser::new(Resolver { seen_base: None }).with_base_uri("file:///docs/");
        parser
            .parse("<!DOCTYPE a [<!ENTITY e SYSTEM 'e.xml'>]><a>&e;</a>")
            .unwrap();
        assert_eq!(parser.sink().seen_base.as_deref(), Some("file:///docs/"));
    }

    struct StopAtFirstElement;

    impl EventSink for StopAtFirstElement {
        fn start_element(
            &mut self,
            _uri: Option<&str>,
            _local_name: &str,
            qname: &str,
            _attributes: &crate::Attributes,
        ) -> SinkResult {
            Err(SaxError::fatal(format!("stopped at {}", qname)))
        }
    }

    #[test]
    fn test_sink_error_cancels_parse() {
        let mut parser = SaxParser::new(StopAtFirstElement);
        let err = parser.parse("<a><b/></a>").unwrap_err();
        assert_eq!(err.message, "stopped at a");
    }
}
