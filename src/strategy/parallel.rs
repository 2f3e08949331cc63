//! Collected and Parallel Parsing
//!
//! Every parse owns its scanner, entity tables and namespace context, so
//! independent documents can be spread over the rayon pool with no shared
//! mutable state.

use rayon::prelude::*;

use crate::config::ParserConfig;
use crate::error::SaxError;
use crate::sax::{EventCollector, SaxEvent, SaxParser};

/// Parse a document with the default configuration, collecting its events
pub fn parse_events(input: &str) -> Result<Vec<SaxEvent>, SaxError> {
    parse_events_with(input, ParserConfig::default())
}

/// Parse a document, collecting its events.
///
/// Recoverable errors and warnings are part of the returned events; a fatal
/// error discards them and is returned instead.
pub fn parse_events_with(input: &str, config: ParserConfig) -> Result<Vec<SaxEvent>, SaxError> {
    let mut parser = SaxParser::new(EventCollector::new()).with_config(config);
    parser.parse(input)?;
    Ok(parser.into_sink().into_events())
}

fn parse_bytes_with(input: &[u8], config: ParserConfig) -> Result<Vec<SaxEvent>, SaxError> {
    let mut parser = SaxParser::new(EventCollector::new()).with_config(config);
    parser.parse_bytes(input)?;
    Ok(parser.into_sink().into_events())
}

/// Parse several documents in parallel, results in input order
pub fn parse_parallel(documents: &[&str], config: ParserConfig) -> Vec<Result<Vec<SaxEvent>, SaxError>> {
    log::debug!("parsing {} documents in parallel", documents.len());
    documents
        .par_iter()
        .map(|doc| parse_events_with(doc, config.clone()))
        .collect()
}

/// Same as [`parse_parallel`] for undecoded input
pub fn parse_parallel_bytes(documents: &[&[u8]], config: ParserConfig) -> Vec<Result<Vec<SaxEvent>, SaxError>> {
    documents
        .par_iter()
        .map(|doc| parse_bytes_with(doc, config.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events() {
        let events = parse_events("<root><a/></root>").unwrap();
        assert_eq!(events.first(), Some(&SaxEvent::StartDocument));
        assert_eq!(events.last(), Some(&SaxEvent::EndDocument));
        let names: Vec<_> = events.iter().filter_map(|e| e.element_name()).collect();
        assert_eq!(names, ["root", "a", "a", "root"]);
    }

    #[test]
    fn test_parse_events_fatal() {
        let err = parse_events("<root>").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.message, "the markup root has not been closed");
    }

    #[test]
    fn test_parallel_preserves_order() {
        let docs = ["<a>1</a>", "<b>", "<c>3</c>"];
        let results = parse_parallel(&docs, ParserConfig::default());
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap().contains(&SaxEvent::Characters("1".to_string())));
        assert!(results[1].is_err());
        assert!(results[2].as_ref().unwrap().contains(&SaxEvent::Characters("3".to_string())));
    }

    #[test]
    fn test_parallel_documents_are_independent() {
        let docs = [
            "<!DOCTYPE a [<!ENTITY e 'first'>]><a>&e;</a>",
            "<b>&e;</b>",
        ];
        let results = parse_parallel(&docs, ParserConfig::default());
        let first = results[0].as_ref().unwrap();
        assert!(first.contains(&SaxEvent::Characters("first".to_string())));
        let second = results[1].as_ref().unwrap();
        assert!(second.iter().any(|e| matches!(e, SaxEvent::Error(err) if err.message == "entity : [e] not declared")));
    }

    #[test]
    fn test_parallel_bytes() {
        let docs: [&[u8]; 2] = [b"<a/>", &[0xFF, 0xFE, b'<', 0, b'b', 0, b'/', 0, b'>', 0]];
        let results = parse_parallel_bytes(&docs, ParserConfig::default());
        assert!(results.iter().all(|r| r.is_ok()));
    }
}
