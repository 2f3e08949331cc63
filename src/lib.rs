//! RustySax - Streaming SAX2 XML parser
//!
//! Parses XML 1.0 and 1.1 documents and reports what it finds to an
//! [`EventSink`], one callback per construct:
//! - Content: elements, text, processing instructions, prefix mappings
//! - Lexical: comments, CDATA sections, DTD and entity boundaries
//! - Declarations: everything declared in the internal and external subsets
//! - Diagnostics: warnings, recoverable errors, fatal errors
//!
//! Internal and external entities are expanded on the fly, attribute
//! defaults from the DTD are applied and namespace prefixes are resolved.
//!
//! ```
//! use rustysax::{parse_events, SaxEvent};
//!
//! let events = parse_events("<p:doc xmlns:p='urn:x'>text</p:doc>").unwrap();
//! assert!(events.contains(&SaxEvent::Characters("text".to_string())));
//! ```
//!
//! With the `nif` feature the crate also builds as an Erlang NIF library.

pub mod config;
pub mod core;
pub mod error;
pub mod sax;
pub mod strategy;

#[cfg(feature = "nif")]
mod nif;

pub use config::ParserConfig;
pub use core::attributes::{Attribute, Attributes};
pub use error::{Position, SaxError, Severity, SinkResult};
pub use sax::{EventCollector, EventSink, NullSink, SaxEvent, SaxParser, XmlFilter};
pub use strategy::{parse_events, parse_events_with, parse_parallel, parse_parallel_bytes};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(all(feature = "mimalloc", feature = "nif"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;
