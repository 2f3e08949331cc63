//! SAX (Simple API for XML) Module
//!
//! Event-based parsing: the scanner drives an [`EventSink`] with one
//! callback per construct it recognizes.
//!
//! ## Architecture
//!
//! ```text
//! SaxParser ---> XmlScanner ---> EventSink
//!                                   |
//!                   +---------------+---------------+
//!                   v               v               v
//!             EventCollector    XmlFilter       user sinks
//!             (SaxEvent[])      (chains)
//! ```
//!
//! ## Event Families
//!
//! - Content: document, elements, prefix mappings, text, PIs, skipped entities
//! - Lexical: comments, CDATA boundaries, DTD boundaries, entity boundaries
//! - Declarations: element, attribute, entity and notation declarations
//! - Diagnostics: warnings, recoverable errors, fatal errors
//! - Resolution: fetching the text of external entities

pub mod collector;
pub mod events;
pub mod filter;
pub mod handler;
pub mod parser;

pub use collector::EventCollector;
pub use events::SaxEvent;
pub use filter::XmlFilter;
pub use handler::{EventSink, NullSink};
pub use parser::SaxParser;
