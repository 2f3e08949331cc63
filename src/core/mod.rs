//! Core XML parsing primitives
//!
//! This module contains the building blocks of the SAX scanner:
//! - Cursor: stack of input frames with memchr-accelerated runs
//! - Scanner: grammar state machine driving the event sink
//! - Unicode: name and character classification tables
//! - Entities: entity tables and reference decoding
//! - Namespace: prefix bindings scoped to elements
//! - DTD: element, attribute-list and notation declarations
//! - Attributes, QName: start-tag data handed to the sink
//! - Resolver: LRU cache of resolved external texts
//! - Encoding: UTF-16 detection and decoding of byte input

pub mod attributes;
pub mod cursor;
pub mod dtd;
pub mod encoding;
pub mod entities;
pub mod namespace;
pub mod qname;
pub mod resolver;
pub mod scanner;
pub mod unicode;
