//! Parsing Strategy Module
//!
//! Ways of running the scanner beyond a single sink-driven parse:
//! - Collected: one document into an owned event list
//! - Parallel: many independent documents across the rayon pool

pub mod parallel;

pub use parallel::{parse_events, parse_events_with, parse_parallel, parse_parallel_bytes};
