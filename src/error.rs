//! Parse errors and scanner control flow
//!
//! Every diagnostic handed to an [`EventSink`](crate::EventSink) is a
//! [`SaxError`] tagged with a [`Severity`]:
//! - `Warning`: informational, parsing continues unaffected
//! - `Error`: recoverable well-formedness or validity problem
//! - `Fatal`: the parse is aborted after the sink has been notified
//!
//! Inside the scanner, running out of input is not an error by itself. It
//! travels as [`Interrupt::EndOfInput`] until the driver decides whether the
//! document ended cleanly.

use std::fmt;

/// How serious a reported problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location in the top-level document, counted in characters.
///
/// Replacement text of entities does not move the position; errors raised
/// inside an entity point at the reference that included it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Zero-based character offset
    pub offset: usize,
    /// One-based line number
    pub line: usize,
    /// One-based column number
    pub column: usize,
}

impl Position {
    pub fn start() -> Self {
        Position {
            offset: 0,
            line: 1,
            column: 1,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A warning, recoverable error or fatal error raised while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaxError {
    pub severity: Severity,
    pub message: String,
    pub position: Position,
    /// The character the scanner was looking at, if any
    pub character: Option<char>,
}

impl SaxError {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        SaxError {
            severity,
            message: message.into(),
            position: Position::default(),
            character: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    pub fn at(mut self, position: Position, character: Option<char>) -> Self {
        self.position = position;
        self.character = character;
        self
    }

    /// Same diagnostic, promoted to a fatal error
    pub fn escalate(mut self) -> Self {
        self.severity = Severity::Fatal;
        self
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl fmt::Display for SaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.severity, self.position, self.message)?;
        if let Some(c) = self.character {
            write!(f, " (character {:?})", c)?;
        }
        Ok(())
    }
}

impl std::error::Error for SaxError {}

/// Result type of every sink callback. `Err` stops the parse.
pub type SinkResult = Result<(), SaxError>;

/// Why a scanning step stopped early
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interrupt {
    /// The input ran out; the driver decides whether that is premature
    EndOfInput,
    /// The parse must stop with this error
    Abort(SaxError),
}

impl From<SaxError> for Interrupt {
    fn from(err: SaxError) -> Self {
        Interrupt::Abort(err)
    }
}

pub type ScanResult<T> = Result<T, Interrupt>;
