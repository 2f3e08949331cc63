//! XML Entity Tables and Reference Decoding
//!
//! Handles:
//! - Predefined entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - General and parameter entity declarations (disjoint namespaces)
//! - Expansion of literals such as attribute defaults
//!
//! Declarations follow the XML rule that the first declaration of a name
//! is binding; later ones are ignored.

use memchr::memchr;
use memchr::memmem;
use std::collections::HashMap;

use super::unicode::{code_point_to_char, is_name};

/// Replacement character of a predefined entity
#[inline]
pub fn predefined(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => None,
    }
}

/// Why a character reference could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharRefError {
    /// No digits between `&#` (or `&#x`) and `;`
    Empty,
    /// A character that is not a (hex) digit
    InvalidDigit(char),
    /// The code point is not an XML Char
    NotAChar(u32),
}

impl CharRefError {
    pub fn message(&self) -> String {
        match self {
            CharRefError::Empty => "character reference has no digits".to_string(),
            CharRefError::InvalidDigit(c) => {
                format!("invalid character {:?} in character reference", c)
            }
            CharRefError::NotAChar(cp) => {
                format!("character reference &#x{:X}; does not refer to a legal XML character", cp)
            }
        }
    }
}

/// Decode the body of a character reference (the text between `&#` and `;`)
pub fn decode_char_ref(body: &str, xml11: bool) -> Result<char, CharRefError> {
    let (digits, radix) = match body.strip_prefix('x') {
        Some(hex) => (hex, 16),
        None => (body, 10),
    };
    if digits.is_empty() {
        return Err(CharRefError::Empty);
    }
    if let Some(bad) = digits.chars().find(|c| !c.is_digit(radix)) {
        return Err(CharRefError::InvalidDigit(bad));
    }
    // overflow means "far beyond U+10FFFF"
    let cp = u32::from_str_radix(digits, radix).unwrap_or(u32::MAX);
    code_point_to_char(cp, xml11).ok_or(CharRefError::NotAChar(cp))
}

/// PUBLIC and/or SYSTEM identifier of an external resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ExternalId {
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

impl ExternalId {
    pub fn system(system_id: impl Into<String>) -> Self {
        ExternalId {
            public_id: None,
            system_id: Some(system_id.into()),
        }
    }
}

/// What an entity name stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityDef {
    /// Literal replacement text
    Internal(String),
    /// Replacement text fetched through the entity resolver
    External(ExternalId),
    /// NDATA entity, never parsed
    Unparsed { id: ExternalId, notation: String },
}

/// Outcome of adding a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declared {
    Added,
    /// An earlier declaration of the same name is kept
    Duplicate,
    /// Predefined entities keep their built-in meaning
    Predefined,
}

/// General and parameter entity declarations of one document
#[derive(Debug, Default)]
pub struct EntityTable {
    general: HashMap<String, EntityDef>,
    parameter: HashMap<String, EntityDef>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a general entity; the first declaration wins
    pub fn declare_general(&mut self, name: &str, def: EntityDef) -> Declared {
        if predefined(name).is_some() {
            return Declared::Predefined;
        }
        Self::insert_first(&mut self.general, name, def)
    }

    /// Declare a parameter entity; the first declaration wins
    pub fn declare_parameter(&mut self, name: &str, def: EntityDef) -> Declared {
        Self::insert_first(&mut self.parameter, name, def)
    }

    fn insert_first(map: &mut HashMap<String, EntityDef>, name: &str, def: EntityDef) -> Declared {
        if map.contains_key(name) {
            return Declared::Duplicate;
        }
        map.insert(name.to_string(), def);
        Declared::Added
    }

    pub fn general(&self, name: &str) -> Option<&EntityDef> {
        self.general.get(name)
    }

    pub fn parameter(&self, name: &str) -> Option<&EntityDef> {
        self.parameter.get(name)
    }

    /// Expand references in a literal that has already been read in full,
    /// such as an attribute default value.
    ///
    /// Character references and predefined entities are decoded, internal
    /// general entities are expanded recursively. External and unparsed
    /// entities are not allowed in such literals.
    pub fn expand_literal(&self, text: &str, xml11: bool) -> Result<String, String> {
        let mut stack = Vec::new();
        self.expand_into(text, xml11, &mut stack)
    }

    fn expand_into<'t>(&'t self, text: &str, xml11: bool, stack: &mut Vec<&'t str>) -> Result<String, String> {
        if memchr(b'&', text.as_bytes()).is_none() {
            return Ok(text.to_string());
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(amp) = memchr(b'&', rest.as_bytes()) {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let semi = memchr(b';', after.as_bytes())
                .ok_or_else(|| "entity reference is not terminated by ';'".to_string())?;
            let body = &after[..semi];
            rest = &after[semi + 1..];

            if let Some(digits) = body.strip_prefix('#') {
                let c = decode_char_ref(digits, xml11).map_err(|e| e.message())?;
                out.push(c);
                continue;
            }
            if let Some(c) = predefined(body) {
                out.push(c);
                continue;
            }
            if !is_name(body) {
                return Err(format!("invalid entity reference &{};", body));
            }
            match self.general.get_key_value(body) {
                Some((key, EntityDef::Internal(value))) => {
                    if stack.contains(&key.as_str()) {
                        return Err(format!("Recursion detected : [{}] contains a reference to itself", body));
                    }
                    stack.push(key.as_str());
                    let expanded = self.expand_into(value, xml11, stack)?;
                    stack.pop();
                    out.push_str(&expanded);
                }
                Some(_) => {
                    return Err(format!(
                        "external entity reference [{}] not allowed in attribute value",
                        body
                    ))
                }
                None => return Err(format!("entity : [{}] not declared", body)),
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Textual recursion guard: does `value` contain the reference `&name;` (or `%name;`)?
pub fn references_itself(marker: char, name: &str, value: &str) -> bool {
    let needle = format!("{}{};", marker, name);
    memmem::find(value.as_bytes(), needle.as_bytes()).is_some()
}
