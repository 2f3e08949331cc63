//! DTD Declaration Store
//!
//! Collects ELEMENT, ATTLIST and NOTATION declarations while the internal
//! and external subsets are scanned. The store is consulted afterwards to:
//! - attach declared types to attributes of a start tag
//! - synthesize attributes that carry a default value
//! - tell element-only content (where whitespace is ignorable) from mixed content
//!
//! As with entities, the first declaration of an attribute is binding, which
//! gives the internal subset precedence over the external one.

use std::collections::HashMap;

use super::entities::ExternalId;

/// Collected DTD declarations
#[derive(Debug, Default)]
pub struct DtdDeclarations {
    /// Element declarations: name -> content spec
    pub elements: HashMap<String, ElementDecl>,
    /// Attribute lists: element name -> attributes
    pub attlists: HashMap<String, Vec<AttDef>>,
    /// Notations: name -> identifiers
    pub notations: HashMap<String, ExternalId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDecl {
    /// Content model with all whitespace removed
    pub model: String,
    pub content_spec: ContentSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSpec {
    Empty,
    Any,
    Mixed(Vec<String>),      // List of allowed element names
    Children,
}

impl ContentSpec {
    /// Classify a normalized content model
    pub fn classify(model: &str) -> Option<ContentSpec> {
        match model {
            "EMPTY" => Some(ContentSpec::Empty),
            "ANY" => Some(ContentSpec::Any),
            _ if model.starts_with("(#PCDATA") => {
                let inner = model.trim_start_matches('(').trim_end_matches('*').trim_end_matches(')');
                let names = inner
                    .split('|')
                    .skip(1)
                    .map(|n| n.to_string())
                    .collect();
                Some(ContentSpec::Mixed(names))
            }
            _ if model.starts_with('(') => Some(ContentSpec::Children),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttDef {
    pub name: String,
    pub att_type: AttType,
    pub default: AttDefault,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttType {
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    Notation(Vec<String>),
    Enumeration(Vec<String>),
}

impl AttType {
    /// Parse one of the keyword types (everything but enumerations)
    pub fn from_keyword(keyword: &str) -> Option<AttType> {
        Some(match keyword {
            "CDATA" => AttType::CData,
            "ID" => AttType::Id,
            "IDREF" => AttType::IdRef,
            "IDREFS" => AttType::IdRefs,
            "ENTITY" => AttType::Entity,
            "ENTITIES" => AttType::Entities,
            "NMTOKEN" => AttType::NmToken,
            "NMTOKENS" => AttType::NmTokens,
            _ => return None,
        })
    }

    /// Type as reported with an attribute value (`NMTOKEN` for enumerations)
    pub fn as_str(&self) -> &'static str {
        match self {
            AttType::CData => "CDATA",
            AttType::Id => "ID",
            AttType::IdRef => "IDREF",
            AttType::IdRefs => "IDREFS",
            AttType::Entity => "ENTITY",
            AttType::Entities => "ENTITIES",
            AttType::NmToken | AttType::Enumeration(_) => "NMTOKEN",
            AttType::NmTokens => "NMTOKENS",
            AttType::Notation(_) => "NOTATION",
        }
    }

    /// Type as written in the declaration, e.g. `(a|b)` or `NOTATION (gif|png)`
    pub fn declaration(&self) -> String {
        match self {
            AttType::Enumeration(values) => format!("({})", values.join("|")),
            AttType::Notation(names) => format!("NOTATION ({})", names.join("|")),
            other => other.as_str().to_string(),
        }
    }

    #[inline]
    pub fn is_cdata(&self) -> bool {
        matches!(self, AttType::CData)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttDefault {
    Required,
    Implied,
    Fixed(String),
    Default(String),
}

impl AttDefault {
    /// `#REQUIRED`, `#IMPLIED`, `#FIXED` or nothing
    pub fn mode(&self) -> Option<&'static str> {
        match self {
            AttDefault::Required => Some("#REQUIRED"),
            AttDefault::Implied => Some("#IMPLIED"),
            AttDefault::Fixed(_) => Some("#FIXED"),
            AttDefault::Default(_) => None,
        }
    }

    /// Value to synthesize when the attribute is missing
    pub fn value(&self) -> Option<&str> {
        match self {
            AttDefault::Fixed(v) | AttDefault::Default(v) => Some(v),
            AttDefault::Required | AttDefault::Implied => None,
        }
    }
}

impl DtdDeclarations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element declaration. Returns false if the element was already declared.
    pub fn add_element(&mut self, name: &str, model: String) -> bool {
        if self.elements.contains_key(name) {
            return false;
        }
        let content_spec = ContentSpec::classify(&model).unwrap_or(ContentSpec::Any);
        self.elements
            .insert(name.to_string(), ElementDecl { model, content_spec });
        true
    }

    /// Add an attribute definition. Returns false if the attribute was already
    /// defined for this element; the earlier definition is kept.
    pub fn add_attribute(&mut self, element: &str, def: AttDef) -> bool {
        let defs = self.attlists.entry(element.to_string()).or_default();
        if defs.iter().any(|d| d.name == def.name) {
            return false;
        }
        defs.push(def);
        true
    }

    /// Add a notation declaration. Returns false on a redeclaration.
    pub fn add_notation(&mut self, name: &str, id: ExternalId) -> bool {
        if self.notations.contains_key(name) {
            return false;
        }
        self.notations.insert(name.to_string(), id);
        true
    }

    /// Attribute definitions declared for `element`
    pub fn attributes(&self, element: &str) -> &[AttDef] {
        self.attlists.get(element).map_or(&[], |defs| defs.as_slice())
    }

    pub fn attribute(&self, element: &str, name: &str) -> Option<&AttDef> {
        self.attributes(element).iter().find(|d| d.name == name)
    }

    /// Whether whitespace directly inside `element` is ignorable
    pub fn has_element_content(&self, element: &str) -> bool {
        matches!(
            self.elements.get(element).map(|e| &e.content_spec),
            Some(ContentSpec::Children)
        )
    }
}

/// Strip all whitespace from a content model
pub fn normalize_model(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r')).collect()
}

/// Attribute-value normalization.
///
/// Each whitespace character becomes a space; for types other than CDATA,
/// leading and trailing spaces are dropped and runs of spaces collapse.
pub fn normalize_attribute_value(value: &str, att_type: Option<&AttType>) -> String {
    let spaced: String = value
        .chars()
        .map(|c| if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c })
        .collect();
    match att_type {
        Some(t) if !t.is_cdata() => spaced.split(' ').filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" "),
        _ => spaced,
    }
}
