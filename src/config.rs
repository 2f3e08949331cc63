//! Parser configuration
//!
//! Feature toggles consumed by the scanner. Every field has a builder
//! method so configurations read as a chain:
//!
//! ```
//! use rustysax::ParserConfig;
//!
//! let config = ParserConfig::default()
//!     .with_namespaces(false)
//!     .with_strict_char_data(true);
//! assert!(!config.namespaces);
//! ```

/// Options for a single parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Route `xmlns` attributes to the namespace context and resolve prefixes
    pub namespaces: bool,
    /// Check `#REQUIRED` and `#FIXED` attribute declarations
    pub validation: bool,
    /// Validate every character of text, comments, PIs and attribute values
    /// against the XML Char production instead of only scanning for
    /// delimiters
    pub strict_char_data: bool,
    /// Normalize attribute-value whitespace according to the declared type
    pub normalize_attributes: bool,
    /// Accept documents declaring `version="1.1"`
    pub xml_1_1: bool,
    /// Keep `&name;` as literal text when `name` is not declared
    pub preserve_undeclared_entities: bool,
    /// Fetch and parse the external DTD subset named by the DOCTYPE
    pub load_external_dtd: bool,
    /// Fetch external general and parameter entities when referenced
    pub resolve_external_entities: bool,
    /// Number of resolved external texts cached per parse
    pub entity_cache_capacity: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            namespaces: true,
            validation: false,
            strict_char_data: false,
            normalize_attributes: false,
            xml_1_1: true,
            preserve_undeclared_entities: false,
            load_external_dtd: true,
            resolve_external_entities: true,
            entity_cache_capacity: 16,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Well-formedness checking with every character validated
    pub fn strict() -> Self {
        Self::default().with_strict_char_data(true)
    }

    pub fn with_namespaces(mut self, enabled: bool) -> Self {
        self.namespaces = enabled;
        self
    }

    pub fn with_validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    pub fn with_strict_char_data(mut self, enabled: bool) -> Self {
        self.strict_char_data = enabled;
        self
    }

    pub fn with_normalize_attributes(mut self, enabled: bool) -> Self {
        self.normalize_attributes = enabled;
        self
    }

    pub fn with_xml_1_1(mut self, enabled: bool) -> Self {
        self.xml_1_1 = enabled;
        self
    }

    pub fn with_preserve_undeclared_entities(mut self, enabled: bool) -> Self {
        self.preserve_undeclared_entities = enabled;
        self
    }

    pub fn with_load_external_dtd(mut self, enabled: bool) -> Self {
        self.load_external_dtd = enabled;
        self
    }

    pub fn with_resolve_external_entities(mut self, enabled: bool) -> Self {
        self.resolve_external_entities = enabled;
        self
    }

    pub fn with_entity_cache_capacity(mut self, capacity: usize) -> Self {
        self.entity_cache_capacity = capacity;
        self
    }

    /// XML versions this configuration accepts in a declaration
    pub fn supported_versions(&self) -> &'static [&'static str] {
        if self.xml_1_1 {
            &["1.0", "1.1"]
        } else {
            &["1.0"]
        }
    }
}
