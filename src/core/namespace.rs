//! Namespace Context
//!
//! Stack-based prefix to URI bindings. Each binding remembers the element
//! depth that declared it, so leaving an element drops exactly the bindings
//! it introduced. The empty prefix stands for the default namespace.

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// Namespace binding (prefix -> URI)
#[derive(Debug, Clone)]
struct NsBinding {
    prefix: String,
    uri: String,
    depth: usize,
}

/// Why a declaration was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// `xmlns` may never be declared
    ReservedXmlns,
    /// `xml` may only be bound to its own URI
    ReservedXml,
    /// Only the `xml` prefix may use the XML namespace URI
    ReservedUri(String),
}

impl NamespaceError {
    pub fn message(&self) -> String {
        match self {
            NamespaceError::ReservedXmlns => "the prefix 'xmlns' must not be declared".to_string(),
            NamespaceError::ReservedXml => {
                format!("the prefix 'xml' can only be bound to {}", ns::XML)
            }
            NamespaceError::ReservedUri(uri) => {
                format!("the namespace URI {} can not be bound to another prefix", uri)
            }
        }
    }
}

/// Stack of namespace frames
#[derive(Debug)]
pub struct NamespaceContext {
    /// Stack of namespace bindings
    bindings: Vec<NsBinding>,
    /// Current element depth
    depth: usize,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    /// Create a context with the `xml` prefix pre-bound
    pub fn new() -> Self {
        let mut bindings = Vec::with_capacity(16);
        bindings.push(NsBinding {
            prefix: "xml".to_string(),
            uri: ns::XML.to_string(),
            depth: 0,
        });
        NamespaceContext { bindings, depth: 0 }
    }

    /// Enter a new element frame
    pub fn push_context(&mut self) {
        self.depth += 1;
    }

    /// Leave an element frame, returning the prefixes it declared in declaration order
    pub fn pop_context(&mut self) -> Vec<String> {
        let keep = self
            .bindings
            .iter()
            .rposition(|b| b.depth < self.depth)
            .map_or(0, |i| i + 1);
        let removed = self.bindings.split_off(keep);
        self.depth = self.depth.saturating_sub(1);
        removed.into_iter().map(|b| b.prefix).collect()
    }

    /// Bind `prefix` in the current frame.
    ///
    /// Returns `Ok(false)` when the declaration is legal but binds nothing
    /// new (`xml` declared with its own URI).
    pub fn declare_prefix(&mut self, prefix: &str, uri: &str) -> Result<bool, NamespaceError> {
        if prefix == "xmlns" {
            return Err(NamespaceError::ReservedXmlns);
        }
        if prefix == "xml" {
            return if uri == ns::XML {
                Ok(false)
            } else {
                Err(NamespaceError::ReservedXml)
            };
        }
        if uri == ns::XML || uri == ns::XMLNS {
            return Err(NamespaceError::ReservedUri(uri.to_string()));
        }
        self.bindings.push(NsBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            depth: self.depth,
        });
        Ok(true)
    }

    /// Resolve a prefix ("" for the default namespace).
    ///
    /// An empty URI (`xmlns=""`) undeclares the default namespace and
    /// resolves to `None`.
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Get current depth
    pub fn depth(&self) -> usize {
        self.depth
    }
}
