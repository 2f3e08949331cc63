//! XML Attribute List
//!
//! The attributes of one start tag, in document order followed by any
//! attributes synthesized from DTD defaults.

use super::qname::QName;

/// One attribute of a start tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name (may include namespace prefix)
    pub qname: QName,
    /// Namespace URI, when namespace processing resolved one
    pub uri: Option<String>,
    /// Declared type, `None` when the DTD does not declare the attribute
    pub att_type: Option<String>,
    /// Attribute value (references expanded)
    pub value: String,
    /// False for attributes synthesized from a DTD default
    pub specified: bool,
}

impl Attribute {
    /// Create an attribute as written in a start tag
    pub fn new(qname: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            qname: QName::new(qname),
            uri: None,
            att_type: None,
            value: value.into(),
            specified: true,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.qname.as_str()
    }

    #[inline]
    pub fn local_name(&self) -> &str {
        self.qname.local_name()
    }

    /// Namespace prefix (before colon), "" if none
    #[inline]
    pub fn prefix(&self) -> &str {
        self.qname.prefix()
    }
}

/// Ordered attribute list of one start tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    items: Vec<Attribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Attribute> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.items.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Attribute> {
        self.items.iter_mut()
    }

    /// Append an attribute unless one with the same qualified name is present.
    /// Returns false (keeping the first) on a duplicate.
    pub fn push(&mut self, attr: Attribute) -> bool {
        if self.index_of(attr.name()).is_some() {
            return false;
        }
        self.items.push(attr);
        true
    }

    /// Index of the attribute with this qualified name
    pub fn index_of(&self, qname: &str) -> Option<usize> {
        self.items.iter().position(|a| a.qname == *qname)
    }

    /// Index of the attribute with this namespace URI and local name
    pub fn index_of_ns(&self, uri: Option<&str>, local_name: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|a| a.uri.as_deref() == uri && a.local_name() == local_name)
    }

    /// Value of the attribute with this qualified name
    pub fn value(&self, qname: &str) -> Option<&str> {
        self.index_of(qname).map(|i| self.items[i].value.as_str())
    }

    pub fn value_ns(&self, uri: Option<&str>, local_name: &str) -> Option<&str> {
        self.index_of_ns(uri, local_name)
            .map(|i| self.items[i].value.as_str())
    }

    /// Name/value pairs, mainly for tests and term conversion
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.items
            .iter()
            .map(|a| (a.name().to_string(), a.value.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_first_duplicate() {
        let mut attrs = Attributes::new();
        assert!(attrs.push(Attribute::new("x", "1")));
        assert!(!attrs.push(Attribute::new("x", "2")));
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.value("x"), Some("1"));
    }

    #[test]
    fn test_lookup_by_namespace() {
        let mut attrs = Attributes::new();
        let mut a = Attribute::new("p:id", "7");
        a.uri = Some("urn:p".into());
        attrs.push(a);
        attrs.push(Attribute::new("id", "8"));

        assert_eq!(attrs.value_ns(Some("urn:p"), "id"), Some("7"));
        assert_eq!(attrs.value_ns(None, "id"), Some("8"));
        assert_eq!(attrs.get(0).map(|a| a.prefix()), Some("p"));
        assert_eq!(attrs.index_of("missing"), None);
    }

    #[test]
    fn test_pairs_keep_order() {
        let mut attrs = Attributes::new();
        attrs.push(Attribute::new("b", "2"));
        attrs.push(Attribute::new("a", "1"));
        assert_eq!(
            attrs.pairs(),
            vec![("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())]
        );
    }
}
