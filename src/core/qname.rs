//! Qualified names

use memchr::memchr;
use std::fmt;

/// An XML name split at its first colon
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    full: String,
    colon: Option<usize>,
}

impl QName {
    pub fn new(full: impl Into<String>) -> Self {
        let full = full.into();
        let colon = memchr(b':', full.as_bytes());
        QName { full, colon }
    }

    /// `prefix:local` or `local`
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.full
    }

    /// The prefix, or "" for unprefixed names
    pub fn prefix(&self) -> &str {
        self.colon.map_or("", |i| &self.full[..i])
    }

    pub fn local_name(&self) -> &str {
        self.colon.map_or(self.full.as_str(), |i| &self.full[i + 1..])
    }

    pub fn has_prefix(&self) -> bool {
        self.colon.is_some()
    }

    /// A namespace-well-formed name has at most one colon, with something on each side
    pub fn is_ns_valid(&self) -> bool {
        match self.colon {
            None => true,
            Some(i) => {
                i > 0 && i + 1 < self.full.len() && memchr(b':', &self.full.as_bytes()[i + 1..]).is_none()
            }
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

impl PartialEq<str> for QName {
    fn eq(&self, other: &str) -> bool {
        self.full == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let q = QName::new("p:b");
        assert_eq!(q.prefix(), "p");
        assert_eq!(q.local_name(), "b");
        assert!(q.has_prefix());

        let q = QName::new("root");
        assert_eq!(q.prefix(), "");
        assert_eq!(q.local_name(), "root");
        assert_eq!(q.to_string(), "root");
    }

    #[test]
    fn test_equality_is_on_full_name() {
        assert_eq!(QName::new("a:b"), QName::new("a:b"));
        assert_ne!(QName::new("a:b"), QName::new("c:b"));
        assert!(QName::new("x") == *"x");
    }

    #[test]
    fn test_ns_validity() {
        assert!(QName::new("a:b").is_ns_valid());
        assert!(!QName::new(":b").is_ns_valid());
        assert!(!QName::new("a:").is_ns_valid());
        assert!(!QName::new("a:b:c").is_ns_valid());
    }
}
