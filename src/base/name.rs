//! Domain names.
//!
//! A domain name is a sequence of labels. This module keeps names in
//! their presentation form, i.e., as a string of labels joined by dots,
//! with the root name being the empty string. The wire form with its
//! length-prefixed labels and compression pointers only exists while a
//! message is being encoded or decoded and lives in [`wire`].
//!
//! Since DNS names compare case-insensitively, [`Name`] implements
//! equality, ordering, and hashing over the ASCII-lowercased label
//! octets. The original spelling is preserved for display.
//!
//! [`wire`]: super::wire

use core::cmp::Ordering;
use core::str::FromStr;
use core::{fmt, hash};

//------------ Name ----------------------------------------------------------

/// A domain name.
#[derive(Clone, Debug, Default)]
pub struct Name {
    /// The dot-joined labels. Empty for the root name.
    inner: String,
}

/// # Creation and Conversion
///
impl Name {
    /// The maximum length of a name in presentation form.
    pub const MAX_LEN: usize = 255;

    /// The maximum length of a single label.
    pub const MAX_LABEL_LEN: usize = 63;

    /// Creates the root name.
    pub fn root() -> Self {
        Name::default()
    }

    /// Creates a name from an already validated or decoded string.
    ///
    /// This is used by the wire decoder which produces label strings
    /// straight from their length-prefixed wire encoding.
    pub(super) fn from_decoded(inner: String) -> Self {
        Name { inner }
    }

    /// Returns the name as a string slice without a trailing dot.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns whether the name is the root name.
    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator over the labels of the name.
    ///
    /// The root name has no labels.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.inner.split('.').filter(|label| !label.is_empty())
    }
}

//--- FromStr

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A single trailing dot marks an absolute name in presentation
        // format; the stored form never carries it.
        let s = s.strip_suffix('.').unwrap_or(s);
        if s.is_empty() {
            return Ok(Name::root());
        }
        if s.len() > Self::MAX_LEN {
            return Err(NameError::LongName);
        }
        for label in s.split('.') {
            if label.is_empty() {
                return Err(NameError::EmptyLabel);
            }
            if label.len() > Self::MAX_LABEL_LEN {
                return Err(NameError::LongLabel);
            }
            if !label.is_ascii() {
                return Err(NameError::BadLabel);
            }
        }
        Ok(Name {
            inner: s.into(),
        })
    }
}

//--- PartialEq and Eq

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.inner.eq_ignore_ascii_case(&other.inner)
    }
}

impl Eq for Name {}

//--- PartialOrd and Ord

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.inner.bytes().map(|ch| ch.to_ascii_lowercase());
        let right = other.inner.bytes().map(|ch| ch.to_ascii_lowercase());
        left.cmp(right)
    }
}

//--- Hash

impl hash::Hash for Name {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        for ch in self.inner.bytes() {
            state.write_u8(ch.to_ascii_lowercase())
        }
    }
}

//--- Display

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            f.write_str(&self.inner)
        }
    }
}

//------------ NameError -----------------------------------------------------

/// An error happened while converting a string into a name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NameError {
    /// The name exceeds the maximum length.
    LongName,

    /// A label exceeds the maximum label length.
    LongLabel,

    /// The name contains an empty label.
    EmptyLabel,

    /// A label contains characters outside of ASCII.
    BadLabel,
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            NameError::LongName => f.write_str("long domain name"),
            NameError::LongLabel => f.write_str("long domain name label"),
            NameError::EmptyLabel => f.write_str("empty domain name label"),
            NameError::BadLabel => f.write_str("invalid domain name label"),
        }
    }
}

impl std::error::Error for NameError {}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn name(s: &str) -> Name {
        Name::from_str(s).unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(name("example.com").as_str(), "example.com");
        assert_eq!(name("example.com.").as_str(), "example.com");
        assert_eq!(name("").as_str(), "");
        assert_eq!(name(".").as_str(), "");
        assert_eq!(
            Name::from_str("example..com"),
            Err(NameError::EmptyLabel)
        );
        assert_eq!(
            Name::from_str(&"x".repeat(64)),
            Err(NameError::LongLabel)
        );
        let long = vec!["abcdefg"; 32].join(".");
        assert_eq!(Name::from_str(&long), Err(NameError::LongName));
        assert_eq!(
            Name::from_str("exämple.com"),
            Err(NameError::BadLabel)
        );
    }

    #[test]
    fn case_insensitive_eq() {
        assert_eq!(name("Example.COM"), name("example.com"));
        assert_ne!(name("example.org"), name("example.com"));
        let mut left = DefaultHasher::new();
        name("Example.COM").hash(&mut left);
        let mut right = DefaultHasher::new();
        name("example.com").hash(&mut right);
        assert_eq!(left.finish(), right.finish());
    }

    #[test]
    fn labels() {
        let name = name("www.example.com");
        assert_eq!(
            name.labels().collect::<Vec<_>>(),
            ["www", "example", "com"]
        );
        assert_eq!(Name::root().labels().count(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", name("www.example.com")), "www.example.com");
        assert_eq!(format!("{}", Name::root()), ".");
    }
}
