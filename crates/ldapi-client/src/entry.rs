//! Search result entries.

use std::collections::HashMap;

use ldap3::SearchEntry;
use serde::Serialize;

use crate::config::DirectoryConfig;
use crate::dn::{parse_dn, ParsedDn};
use crate::error::DirectoryResult;

/// Attribute values keyed by attribute name.
pub type Attributes = HashMap<String, Vec<String>>;

/// A directory entry returned by a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Distinguished Name.
    pub dn: String,

    /// Attributes (all values are multi-valued).
    pub attributes: HashMap<String, Vec<String>>,

    /// Attributes whose values are not valid UTF-8.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub binary_attributes: HashMap<String, Vec<Vec<u8>>>,
}

impl From<SearchEntry> for DirectoryEntry {
    fn from(entry: SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attributes: entry.attrs,
            binary_attributes: entry.bin_attrs,
        }
    }
}

impl DirectoryEntry {
    /// Creates an entry from a DN and text attributes.
    #[must_use]
    pub fn new(dn: impl Into<String>, attributes: HashMap<String, Vec<String>>) -> Self {
        Self {
            dn: dn.into(),
            attributes,
            binary_attributes: HashMap::new(),
        }
    }

    /// Gets the first value of an attribute.
    ///
    /// Attribute names are matched case-insensitively, as the server
    /// may return a different case than was requested.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.get_attrs(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Gets all values of an attribute.
    #[must_use]
    pub fn get_attrs(&self, name: &str) -> Option<&Vec<String>> {
        self.attributes.get(name).or_else(|| {
            self.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
    }

    /// Checks if the entry has an attribute.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        self.get_attrs(name).is_some()
    }

    /// Gets the first value of a binary attribute.
    #[must_use]
    pub fn get_binary_attr(&self, name: &str) -> Option<&[u8]> {
        self.binary_attributes
            .get(name)
            .and_then(|v| v.first())
            .map(Vec::as_slice)
    }

    /// Object classes of the entry.
    #[must_use]
    pub fn object_classes(&self) -> &[String] {
        self.get_attrs("objectClass")
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Login name, read from the configured login attribute.
    #[must_use]
    pub fn login<'a>(&'a self, config: &DirectoryConfig) -> Option<&'a str> {
        self.get_attr(&config.login_attribute)
    }

    /// Display name, read from the configured full name attribute.
    #[must_use]
    pub fn display_name<'a>(&'a self, config: &DirectoryConfig) -> Option<&'a str> {
        self.get_attr(&config.fullname_attribute)
    }

    /// Number of attributes, text and binary.
    #[must_use]
    pub fn count(&self) -> usize {
        self.attributes.len() + self.binary_attributes.len()
    }

    /// Parses the entry's DN.
    ///
    /// # Errors
    ///
    /// Returns an error if the DN returned by the server is malformed.
    pub fn parsed_dn(&self) -> DirectoryResult<ParsedDn> {
        parse_dn(&self.dn)
    }
}
