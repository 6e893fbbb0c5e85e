//! Distinguished name utilities.
//!
//! A DN is a comma separated list of RDNs, most specific first
//! (`uid=jdoe,ou=people,dc=example,dc=com`). Each RDN is one or more
//! `type=value` assertions joined by `+`. Values may contain RFC 4514
//! escapes (`\,`, `\2C`) or be double-quoted.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{DirectoryError, DirectoryResult};

/// Characters that must always be backslash-escaped in a DN value.
const SPECIAL: &[char] = &[',', '+', '"', '\\', '<', '>', ';', '='];

/// A DN split into attribute types, each with its values in DN order.
///
/// Types appear in order of first occurrence. Type names are kept as
/// written, so `OU` and `ou` form separate groups; use
/// [`ParsedDn::get_ignore_case`] to look up without regard to case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDn {
    groups: Vec<(String, Vec<String>)>,
}

impl ParsedDn {
    fn push(&mut self, attr_type: &str, value: String) {
        match self.groups.iter_mut().find(|(t, _)| t == attr_type) {
            Some((_, values)) => values.push(value),
            None => self.groups.push((attr_type.to_string(), vec![value])),
        }
    }

    /// Returns the values for an attribute type (exact match).
    #[must_use]
    pub fn get(&self, attr_type: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(t, _)| t == attr_type)
            .map(|(_, v)| v.as_slice())
    }

    /// Returns the values of the first group whose type matches
    /// case-insensitively.
    #[must_use]
    pub fn get_ignore_case(&self, attr_type: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(t, _)| t.eq_ignore_ascii_case(attr_type))
            .map(|(_, v)| v.as_slice())
    }

    /// Iterates over `(type, values)` groups in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(t, v)| (t.as_str(), v.as_slice()))
    }

    /// Returns the attribute types in order of first appearance.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(t, _)| t.as_str())
    }

    /// Number of distinct attribute types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Returns true if the DN had no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for ParsedDn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (attr_type, values) in &self.groups {
            map.serialize_entry(attr_type, values)?;
        }
        map.end()
    }
}

impl fmt::Display for ParsedDn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (attr_type, values)) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{attr_type}: {}", values.join(", "))?;
        }
        Ok(())
    }
}

/// Splits `s` on unescaped, unquoted occurrences of any of `separators`.
fn split_unescaped<'a>(s: &'a str, separators: &[char]) -> DirectoryResult<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    let mut quoted = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            c if !quoted && separators.contains(&c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if escaped {
        return Err(DirectoryError::invalid_dn(format!("dangling escape in '{s}'")));
    }
    if quoted {
        return Err(DirectoryError::invalid_dn(format!("unterminated quote in '{s}'")));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

/// Trims leading spaces and trailing spaces that are not escaped.
fn trim_unescaped(s: &str) -> &str {
    let mut s = s.trim_start();
    while s.ends_with(' ') {
        let body = &s[..s.len() - 1];
        let backslashes = body.chars().rev().take_while(|&c| c == '\\').count();
        if backslashes % 2 == 1 {
            break;
        }
        s = body;
    }
    s
}

/// Splits a DN into its RDN strings, most specific first.
///
/// Values are returned as written (escapes preserved). An empty DN yields
/// an empty list.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidDn`] for empty components, RDNs
/// without `=`, dangling escapes or unterminated quotes.
pub fn explode_dn(dn: &str) -> DirectoryResult<Vec<String>> {
    if dn.trim().is_empty() {
        return Ok(Vec::new());
    }

    split_unescaped(dn, &[',', ';'])?
        .into_iter()
        .map(|rdn| {
            let rdn = trim_unescaped(rdn);
            if rdn.is_empty() {
                return Err(DirectoryError::invalid_dn(format!("empty RDN in '{dn}'")));
            }
            if split_unescaped(rdn, &['='])?.len() < 2 {
                return Err(DirectoryError::invalid_dn(format!("RDN '{rdn}' has no '='")));
            }
            Ok(rdn.to_string())
        })
        .collect()
}

/// Splits one RDN into `(type, unescaped value)` pairs.
fn parse_rdn(rdn: &str) -> DirectoryResult<Vec<(String, String)>> {
    split_unescaped(rdn, &['+'])?
        .into_iter()
        .map(|ava| {
            let eq = find_unescaped_eq(ava)
                .ok_or_else(|| DirectoryError::invalid_dn(format!("'{ava}' has no '='")))?;
            let attr_type = ava[..eq].trim();
            if attr_type.is_empty()
                || !attr_type
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
            {
                return Err(DirectoryError::invalid_dn(format!(
                    "invalid attribute type '{attr_type}'"
                )));
            }
            let value = unescape_dn_value(trim_unescaped(&ava[eq + 1..]))?;
            Ok((attr_type.to_string(), value))
        })
        .collect()
}

fn find_unescaped_eq(ava: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in ava.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' {
            return Some(i);
        }
    }
    None
}

/// Parses a DN into attribute types grouped with their values.
///
/// `uid=jdoe,ou=dev,ou=people,dc=example,dc=com` yields
/// `uid: [jdoe]`, `ou: [dev, people]`, `dc: [example, com]`.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidDn`] if the DN is malformed.
pub fn parse_dn(dn: &str) -> DirectoryResult<ParsedDn> {
    let mut parsed = ParsedDn::default();
    for rdn in explode_dn(dn)? {
        for (attr_type, value) in parse_rdn(&rdn)? {
            parsed.push(&attr_type, value);
        }
    }
    Ok(parsed)
}

/// Returns the first `ou` value of a DN, comparing the type
/// case-insensitively.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidDn`] if the DN is malformed.
pub fn ou_rdn(dn: &str) -> DirectoryResult<Option<String>> {
    for rdn in explode_dn(dn)? {
        for (attr_type, value) in parse_rdn(&rdn)? {
            if attr_type.eq_ignore_ascii_case("ou") {
                return Ok(Some(value));
            }
        }
    }
    Ok(None)
}

/// Returns true if `dn` parses as a DN.
#[must_use]
pub fn is_valid_dn(dn: &str) -> bool {
    parse_dn(dn).is_ok()
}

/// Escapes an attribute value for use in a DN (RFC 4514).
#[must_use]
pub fn escape_dn_value(value: &str) -> String {
    let last = value.chars().count().saturating_sub(1);
    let mut result = String::with_capacity(value.len() * 2);

    for (i, ch) in value.chars().enumerate() {
        match ch {
            c if SPECIAL.contains(&c) => {
                result.push('\\');
                result.push(c);
            }
            '\0' => result.push_str("\\00"),
            ' ' if i == 0 || i == last => result.push_str("\\20"),
            '#' if i == 0 => result.push_str("\\23"),
            _ => result.push(ch),
        }
    }

    result
}

/// Reverses DN value escaping, including quoted values and `\XX` hex
/// escapes of UTF-8 bytes.
///
/// # Errors
///
/// Returns [`DirectoryError::InvalidDn`] for a dangling escape or when the
/// hex escapes do not form valid UTF-8.
pub fn unescape_dn_value(value: &str) -> DirectoryResult<String> {
    let inner = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(quoted) => quoted,
        None => value,
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let first = chars
            .next()
            .ok_or_else(|| DirectoryError::invalid_dn(format!("dangling escape in '{value}'")))?;
        let hex_pair = first
            .to_digit(16)
            .zip(chars.peek().and_then(|c| c.to_digit(16)));
        if let Some((hi, lo)) = hex_pair {
            chars.next();
            // both digits are < 16
            bytes.push(u8::try_from(hi * 16 + lo).unwrap_or_default());
        } else {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(first.encode_utf8(&mut buf).as_bytes());
        }
    }

    String::from_utf8(bytes)
        .map_err(|_| DirectoryError::invalid_dn(format!("'{value}' is not valid UTF-8")))
}
