//! Dotted field paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A non-empty sequence of field names, written `author.given_name`.
///
/// Segments are identifiers: ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a dotted path.
    ///
    /// ```
    /// use aip_query::FieldPath;
    ///
    /// let path = FieldPath::parse("author.given_name").unwrap();
    /// assert_eq!(path.segments(), ["author", "given_name"]);
    /// assert!(FieldPath::parse("author..name").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let segments = text
            .split('.')
            .map(|segment| {
                if segment.is_empty() {
                    return Err(Error::field_path(text, "empty segment"));
                }
                if let Some(c) = segment
                    .chars()
                    .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
                {
                    return Err(Error::field_path(text, format!("invalid character {c:?}")));
                }
                Ok(segment.to_string())
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(FieldPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        FieldPath::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        FieldPath::parse(&s)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_segments() {
        let path: FieldPath = "a.b_c.d1".parse().unwrap();
        assert_eq!(path.segments(), ["a", "b_c", "d1"]);
        assert_eq!(path.to_string(), "a.b_c.d1");
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", ".", "a.", ".a", "a..b", "a-b", "a b"] {
            let err = FieldPath::parse(bad).unwrap_err();
            assert!(
                matches!(err, Error::InvalidFieldPath { .. }),
                "{bad:?} gave {err}"
            );
        }
    }

    #[test]
    fn serde_uses_dotted_text() {
        let path = FieldPath::parse("author.family_name").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"author.family_name\"");

        let back: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
        assert!(serde_json::from_str::<FieldPath>("\"a..b\"").is_err());
    }
}
