//! Citation key validation.
//!
//! A citation key is what a LaTeX document passes to `\cite{...}`. Valid keys:
//! - Must be non-empty
//! - Must not contain whitespace or control characters
//! - Must not contain any of `{ } , " # % ' ( ) =`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Characters that BibTeX either treats as syntax or chokes on inside a key.
const FORBIDDEN_CHARS: &[char] = &['{', '}', ',', '"', '#', '%', '\'', '(', ')', '='];

/// A validated BibTeX citation key.
///
/// Deserialization goes through [`CitationKey::parse`], so a snapshot or
/// JSON document cannot smuggle in a key that `parse` would reject.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CitationKey(String);

impl CitationKey {
    /// Validate and wrap a citation key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibstore_types::CitationKey;
    ///
    /// assert!(CitationKey::parse("knuth1984").is_ok());
    /// assert!(CitationKey::parse("").is_err());
    /// assert!(CitationKey::parse("has space").is_err());
    /// ```
    pub fn parse(key: &str) -> Result<Self, TypeError> {
        if key.is_empty() {
            return Err(TypeError::InvalidCitationKey {
                key: key.to_string(),
                reason: "citation key must not be empty".into(),
            });
        }

        if let Some(ch) = key.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(TypeError::InvalidCitationKey {
                key: key.to_string(),
                reason: format!("contains whitespace or control character: {ch:?}"),
            });
        }

        if let Some(ch) = key.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Err(TypeError::InvalidCitationKey {
                key: key.to_string(),
                reason: format!("contains forbidden character: {ch:?}"),
            });
        }

        Ok(Self(key.to_string()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CitationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CitationKey({})", self.0)
    }
}

impl fmt::Display for CitationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CitationKey {
    type Error = TypeError;

    fn try_from(key: String) -> Result<Self, Self::Error> {
        Self::parse(&key)
    }
}

impl From<CitationKey> for String {
    fn from(key: CitationKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_keys() {
        assert!(CitationKey::parse("knuth1984").is_ok());
        assert!(CitationKey::parse("Lamport:94").is_ok());
        assert!(CitationKey::parse("doe-2020a").is_ok());
        assert!(CitationKey::parse("ünïcode_ok").is_ok());
    }

    #[test]
    fn reject_empty_key() {
        assert!(matches!(
            CitationKey::parse(""),
            Err(TypeError::InvalidCitationKey { .. })
        ));
    }

    #[test]
    fn reject_whitespace() {
        assert!(CitationKey::parse("has space").is_err());
        assert!(CitationKey::parse("has\ttab").is_err());
        assert!(CitationKey::parse("trailing\n").is_err());
    }

    #[test]
    fn reject_forbidden_chars() {
        for bad in ["a{b", "a}b", "a,b", "a\"b", "a#b", "a%b", "a'b", "a(b", "a)b", "a=b"] {
            assert!(CitationKey::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn display_is_raw_key() {
        let key = CitationKey::parse("knuth1984").unwrap();
        assert_eq!(key.to_string(), "knuth1984");
        assert_eq!(format!("{key:?}"), "CitationKey(knuth1984)");
    }

    #[test]
    fn serde_roundtrip_as_plain_string() {
        let key = CitationKey::parse("turing1936").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"turing1936\"");
        assert_eq!(serde_json::from_str::<CitationKey>(&json).unwrap(), key);
    }

    #[test]
    fn deserialize_rejects_invalid_key() {
        assert!(serde_json::from_str::<CitationKey>("\"has space\"").is_err());
        assert!(serde_json::from_str::<CitationKey>("\"a{b\"").is_err());
        assert!(serde_json::from_str::<CitationKey>("\"\"").is_err());
    }

    proptest! {
        #[test]
        fn alphanumeric_keys_always_parse(key in "[A-Za-z0-9_:-]{1,32}") {
            let parsed = CitationKey::parse(&key).unwrap();
            prop_assert_eq!(parsed.as_str(), key.as_str());
        }
    }
}
