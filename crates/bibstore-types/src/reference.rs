//! Bibliographic entries and their BibTeX rendering.

use serde::{Deserialize, Serialize};

use crate::entry::EntryType;
use crate::error::TypeError;
use crate::key::CitationKey;

/// One bibliographic entry.
///
/// Fields keep their insertion order so the rendered BibTeX reads the way the
/// user entered it. Field names are matched case-insensitively, as BibTeX does.
/// Deserialization runs every field through [`Reference::set_field`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReferenceRecord")]
pub struct Reference {
    /// Citation key used in `\cite{...}`.
    pub key: CitationKey,
    /// Entry type (`article`, `book`, ...).
    pub entry_type: EntryType,
    /// Ordered `(name, value)` pairs.
    fields: Vec<(String, String)>,
}

/// Unchecked wire shape of [`Reference`].
#[derive(Deserialize)]
struct ReferenceRecord {
    key: CitationKey,
    entry_type: EntryType,
    fields: Vec<(String, String)>,
}

impl TryFrom<ReferenceRecord> for Reference {
    type Error = TypeError;

    fn try_from(record: ReferenceRecord) -> Result<Self, Self::Error> {
        let mut reference = Reference::new(record.key, record.entry_type);
        for (name, value) in record.fields {
            reference.set_field(name, value)?;
        }
        Ok(reference)
    }
}

impl Reference {
    /// Create a reference with no fields.
    pub fn new(key: CitationKey, entry_type: EntryType) -> Self {
        Self {
            key,
            entry_type,
            fields: Vec::new(),
        }
    }

    /// Builder-style [`Reference::set_field`].
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, TypeError> {
        self.set_field(name, value)?;
        Ok(self)
    }

    /// Set a field, replacing an existing one of the same name in place.
    ///
    /// Names must be non-empty ASCII alphanumerics, `-` or `_`. Values must
    /// have balanced braces, since they are rendered inside `{...}`.
    pub fn set_field(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), TypeError> {
        let name = name.into().to_ascii_lowercase();
        let value = value.into();

        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(TypeError::InvalidField(format!(
                "field name {name:?} must be non-empty ASCII alphanumerics, '-' or '_'"
            )));
        }
        if !braces_balanced(&value) {
            return Err(TypeError::InvalidField(format!(
                "value of {name:?} has unbalanced braces"
            )));
        }

        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
        Ok(())
    }

    /// Look up a field value by name (case-insensitive).
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Render the canonical BibTeX block for this reference.
    ///
    /// Every rendering ends with a closing brace, a newline and one blank
    /// line, so renderings can be concatenated directly.
    pub fn to_bibtex(&self) -> String {
        let mut out = format!("@{}{{{},\n", self.entry_type, self.key);
        for (name, value) in &self.fields {
            out.push_str(&format!("  {name} = {{{value}}},\n"));
        }
        out.push_str("}\n\n");
        out
    }
}

fn braces_balanced(value: &str) -> bool {
    let mut depth: usize = 0;
    for ch in value.chars() {
        match ch {
            '{' => depth += 1,
            '}' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}
