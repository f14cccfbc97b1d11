//! BibTeX entry types.
//!
//! Entry types are stored by name, so a snapshot written with a custom type
//! is validated again when it is read back.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// BibTeX entry type, rendered after the `@` of an entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntryType {
    Article,
    Book,
    Booklet,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    Misc,
    PhdThesis,
    Proceedings,
    TechReport,
    Unpublished,
    /// Any type not in the standard set: lowercased ASCII alphanumerics.
    Custom(String),
}

impl EntryType {
    /// The lowercase BibTeX name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Booklet => "booklet",
            Self::InBook => "inbook",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::MastersThesis => "mastersthesis",
            Self::Misc => "misc",
            Self::PhdThesis => "phdthesis",
            Self::Proceedings => "proceedings",
            Self::TechReport => "techreport",
            Self::Unpublished => "unpublished",
            Self::Custom(name) => name,
        }
    }
}

impl Default for EntryType {
    fn default() -> Self {
        Self::Misc
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = TypeError;

    /// Case-insensitive. Unknown names become [`EntryType::Custom`] when they
    /// are non-empty ASCII alphanumerics, and are rejected otherwise.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().trim_start_matches('@').to_ascii_lowercase();
        Ok(match lower.as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "booklet" => Self::Booklet,
            "inbook" => Self::InBook,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "mastersthesis" => Self::MastersThesis,
            "misc" => Self::Misc,
            "phdthesis" => Self::PhdThesis,
            "proceedings" => Self::Proceedings,
            "techreport" => Self::TechReport,
            "unpublished" => Self::Unpublished,
            _ if !lower.is_empty() && lower.chars().all(|c| c.is_ascii_alphanumeric()) => {
                Self::Custom(lower)
            }
            _ => return Err(TypeError::InvalidEntryType(s.to_string())),
        })
    }
}

impl TryFrom<String> for EntryType {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EntryType> for String {
    fn from(ty: EntryType) -> Self {
        ty.as_str().to_string()
    }
}
