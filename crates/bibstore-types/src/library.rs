use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::CitationKey;
use crate::reference::Reference;

/// The application's persisted state: every reference plus bookkeeping.
///
/// References keep insertion order. `revision` increases by one on every
/// successful mutation, so two snapshots of the same library can be told
/// apart without diffing. Deserialization rejects duplicate keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LibraryRecord")]
pub struct ReferenceLibrary {
    references: Vec<Reference>,
    revision: u64,
}

/// Unchecked wire shape of [`ReferenceLibrary`].
#[derive(Deserialize)]
struct LibraryRecord {
    references: Vec<Reference>,
    revision: u64,
}

impl TryFrom<LibraryRecord> for ReferenceLibrary {
    type Error = TypeError;

    fn try_from(record: LibraryRecord) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        for reference in &record.references {
            if !seen.insert(&reference.key) {
                return Err(TypeError::DuplicateKey(reference.key.to_string()));
            }
        }
        Ok(Self {
            references: record.references,
            revision: record.revision,
        })
    }
}

impl ReferenceLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference. Fails if its key is already present.
    pub fn add(&mut self, reference: Reference) -> Result<(), TypeError> {
        if self.get(&reference.key).is_some() {
            return Err(TypeError::DuplicateKey(reference.key.to_string()));
        }
        self.references.push(reference);
        self.revision += 1;
        Ok(())
    }

    /// Insert or replace the reference with the same key, keeping its position.
    pub fn upsert(&mut self, reference: Reference) {
        match self.references.iter_mut().find(|r| r.key == reference.key) {
            Some(slot) => *slot = reference,
            None => self.references.push(reference),
        }
        self.revision += 1;
    }

    /// Remove a reference by key.
    pub fn remove(&mut self, key: &CitationKey) -> Option<Reference> {
        let idx = self.references.iter().position(|r| &r.key == key)?;
        self.revision += 1;
        Some(self.references.remove(idx))
    }

    pub fn get(&self, key: &CitationKey) -> Option<&Reference> {
        self.references.iter().find(|r| &r.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Reference> {
        self.references.iter()
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Number of successful mutations since the library was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl<'a> IntoIterator for &'a ReferenceLibrary {
    type Item = &'a Reference;
    type IntoIter = std::slice::Iter<'a, Reference>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
