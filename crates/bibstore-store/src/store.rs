//! The [`ReferenceStore`] facade over snapshots and `.bib` files.

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::bibtex;
use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::filename::sanitize_filename;
use crate::snapshot;
use crate::traits::BibtexEntry;

/// File-backed store for one bibliography.
///
/// Binds the snapshot and `.bib` operations to the directory named by a
/// [`StoreConfig`]. User-supplied `.bib` names are always passed through
/// [`sanitize_filename`] before they touch the filesystem, so they resolve to
/// a file directly under the root.
///
/// The store holds no handles between calls and takes no locks.
#[derive(Clone, Debug)]
pub struct ReferenceStore {
    config: StoreConfig,
}

impl ReferenceStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    /// Store with default settings rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self::new(StoreConfig::with_root(root))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the state snapshot.
    pub fn state_path(&self) -> PathBuf {
        self.config.state_path()
    }

    /// Path of `<root>/<sanitized name>.bib`.
    pub fn bibtex_path(&self, name: &str) -> PathBuf {
        bibtex::bib_path(&self.bibtex_base(name))
    }

    // ---- State snapshot ----

    /// Load the state snapshot, initializing it with `default` if absent.
    ///
    /// Never fails; see [`snapshot::load_or_init_state`].
    pub fn load_or_init<T>(&self, default: T) -> T
    where
        T: Serialize + DeserializeOwned,
    {
        snapshot::load_or_init_state_with(default, &self.state_path(), self.config.sync_mode)
    }

    pub fn load<T: DeserializeOwned>(&self) -> StoreResult<T> {
        snapshot::load_state(&self.state_path())
    }

    pub fn save<T: Serialize + ?Sized>(&self, value: &T) -> StoreResult<()> {
        snapshot::save_state_with(value, &self.state_path(), self.config.sync_mode)
    }

    pub fn clear(&self) -> StoreResult<()> {
        snapshot::clear_state(&self.state_path())
    }

    // ---- BibTeX export ----

    /// Write `references` to `<root>/<sanitized name>.bib`.
    ///
    /// Returns the path written and the number of entries.
    pub fn export_bibtex<I>(&self, name: &str, references: I) -> StoreResult<(PathBuf, usize)>
    where
        I: IntoIterator,
        I::Item: BibtexEntry,
    {
        let base = self.bibtex_base(name);
        let count = bibtex::write_bibtex(&base, references)?;
        Ok((bibtex::bib_path(&base), count))
    }

    /// Read `<root>/<sanitized name>.bib`.
    pub fn import_bibtex(&self, name: &str) -> StoreResult<String> {
        bibtex::read_bibtex(&self.bibtex_base(name))
    }

    /// [`ReferenceStore::import_bibtex`] that yields `""` on any failure.
    pub fn import_bibtex_or_empty(&self, name: &str) -> String {
        bibtex::read_bibtex_or_empty(&self.bibtex_base(name))
    }

    fn bibtex_base(&self, name: &str) -> PathBuf {
        let clean = sanitize_filename(name);
        if clean != name {
            debug!(requested = name, sanitized = %clean, "sanitized bibtex file name");
        }
        self.config.root.join(clean)
    }
}
