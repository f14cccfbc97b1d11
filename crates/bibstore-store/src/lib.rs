//! File persistence for bibstore.
//!
//! This crate stores a bibliography manager's state on disk. It has three
//! independent concerns, none of which share handles or state:
//!
//! - **State snapshots** ([`snapshot`]) -- one serialized value per file,
//!   framed with a magic tag, a format version and a CRC32 checksum.
//! - **BibTeX files** ([`bibtex`]) -- `<name>.bib` text renderings of a
//!   collection of [`BibtexEntry`] values.
//! - **Filename sanitization** ([`filename`]) -- stripping path-hostile
//!   characters from user input before it becomes a path.
//!
//! [`ReferenceStore`] binds all three to a root directory described by a
//! [`StoreConfig`].
//!
//! # Error Policy
//!
//! 1. Every operation has a strict form returning [`StoreResult`].
//! 2. Only [`load_or_init_state`] and [`read_bibtex_or_empty`] degrade
//!    instead of failing; both log the failure through `tracing`.
//! 3. No locking: concurrent writers to one path race, last writer wins.

pub mod bibtex;
pub mod config;
pub mod error;
pub mod filename;
pub mod snapshot;
pub mod store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use bibtex::{bib_path, read_bibtex, read_bibtex_or_empty, write_bibtex, LINE_SEPARATOR};
pub use config::{StoreConfig, SyncMode};
pub use error::{StoreError, StoreResult};
pub use filename::{sanitize_filename, BLOCKED_CHARS, FALLBACK_FILENAME, MIN_FILENAME_LEN};
pub use snapshot::{
    clear_state, load_or_init_state, load_or_init_state_with, load_state, save_state,
    save_state_with, FORMAT_VERSION, MAGIC,
};
pub use store::ReferenceStore;
pub use traits::BibtexEntry;
