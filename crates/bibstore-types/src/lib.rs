//! Domain types for bibstore.
//!
//! This crate holds the bibliographic model that the rest of the workspace
//! persists. It knows how to render a reference as BibTeX, but nothing about
//! files: storage lives in `bibstore-store`.
//!
//! # Key Types
//!
//! - [`CitationKey`] — Validated BibTeX citation key
//! - [`EntryType`] — BibTeX entry type (`@article`, `@book`, ...)
//! - [`Reference`] — One bibliographic entry with ordered fields
//! - [`ReferenceLibrary`] — The application's persisted state

pub mod entry;
pub mod error;
pub mod key;
pub mod library;
pub mod reference;

pub use entry::EntryType;
pub use error::TypeError;
pub use key::CitationKey;
pub use library::ReferenceLibrary;
pub use reference::Reference;
