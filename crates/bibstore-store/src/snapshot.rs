//! Versioned state snapshots.
//!
//! A snapshot file holds exactly one serialized value. On-disk format:
//!
//! ```text
//! [4 bytes: magic b"BIBS"]
//! [4 bytes: format version (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (bincode-serialized value)]
//! ```
//!
//! Values must be bincode-compatible: serde attributes that need
//! `deserialize_any` (`untagged`, `flatten`) cannot be read back.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SyncMode;
use crate::error::{StoreError, StoreResult};

/// Tag at the start of every snapshot file.
pub const MAGIC: [u8; 4] = *b"BIBS";

/// Snapshot format version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Header size: 4 bytes magic + 4 bytes version + 4 bytes CRC.
const HEADER_SIZE: usize = 12;

/// Serialize `value` and overwrite `path` with it.
pub fn save_state<T: Serialize + ?Sized>(value: &T, path: &Path) -> StoreResult<()> {
    save_state_with(value, path, SyncMode::OsDefault)
}

/// [`save_state`] with an explicit flush strategy.
///
/// The value is encoded before the file is touched, so a serialization
/// failure leaves any previous snapshot intact.
pub fn save_state_with<T: Serialize + ?Sized>(
    value: &T,
    path: &Path,
    sync_mode: SyncMode,
) -> StoreResult<()> {
    let bytes = encode(value)?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        writer.get_ref().sync_all()?;
    }

    debug!(path = %path.display(), bytes = bytes.len(), "snapshot saved");
    Ok(())
}

/// Read and decode the snapshot at `path`.
pub fn load_state<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Err(StoreError::EmptySnapshot(path.to_path_buf()));
    }
    let value = decode(&bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "snapshot loaded");
    Ok(value)
}

/// Load the snapshot at `path`, falling back to `default`.
///
/// If `path` is not a regular file, `default` is written there first; a
/// failure to do so is logged and otherwise ignored. Any failure to read or
/// decode the file is logged and `default` is returned unchanged. This
/// function never fails.
pub fn load_or_init_state<T>(default: T, path: &Path) -> T
where
    T: Serialize + DeserializeOwned,
{
    load_or_init_state_with(default, path, SyncMode::OsDefault)
}

/// [`load_or_init_state`] with an explicit flush strategy for the initial write.
pub fn load_or_init_state_with<T>(default: T, path: &Path, sync_mode: SyncMode) -> T
where
    T: Serialize + DeserializeOwned,
{
    if !path.is_file() {
        if let Err(e) = save_state_with(&default, path, sync_mode) {
            warn!(path = %path.display(), error = %e, "failed to initialize snapshot");
        }
    }

    match load_state(path) {
        Ok(value) => value,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load snapshot; using default");
            default
        }
    }
}

/// Truncate the snapshot at `path` to zero bytes, creating it if absent.
///
/// A cleared snapshot fails [`load_state`] with
/// [`StoreError::EmptySnapshot`], so it never yields stale content.
pub fn clear_state(path: &Path) -> StoreResult<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    debug!(path = %path.display(), "snapshot cleared");
    Ok(())
}

fn encode<T: Serialize + ?Sized>(value: &T) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let crc = crc32fast::hash(&payload);

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&crc.to_le_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Truncated {
            len: bytes.len(),
            needed: HEADER_SIZE,
        });
    }

    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
    if magic != MAGIC {
        return Err(StoreError::BadMagic { found: magic });
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: version,
            supported: FORMAT_VERSION,
        });
    }

    let expected = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let payload = &bytes[HEADER_SIZE..];
    let actual = crc32fast::hash(payload);
    if actual != expected {
        return Err(StoreError::ChecksumMismatch { expected, actual });
    }

    bincode::deserialize(payload).map_err(|e| StoreError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use bibstore_types::{CitationKey, EntryType, Reference, ReferenceLibrary};
    use proptest::prelude::*;

    fn sample_library() -> ReferenceLibrary {
        let mut lib = ReferenceLibrary::new();
        lib.add(
            Reference::new(CitationKey::parse("knuth1984").unwrap(), EntryType::Article)
                .with_field("author", "Donald E. Knuth")
                .unwrap()
                .with_field("title", "Literate Programming")
                .unwrap(),
        )
        .unwrap();
        lib.add(
            Reference::new(CitationKey::parse("lamport94").unwrap(), EntryType::Book)
                .with_field("title", "LaTeX: A Document Preparation System")
                .unwrap(),
        )
        .unwrap();
        lib
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        let lib = sample_library();

        save_state(&lib, &path).unwrap();
        let loaded: ReferenceLibrary = load_state(&path).unwrap();
        assert_eq!(loaded, lib);
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");

        save_state(&sample_library(), &path).unwrap();
        save_state(&ReferenceLibrary::new(), &path).unwrap();
        let loaded: ReferenceLibrary = load_state(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn file_starts_with_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state(&42u64, &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"BIBS");
        assert_eq!(&bytes[4..8], &FORMAT_VERSION.to_le_bytes());
        assert_eq!(bytes.len(), HEADER_SIZE + 8);
    }

    #[test]
    fn sync_every_write_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state_with(&sample_library(), &path, SyncMode::EveryWrite).unwrap();
        let loaded: ReferenceLibrary = load_state(&path).unwrap();
        assert_eq!(loaded, sample_library());
    }

    #[test]
    fn save_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/state.dat");
        let err = save_state(&1u8, &path).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_state::<u32>(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn load_or_init_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nonexistent_path");
        assert!(!path.exists());

        let lib = load_or_init_state(sample_library(), &path);
        assert_eq!(lib, sample_library());
        assert!(path.is_file());

        let on_disk: ReferenceLibrary = load_state(&path).unwrap();
        assert_eq!(on_disk, sample_library());
    }

    #[test]
    fn load_or_init_prefers_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state(&sample_library(), &path).unwrap();

        let lib = load_or_init_state(ReferenceLibrary::new(), &path);
        assert_eq!(lib, sample_library());
    }

    #[test]
    fn load_or_init_returns_default_when_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir/state.dat");
        let lib = load_or_init_state(sample_library(), &path);
        assert_eq!(lib, sample_library());
        assert!(!path.exists());
    }

    #[test]
    fn load_or_init_returns_default_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        fs::write(&path, b"definitely not a snapshot").unwrap();

        let lib = load_or_init_state(ReferenceLibrary::new(), &path);
        assert!(lib.is_empty());
        // The corrupt file is left alone.
        assert_eq!(fs::read(&path).unwrap(), b"definitely not a snapshot");
    }

    #[test]
    fn clear_then_load_is_not_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state(&sample_library(), &path).unwrap();

        clear_state(&path).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);

        let err = load_state::<ReferenceLibrary>(&path).unwrap_err();
        assert!(matches!(err, StoreError::EmptySnapshot(_)));

        let lib = load_or_init_state(ReferenceLibrary::new(), &path);
        assert_ne!(lib, sample_library());
        assert!(lib.is_empty());
    }

    #[test]
    fn clear_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.dat");
        clear_state(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn clear_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(clear_state(&dir.path().join("nope/state.dat")).is_err());
    }

    #[test]
    fn truncated_header_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        fs::write(&path, b"BIBS\x01").unwrap();
        let err = load_state::<u32>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Truncated { len: 5, needed: 12 }));
    }

    #[test]
    fn bad_magic_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state(&7u32, &path).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[0] = b'X';
        fs::write(&path, &bytes).unwrap();

        let err = load_state::<u32>(&path).unwrap_err();
        assert!(matches!(err, StoreError::BadMagic { found } if &found == b"XIBS"));
    }

    #[test]
    fn newer_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state(&7u32, &path).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
        fs::write(&path, &bytes).unwrap();

        let err = load_state::<u32>(&path).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnsupportedVersion { found: 2, supported: 1 }
        ));
    }

    #[test]
    fn flipped_payload_byte_detected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state(&sample_library(), &path).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        bytes[HEADER_SIZE] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        let err = load_state::<ReferenceLibrary>(&path).unwrap_err();
        assert!(matches!(err, StoreError::ChecksumMismatch { .. }));
        // The degraded path falls back to the default.
        assert!(load_or_init_state(ReferenceLibrary::new(), &path).is_empty());
    }

    #[test]
    fn wrong_shape_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.dat");
        save_state(&1u8, &path).unwrap();
        let err = load_state::<ReferenceLibrary>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_values(
            value in (
                any::<u64>(),
                ".*",
                proptest::collection::vec(any::<i32>(), 0..16),
                proptest::collection::btree_map(".{0,8}", any::<Option<bool>>(), 0..8),
            )
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("state.dat");
            save_state(&value, &path).unwrap();
            let loaded: (u64, String, Vec<i32>, BTreeMap<String, Option<bool>>) =
                load_or_init_state(Default::default(), &path);
            prop_assert_eq!(loaded, value);
        }
    }
}
