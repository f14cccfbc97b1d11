use std::path::PathBuf;

/// Errors from reference store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The snapshot file exists but holds no bytes (e.g. after a clear).
    #[error("snapshot is empty: {}", .0.display())]
    EmptySnapshot(PathBuf),

    /// The snapshot file is shorter than its header.
    #[error("snapshot truncated: {len} bytes, header needs {needed}")]
    Truncated { len: usize, needed: usize },

    /// The file does not start with the snapshot magic tag.
    #[error("not a bibstore snapshot: bad magic {found:02x?}")]
    BadMagic { found: [u8; 4] },

    /// The snapshot was written by an unknown format version.
    #[error("unsupported snapshot version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Payload checksum does not match the header (data corruption).
    #[error("snapshot checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Configuration could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
