//! Filename sanitization for user-entered names.

/// Characters removed from user-entered filenames.
pub const BLOCKED_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>', '.', ','];

/// Minimum length, in characters, of a sanitized filename.
pub const MIN_FILENAME_LEN: usize = 3;

/// Returned in place of any name that is too short once cleaned.
pub const FALLBACK_FILENAME: &str = "filename_too_short";

/// Strip every [`BLOCKED_CHARS`] character from `name`.
///
/// If fewer than [`MIN_FILENAME_LEN`] characters remain, the whole name is
/// discarded and [`FALLBACK_FILENAME`] is returned. The function is
/// idempotent.
///
/// # Examples
///
/// ```
/// use bibstore_store::sanitize_filename;
///
/// assert_eq!(sanitize_filename("my/refs.v2"), "myrefsv2");
/// assert_eq!(sanitize_filename("a."), "filename_too_short");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| !BLOCKED_CHARS.contains(c)).collect();

    if cleaned.chars().count() < MIN_FILENAME_LEN {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned
    }
}
