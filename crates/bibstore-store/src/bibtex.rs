//! `.bib` text files.
//!
//! Writing concatenates each entry's rendering verbatim. Reading rebuilds the
//! text line by line with [`LINE_SEPARATOR`] after every line, so the round
//! trip is lossy: `\r\n` endings collapse to the platform separator and a
//! final unterminated line gains one.
//!
//! Only `\n` and `\r\n` end a line. A lone `\r` (classic Mac OS endings)
//! stays inside the line it appears in and is not normalized.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::StoreResult;
use crate::traits::BibtexEntry;

/// Line separator appended after every line read back from a `.bib` file.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";
/// Line separator appended after every line read back from a `.bib` file.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// `path` with the literal suffix `.bib` appended.
///
/// This appends to the full file name rather than replacing an extension:
/// `refs.v2` becomes `refs.v2.bib`.
pub fn bib_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".bib");
    PathBuf::from(name)
}

/// Write `references` to `<path>.bib`, overwriting it.
///
/// Entries are written back to back in iteration order. Returns the number of
/// entries written. A failure part-way through leaves the entries written so
/// far in place.
pub fn write_bibtex<I>(path: &Path, references: I) -> StoreResult<usize>
where
    I: IntoIterator,
    I::Item: BibtexEntry,
{
    let target = bib_path(path);
    let mut writer = BufWriter::new(File::create(&target)?);

    let mut count = 0;
    for reference in references {
        writer.write_all(reference.to_bibtex().as_bytes())?;
        count += 1;
    }
    writer.flush()?;

    debug!(path = %target.display(), entries = count, "bibtex written");
    Ok(count)
}

/// Read `<path>.bib`, normalizing line endings to [`LINE_SEPARATOR`].
pub fn read_bibtex(path: &Path) -> StoreResult<String> {
    let target = bib_path(path);
    let reader = BufReader::new(File::open(&target)?);

    let mut text = String::new();
    for line in reader.lines() {
        text.push_str(&line?);
        text.push_str(LINE_SEPARATOR);
    }

    debug!(path = %target.display(), bytes = text.len(), "bibtex read");
    Ok(text)
}

/// [`read_bibtex`] that logs any failure and returns an empty string.
///
/// An empty result is ambiguous: the file may be empty or unreadable. Use
/// [`read_bibtex`] to tell the two apart.
pub fn read_bibtex_or_empty(path: &Path) -> String {
    read_bibtex(path).unwrap_or_else(|e| {
        warn!(path = %bib_path(path).display(), error = %e, "reading bibtex failed");
        String::new()
    })
}
