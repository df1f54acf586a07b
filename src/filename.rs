//! Filesystem-safe note filenames.
//!
//! Titles are reduced to alphanumerics, spaces, hyphens, and underscores.
//! Path separators never survive, so a title cannot address a file outside
//! its target folder.

use crate::Timestamp;

pub const NOTE_EXTENSION: &str = "md";

/// `strftime` format of the filename prefix.
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const UNTITLED: &str = "Untitled";

/// Drop every character that is not alphanumeric, space, `-`, or `_`,
/// then trim trailing whitespace.
pub fn sanitize_title(title: &str) -> String {
    let kept: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim_end().to_string()
}

/// `YYYYMMDD_HHMMSS_<sanitized title>.md`
pub fn derive_filename(title: &str, now: &Timestamp) -> String {
    let stem = non_empty_stem(sanitize_title(title));
    let name = format!("{}_{}", now.format(FILENAME_TIMESTAMP_FORMAT), stem);
    with_note_extension(name)
}

/// Sanitize a caller-chosen filename without adding a timestamp prefix.
///
/// A trailing `.md` is kept; anything else the sanitizer would drop
/// (including other dots) is removed.
pub fn raw_filename(name: &str) -> String {
    let suffix = format!(".{}", NOTE_EXTENSION);
    let stem = name.strip_suffix(suffix.as_str()).unwrap_or(name);
    with_note_extension(non_empty_stem(sanitize_title(stem)))
}

fn non_empty_stem(stem: String) -> String {
    if stem.trim().is_empty() {
        UNTITLED.to_string()
    } else {
        stem
    }
}

fn with_note_extension(name: String) -> String {
    let suffix = format!(".{}", NOTE_EXTENSION);
    if name.ends_with(&suffix) {
        name
    } else {
        name + &suffix
    }
}
