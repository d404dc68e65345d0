//! Upload path resolution and filename sanitization
//!
//! Both storing an upload and serving one go through `upload_path`, so a
//! request can never name a location outside the uploads directory.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolve the on-disk location for an uploaded file
///
/// With a filename, returns the uploads directory joined with the
/// sanitized name; without one, the directory itself.
pub fn upload_path(uploads_dir: &Path, filename: Option<&str>) -> PathBuf {
    match filename {
        Some(name) => uploads_dir.join(sanitize_filename(name)),
        None => uploads_dir.to_path_buf(),
    }
}

/// Reduce a client-supplied filename to a safe single path component
///
/// Strips directory components, maps everything outside `[A-Za-z0-9._-]`
/// to `_`, and trims leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(sanitize_filename("track01.mp3"), "track01.mp3");
        assert_eq!(sanitize_filename("My_Song-final.flac"), "My_Song-final.flac");
    }

    #[test]
    fn strips_directory_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("/var/tmp/a.mp3"), "a.mp3");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("a b?.mp3"), "a_b_.mp3");
        assert_eq!(sanitize_filename("na\u{ef}ve.ogg"), "na_ve.ogg");
        // Backslash is not a separator on unix but must not survive
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "_.._boot.ini");
    }

    #[test]
    fn trims_leading_dots() {
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(".."), "file");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("/"), "file");
    }

    #[test]
    fn resolves_inside_uploads_dir() {
        let dir = Path::new("/srv/tunedex/uploads");
        assert_eq!(
            upload_path(dir, Some("../escape.mp3")),
            PathBuf::from("/srv/tunedex/uploads/escape.mp3")
        );
        assert_eq!(upload_path(dir, None), PathBuf::from("/srv/tunedex/uploads"));
    }
}
