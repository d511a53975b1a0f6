//! Stored-name derivation for uploaded files.
//!
//! Uploads never keep their client file name verbatim. The stored name
//! is the slugged stem plus the upload time in Unix seconds, which keeps
//! repeated uploads of the same file from colliding, with the original
//! extension appended.

use chrono::{DateTime, Utc};

/// Reduce a name stem to lowercase ASCII letters and digits, collapsing
/// every other run of characters into a single `-`. Leading and trailing
/// separators are trimmed.
pub fn slugify(stem: &str) -> String {
    let mut slug = String::with_capacity(stem.len());
    let mut pending_separator = false;

    for ch in stem.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Split a file name into stem and extension.
///
/// Dotfiles and names without a dot have no extension; only the last
/// dot-separated segment counts as one.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Derive the storage name for an uploaded file from its original name
/// and the upload time.
pub fn stored_file_name(original: &str, at: DateTime<Utc>) -> String {
    let (stem, ext) = split_extension(original);
    let base = format!("{}_{}", slugify(stem), at.timestamp());
    match ext {
        Some(ext) => format!("{base}.{ext}"),
        None => base,
    }
}

/// Carry the original extension over to a rename that omits one. A new
/// name containing any dot is taken as already carrying an extension.
pub fn ensure_extension(new_name: &str, original_ext: Option<&str>) -> String {
    if !new_name.contains('.') {
        if let Some(ext) = original_ext {
            return format!("{new_name}.{ext}");
        }
    }
    new_name.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  --Annual Report (2024)--  "), "annual-report-2024");
        assert_eq!(slugify("already-slugged"), "already-slugged");
        assert_eq!(slugify("___"), "");
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("photo.PNG"), ("photo", Some("PNG")));
        assert_eq!(split_extension("archive.tar.gz"), ("archive.tar", Some("gz")));
        assert_eq!(split_extension("README"), ("README", None));
        assert_eq!(split_extension(".gitignore"), (".gitignore", None));
        assert_eq!(split_extension("trailing."), ("trailing.", None));
    }

    #[test]
    fn test_stored_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let stamp = at.timestamp();

        assert_eq!(
            stored_file_name("Holiday Photo.jpg", at),
            format!("holiday-photo_{stamp}.jpg")
        );
        assert_eq!(stored_file_name("notes", at), format!("notes_{stamp}"));
    }

    #[test]
    fn test_ensure_extension() {
        assert_eq!(ensure_extension("report", Some("pdf")), "report.pdf");
        assert_eq!(ensure_extension("report.txt", Some("pdf")), "report.txt");
        assert_eq!(ensure_extension("v2.final", Some("pdf")), "v2.final");
        assert_eq!(ensure_extension("report", None), "report");
    }
}
