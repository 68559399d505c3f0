//! Path algebra shared by every backend.
//!
//! All operations work on `/`-separated strings and follow one convention:
//! a path ending with `/` denotes a directory, any other path denotes a file.
//!
//! Two path shapes circulate through the crate:
//!
//! - **Root**: the canonical prefix of a backend instance, always of the form
//!   `/path/to/root/` (exactly one leading and one trailing separator).
//! - **Path**: an object path relative to the root, never starting with `/`
//!   except for the root marker `/` itself.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::{Error, ErrorKind, Result};

/// Characters left untouched by [`encode_path`].
///
/// Letters and digits plus `-_.~/()!*'`; every other byte is escaped.
const PATH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/')
    .remove(b'(')
    .remove(b')')
    .remove(b'!')
    .remove(b'*')
    .remove(b'\'');

/// Normalize an object path.
///
/// - Surrounding whitespace is trimmed: ` abc/def ` => `abc/def`
/// - Leading separators are trimmed: `///abc` => `abc`
/// - Internal duplicate separators collapse: `abc///def` => `abc/def`
/// - An empty result becomes the root marker: `` => `/`
///
/// # Examples
///
/// ```
/// use unistore_core::path::normalize_path;
///
/// assert_eq!(normalize_path("//abc//def/"), "abc/def/");
/// assert_eq!(normalize_path("   "), "/");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let collapsed = collapse_separators(path.trim().trim_start_matches('/'));
    if collapsed.is_empty() {
        return "/".to_owned();
    }
    collapsed
}

/// Normalize a backend root to the canonical `/abc/def/` form.
///
/// The result always carries exactly one leading and one trailing separator,
/// whatever shape the input had, and the operation is idempotent.
///
/// # Examples
///
/// ```
/// use unistore_core::path::normalize_root;
///
/// assert_eq!(normalize_root("abc/def"), "/abc/def/");
/// assert_eq!(normalize_root(""), "/");
/// ```
#[must_use]
pub fn normalize_root(root: &str) -> String {
    let collapsed = collapse_separators(root.trim());
    let inner = collapsed.trim_matches('/');
    if inner.is_empty() {
        return "/".to_owned();
    }
    format!("/{inner}/")
}

/// Build the backend-absolute path of `path` under `root`.
///
/// `root` must be canonical (see [`normalize_root`]). The root marker `/`
/// maps to the root itself without its surrounding separators; any other
/// path must not start with `/` and is appended to the root.
///
/// # Examples
///
/// ```
/// use unistore_core::path::build_abs_path;
///
/// assert_eq!(build_abs_path("/root/", "a/b").unwrap(), "root/a/b");
/// assert_eq!(build_abs_path("/root/", "/").unwrap(), "root");
/// ```
pub fn build_abs_path(root: &str, path: &str) -> Result<String> {
    let prefix = canonical_prefix(root)?;
    if path == "/" {
        return Ok(prefix.trim_end_matches('/').to_owned());
    }
    if path.starts_with('/') {
        return Err(Error::new(
            ErrorKind::Other,
            format!("path {path:?} must not start with '/'"),
        )
        .with_path(path));
    }
    Ok(format!("{prefix}{path}"))
}

/// Strip `root` from a backend-reported full path, yielding the relative path.
///
/// This is the inverse of [`build_abs_path`]. The full path may be reported
/// with or without a leading separator. Fails when the full path equals the
/// root itself or does not live under it.
///
/// # Examples
///
/// ```
/// use unistore_core::path::build_rel_path;
///
/// assert_eq!(build_rel_path("/root/", "root/a/b").unwrap(), "a/b");
/// assert_eq!(build_rel_path("/root/", "/root/dir/").unwrap(), "dir/");
/// assert!(build_rel_path("/root/", "/root/").is_err());
/// ```
pub fn build_rel_path(root: &str, full_path: &str) -> Result<String> {
    let prefix = canonical_prefix(root)?;
    let full = full_path.strip_prefix('/').unwrap_or(full_path);
    if full == prefix {
        return Err(Error::new(
            ErrorKind::Other,
            "cannot build a relative path for the root itself",
        )
        .with_path(full_path));
    }
    full.strip_prefix(prefix)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            Error::new(
                ErrorKind::Other,
                format!("path is not under root {root:?}"),
            )
            .with_path(full_path)
        })
}

/// Percent-encode a path for use in a request URI.
///
/// Every UTF-8 byte outside letters, digits and `-_.~/()!*'` becomes an
/// uppercase `%XX` escape.
///
/// # Examples
///
/// ```
/// use unistore_core::path::encode_path;
///
/// assert_eq!(encode_path("a b/c+d"), "a%20b/c%2Bd");
/// assert_eq!(encode_path("中"), "%E4%B8%AD");
/// ```
#[must_use]
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_ENCODE_SET).to_string()
}

/// Derive the display name of a path.
///
/// A file yields its last segment, a directory its last segment with the
/// trailing separator, and the root marker yields itself.
///
/// # Examples
///
/// ```
/// use unistore_core::path::name_from_path;
///
/// assert_eq!(name_from_path("a/b/file.txt"), "file.txt");
/// assert_eq!(name_from_path("a/b/"), "b/");
/// assert_eq!(name_from_path("/"), "/");
/// ```
#[must_use]
pub fn name_from_path(path: &str) -> &str {
    if path == "/" {
        return path;
    }
    let search = path.strip_suffix('/').unwrap_or(path);
    match search.rfind('/') {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

/// Return the root without its leading separator, validating its shape.
fn canonical_prefix(root: &str) -> Result<&str> {
    if !root.starts_with('/') || !root.ends_with('/') {
        return Err(Error::new(
            ErrorKind::Other,
            format!("root {root:?} must start and end with '/'"),
        ));
    }
    Ok(&root[1..])
}

fn collapse_separators(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_was_sep = false;
    for ch in input.chars() {
        if ch == '/' {
            if !prev_was_sep {
                out.push(ch);
            }
            prev_was_sep = true;
        } else {
            out.push(ch);
            prev_was_sep = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use percent_encoding::percent_decode_str;

    use super::*;

    #[test]
    fn test_should_normalize_path() {
        let cases = [
            ("", "/"),
            ("/", "/"),
            ("  ", "/"),
            (" abc/def ", "abc/def"),
            ("///abc", "abc"),
            ("abc///def", "abc/def"),
            ("abc//def//", "abc/def/"),
            ("//abc/", "abc/"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_path(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_should_normalize_root() {
        let cases = [
            ("", "/"),
            ("/", "/"),
            ("//", "/"),
            ("abc", "/abc/"),
            ("/abc", "/abc/"),
            ("abc/", "/abc/"),
            ("/abc/def/", "/abc/def/"),
            (" //abc///def ", "/abc/def/"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_root(input), expected, "input: {input:?}");
        }
    }

    #[test]
    fn test_should_always_append_trailing_separator_to_root() {
        // A root given without a trailing separator used to be kept as-is,
        // which broke every caller that concatenates paths onto the root.
        for input in ["/tmp/data", "tmp/data", "/tmp", "a"] {
            let root = normalize_root(input);
            assert!(root.starts_with('/'), "{root}");
            assert!(root.ends_with('/'), "{root}");
            assert!(!root.contains("//") || root == "/", "{root}");
        }
    }

    #[test]
    fn test_should_normalize_root_idempotently() {
        for input in ["", "/", "a", "/a/b", "a//b/", " x ", "///"] {
            let once = normalize_root(input);
            assert_eq!(normalize_root(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_should_build_abs_path() {
        assert_eq!(build_abs_path("/root/", "a/b").unwrap(), "root/a/b");
        assert_eq!(build_abs_path("/root/", "/").unwrap(), "root");
        assert_eq!(build_abs_path("/root/", "dir/").unwrap(), "root/dir/");
        assert_eq!(build_abs_path("/", "a").unwrap(), "a");
        assert_eq!(build_abs_path("/", "/").unwrap(), "");
    }

    #[test]
    fn test_should_reject_invalid_abs_path_input() {
        assert!(build_abs_path("/root/", "/a").is_err());
        assert!(build_abs_path("root/", "a").is_err());
        assert!(build_abs_path("/root", "a").is_err());
    }

    #[test]
    fn test_should_build_rel_path() {
        assert_eq!(build_rel_path("/root/", "root/a/b").unwrap(), "a/b");
        assert_eq!(build_rel_path("/root/", "/root/a/").unwrap(), "a/");
        assert_eq!(build_rel_path("/", "a/b").unwrap(), "a/b");
        assert_eq!(build_rel_path("/", "/a").unwrap(), "a");
    }

    #[test]
    fn test_should_reject_rel_path_of_root_itself() {
        assert!(build_rel_path("/root/", "/root/").is_err());
        assert!(build_rel_path("/root/", "root/").is_err());
        assert!(build_rel_path("/", "/").is_err());
    }

    #[test]
    fn test_should_reject_rel_path_outside_root() {
        let err = build_rel_path("/root/", "other/a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.path(), "other/a");
    }

    #[test]
    fn test_should_invert_abs_path() {
        let root = "/data/bucket/";
        for path in ["a", "a/b", "dir/", "x y/z"] {
            let abs = build_abs_path(root, path).unwrap();
            assert_eq!(build_rel_path(root, &abs).unwrap(), path);
        }
    }

    #[test]
    fn test_should_encode_reserved_bytes_only() {
        let encoded = encode_path("AB cd !@#");
        assert_eq!(encoded, "AB%20cd%20!%40%23");

        let unreserved = "azAZ09-_.~/()!*'";
        assert_eq!(encode_path(unreserved), unreserved);
    }

    #[test]
    fn test_should_encode_utf8_as_uppercase_hex() {
        assert_eq!(encode_path("é"), "%C3%A9");
        assert_eq!(encode_path("a?b=c&d"), "a%3Fb%3Dc%26d");
    }

    #[test]
    fn test_should_decode_encoded_path_to_original_bytes() {
        let original = "dir/ümlaut file !@#$%^&*()_+-=;'><,?.txt";
        let encoded = encode_path(original);
        let decoded = percent_decode_str(&encoded).decode_utf8().unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_should_get_name_from_path() {
        assert_eq!(name_from_path("/"), "/");
        assert_eq!(name_from_path("abc"), "abc");
        assert_eq!(name_from_path("abc/"), "abc/");
        assert_eq!(name_from_path("abc/def"), "def");
        assert_eq!(name_from_path("abc/def/"), "def/");
        assert_eq!(name_from_path("a/b/c.txt"), "c.txt");
    }
}
