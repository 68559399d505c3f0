//! Value types describing objects: mode, metadata, multipart parts and byte ranges.

use std::fmt;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

use chrono::{DateTime, Utc};

/// Whether a path denotes a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectMode {
    /// Not determined.
    #[default]
    Unknown,
    /// A regular object.
    File,
    /// A directory (or a common prefix for object stores).
    Dir,
}

impl ObjectMode {
    /// Infer the mode from a path: a trailing `/` means a directory.
    ///
    /// This is the only source of truth for the mode of a path; callers never
    /// pass the mode separately when interpreting a path.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        if path.ends_with('/') {
            Self::Dir
        } else {
            Self::File
        }
    }

    /// Whether this is [`ObjectMode::Dir`].
    #[must_use]
    pub fn is_dir(self) -> bool {
        self == Self::Dir
    }

    /// Whether this is [`ObjectMode::File`].
    #[must_use]
    pub fn is_file(self) -> bool {
        self == Self::File
    }
}

impl fmt::Display for ObjectMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::File => "file",
            Self::Dir => "dir",
        })
    }
}

/// A metadata snapshot of one object.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectMetadata {
    /// File or directory.
    pub mode: ObjectMode,
    /// Size in bytes.
    pub content_length: Option<u64>,
    /// MD5 of the content, derived from the ETag when the backend has one.
    pub content_md5: Option<String>,
    /// Last modification time.
    pub last_modified: Option<DateTime<Utc>>,
    /// Entity tag as returned by the backend, quotes included.
    pub etag: Option<String>,
}

impl ObjectMetadata {
    /// Metadata with only the mode set.
    #[must_use]
    pub fn new(mode: ObjectMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set the content length.
    #[must_use]
    pub fn with_content_length(mut self, length: u64) -> Self {
        self.content_length = Some(length);
        self
    }

    /// Set the last modification time.
    #[must_use]
    pub fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }

    /// Set the ETag, deriving the content MD5 from it.
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        let etag = etag.into();
        self.content_md5 = Some(etag.trim_matches('"').to_owned());
        self.etag = Some(etag);
        self
    }
}

/// One uploaded part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectPart {
    /// 1-based part number.
    pub part_number: u32,
    /// ETag the server returned for the part.
    pub etag: String,
}

impl ObjectPart {
    /// Create a part record.
    pub fn new(part_number: u32, etag: impl Into<String>) -> Self {
        Self {
            part_number,
            etag: etag.into(),
        }
    }
}

/// A byte window of an object, as an `(offset, size)` pair.
///
/// Three shapes exist: start-only (open end), end-only (the first N bytes)
/// and start+end. Standard range syntax converts directly:
///
/// ```
/// use unistore_core::RangeBounds;
///
/// let window = RangeBounds::from(3..8);
/// assert_eq!((window.offset(), window.size()), (Some(3), Some(5)));
/// assert_eq!(window.header_value().as_deref(), Some("bytes=3-7"));
///
/// assert_eq!(RangeBounds::from(10..).header_value().as_deref(), Some("bytes=10-"));
/// assert_eq!(RangeBounds::from(..4).header_value().as_deref(), Some("bytes=0-3"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RangeBounds {
    offset: Option<u64>,
    size: Option<u64>,
}

impl RangeBounds {
    /// The whole object.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            offset: None,
            size: None,
        }
    }

    /// From `start` to the end of the object.
    #[must_use]
    pub const fn from_start(start: u64) -> Self {
        Self {
            offset: Some(start),
            size: None,
        }
    }

    /// The first `end` bytes of the object.
    #[must_use]
    pub const fn to_end(end: u64) -> Self {
        Self {
            offset: None,
            size: Some(end),
        }
    }

    /// The window `[start, end)`; an inverted window is empty.
    #[must_use]
    pub const fn between(start: u64, end: u64) -> Self {
        Self {
            offset: Some(start),
            size: Some(end.saturating_sub(start)),
        }
    }

    /// Build from a raw offset and size.
    #[must_use]
    pub const fn new(offset: Option<u64>, size: Option<u64>) -> Self {
        Self { offset, size }
    }

    /// Start offset, if bounded.
    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Window size, if bounded.
    #[must_use]
    pub const fn size(&self) -> Option<u64> {
        self.size
    }

    /// Whether the window covers the whole object.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!((self.offset, self.size), (None | Some(0), None))
    }

    /// Whether the window is known to contain no byte at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.size, Some(0))
    }

    /// Render the HTTP `Range` header value.
    ///
    /// Returns `None` when no header is needed (whole object) or when the
    /// window is empty and cannot be expressed as an HTTP range.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.is_full() || self.is_empty() {
            return None;
        }
        match (self.offset, self.size) {
            (Some(offset), Some(size)) => Some(format!("bytes={offset}-{}", offset + size - 1)),
            (Some(offset), None) => Some(format!("bytes={offset}-")),
            (None, Some(size)) => Some(format!("bytes=0-{}", size - 1)),
            (None, None) => None,
        }
    }
}

impl From<Range<u64>> for RangeBounds {
    fn from(range: Range<u64>) -> Self {
        Self::between(range.start, range.end)
    }
}

impl From<RangeFrom<u64>> for RangeBounds {
    fn from(range: RangeFrom<u64>) -> Self {
        Self::from_start(range.start)
    }
}

impl From<RangeTo<u64>> for RangeBounds {
    fn from(range: RangeTo<u64>) -> Self {
        Self::to_end(range.end)
    }
}

impl From<RangeFull> for RangeBounds {
    fn from(_: RangeFull) -> Self {
        Self::full()
    }
}

impl fmt::Display for RangeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.offset, self.size) {
            (None, None) => f.write_str(".."),
            (Some(o), None) => write!(f, "{o}.."),
            (None, Some(s)) => write!(f, "..{s}"),
            (Some(o), Some(s)) => write!(f, "{o}..{}", o + s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_infer_mode_from_path() {
        assert_eq!(ObjectMode::from_path("a/b/"), ObjectMode::Dir);
        assert_eq!(ObjectMode::from_path("/"), ObjectMode::Dir);
        assert_eq!(ObjectMode::from_path("a/b"), ObjectMode::File);
        assert_eq!(ObjectMode::from_path(""), ObjectMode::File);
    }

    #[test]
    fn test_should_derive_md5_from_etag() {
        let meta = ObjectMetadata::new(ObjectMode::File)
            .with_content_length(12)
            .with_etag("\"9b2cf535f27731c974343645a3985328\"");
        assert_eq!(meta.etag.as_deref(), Some("\"9b2cf535f27731c974343645a3985328\""));
        assert_eq!(
            meta.content_md5.as_deref(),
            Some("9b2cf535f27731c974343645a3985328")
        );
        assert_eq!(meta.content_length, Some(12));
    }

    #[test]
    fn test_should_compute_size_from_bounds() {
        let range = RangeBounds::between(3, 8);
        assert_eq!(range.offset(), Some(3));
        assert_eq!(range.size(), Some(5));

        let inverted = RangeBounds::between(8, 3);
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_should_render_range_headers() {
        assert_eq!(
            RangeBounds::between(3, 8).header_value().as_deref(),
            Some("bytes=3-7")
        );
        assert_eq!(
            RangeBounds::from_start(5).header_value().as_deref(),
            Some("bytes=5-")
        );
        assert_eq!(
            RangeBounds::to_end(10).header_value().as_deref(),
            Some("bytes=0-9")
        );
        assert_eq!(RangeBounds::full().header_value(), None);
        assert_eq!(RangeBounds::from_start(0).header_value(), None);
        assert_eq!(RangeBounds::to_end(0).header_value(), None);
    }

    #[test]
    fn test_should_convert_std_ranges() {
        assert_eq!(RangeBounds::from(2..6), RangeBounds::new(Some(2), Some(4)));
        assert_eq!(RangeBounds::from(7..), RangeBounds::from_start(7));
        assert_eq!(RangeBounds::from(..3), RangeBounds::to_end(3));
        assert_eq!(RangeBounds::from(..), RangeBounds::full());
        assert_eq!(RangeBounds::from(2..6).to_string(), "2..6");
    }
}
