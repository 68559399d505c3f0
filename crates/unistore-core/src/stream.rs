//! Adapter turning a paginated listing source into a lazy entry sequence.
//!
//! Listing protocols hand out entries one page at a time. [`ObjectStream`]
//! owns a [`PageSource`], buffers the entries of the last fetched page and
//! yields them one by one, fetching the next page only when the buffer runs
//! dry. Once a page comes back empty, or the source reports it is done, no
//! further page is requested: the stream is finite and not restartable.
//!
//! The stream is single-consumer; every state change goes through `&mut self`.

use std::collections::VecDeque;
use std::fmt;

use crate::entry::Entry;
use crate::error::{Error, Result};

/// One page of a listing.
#[derive(Debug, Default)]
pub struct Page {
    /// Entries of this page, in order.
    pub entries: Vec<Entry>,
    /// Whether the source has no further page.
    pub done: bool,
}

impl Page {
    /// A page followed by more pages.
    #[must_use]
    pub fn more(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            done: false,
        }
    }

    /// The final page.
    #[must_use]
    pub fn last(entries: Vec<Entry>) -> Self {
        Self {
            entries,
            done: true,
        }
    }
}

/// A source of listing pages, driven by [`ObjectStream`].
///
/// Implementations keep their own cursor (a continuation token, a directory
/// iterator) and advance it on every call.
pub trait PageSource: Send + fmt::Debug {
    /// Fetch the next page.
    fn next_page(&mut self) -> Result<Page>;
}

/// A lazy sequence of listing entries.
///
/// Use [`ObjectStream::next_entry`] for an explicit tri-state result, or
/// iterate over `Result<Entry>` items.
#[derive(Debug)]
pub struct ObjectStream {
    source: Option<Box<dyn PageSource>>,
    buffer: VecDeque<Entry>,
    done: bool,
    pending: Option<Error>,
}

impl ObjectStream {
    /// Stream the pages of `source`.
    pub fn new(source: impl PageSource + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            buffer: VecDeque::new(),
            done: false,
            pending: None,
        }
    }

    /// A stream over entries that are already known.
    #[must_use]
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self {
            source: None,
            buffer: entries.into(),
            done: true,
            pending: None,
        }
    }

    /// A stream yielding nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_entries(Vec::new())
    }

    /// Whether another call to [`next_entry`](Self::next_entry) yields an
    /// item or an error.
    ///
    /// When the buffer is empty and the source is not done yet, this fetches
    /// one page to find out. A fetch failure is kept and handed out by the
    /// next `next_entry` call, so this returns `true` in that case.
    pub fn has_next(&mut self) -> bool {
        if !self.buffer.is_empty() || self.pending.is_some() {
            return true;
        }
        if self.done {
            return false;
        }
        match self.fetch() {
            Ok(()) => !self.buffer.is_empty(),
            Err(err) => {
                self.pending = Some(err);
                true
            }
        }
    }

    /// Advance the stream.
    ///
    /// Returns `Ok(Some(entry))` for an item, `Ok(None)` at the end of the
    /// sequence and `Err` when fetching a page failed. A failure ends the
    /// stream.
    pub fn next_entry(&mut self) -> Result<Option<Entry>> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        loop {
            if let Some(entry) = self.buffer.pop_front() {
                return Ok(Some(entry));
            }
            if self.done {
                return Ok(None);
            }
            self.fetch()?;
        }
    }

    fn fetch(&mut self) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            self.done = true;
            return Ok(());
        };
        let page = match source.next_page() {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };
        if page.done || page.entries.is_empty() {
            self.done = true;
        }
        tracing::trace!(
            entries = page.entries.len(),
            done = self.done,
            "fetched listing page"
        );
        self.buffer.extend(page.entries);
        Ok(())
    }
}

impl Iterator for ObjectStream {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::accessor::{Accessor, AccessorMetadata, Scheme};
    use crate::capability::Capability;
    use crate::error::ErrorKind;
    use crate::metadata::{ObjectMetadata, ObjectMode};

    #[derive(Debug)]
    struct NullAccessor;

    impl Accessor for NullAccessor {
        fn metadata(&self) -> AccessorMetadata {
            AccessorMetadata {
                scheme: Scheme::Custom("null"),
                root: "/".to_owned(),
                name: String::new(),
                capability: Capability::empty(),
            }
        }
    }

    fn entries(prefix: &str, n: usize) -> Vec<Entry> {
        let acc: Arc<dyn Accessor> = Arc::new(NullAccessor);
        (0..n)
            .map(|i| {
                Entry::new(
                    Arc::clone(&acc),
                    format!("{prefix}{i}"),
                    ObjectMetadata::new(ObjectMode::File),
                    false,
                )
            })
            .collect()
    }

    /// Replays scripted pages and counts fetches.
    #[derive(Debug)]
    struct ScriptedSource {
        pages: VecDeque<Result<Page>>,
        fetches: usize,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Page>>) -> Self {
            Self {
                pages: pages.into(),
                fetches: 0,
            }
        }
    }

    impl PageSource for ScriptedSource {
        fn next_page(&mut self) -> Result<Page> {
            self.fetches += 1;
            self.pages
                .pop_front()
                .unwrap_or_else(|| panic!("fetched past the last page"))
        }
    }

    #[test]
    fn test_should_yield_entries_then_end() {
        let source = ScriptedSource::new(vec![
            Ok(Page::more(entries("a", 3))),
            Ok(Page::last(Vec::new())),
        ]);
        let mut stream = ObjectStream::new(source);

        let mut seen = Vec::new();
        while stream.has_next() {
            let entry = stream.next_entry().unwrap().unwrap();
            seen.push(entry.path().to_owned());
        }
        assert_eq!(seen, vec!["a0", "a1", "a2"]);
        assert!(!stream.has_next());
        assert!(stream.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_should_report_no_next_for_empty_source_on_first_call() {
        let mut stream = ObjectStream::new(ScriptedSource::new(vec![Ok(Page::more(Vec::new()))]));
        assert!(!stream.has_next());
        assert!(stream.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_should_follow_multiple_pages() {
        let source = ScriptedSource::new(vec![
            Ok(Page::more(entries("a", 2))),
            Ok(Page::more(entries("b", 1))),
            Ok(Page::last(entries("c", 2))),
        ]);
        let paths: Vec<String> = ObjectStream::new(source)
            .map(|e| e.map(|e| e.path().to_owned()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(paths, vec!["a0", "a1", "b0", "c0", "c1"]);
    }

    #[test]
    fn test_should_stop_fetching_after_done_page() {
        let source = ScriptedSource::new(vec![Ok(Page::last(entries("a", 1)))]);
        let mut stream = ObjectStream::new(source);
        assert!(stream.next_entry().unwrap().is_some());
        assert!(stream.next_entry().unwrap().is_none());
        // A further fetch would panic in the scripted source.
        assert!(stream.next_entry().unwrap().is_none());
        assert!(!stream.has_next());
    }

    #[test]
    fn test_should_surface_fetch_error_from_has_next() {
        let source = ScriptedSource::new(vec![
            Ok(Page::more(entries("a", 1))),
            Err(Error::new(ErrorKind::Interrupted, "connection reset")),
        ]);
        let mut stream = ObjectStream::new(source);
        assert!(stream.next_entry().unwrap().is_some());

        assert!(stream.has_next());
        let err = stream.next_entry().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Interrupted);

        assert!(!stream.has_next());
        assert!(stream.next_entry().unwrap().is_none());
    }

    #[test]
    fn test_should_stream_known_entries() {
        let mut stream = ObjectStream::from_entries(entries("x", 2));
        assert!(stream.has_next());
        assert_eq!(stream.by_ref().count(), 2);
        assert!(!stream.has_next());
        assert!(!ObjectStream::empty().has_next());
    }
}
