//! Directory listing as a page source.

use std::fmt;
use std::fs;
use std::sync::Arc;
use std::vec::IntoIter;

use tracing::trace;
use unistore_core::{Accessor, Entry, Operation, Page, PageSource, Result};

use crate::backend::{fs_error, object_metadata};

/// Children converted to entries per page.
const PAGE_SIZE: usize = 256;

/// Pages over the already-sorted children of one directory.
///
/// Metadata is read page by page, so a child removed after the directory
/// was opened fails the page that reaches it.
pub(crate) struct DirLister {
    accessor: Arc<dyn Accessor>,
    parent: String,
    children: IntoIter<fs::DirEntry>,
}

impl fmt::Debug for DirLister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirLister")
            .field("parent", &self.parent)
            .field("remaining", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl DirLister {
    pub(crate) fn new(
        accessor: Arc<dyn Accessor>,
        parent: String,
        children: Vec<fs::DirEntry>,
    ) -> Self {
        Self {
            accessor,
            parent,
            children: children.into_iter(),
        }
    }

    fn entry(&self, child: &fs::DirEntry) -> Result<Entry> {
        let name = child.file_name().to_string_lossy().into_owned();
        let mut path = format!("{}{name}", self.parent);
        // Follow symlinks, falling back to the link itself when dangling.
        let meta = fs::metadata(child.path())
            .or_else(|_| child.metadata())
            .map_err(fs_error(Operation::List, &path))?;
        if meta.is_dir() {
            path.push('/');
        }
        Ok(Entry::new(
            Arc::clone(&self.accessor),
            path,
            object_metadata(&meta),
            true,
        ))
    }
}

impl PageSource for DirLister {
    fn next_page(&mut self) -> Result<Page> {
        let batch: Vec<fs::DirEntry> = self.children.by_ref().take(PAGE_SIZE).collect();
        let entries = batch
            .iter()
            .map(|child| self.entry(child))
            .collect::<Result<Vec<_>>>()?;
        trace!(parent = %self.parent, entries = entries.len(), "Listed directory page");

        if self.children.as_slice().is_empty() {
            Ok(Page::last(entries))
        } else {
            Ok(Page::more(entries))
        }
    }
}
