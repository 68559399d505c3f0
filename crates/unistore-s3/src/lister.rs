//! `ListObjectsV2` pagination as a page source.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use tracing::debug;
use unistore_core::path::build_rel_path;
use unistore_core::{
    Accessor, Entry, ObjectMetadata, ObjectMode, Operation, Page, PageSource, Result,
};
use unistore_s3_xml::{ListBucketResult, from_xml};

use crate::error::{parse_error, xml_error};
use crate::request::{S3Core, read_body};

/// Follows continuation tokens below one directory.
pub(crate) struct S3Lister {
    accessor: Arc<dyn Accessor>,
    core: Arc<S3Core>,
    path: String,
    token: Option<String>,
    done: bool,
}

impl fmt::Debug for S3Lister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Lister")
            .field("path", &self.path)
            .field("token", &self.token)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl S3Lister {
    pub(crate) fn new(accessor: Arc<dyn Accessor>, core: Arc<S3Core>, path: &str) -> Self {
        Self {
            accessor,
            core,
            path: path.to_owned(),
            token: None,
            done: false,
        }
    }

    fn entries(&self, output: ListBucketResult) -> Result<Vec<Entry>> {
        let mut entries = Vec::with_capacity(output.common_prefixes.len() + output.contents.len());

        for prefix in output.common_prefixes {
            let path = build_rel_path(&self.core.root, &prefix)
                .map_err(|e| e.with_operation(Operation::List))?;
            entries.push(Entry::new(
                Arc::clone(&self.accessor),
                path,
                ObjectMetadata::new(ObjectMode::Dir),
                false,
            ));
        }

        for object in output.contents {
            // The queried directory itself is reported as a key ending in `/`.
            if object.key.ends_with('/') {
                continue;
            }
            let path = build_rel_path(&self.core.root, &object.key)
                .map_err(|e| e.with_operation(Operation::List))?;
            let mut meta = ObjectMetadata::new(ObjectMode::File).with_content_length(object.size);
            if let Some(modified) = object.last_modified {
                meta = meta.with_last_modified(modified);
            }
            if let Some(etag) = object.etag {
                meta = meta.with_etag(etag);
            }
            entries.push(Entry::new(Arc::clone(&self.accessor), path, meta, false));
        }

        Ok(entries)
    }
}

impl PageSource for S3Lister {
    fn next_page(&mut self) -> Result<Page> {
        if self.done {
            return Ok(Page::last(Vec::new()));
        }

        let op = Operation::List;
        let req = self
            .core
            .list_objects_request(op, &self.path, self.token.as_deref())?;
        let resp = self.core.send(op, &self.path, req)?;
        if resp.status() != StatusCode::OK {
            return Err(parse_error(op, &self.path, resp));
        }

        let body = read_body(op, &self.path, resp)?;
        let output: ListBucketResult =
            from_xml(&body).map_err(|e| xml_error(op, &self.path, e))?;

        let next_token = output
            .next_continuation_token
            .clone()
            .filter(|t| !t.is_empty());
        // IsTruncated decides when present, otherwise the token does. Without
        // a token there is no way to ask for the next page.
        self.done = match output.is_truncated {
            Some(truncated) => !truncated || next_token.is_none(),
            None => next_token.is_none(),
        };
        self.token = next_token;

        let entries = self.entries(output)?;
        debug!(path = %self.path, entries = entries.len(), done = self.done, "Listed S3 page");

        if self.done {
            Ok(Page::last(entries))
        } else {
            Ok(Page::more(entries))
        }
    }
}
