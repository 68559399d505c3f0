//! Directory entries produced by listing.

use std::sync::Arc;

use crate::accessor::Accessor;
use crate::metadata::{ObjectMetadata, ObjectMode};
use crate::operator::Object;
use crate::path::name_from_path;

/// One item of a listing: the owning backend, a path and a metadata snapshot.
#[derive(Debug, Clone)]
pub struct Entry {
    accessor: Arc<dyn Accessor>,
    path: String,
    metadata: ObjectMetadata,
    complete: bool,
}

impl Entry {
    /// Create an entry.
    ///
    /// `complete` tells whether `metadata` holds everything a stat would
    /// return, so consumers can skip a round trip.
    pub fn new(
        accessor: Arc<dyn Accessor>,
        path: impl Into<String>,
        metadata: ObjectMetadata,
        complete: bool,
    ) -> Self {
        Self {
            accessor,
            path: path.into(),
            metadata,
            complete,
        }
    }

    /// Path relative to the backend root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment (with its trailing `/` for directories).
    #[must_use]
    pub fn name(&self) -> &str {
        name_from_path(&self.path)
    }

    /// File or directory.
    #[must_use]
    pub fn mode(&self) -> ObjectMode {
        self.metadata.mode
    }

    /// Metadata captured while listing.
    #[must_use]
    pub fn metadata(&self) -> &ObjectMetadata {
        &self.metadata
    }

    /// Whether the captured metadata is complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The backend that produced this entry.
    #[must_use]
    pub fn accessor(&self) -> &Arc<dyn Accessor> {
        &self.accessor
    }

    /// An [`Object`] handle for this entry on the same backend.
    #[must_use]
    pub fn object(&self) -> Object {
        Object::new(Arc::clone(&self.accessor), &self.path)
    }
}
