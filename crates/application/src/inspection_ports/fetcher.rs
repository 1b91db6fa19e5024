use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ppecheck_core::AppResult;
use ppecheck_domain::ObjectLocation;

/// Object content downloaded into invocation scratch space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedObject {
    /// File holding the full object bytes.
    pub path: PathBuf,
    /// Content type recorded by the object store, when present.
    pub content_type: Option<String>,
    /// Number of bytes written.
    pub size_bytes: u64,
}

/// Port for reading uploaded objects from storage.
#[async_trait]
pub trait ObjectFetcher: Send + Sync {
    /// Downloads the object at `location` into `destination`.
    ///
    /// Returns `AppError::NotFound` when the object does not exist.
    async fn fetch(
        &self,
        location: &ObjectLocation,
        destination: &Path,
    ) -> AppResult<FetchedObject>;
}
