//! Storage root and bucket factory

use crate::resolver::PathResolver;
use crate::store::ContentStore;
use crate::Result;
use std::path::Path;
use tracing::warn;

/// Environment variable naming the storage root
pub const STORAGE_ROOT_ENV: &str = "FILE_STORAGE_ROOT";

/// Development-only fallback when no root is configured
pub const DEFAULT_STORAGE_ROOT: &str = "/tmp/map";

/// Uploaded history images
pub const BUCKET_IMAGES: &str = "images";
/// Profile photos
pub const BUCKET_PROFILE: &str = "profile";
/// Generic files served by the media route
pub const BUCKET_FILES: &str = "files";
/// Staging area for uploads awaiting promotion
pub const BUCKET_TMP: &str = "tmp";

/// The single directory all buckets live under.
///
/// Built once at startup and passed to whoever needs a store; it is never
/// mutated afterwards, so clones can be shared freely across tasks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageRoot {
    resolver: PathResolver,
}

impl StorageRoot {
    /// Root at an explicit directory
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            resolver: PathResolver::new(path),
        }
    }

    /// Root from `FILE_STORAGE_ROOT`, falling back to `/tmp/map`
    pub fn from_env() -> Self {
        match std::env::var(STORAGE_ROOT_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path.trim()),
            _ => {
                warn!(
                    root = DEFAULT_STORAGE_ROOT,
                    "{} not set, using development default", STORAGE_ROOT_ENV
                );
                Self::new(DEFAULT_STORAGE_ROOT)
            }
        }
    }

    /// Absolute root directory
    pub fn path(&self) -> &Path {
        self.resolver.root()
    }

    pub(crate) fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Open (and lazily create) a bucket
    pub async fn bucket(&self, name: &str) -> Result<ContentStore> {
        ContentStore::open(self, name).await
    }

    /// Store scoped to the root itself, for moves between buckets
    pub async fn scope(&self) -> Result<ContentStore> {
        ContentStore::open(self, "").await
    }
}
