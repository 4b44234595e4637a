//! Application state

use crate::config::ServerConfig;
use tracing::info;
use waypost_store::{
    ContentStore, StorageRoot, BUCKET_FILES, BUCKET_IMAGES, BUCKET_PROFILE, BUCKET_TMP,
};

/// Buckets uploads may be promoted into
pub const PROMOTION_BUCKETS: [&str; 3] = [BUCKET_IMAGES, BUCKET_PROFILE, BUCKET_FILES];

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Storage root, fixed for the life of the process
    pub root: StorageRoot,
    /// Bucket served by the media route
    pub files: ContentStore,
    /// Staging bucket, swept for abandoned uploads
    pub staging: ContentStore,
    /// Root-scoped store for staging and cross-bucket moves
    pub scope: ContentStore,
}

impl AppState {
    /// Create the state, making sure every well-known bucket exists
    pub async fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let root = StorageRoot::new(&config.storage_root);

        for bucket in [BUCKET_IMAGES, BUCKET_PROFILE, BUCKET_FILES, BUCKET_TMP] {
            root.bucket(bucket).await?;
        }
        info!(root = %root.path().display(), "Storage buckets ready");

        let files = root.bucket(BUCKET_FILES).await?;
        let staging = root.bucket(BUCKET_TMP).await?;
        let scope = root.scope().await?;

        Ok(Self {
            config,
            root,
            files,
            staging,
            scope,
        })
    }
}
