//! Upload batches with compensating cleanup
//!
//! A request that writes or moves several objects records each step in an
//! [`UploadBatch`]. When its surrounding transaction commits, the batch is
//! committed; when it fails, [`UploadBatch::rollback`] undoes the steps in
//! reverse order. Rollback never fails: cleanup problems are collected and
//! handed back so the original error stays the one reported.

use crate::resolver::sanitize;
use crate::sniff::{self, SNIFF_LEN};
use crate::store::{ContentStore, WriteOptions};
use crate::{CleanupError, Result, StoreError};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An object written by a batch, as a database row would reference it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub bucket: String,
    /// Generated object name
    pub name: String,
    pub original_name: Option<String>,
    pub size: u64,
    pub content_type: String,
}

impl StoredObject {
    /// Logical reference path, `/<bucket>/<name>`
    pub fn src(&self) -> String {
        format!("/{}/{}", self.bucket, self.name)
    }
}

#[derive(Debug)]
enum Step {
    Written(String),
    Moved { from: String, to: String },
}

/// Tracks the writes and moves of one logical upload
#[derive(Debug)]
pub struct UploadBatch {
    store: ContentStore,
    steps: Vec<Step>,
    settled: bool,
}

impl UploadBatch {
    /// Start a batch over a root-scoped store
    pub fn new(store: ContentStore) -> Self {
        Self {
            store,
            steps: Vec::new(),
            settled: false,
        }
    }

    /// Number of recorded steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Write `content` under a fresh name in `bucket`
    pub async fn stage(
        &mut self,
        bucket: &str,
        content: Bytes,
        original_name: Option<&str>,
    ) -> Result<StoredObject> {
        let object = StoredObject {
            bucket: sanitize(bucket),
            name: ContentStore::gen_filename(),
            original_name: original_name.map(str::to_string),
            size: content.len() as u64,
            content_type: self.detect(&content, original_name).to_string(),
        };
        let src = object.src();

        self.store.write(&src, content, WriteOptions::touch()).await?;
        self.steps.push(Step::Written(src));
        debug!(src = %object.src(), size = object.size, "Staged upload");
        Ok(object)
    }

    fn detect(&self, content: &[u8], original_name: Option<&str>) -> &'static str {
        original_name
            .and_then(sniff::from_extension)
            .unwrap_or_else(|| {
                let preview = &content[..content.len().min(SNIFF_LEN)];
                sniff::detect(preview, self.store.sniffer())
            })
    }

    /// Move the regular file at `src` into `bucket`, keeping its name;
    /// returns the new path. Directories are never promoted.
    pub async fn promote(&mut self, src: &str, bucket: &str) -> Result<String> {
        if !self.store.exists(src).await {
            return Err(StoreError::NotFound(src.to_string()));
        }
        let source = self.store.resolve(src);
        let name = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StoreError::NotFound(src.to_string()))?;
        let to = format!("/{}/{}", sanitize(bucket), name);

        self.store.rename(src, &to).await?;
        self.steps.push(Step::Moved {
            from: src.to_string(),
            to: to.clone(),
        });
        debug!(from = %src, to = %to, "Promoted upload");
        Ok(to)
    }

    /// Keep everything the batch did
    pub fn commit(mut self) {
        self.settled = true;
        debug!(steps = self.steps.len(), "Upload batch committed");
    }

    /// Undo every step, newest first, returning the cleanups that failed
    pub async fn rollback(mut self) -> Vec<CleanupError> {
        self.settled = true;
        let mut failures = Vec::new();

        for step in std::mem::take(&mut self.steps).into_iter().rev() {
            match step {
                Step::Moved { from, to } => {
                    if let Err(e) = self.store.rename(&to, &from).await {
                        warn!(from = %to, to = %from, error = %e, "Failed to revert move");
                        failures.push(CleanupError::new(to, into_io(e)));
                    }
                }
                Step::Written(src) => {
                    if let Err(e) = self.store.unlink(&src).await {
                        failures.push(e);
                    }
                }
            }
        }

        if !failures.is_empty() {
            warn!(failed = failures.len(), "Upload rollback left residue");
        }
        failures
    }
}

impl Drop for UploadBatch {
    fn drop(&mut self) {
        if !self.settled && !self.steps.is_empty() {
            let paths: Vec<&str> = self
                .steps
                .iter()
                .map(|step| match step {
                    Step::Written(src) => src.as_str(),
                    Step::Moved { to, .. } => to.as_str(),
                })
                .collect();
            warn!(?paths, "Upload batch dropped without commit or rollback");
        }
    }
}

fn into_io(err: StoreError) -> std::io::Error {
    match err {
        StoreError::Io(e) => e,
        StoreError::StorageInit { source, .. } => source,
        StoreError::NotFound(path) | StoreError::PathNotFound(path) => {
            std::io::Error::new(std::io::ErrorKind::NotFound, path)
        }
        other => std::io::Error::other(other.to_string()),
    }
}
