//! Bucket-scoped content store

use crate::peek::PeekReader;
use crate::range::{self, ContentRange};
use crate::resolver::{sanitize, PathResolver};
use crate::root::StorageRoot;
use crate::sniff::{self, InferSniffer, Sniffer, OCTET_STREAM, SNIFF_LEN};
use crate::{CleanupError, Result, StoreError};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, AsyncWriteExt, Take};
use tracing::{debug, error, info};

/// Byte stream over a stored object, peekable for sniffing
pub type ObjectStream = PeekReader<Take<File>>;

/// Text encoding for reads and writes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Utf8,
    Base64,
    Hex,
    /// Raw bytes, no text conversion
    Binary,
}

/// Content accepted by [`ContentStore::write`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteContent {
    Bytes(Bytes),
    Text(String),
}

impl WriteContent {
    fn into_bytes(self, encoding: Encoding) -> Result<Bytes> {
        match (self, encoding) {
            (Self::Bytes(bytes), _) => Ok(bytes),
            (Self::Text(text), Encoding::Utf8 | Encoding::Binary) => Ok(Bytes::from(text)),
            (Self::Text(text), Encoding::Base64) => general_purpose::STANDARD
                .decode(text.trim())
                .map(Bytes::from)
                .map_err(|e| StoreError::Encoding(e.to_string())),
            (Self::Text(text), Encoding::Hex) => hex::decode(text.trim())
                .map(Bytes::from)
                .map_err(|e| StoreError::Encoding(e.to_string())),
        }
    }
}

impl From<Bytes> for WriteContent {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for WriteContent {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<&[u8]> for WriteContent {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(Bytes::copy_from_slice(bytes))
    }
}

impl From<String> for WriteContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for WriteContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// Options for [`ContentStore::write`]
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteOptions {
    /// How text content is decoded into bytes
    pub encoding: Encoding,
    /// Create missing parent directories and an empty file before writing
    pub touch_if_not_exists: bool,
}

impl WriteOptions {
    /// Default options with `touch_if_not_exists` set
    pub fn touch() -> Self {
        Self {
            touch_if_not_exists: true,
            ..Default::default()
        }
    }
}

/// Result of [`ContentStore::read`]
#[derive(Clone, Debug, PartialEq)]
pub enum ReadContent {
    /// Parsed JSON document (`.json` objects that parse)
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
}

impl ReadContent {
    /// Parsed JSON, if the object was read as JSON
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Raw bytes, if read with [`Encoding::Binary`]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text, if read with a text encoding
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Byte offsets for [`ContentStore::stream`], both inclusive
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamOptions {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl From<&ContentRange> for StreamOptions {
    fn from(range: &ContentRange) -> Self {
        Self {
            start: Some(range.start),
            end: Some(range.end),
        }
    }
}

/// Size and modification time of a stored path
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStat {
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_file: bool,
}

/// What to derive a content type from
pub enum ContentSource<'a> {
    /// File name only; never touches the disk
    Filename(&'a str),
    /// Stored object; extension first, then its leading bytes
    Path(&'a str),
    /// An open stream; peeked bytes stay available to the reader
    Stream(&'a mut ObjectStream),
}

/// Byte storage confined to one bucket under the storage root
#[derive(Clone)]
pub struct ContentStore {
    bucket: String,
    resolver: PathResolver,
    sniffer: Arc<dyn Sniffer>,
}

impl fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStore")
            .field("bucket", &self.bucket)
            .field("root", &self.resolver.root())
            .finish()
    }
}

impl ContentStore {
    /// Open a bucket under `root`, creating its directory if missing
    pub async fn open(root: &StorageRoot, bucket: &str) -> Result<Self> {
        let bucket = sanitize(bucket);
        let store = Self {
            resolver: root.resolver().child(&bucket),
            bucket,
            sniffer: Arc::new(InferSniffer),
        };
        store.init().await?;
        Ok(store)
    }

    /// Replace the signature sniffer used by content-type detection
    pub fn with_sniffer(mut self, sniffer: Arc<dyn Sniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    /// Ensure the bucket directory exists. Safe to race with other callers.
    pub async fn init(&self) -> Result<()> {
        let root = self.resolver.root();
        fs::create_dir_all(root)
            .await
            .map_err(|source| StoreError::StorageInit {
                path: root.to_path_buf(),
                source,
            })?;
        debug!(bucket = %self.bucket, root = %root.display(), "Bucket ready");
        Ok(())
    }

    /// Bucket name (empty for a root-scoped store)
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Absolute bucket directory
    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    /// Signature sniffer in use
    pub fn sniffer(&self) -> &dyn Sniffer {
        self.sniffer.as_ref()
    }

    /// Confine a caller path to this bucket
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.resolver.resolve(relative)
    }

    /// Caller-facing form of an absolute path in this bucket
    pub fn display_path(&self, absolute: &Path) -> String {
        self.resolver.display_path(absolute)
    }

    fn io_error(&self, err: std::io::Error, path: &Path) -> StoreError {
        if err.kind() == ErrorKind::NotFound {
            StoreError::NotFound(self.display_path(path))
        } else {
            StoreError::Io(err)
        }
    }

    async fn is_file(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn parent_is_dir(path: &Path) -> bool {
        match path.parent() {
            Some(parent) => fs::metadata(parent)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false),
            None => false,
        }
    }

    /// True only for an existing regular file
    pub async fn exists(&self, relative: &str) -> bool {
        Self::is_file(&self.resolve(relative)).await
    }

    /// True when the parent directory of the resolved path exists
    pub async fn dir_exists(&self, relative: &str) -> bool {
        Self::parent_is_dir(&self.resolve(relative)).await
    }

    async fn prepare_write_target(&self, relative: &str, options: WriteOptions) -> Result<PathBuf> {
        let path = self.resolve(relative);
        if Self::parent_is_dir(&path).await {
            return Ok(path);
        }
        if !options.touch_if_not_exists {
            return Err(StoreError::PathNotFound(self.display_path(&path)));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e, parent))?;
        }
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(_) => {}
            // someone else touched it first
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(self.io_error(e, &path)),
        }
        Ok(path)
    }

    /// Write `content`, replacing whatever is at the path (last writer wins)
    pub async fn write(
        &self,
        relative: &str,
        content: impl Into<WriteContent>,
        options: WriteOptions,
    ) -> Result<()> {
        let bytes = content.into().into_bytes(options.encoding)?;
        let path = self.prepare_write_target(relative, options).await?;
        fs::write(&path, &bytes)
            .await
            .map_err(|e| self.io_error(e, &path))?;
        debug!(path = %self.display_path(&path), size = bytes.len(), "Wrote object");
        Ok(())
    }

    /// Copy a reader into the object, returning the number of bytes written
    pub async fn write_stream<R>(
        &self,
        relative: &str,
        reader: &mut R,
        options: WriteOptions,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.prepare_write_target(relative, options).await?;
        let mut file = File::create(&path)
            .await
            .map_err(|e| self.io_error(e, &path))?;
        let written = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        debug!(path = %self.display_path(&path), size = written, "Streamed object to disk");
        Ok(written)
    }

    /// Read an object; `.json` objects that parse come back as JSON
    pub async fn read(&self, relative: &str, encoding: Encoding) -> Result<ReadContent> {
        let path = self.resolve(relative);
        if !Self::is_file(&path).await {
            return Err(StoreError::NotFound(self.display_path(&path)));
        }

        let raw = fs::read(&path).await.map_err(|e| self.io_error(e, &path))?;

        let is_json = sniff::from_extension(&path.to_string_lossy())
            == Some(mime::APPLICATION_JSON.essence_str());
        if is_json {
            match serde_json::from_slice(&raw) {
                Ok(value) => return Ok(ReadContent::Json(value)),
                Err(e) => debug!(path = %self.display_path(&path), error = %e, "Not valid JSON, returning raw"),
            }
        }

        Ok(match encoding {
            Encoding::Utf8 => ReadContent::Text(String::from_utf8_lossy(&raw).into_owned()),
            Encoding::Base64 => ReadContent::Text(general_purpose::STANDARD.encode(&raw)),
            Encoding::Hex => ReadContent::Text(hex::encode(&raw)),
            Encoding::Binary => ReadContent::Bytes(Bytes::from(raw)),
        })
    }

    /// Open a byte stream, optionally limited to `start..=end`.
    ///
    /// Existence is checked before opening; a file removed in between
    /// surfaces as the open error.
    pub async fn stream(&self, relative: &str, options: StreamOptions) -> Result<ObjectStream> {
        let path = self.resolve(relative);
        if !Self::is_file(&path).await {
            return Err(StoreError::NotFound(self.display_path(&path)));
        }

        let mut file = File::open(&path)
            .await
            .map_err(|e| self.io_error(e, &path))?;
        let start = options.start.unwrap_or(0);
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }
        let limit = match options.end {
            Some(end) if end >= start => end - start + 1,
            Some(_) => 0,
            None => u64::MAX,
        };
        Ok(PeekReader::new(file.take(limit)))
    }

    /// Best-effort delete. Failures are logged and returned for the caller
    /// to inspect or ignore; they never abort a rollback.
    pub async fn unlink(&self, relative: &str) -> std::result::Result<(), CleanupError> {
        let path = self.resolve(relative);
        let shown = self.display_path(&path);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %shown, "Unlinked object");
                Ok(())
            }
            Err(e) => {
                info!(path = %shown, error = %e, "Unlink failed");
                Err(CleanupError::new(shown, e))
            }
        }
    }

    /// Unlink regular files directly in the bucket that were last modified
    /// more than `max_age` ago. Returns the display paths removed; entries
    /// that cannot be inspected or removed are skipped.
    pub async fn sweep(&self, max_age: Duration) -> Result<Vec<String>> {
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);
        let root = self.resolver.root();
        let mut entries = fs::read_dir(root)
            .await
            .map_err(|e| self.io_error(e, root))?;

        let mut removed = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(meta) = entry.metadata().await else {
                continue;
            };
            let stale = meta.is_file() && meta.modified().is_ok_and(|modified| modified <= cutoff);
            if !stale {
                continue;
            }
            let shown = self.display_path(&entry.path());
            if self.unlink(&shown).await.is_ok() {
                removed.push(shown);
            }
        }

        if !removed.is_empty() {
            info!(bucket = %self.bucket, count = removed.len(), "Swept stale objects");
        }
        Ok(removed)
    }

    /// Move an object within this store's scope
    pub async fn rename(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from);
        let target = self.resolve(to);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e, parent))?;
        }
        fs::rename(&source, &target)
            .await
            .map_err(|e| self.io_error(e, &source))?;
        debug!(
            from = %self.display_path(&source),
            to = %self.display_path(&target),
            "Renamed object"
        );
        Ok(())
    }

    /// Size and modification time
    pub async fn stat(&self, relative: &str) -> Result<ObjectStat> {
        let path = self.resolve(relative);
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| self.io_error(e, &path))?;
        Ok(ObjectStat {
            size: meta.len(),
            modified: DateTime::<Utc>::from(meta.modified()?),
            is_file: meta.is_file(),
        })
    }

    /// Milliseconds by which an external file is newer than a stored one
    pub async fn modified_delta(&self, source: &Path, target: &str) -> Result<i64> {
        let source_meta = fs::metadata(source).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(source.display().to_string()),
            _ => StoreError::Io(e),
        })?;
        let source_modified = DateTime::<Utc>::from(source_meta.modified()?);
        let target_modified = self.stat(target).await?.modified;
        Ok((source_modified - target_modified).num_milliseconds())
    }

    /// Resolve a content type: extension table, then SVG markup, then
    /// signatures, then `application/octet-stream`.
    pub async fn content_type(&self, source: ContentSource<'_>) -> Result<&'static str> {
        let name = match &source {
            ContentSource::Filename(name) | ContentSource::Path(name) => Some(*name),
            ContentSource::Stream(_) => None,
        };
        if let Some(mime) = name.and_then(sniff::from_extension) {
            return Ok(mime);
        }

        match source {
            ContentSource::Filename(_) => Ok(OCTET_STREAM),
            ContentSource::Path(relative) => {
                let mut stream = self.stream(relative, StreamOptions::default()).await?;
                Ok(self.sniff_stream(&mut stream).await)
            }
            ContentSource::Stream(stream) => Ok(self.sniff_stream(stream).await),
        }
    }

    async fn sniff_stream<R: AsyncRead + Unpin>(&self, stream: &mut PeekReader<R>) -> &'static str {
        match stream.peek(SNIFF_LEN).await {
            Ok(preview) => sniff::detect(preview, self.sniffer.as_ref()),
            Err(e) => {
                error!(bucket = %self.bucket, error = %e, "Error reading stream");
                OCTET_STREAM
            }
        }
    }

    /// Translate a `Range` header against `size`
    pub fn content_range(&self, range: Option<&str>, size: u64) -> Result<ContentRange> {
        range::content_range(range, size)
    }

    /// Random 32-hex-character object name (128 bits)
    pub fn gen_filename() -> String {
        let bytes: [u8; 16] = rand::random();
        hex::encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup(bucket: &str) -> (TempDir, ContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StorageRoot::new(dir.path()).bucket(bucket).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_bucket_created_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let root = StorageRoot::new(dir.path());
        assert!(!dir.path().join("images").exists());

        let (a, b) = tokio::join!(root.bucket("images"), root.bucket("images"));
        a.unwrap();
        b.unwrap();
        assert!(dir.path().join("images").is_dir());
    }

    #[tokio::test]
    async fn test_bucket_name_cannot_escape() {
        let dir = tempfile::tempdir().unwrap();
        let root = StorageRoot::new(dir.path().join("root"));
        let store = root.bucket("../outside").await.unwrap();
        assert!(store.root().starts_with(root.path()));
        assert_eq!(store.bucket(), "./outside");
    }

    #[tokio::test]
    async fn test_init_failure_is_storage_init() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"file, not dir").unwrap();

        let err = StorageRoot::new(&blocker).bucket("images").await.unwrap_err();
        assert!(matches!(err, StoreError::StorageInit { .. }));
    }

    #[tokio::test]
    async fn test_write_read_binary() {
        let (_dir, store) = setup("files").await;
        let data: Vec<u8> = (0..=255u8).collect();

        store.write("blob", data.clone(), WriteOptions::default()).await.unwrap();
        let content = store.read("blob", Encoding::Binary).await.unwrap();
        assert_eq!(content.as_bytes().unwrap().as_ref(), data.as_slice());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let (_dir, store) = setup("files").await;
        store.write("note.txt", "first", WriteOptions::default()).await.unwrap();
        store.write("note.txt", "second", WriteOptions::default()).await.unwrap();

        let content = store.read("note.txt", Encoding::Utf8).await.unwrap();
        assert_eq!(content.as_text(), Some("second"));
    }

    #[tokio::test]
    async fn test_read_json_parses() {
        let (_dir, store) = setup("files").await;
        store
            .write("meta.json", r#"{"rating": 5, "tags": ["sea"]}"#, WriteOptions::default())
            .await
            .unwrap();

        let content = store.read("meta.json", Encoding::Utf8).await.unwrap();
        assert_eq!(
            content.as_json().unwrap(),
            &serde_json::json!({"rating": 5, "tags": ["sea"]})
        );
    }

    #[tokio::test]
    async fn test_read_invalid_json_falls_back() {
        let (_dir, store) = setup("files").await;
        store.write("broken.json", "{not json", WriteOptions::default()).await.unwrap();

        let content = store.read("broken.json", Encoding::Utf8).await.unwrap();
        assert_eq!(content.as_text(), Some("{not json"));
    }

    #[tokio::test]
    async fn test_text_encodings() {
        let (_dir, store) = setup("files").await;
        let options = WriteOptions {
            encoding: Encoding::Base64,
            ..Default::default()
        };
        store.write("b64", "aGVsbG8=", options).await.unwrap();

        let hex = store.read("b64", Encoding::Hex).await.unwrap();
        assert_eq!(hex.as_text(), Some("68656c6c6f"));
        let text = store.read("b64", Encoding::Utf8).await.unwrap();
        assert_eq!(text.as_text(), Some("hello"));

        let bad = store.write("bad", "zz", WriteOptions { encoding: Encoding::Hex, ..Default::default() }).await;
        assert!(matches!(bad, Err(StoreError::Encoding(_))));
    }

    #[tokio::test]
    async fn test_read_missing() {
        let (_dir, store) = setup("files").await;
        let err = store.read("nope", Encoding::Utf8).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref p) if p == "/nope"));
    }

    #[tokio::test]
    async fn test_write_missing_parent() {
        let (_dir, store) = setup("files").await;
        let err = store
            .write("missing/dir/file", "x", WriteOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PathNotFound(ref p) if p == "/missing/dir/file"));
        assert!(!store.dir_exists("missing/dir/file").await);
    }

    #[tokio::test]
    async fn test_write_touch_creates_parent() {
        let (_dir, store) = setup("files").await;
        store
            .write("new/dir/file.txt", "content", WriteOptions::touch())
            .await
            .unwrap();
        assert!(store.exists("new/dir/file.txt").await);
        assert!(store.dir_exists("new/dir/file.txt").await);
    }

    #[tokio::test]
    async fn test_write_stream() {
        let (_dir, store) = setup("files").await;
        let mut source: &[u8] = b"streamed bytes";
        let written = store
            .write_stream("s.bin", &mut source, WriteOptions::default())
            .await
            .unwrap();
        assert_eq!(written, 14);
        assert_eq!(store.stat("s.bin").await.unwrap().size, 14);
    }

    #[tokio::test]
    async fn test_stream_range() {
        let (_dir, store) = setup("files").await;
        store.write("digits", "0123456789", WriteOptions::default()).await.unwrap();

        let mut stream = store
            .stream("digits", StreamOptions { start: Some(2), end: Some(5) })
            .await
            .unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "2345");

        let mut stream = store
            .stream("digits", StreamOptions { start: Some(7), end: None })
            .await
            .unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "789");
    }

    #[tokio::test]
    async fn test_stream_missing() {
        let (_dir, store) = setup("files").await;
        let err = store.stream("ghost", StreamOptions::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_unlink_missing_is_harmless() {
        let (_dir, store) = setup("files").await;
        let err = store.unlink("never-written").await.unwrap_err();
        assert!(err.is_already_absent());
        assert_eq!(err.path, "/never-written");
    }

    #[tokio::test]
    async fn test_unlink_removes() {
        let (_dir, store) = setup("files").await;
        store.write("gone", "bye", WriteOptions::default()).await.unwrap();
        store.unlink("gone").await.unwrap();
        assert!(!store.exists("gone").await);
    }

    #[tokio::test]
    async fn test_sweep_removes_only_stale_files() {
        let (dir, store) = setup("tmp").await;
        store.write("old", "1", WriteOptions::default()).await.unwrap();
        store.write("nested/keep", "2", WriteOptions::touch()).await.unwrap();

        let removed = store.sweep(Duration::from_secs(3600)).await.unwrap();
        assert!(removed.is_empty());
        assert!(store.exists("old").await);

        let removed = store.sweep(Duration::ZERO).await.unwrap();
        assert_eq!(removed, vec!["/old".to_string()]);
        assert!(!store.exists("old").await);
        assert!(dir.path().join("tmp").join("nested").join("keep").is_file());
    }

    #[tokio::test]
    async fn test_rename_between_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let root = StorageRoot::new(dir.path());
        let scope = root.scope().await.unwrap();
        scope.write("/tmp/abc", "staged", WriteOptions::touch()).await.unwrap();

        scope.rename("/tmp/abc", "/images/abc").await.unwrap();
        assert!(!scope.exists("/tmp/abc").await);

        let images = root.bucket("images").await.unwrap();
        let content = images.read("abc", Encoding::Utf8).await.unwrap();
        assert_eq!(content.as_text(), Some("staged"));
    }

    #[tokio::test]
    async fn test_rename_missing_source() {
        let (_dir, store) = setup("files").await;
        let err = store.rename("ghost", "other").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_stat_hides_storage_root() {
        let (dir, store) = setup("files").await;
        let err = store.stat("missing.png").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("/missing.png"));
        assert!(!message.contains(&*dir.path().to_string_lossy()));
    }

    #[tokio::test]
    async fn test_stat_reports_size() {
        let (_dir, store) = setup("files").await;
        store.write("sized", vec![0u8; 1000], WriteOptions::default()).await.unwrap();
        let stat = store.stat("sized").await.unwrap();
        assert_eq!(stat.size, 1000);
        assert!(stat.is_file);
    }

    #[tokio::test]
    async fn test_content_type_by_extension_needs_no_file() {
        let (_dir, store) = setup("files").await;
        let mime = store.content_type(ContentSource::Filename("a.png")).await.unwrap();
        assert_eq!(mime, "image/png");
        let mime = store.content_type(ContentSource::Path("not-there.png")).await.unwrap();
        assert_eq!(mime, "image/png");
    }

    #[tokio::test]
    async fn test_content_type_svg_without_extension() {
        let (_dir, store) = setup("files").await;
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"></svg>"#;
        store.write("drawing", svg, WriteOptions::default()).await.unwrap();
        let mime = store.content_type(ContentSource::Path("drawing")).await.unwrap();
        assert_eq!(mime, "image/svg+xml");
    }

    #[tokio::test]
    async fn test_content_type_signature_and_fallback() {
        let (_dir, store) = setup("files").await;
        store
            .write("pic", b"\x89PNG\r\n\x1a\n0000".as_slice(), WriteOptions::default())
            .await
            .unwrap();
        store.write("noise", "no magic here", WriteOptions::default()).await.unwrap();

        assert_eq!(store.content_type(ContentSource::Path("pic")).await.unwrap(), "image/png");
        assert_eq!(
            store.content_type(ContentSource::Path("noise")).await.unwrap(),
            OCTET_STREAM
        );
        assert_eq!(
            store.content_type(ContentSource::Filename("noext")).await.unwrap(),
            OCTET_STREAM
        );
    }

    #[tokio::test]
    async fn test_content_type_missing_object() {
        let (_dir, store) = setup("files").await;
        let err = store.content_type(ContentSource::Path("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_sniffing_stream_keeps_content() {
        let (_dir, store) = setup("files").await;
        let mut data = b"GIF89a".to_vec();
        data.extend(std::iter::repeat(7u8).take(4096));
        store.write("anim", data.clone(), WriteOptions::default()).await.unwrap();

        let mut stream = store.stream("anim", StreamOptions::default()).await.unwrap();
        let mime = store.content_type(ContentSource::Stream(&mut stream)).await.unwrap();
        assert_eq!(mime, "image/gif");

        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, data);
    }

    #[tokio::test]
    async fn test_modified_delta() {
        let (dir, store) = setup("files").await;
        store.write("target", "t", WriteOptions::default()).await.unwrap();
        let external = dir.path().join("external");
        std::fs::write(&external, b"e").unwrap();

        let delta = store.modified_delta(&external, "target").await.unwrap();
        assert!(delta >= 0);

        let err = store.modified_delta(&dir.path().join("nope"), "target").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_gen_filename() {
        let a = ContentStore::gen_filename();
        let b = ContentStore::gen_filename();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
