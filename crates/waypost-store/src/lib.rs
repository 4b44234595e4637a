//! # Waypost Store
//!
//! Scoped local file storage backing Waypost's image and profile uploads.
//!
//! This crate provides:
//! - **Path confinement**: every caller path is pinned under a bucket root
//! - **Content store**: write, read, stream, stat, rename and best-effort unlink
//! - **Byte ranges**: `Range` header translation for partial content
//! - **Content types**: extension lookup with SVG and magic-byte sniffing
//! - **Upload batches**: stage/promote with compensating rollback
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     HTTP handlers / upload callers      │
//! ├─────────────────────────────────────────┤
//! │    UploadBatch (stage, promote, undo)   │
//! ├─────────────────────────────────────────┤
//! │   ContentStore (one per bucket)         │
//! │   range · sniff · PeekReader            │
//! ├─────────────────────────────────────────┤
//! │   PathResolver  ←  StorageRoot          │
//! ├─────────────────────────────────────────┤
//! │          Local filesystem               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use waypost_store::{StorageRoot, WriteOptions, StreamOptions};
//!
//! let root = StorageRoot::new("/var/lib/waypost");
//! let images = root.bucket("images").await?;
//! let name = ContentStore::gen_filename();
//! images.write(&name, bytes, WriteOptions::default()).await?;
//! let stream = images.stream(&name, StreamOptions::default()).await?;
//! ```

pub mod error;
pub mod peek;
pub mod range;
pub mod resolver;
pub mod root;
pub mod sniff;
pub mod store;
pub mod upload;

pub use error::{CleanupError, Result, StoreError};
pub use peek::PeekReader;
pub use range::{content_range, ContentRange};
pub use resolver::{sanitize, PathResolver};
pub use root::{
    StorageRoot, BUCKET_FILES, BUCKET_IMAGES, BUCKET_PROFILE, BUCKET_TMP, DEFAULT_STORAGE_ROOT,
    STORAGE_ROOT_ENV,
};
pub use sniff::{InferSniffer, Sniffer, OCTET_STREAM};
pub use store::{
    ContentSource, ContentStore, Encoding, ObjectStat, ObjectStream, ReadContent, StreamOptions,
    WriteContent, WriteOptions,
};
pub use upload::{StoredObject, UploadBatch};
