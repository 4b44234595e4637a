//! HTTP byte-range translation
//!
//! Ranges take the form `bytes=<start>-<end>`, with either bound optional.
//! A multi-range header is answered with its first range only; multipart
//! `byteranges` bodies are never produced.

use crate::{Result, StoreError};
use serde::Serialize;
use std::fmt;

/// A validated byte range over an object of known size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRange {
    /// First byte offset (inclusive)
    pub start: u64,
    /// Last byte offset (inclusive)
    pub end: u64,
    /// Number of bytes in the range
    pub chunk_size: u64,
    /// Total object size
    pub size: u64,
}

impl ContentRange {
    /// Value for the `Content-Range` response header
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes {}-{}/{}", self.start, self.end, self.size)
    }
}

fn unsatisfiable(range: &str) -> StoreError {
    StoreError::RangeNotSatisfiable(range.to_string())
}

fn parse_bound(raw: &str, range: &str) -> Result<Option<i128>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unsatisfiable(range));
    }
    raw.parse::<u64>()
        .map(|v| Some(v as i128))
        .map_err(|_| unsatisfiable(range))
}

/// Translate a `Range` header into a [`ContentRange`] for `size` bytes.
///
/// Checks run in a fixed order: missing or malformed header, both bounds
/// missing, suffix/open-end completion, then `start < 0`,
/// `start > size - 1`, `end > size - 1`, `start > end`.
pub fn content_range(range: Option<&str>, size: u64) -> Result<ContentRange> {
    let header = range.map(str::trim).unwrap_or_default();
    if header.is_empty() {
        return Err(unsatisfiable("<missing>"));
    }

    let ranges = header
        .strip_prefix("bytes=")
        .ok_or_else(|| unsatisfiable(header))?;
    let first = ranges.split_once(',').map_or(ranges, |(first, _)| first);
    let (start_raw, end_raw) = first.split_once('-').ok_or_else(|| unsatisfiable(header))?;

    let size_i = size as i128;
    let last = size_i - 1;

    let (start, end) = match (parse_bound(start_raw, header)?, parse_bound(end_raw, header)?) {
        (None, None) => return Err(unsatisfiable(header)),
        // last N bytes
        (None, Some(suffix)) => (size_i - suffix, last),
        (Some(start), None) => (start, last),
        (Some(start), Some(end)) => (start, end),
    };

    if start < 0 || start > last || end > last || start > end {
        return Err(unsatisfiable(header));
    }

    Ok(ContentRange {
        start: start as u64,
        end: end as u64,
        chunk_size: (end - start + 1) as u64,
        size,
    })
}
