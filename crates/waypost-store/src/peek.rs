//! Lookahead reader
//!
//! [`PeekReader`] buffers the first bytes of an underlying reader so they can
//! be inspected, then replays them to whoever reads the stream afterwards.

use bytes::{Buf, Bytes, BytesMut};
use futures::Stream;
use pin_project_lite::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

/// Chunk size used when turning a reader into a byte stream (64 KB)
pub const STREAM_CHUNK_SIZE: usize = 64 * 1024;

pin_project! {
    /// Reader with a replayable lookahead buffer
    #[derive(Debug)]
    pub struct PeekReader<R> {
        #[pin]
        inner: R,
        buffer: BytesMut,
        eof: bool,
    }
}

impl<R> PeekReader<R> {
    /// Wrap a reader
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: BytesMut::new(),
            eof: false,
        }
    }

    /// Bytes peeked but not yet consumed
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }
}

impl<R: AsyncRead + Unpin> PeekReader<R> {
    /// Look at up to `len` leading bytes without consuming them.
    ///
    /// Returns fewer bytes only when the reader ends first.
    pub async fn peek(&mut self, len: usize) -> io::Result<&[u8]> {
        while self.buffer.len() < len && !self.eof {
            let mut chunk = vec![0u8; len - self.buffer.len()];
            let n = self.inner.read(&mut chunk).await?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buffer.extend_from_slice(&chunk[..n]);
            }
        }
        let end = len.min(self.buffer.len());
        Ok(&self.buffer[..end])
    }
}

impl<R: AsyncRead + Unpin + Send + 'static> PeekReader<R> {
    /// Convert into a stream of chunks, paced by the consumer
    pub fn into_byte_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        futures::stream::unfold(Some(self), |state| async move {
            let mut reader = state?;
            let mut chunk = BytesMut::with_capacity(STREAM_CHUNK_SIZE);
            match reader.read_buf(&mut chunk).await {
                Ok(0) => None,
                Ok(_) => Some((Ok(chunk.freeze()), Some(reader))),
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

impl<R: AsyncRead> AsyncRead for PeekReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.project();
        if !this.buffer.is_empty() {
            let n = this.buffer.len().min(buf.remaining());
            buf.put_slice(&this.buffer[..n]);
            this.buffer.advance(n);
            return Poll::Ready(Ok(()));
        }
        this.inner.poll_read(cx, buf)
    }
}
