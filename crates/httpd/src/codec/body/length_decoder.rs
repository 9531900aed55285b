//! Decoder implementation for HTTP messages with Content-Length header.
//!
//! This module provides functionality to decode HTTP messages where the payload size
//! is specified by the Content-Length header, as defined in
//! [RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2).

use std::cmp;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, ReadBuf};

use crate::codec::body::BodyReader;
use crate::protocol::BodyError;

/// A body stream capped at a known content length.
///
/// Reads never go past the last body byte, so the connection's buffered input is
/// left positioned at the start of whatever follows (the next request on a
/// persistent connection).
pub struct LengthDecoder<'conn> {
    reader: BodyReader<'conn>,
    /// The number of bytes remaining to be read from the payload
    remaining: u64,
}

impl<'conn> LengthDecoder<'conn> {
    /// Creates a new LengthDecoder instance.
    ///
    /// # Arguments
    /// * `reader` - The connection's buffered input, positioned at the first body byte
    /// * `length` - The total content length to decode, specified by Content-Length header
    pub fn new(reader: BodyReader<'conn>, length: u64) -> Self {
        Self { reader, remaining: length }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl fmt::Debug for LengthDecoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LengthDecoder").field("remaining", &self.remaining).finish_non_exhaustive()
    }
}

impl AsyncRead for LengthDecoder<'_> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = &mut *self;
        if this.remaining == 0 || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        let available = ready!(Pin::new(&mut *this.reader).poll_fill_buf(cx))?;
        if available.is_empty() {
            return Poll::Ready(Err(BodyError::UnexpectedEof { remaining: this.remaining }.into()));
        }

        // Read the minimum of remaining length, available bytes and caller capacity
        let remaining = usize::try_from(this.remaining).unwrap_or(usize::MAX);
        let len = cmp::min(cmp::min(remaining, available.len()), buf.remaining());
        buf.put_slice(&available[..len]);

        Pin::new(&mut *this.reader).consume(len);
        this.remaining -= len as u64;
        Poll::Ready(Ok(()))
    }
}
