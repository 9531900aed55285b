//! HTTP request body decoding.
//!
//! A request body is a stream read straight from the connection's buffered input.
//! Which strategy frames it is decided once per request from the method and the
//! headers, see [`crate::codec::RequestDecoder`].
//!
//! # Components
//!
//! - [`LengthDecoder`]: a stream capped at `Content-Length` bytes
//! - [`ChunkedDecoder`]: chunked transfer encoding
//! - [`ExpectContinue`]: writes `HTTP/1.1 100 Continue` before the first read of another body stream
//! - [`Body`]: the union of those plus the always-empty stream, handed to handlers
//!
//! Every strategy implements [`tokio::io::AsyncRead`]; a read that returns no
//! bytes means end-of-stream.

mod chunked_decoder;
mod continue_decoder;
mod length_decoder;

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncBufRead, AsyncRead, ReadBuf};

pub use chunked_decoder::ChunkedDecoder;
pub use continue_decoder::ExpectContinue;
pub use length_decoder::LengthDecoder;

#[cfg(test)]
pub(crate) use continue_decoder::CONTINUE;

use crate::protocol::{Output, PayloadSize};

/// The connection's buffered input as seen by a body decoder.
pub type BodyReader<'conn> = &'conn mut (dyn AsyncBufRead + Send + Unpin + 'conn);

/// The body stream of one request.
pub struct Body<'conn> {
    kind: Kind<'conn>,
}

enum Kind<'conn> {
    Empty,
    Length(LengthDecoder<'conn>),
    Chunked(ChunkedDecoder<'conn>),
    Continue(ExpectContinue<'conn>),
}

impl<'conn> Body<'conn> {
    /// A body whose every read reports end-of-stream immediately.
    pub fn empty() -> Self {
        Self { kind: Kind::Empty }
    }

    /// Installs the decoder matching `payload_size` on top of `reader`.
    pub fn new(payload_size: PayloadSize, reader: BodyReader<'conn>) -> Self {
        match payload_size {
            PayloadSize::Empty => Self::empty(),
            PayloadSize::Length(length) => LengthDecoder::new(reader, length).into(),
            PayloadSize::Chunked => ChunkedDecoder::new(reader).into(),
        }
    }

    /// Wraps this body so that the first read writes `HTTP/1.1 100 Continue` to `output`.
    #[must_use]
    pub fn expect_continue(self, output: &'conn Output<'conn>) -> Self {
        ExpectContinue::new(self, output).into()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::Empty)
    }

    /// Returns true while the body still owes the client its `100 Continue`.
    ///
    /// Until then the client may be holding the body back, so reading it to the
    /// end could wait forever.
    pub fn is_awaiting_continue(&self) -> bool {
        match &self.kind {
            Kind::Continue(decorator) => !decorator.is_sent(),
            _ => false,
        }
    }

    /// Reads the rest of the body and throws it away, returning the number of bytes discarded.
    pub async fn discard(&mut self) -> io::Result<u64> {
        tokio::io::copy(self, &mut tokio::io::sink()).await
    }
}

impl<'conn> From<LengthDecoder<'conn>> for Body<'conn> {
    fn from(decoder: LengthDecoder<'conn>) -> Self {
        Self { kind: Kind::Length(decoder) }
    }
}

impl<'conn> From<ChunkedDecoder<'conn>> for Body<'conn> {
    fn from(decoder: ChunkedDecoder<'conn>) -> Self {
        Self { kind: Kind::Chunked(decoder) }
    }
}

impl<'conn> From<ExpectContinue<'conn>> for Body<'conn> {
    fn from(decorator: ExpectContinue<'conn>) -> Self {
        Self { kind: Kind::Continue(decorator) }
    }
}

impl fmt::Debug for Body<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Empty => f.write_str("Body::Empty"),
            Kind::Length(decoder) => fmt::Debug::fmt(decoder, f),
            Kind::Chunked(decoder) => fmt::Debug::fmt(decoder, f),
            Kind::Continue(decorator) => fmt::Debug::fmt(decorator, f),
        }
    }
}

impl AsyncRead for Body<'_> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        match &mut self.kind {
            Kind::Empty => Poll::Ready(Ok(())),
            Kind::Length(decoder) => Pin::new(decoder).poll_read(cx, buf),
            Kind::Chunked(decoder) => Pin::new(decoder).poll_read(cx, buf),
            Kind::Continue(decorator) => Pin::new(decorator).poll_read(cx, buf),
        }
    }
}
