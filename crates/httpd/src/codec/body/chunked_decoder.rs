//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module decodes request bodies framed as
//! `(SIZE-in-hex CRLF chunk-bytes CRLF)* "0" CRLF CRLF`, a strict subset of
//! [RFC 7230 Section 4.1](https://tools.ietf.org/html/rfc7230#section-4.1):
//! chunk extensions and trailers are not supported. A size line carrying an
//! extension (`5;name=value`) is not a bare hex number and fails to decode.

use std::cmp;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncBufRead, AsyncRead, ReadBuf};
use tracing::trace;
use ChunkedState::*;

use crate::codec::body::BodyReader;
use crate::codec::line::{LineStatus, poll_read_line, trim_line_ending};
use crate::protocol::BodyError;

/// Upper bound for a chunk size line, terminator included.
const MAX_CHUNK_SIZE_LINE: usize = 1024;

/// A body stream decoding chunked transfer encoding.
///
/// Reads never cross a chunk boundary: a read returns at most the bytes left in
/// the current chunk. Once the terminal zero-size chunk and its CRLF have been
/// consumed, every read reports end-of-stream and nothing more is taken from the
/// connection.
pub struct ChunkedDecoder<'conn> {
    reader: BodyReader<'conn>,
    state: ChunkedState,
    /// Bytes left in the current chunk
    remaining_size: u64,
    /// Size line assembled across reads
    line: Vec<u8>,
    crlf: [u8; 2],
    crlf_len: usize,
    /// Once set, every further read fails with this error
    error: Option<BodyError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size line
    ReadSize,
    /// Stream the chunk data
    StreamData,
    /// Read the CRLF after chunk data
    ReadChunkCrlf,
    /// Read the CRLF after the zero-size chunk
    ReadFinalCrlf,
    /// Final state after reading last chunk
    Done,
}

impl<'conn> ChunkedDecoder<'conn> {
    /// Creates a new ChunkedDecoder instance.
    ///
    /// The decoder starts in the ReadSize state, ready to read the size of the first chunk.
    pub fn new(reader: BodyReader<'conn>) -> Self {
        Self { reader, state: ReadSize, remaining_size: 0, line: Vec::new(), crlf: [0; 2], crlf_len: 0, error: None }
    }

    /// Returns true once the terminal chunk has been consumed.
    pub fn is_done(&self) -> bool {
        self.state == Done
    }

    fn read_size(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<ChunkedState>> {
        match ready!(poll_read_line(&mut *self.reader, cx, &mut self.line, MAX_CHUNK_SIZE_LINE))? {
            LineStatus::Complete => {}
            LineStatus::Eof => return Poll::Ready(Err(BodyError::TruncatedChunks.into())),
            LineStatus::TooLong => {
                return Poll::Ready(Err(BodyError::ChunkSizeLineTooLong { max_size: MAX_CHUNK_SIZE_LINE }.into()));
            }
        }

        let size_line = trim_line_ending(&self.line);
        let size = std::str::from_utf8(size_line)
            .ok()
            .and_then(|s| u64::from_str_radix(s, 16).ok())
            .ok_or_else(|| BodyError::invalid_chunk_size(String::from_utf8_lossy(size_line)))?;
        self.line.clear();

        trace!(size, "read chunk size");
        self.remaining_size = size;
        if size == 0 { Poll::Ready(Ok(ReadFinalCrlf)) } else { Poll::Ready(Ok(StreamData)) }
    }

    fn fail(&mut self, e: &io::Error) {
        if let Some(body_error) = BodyError::from_io(e) {
            self.error = Some(body_error.clone());
        }
    }

    fn stream_data(&mut self, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let available = ready!(Pin::new(&mut *self.reader).poll_fill_buf(cx))?;
        if available.is_empty() {
            return Poll::Ready(Err(BodyError::TruncatedChunks.into()));
        }

        let remaining = usize::try_from(self.remaining_size).unwrap_or(usize::MAX);
        let len = cmp::min(cmp::min(remaining, available.len()), buf.remaining());
        buf.put_slice(&available[..len]);
        Pin::new(&mut *self.reader).consume(len);
        self.remaining_size -= len as u64;
        trace!(len, remaining = self.remaining_size, "read chunked bytes");

        if self.remaining_size == 0 {
            self.state = ReadChunkCrlf;
            // consume the chunk terminator before handing control back when it is already buffered;
            // a bad terminator is reported by the next read, this one already carries data
            match poll_crlf(&mut *self.reader, cx, &mut self.crlf, &mut self.crlf_len) {
                Poll::Ready(Ok(())) => self.state = ReadSize,
                Poll::Ready(Err(e)) => self.fail(&e),
                Poll::Pending => {}
            }
        }

        Poll::Ready(Ok(()))
    }
}

impl fmt::Debug for ChunkedDecoder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedDecoder")
            .field("state", &self.state)
            .field("remaining_size", &self.remaining_size)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for ChunkedDecoder<'_> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = &mut *self;
        if let Some(e) = &this.error {
            return Poll::Ready(Err(e.clone().into()));
        }

        let result = ready!(this.poll_decode(cx, buf));
        if let Err(e) = &result {
            this.fail(e);
        }
        Poll::Ready(result)
    }
}

impl ChunkedDecoder<'_> {
    fn poll_decode(&mut self, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        loop {
            match self.state {
                ReadSize => self.state = ready!(self.read_size(cx))?,
                StreamData => {
                    if buf.remaining() == 0 {
                        return Poll::Ready(Ok(()));
                    }
                    return self.stream_data(cx, buf);
                }
                ReadChunkCrlf => {
                    ready!(poll_crlf(&mut *self.reader, cx, &mut self.crlf, &mut self.crlf_len))?;
                    self.state = ReadSize;
                }
                ReadFinalCrlf => {
                    ready!(poll_crlf(&mut *self.reader, cx, &mut self.crlf, &mut self.crlf_len))?;
                    trace!("finished reading chunked data");
                    self.state = Done;
                }
                Done => return Poll::Ready(Ok(())),
            }
        }
    }
}

/// Consumes exactly two bytes and checks they are `\r\n`.
fn poll_crlf<R>(reader: &mut R, cx: &mut Context<'_>, crlf: &mut [u8; 2], crlf_len: &mut usize) -> Poll<io::Result<()>>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    while *crlf_len < crlf.len() {
        let available = ready!(Pin::new(&mut *reader).poll_fill_buf(cx))?;
        if available.is_empty() {
            return Poll::Ready(Err(BodyError::TruncatedChunks.into()));
        }

        let len = cmp::min(crlf.len() - *crlf_len, available.len());
        crlf[*crlf_len..*crlf_len + len].copy_from_slice(&available[..len]);
        Pin::new(&mut *reader).consume(len);
        *crlf_len += len;
    }

    *crlf_len = 0;
    if *crlf == *b"\r\n" { Poll::Ready(Ok(())) } else { Poll::Ready(Err(BodyError::InvalidChunkTerminator.into())) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, BufReader};

    #[tokio::test]
    async fn test_wikipedia() {
        let mut reader: &[u8] = b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\nGET / HTTP/1.1\r\n";

        let mut body = Vec::new();
        {
            let mut decoder = ChunkedDecoder::new(&mut reader);
            decoder.read_to_end(&mut body).await.unwrap();
            assert!(decoder.is_done());

            let mut buf = [0u8; 16];
            assert_eq!(decoder.read(&mut buf).await.unwrap(), 0);
        }

        assert_eq!(&body[..], b"Wikipedia");
        // nothing after the final CRLF is consumed
        assert_eq!(reader, b"GET / HTTP/1.1\r\n");
    }

    #[tokio::test]
    async fn test_reads_do_not_cross_chunks() {
        let mut reader: &[u8] = b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut buf = [0u8; 64];
        assert_eq!(decoder.read(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf[..4], b"Wiki");

        assert_eq!(decoder.read(&mut buf).await.unwrap(), 5);
        assert_eq!(&buf[..5], b"pedia");

        assert_eq!(decoder.read(&mut buf).await.unwrap(), 0);
        assert!(decoder.is_done());
    }

    #[tokio::test]
    async fn test_small_buffer() {
        let mut reader: &[u8] = b"a\r\n0123456789\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut buf = [0u8; 3];
        let mut body = Vec::new();
        loop {
            let n = decoder.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            assert!(n <= 3);
            body.extend_from_slice(&buf[..n]);
        }

        assert_eq!(&body[..], b"0123456789");
    }

    #[tokio::test]
    async fn test_split_across_fills() {
        // a tiny buffer splits size lines, data and terminators over several fills
        let mut reader = BufReader::with_capacity(2, &b"4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        decoder.read_to_end(&mut body).await.unwrap();

        assert_eq!(&body[..], b"Wikipedia");
    }

    #[tokio::test]
    async fn test_uppercase_hex() {
        let mut reader: &[u8] = b"A\r\n0123456789\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        decoder.read_to_end(&mut body).await.unwrap();

        assert_eq!(body.len(), 10);
    }

    #[tokio::test]
    async fn test_invalid_size() {
        let mut reader: &[u8] = b"zz\r\nWiki\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        let e = decoder.read_to_end(&mut body).await.unwrap_err();

        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert_eq!(BodyError::from_io(&e), Some(&BodyError::invalid_chunk_size("zz")));
    }

    #[tokio::test]
    async fn test_extension_is_rejected() {
        let mut reader: &[u8] = b"4;name=value\r\nWiki\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        let e = decoder.read_to_end(&mut body).await.unwrap_err();

        assert_eq!(BodyError::from_io(&e), Some(&BodyError::invalid_chunk_size("4;name=value")));
    }

    #[tokio::test]
    async fn test_missing_chunk_crlf() {
        let mut reader: &[u8] = b"4\r\nWikiXX5\r\npedia\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        let e = decoder.read_to_end(&mut body).await.unwrap_err();

        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert_eq!(BodyError::from_io(&e), Some(&BodyError::InvalidChunkTerminator));
        // the chunk data arrives before the error
        assert_eq!(&body[..], b"Wiki");
    }

    #[tokio::test]
    async fn test_bad_chunk_crlf_error_is_repeated() {
        let mut reader: &[u8] = b"4\r\nWikiXX5\r\npedia\r\n0\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut buf = [0u8; 16];
        assert_eq!(decoder.read(&mut buf).await.unwrap(), 4);
        assert_eq!(&buf[..4], b"Wiki");

        for _ in 0..2 {
            let e = decoder.read(&mut buf).await.unwrap_err();
            assert_eq!(BodyError::from_io(&e), Some(&BodyError::InvalidChunkTerminator));
        }
        assert!(!decoder.is_done());
    }

    #[tokio::test]
    async fn test_trailer_is_rejected() {
        let mut reader: &[u8] = b"4\r\nWiki\r\n0\r\nExpires: never\r\n\r\n";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        let e = decoder.read_to_end(&mut body).await.unwrap_err();

        assert_eq!(BodyError::from_io(&e), Some(&BodyError::InvalidChunkTerminator));
    }

    #[tokio::test]
    async fn test_truncated() {
        let mut reader: &[u8] = b"9\r\nWiki";
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        let e = decoder.read_to_end(&mut body).await.unwrap_err();

        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(BodyError::from_io(&e), Some(&BodyError::TruncatedChunks));
    }

    #[tokio::test]
    async fn test_size_line_too_long() {
        let mut wire = vec![b'0'; MAX_CHUNK_SIZE_LINE + 1];
        wire.extend_from_slice(b"\r\n");
        let mut reader = &wire[..];
        let mut decoder = ChunkedDecoder::new(&mut reader);

        let mut body = Vec::new();
        let e = decoder.read_to_end(&mut body).await.unwrap_err();

        assert_eq!(
            BodyError::from_io(&e),
            Some(&BodyError::ChunkSizeLineTooLong { max_size: MAX_CHUNK_SIZE_LINE })
        );
    }
}
