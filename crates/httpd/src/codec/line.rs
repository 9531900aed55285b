//! Line reading on top of a buffered reader.
//!
//! A line may be larger than the reader's internal buffer, so it is reassembled
//! across as many buffer fills as needed until the `\n` terminator shows up.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::AsyncBufRead;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum LineStatus {
    /// `line` ends with `\n`
    Complete,
    /// The reader reached end-of-stream; `line` holds whatever came before it
    Eof,
    /// The terminator was not found within `limit` bytes
    TooLong,
}

/// Appends bytes up to and including the next `\n` to `line`.
///
/// Safe to call again after `Poll::Pending`: bytes already moved into `line`
/// are consumed from the reader, so progress is kept in `line` itself.
pub(crate) fn poll_read_line<R>(
    reader: &mut R,
    cx: &mut Context<'_>,
    line: &mut Vec<u8>,
    limit: usize,
) -> Poll<io::Result<LineStatus>>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    loop {
        let available = ready!(Pin::new(&mut *reader).poll_fill_buf(cx))?;
        if available.is_empty() {
            return Poll::Ready(Ok(LineStatus::Eof));
        }

        let (found, used) = match available.iter().position(|b| *b == b'\n') {
            Some(index) => (true, index + 1),
            None => (false, available.len()),
        };

        if line.len() + used > limit {
            return Poll::Ready(Ok(LineStatus::TooLong));
        }

        line.extend_from_slice(&available[..used]);
        Pin::new(&mut *reader).consume(used);

        if found {
            return Poll::Ready(Ok(LineStatus::Complete));
        }
    }
}

/// Strips a trailing `\n` or `\r\n`.
pub(crate) fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::poll_fn;
    use tokio::io::{AsyncReadExt, BufReader};

    #[tokio::test]
    async fn reassembles_line_across_fills() {
        let mut reader = BufReader::with_capacity(4, &b"GET /index.html HTTP/1.1\r\nrest"[..]);
        let mut line = Vec::new();

        let status = poll_fn(|cx| poll_read_line(&mut reader, cx, &mut line, 1024)).await.unwrap();

        assert_eq!(status, LineStatus::Complete);
        assert_eq!(trim_line_ending(&line), b"GET /index.html HTTP/1.1");

        let mut rest = String::new();
        reader.read_to_string(&mut rest).await.unwrap();
        assert_eq!(rest, "rest");
    }

    #[tokio::test]
    async fn reports_eof_with_partial_line() {
        let mut reader: &[u8] = b"partial";
        let mut line = Vec::new();

        let status = poll_fn(|cx| poll_read_line(&mut reader, cx, &mut line, 1024)).await.unwrap();

        assert_eq!(status, LineStatus::Eof);
        assert_eq!(line, b"partial");
    }

    #[tokio::test]
    async fn stops_at_limit() {
        let mut reader: &[u8] = b"0123456789\r\n";
        let mut line = Vec::new();

        let status = poll_fn(|cx| poll_read_line(&mut reader, cx, &mut line, 8)).await.unwrap();
        assert_eq!(status, LineStatus::TooLong);

        // a terminator landing exactly on the limit is fine
        let mut reader: &[u8] = b"0123\r\n";
        let mut line = Vec::new();
        let status = poll_fn(|cx| poll_read_line(&mut reader, cx, &mut line, 6)).await.unwrap();
        assert_eq!(status, LineStatus::Complete);
    }

    #[test]
    fn trims_both_terminators() {
        assert_eq!(trim_line_ending(b"abc\r\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc\n"), b"abc");
        assert_eq!(trim_line_ending(b"abc"), b"abc");
        assert_eq!(trim_line_ending(b"\r\n"), b"");
    }
}
