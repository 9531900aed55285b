//! HTTP header decoder implementation for parsing the head of a request
//!
//! This module reads the request line and the header lines of a request from the
//! connection's buffered input and turns them into a [`RequestHeader`].
//!
//! # Wire format
//!
//! - Request line: `METHOD SP TARGET SP VERSION CRLF`, split on whitespace into
//!   exactly three tokens
//! - Headers: `Name:SP?Value CRLF` lines terminated by an empty line; the name
//!   is kept exactly as written, the value is trimmed
//! - A bare `LF` is accepted wherever `CRLF` is expected
//!
//! # Limits
//!
//! The request line and the header lines together, line terminators included,
//! may not exceed the configured number of bytes (1 MiB by default). The limit
//! does not apply to the body.

use std::future::poll_fn;

use http::{Method, Uri};
use tokio::io::AsyncBufRead;
use tracing::trace;

use crate::codec::line::{LineStatus, poll_read_line, trim_line_ending};
use crate::ensure;
use crate::protocol::{Headers, ParseError, RequestHeader};

/// Default maximum size in bytes for the request line plus headers
pub const DEFAULT_MAX_HEADER_BYTES: usize = 1 << 20;

/// Decoder for the request line and header lines of one request.
#[derive(Debug, Clone, Copy)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADER_BYTES)
    }
}

impl HeaderDecoder {
    pub fn new(max_header_bytes: usize) -> Self {
        Self { max_header_bytes }
    }

    /// Reads one request head from `reader`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(header))` if a complete head was read; `reader` is left at the first body byte
    /// - `Ok(None)` if the stream ended cleanly before a request started
    /// - `Err(ParseError)` if the head is malformed, too large, or the stream broke off inside it
    ///
    /// Empty lines in front of the request line are skipped.
    pub async fn decode<R>(&self, reader: &mut R) -> Result<Option<RequestHeader>, ParseError>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        let mut budget = self.max_header_bytes;
        let mut line = Vec::new();

        loop {
            if !self.read_head_line(reader, &mut line, &mut budget).await? {
                return Ok(None);
            }
            if !trim_line_ending(&line).is_empty() {
                break;
            }
        }

        let request_line = String::from_utf8_lossy(trim_line_ending(&line)).into_owned();
        let (method, request_uri, uri, proto) = parse_request_line(&request_line)?;

        let mut headers = Headers::new();
        loop {
            ensure!(self.read_head_line(reader, &mut line, &mut budget).await?, ParseError::UnexpectedEof);

            let header_line = trim_line_ending(&line);
            if header_line.is_empty() {
                break;
            }
            parse_header_line(header_line, &mut headers)?;
        }

        trace!(%method, target = request_uri, header_bytes = self.max_header_bytes - budget, "parsed request head");
        Ok(Some(RequestHeader::new(method, request_uri, uri, proto, headers)))
    }

    /// Reads the next line into `line`, charging it to `budget`.
    ///
    /// Returns `Ok(false)` only when the stream ended before any byte of the line.
    async fn read_head_line<R>(&self, reader: &mut R, line: &mut Vec<u8>, budget: &mut usize) -> Result<bool, ParseError>
    where
        R: AsyncBufRead + Unpin + ?Sized,
    {
        line.clear();
        let limit = *budget;
        let status = poll_fn(|cx| poll_read_line(&mut *reader, cx, &mut *line, limit)).await?;

        match status {
            LineStatus::Complete => {
                *budget -= line.len();
                Ok(true)
            }
            LineStatus::Eof if line.is_empty() => Ok(false),
            LineStatus::Eof => Err(ParseError::UnexpectedEof),
            LineStatus::TooLong => Err(ParseError::too_large_header(self.max_header_bytes)),
        }
    }
}

/// Splits a request line into method, target as written, parsed target and protocol version.
pub(crate) fn parse_request_line(line: &str) -> Result<(Method, String, Uri, String), ParseError> {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    ensure!(tokens.len() == 3, ParseError::invalid_request_line(line));

    let method = Method::from_bytes(tokens[0].as_bytes()).map_err(|_| ParseError::invalid_method(tokens[0]))?;
    let uri = parse_target(tokens[1])?;

    Ok((method, tokens[1].to_string(), uri, tokens[2].to_string()))
}

/// Parses a request target in origin-form (`/path?query`), absolute-form
/// (`http://host/path`) or asterisk-form (`*`).
///
/// Characters `http::Uri` refuses unescaped, such as `` ` `` in a path or `"` in a
/// query, make the target invalid even though lenient parsers let them through.
fn parse_target(target: &str) -> Result<Uri, ParseError> {
    let uri = target.parse::<Uri>().map_err(|_| ParseError::invalid_uri(target))?;

    let origin_form = uri.authority().is_none() && (uri.path().starts_with('/') || target == "*");
    ensure!(uri.scheme().is_some() || origin_form, ParseError::invalid_uri(target));

    Ok(uri)
}

/// Parses one `Name: value` line into `headers`.
///
/// A line whose `:` is its last byte carries no value and is skipped.
fn parse_header_line(line: &[u8], headers: &mut Headers) -> Result<(), ParseError> {
    let index = line.iter().position(|b| *b == b':').ok_or_else(|| ParseError::invalid_header("unsupported protocol"))?;
    if index == line.len() - 1 {
        return Ok(());
    }

    let name = String::from_utf8_lossy(&line[..index]).into_owned();
    let value = String::from_utf8_lossy(&line[index + 1..]);
    headers.add(name, value.trim());
    Ok(())
}
