//! HTTP request decoder module
//!
//! This module turns the connection's buffered input into one [`Request`] at a time.
//!
//! # Components
//!
//! - [`RequestDecoder`]: decodes the request head and installs the body decoder
//! - Header parsing: uses [`HeaderDecoder`] for the request line and headers
//! - Payload selection: [`parse_payload`] decides how the body is framed
//!
//! # Body framing
//!
//! | Request                                   | Body                           |
//! |-------------------------------------------|--------------------------------|
//! | method other than POST or PUT             | always empty                   |
//! | `Transfer-Encoding: chunked`              | [`ChunkedDecoder`]             |
//! | `Content-Length: n`                       | [`LengthDecoder`] capped at `n`|
//! | no or unparsable `Content-Length`         | always empty                   |
//!
//! A non-empty body of a request carrying `Expect: 100-continue` is wrapped in
//! [`ExpectContinue`].
//!
//! [`ChunkedDecoder`]: crate::codec::ChunkedDecoder
//! [`LengthDecoder`]: crate::codec::LengthDecoder
//! [`ExpectContinue`]: crate::codec::ExpectContinue

use tracing::{debug, warn};

use crate::codec::body::{Body, BodyReader};
use crate::codec::header::{DEFAULT_MAX_HEADER_BYTES, HeaderDecoder};
use crate::protocol::{Output, ParseError, PayloadSize, Request, RequestHeader};

const TRANSFER_ENCODING: &str = "Transfer-Encoding";
const CONTENT_LENGTH: &str = "Content-Length";
const EXPECT: &str = "Expect";

/// A decoder for HTTP requests that handles both the head and the body framing
#[derive(Debug, Clone, Copy)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEADER_BYTES)
    }
}

impl RequestDecoder {
    /// Creates a decoder whose request line plus headers may span at most `max_header_bytes`.
    pub fn new(max_header_bytes: usize) -> Self {
        Self { header_decoder: HeaderDecoder::new(max_header_bytes) }
    }

    /// Decodes the next request from `reader`.
    ///
    /// The returned request borrows `reader` for its body and `output` for a
    /// possible `100 Continue`, so it has to be dropped before the next call.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: a request head was read and its body decoder installed
    /// - `Ok(None)`: the peer closed the stream before starting another request
    /// - `Err(_)`: the head was malformed or the stream failed
    pub async fn decode<'conn>(
        &self,
        reader: BodyReader<'conn>,
        output: &'conn Output<'conn>,
        remote_addr: &str,
    ) -> Result<Option<Request<'conn>>, ParseError> {
        let Some(header) = self.header_decoder.decode(&mut *reader).await? else {
            return Ok(None);
        };

        let payload_size = parse_payload(&header);
        debug!(method = %header.method(), target = header.request_uri(), ?payload_size, "decoded request");

        let continue_expected = expects_continue(&header);
        let mut body = Body::new(payload_size, reader);
        if continue_expected && !payload_size.is_empty() {
            body = body.expect_continue(output);
        }

        Ok(Some(header.body(body, remote_addr)))
    }
}

/// Decides how the body of the request described by `header` is framed.
pub fn parse_payload(header: &RequestHeader) -> PayloadSize {
    if !header.need_body() {
        return PayloadSize::Empty;
    }

    let headers = header.headers();
    if headers.get(TRANSFER_ENCODING) == "chunked" {
        return PayloadSize::Chunked;
    }

    let content_length = headers.get(CONTENT_LENGTH);
    if content_length.is_empty() {
        return PayloadSize::Empty;
    }

    match content_length.parse::<u64>() {
        Ok(length) => PayloadSize::Length(length),
        Err(e) => {
            warn!(content_length, cause = %e, "unparsable Content-Length, reading no body");
            PayloadSize::Empty
        }
    }
}

fn expects_continue(header: &RequestHeader) -> bool {
    header.headers().get(EXPECT) == "100-continue"
}
