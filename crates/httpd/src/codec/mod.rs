//! HTTP codec module for decoding requests from a connection's buffered input
//!
//! Decoding is pull based: the connection asks the [`RequestDecoder`] for the next
//! request, and the handler pulls body bytes through [`Body`] as it needs them.
//! Nothing is read from the socket that the current request does not need.
//!
//! # Architecture
//!
//! - Request head:
//!   - [`RequestDecoder`]: decodes one request and installs its body decoder
//!   - [`HeaderDecoder`]: request line and header lines, with a size limit
//!
//! - Request body via the [`body`] module:
//!   - [`LengthDecoder`]: `Content-Length` framing
//!   - [`ChunkedDecoder`]: chunked transfer encoding
//!   - [`ExpectContinue`]: the `100 Continue` interim response
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Mutex;
//! use micro_httpd::codec::RequestDecoder;
//! use tokio::io::{AsyncReadExt, BufReader};
//!
//! # async fn decode() -> Result<(), Box<dyn std::error::Error>> {
//! let wire: &[u8] = b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
//! let mut reader = BufReader::new(wire);
//! let output = Mutex::new(Vec::<u8>::new());
//!
//! let decoder = RequestDecoder::default();
//! if let Some(mut request) = decoder.decode(&mut reader, &output, "127.0.0.1:1").await? {
//!     let mut body = String::new();
//!     request.body_mut().read_to_string(&mut body).await?;
//!     assert_eq!(body, "hello");
//! }
//! # Ok(())
//! # }
//! ```

pub mod body;
mod header;
pub(crate) mod line;
mod request_decoder;

pub use body::{Body, BodyReader, ChunkedDecoder, ExpectContinue, LengthDecoder};
pub use header::{DEFAULT_MAX_HEADER_BYTES, HeaderDecoder};
pub use request_decoder::{RequestDecoder, parse_payload};
