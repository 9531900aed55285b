//! Core HTTP protocol types.
//!
//! # Architecture
//!
//! - **Headers** ([`Headers`]): ordered multi-value header store, names matched exactly as received
//! - **Request Processing**: [`RequestHeader`] from the decoder, [`Request`] once a body is attached
//! - **Query and cookies** ([`query`]): string maps derived from the target and the `Cookie` headers
//! - **Response** ([`ResponseSink`]): raw bytes forwarded to the connection's output buffer
//! - **Message framing** ([`PayloadSize`]): how the request body is delimited
//! - **Error Handling**:
//!   - [`HttpError`]: Top-level error type of a connection
//!   - [`ParseError`]: Request line and header parsing errors
//!   - [`BodyError`]: Body decoding errors, seen by body readers as `io::Error`
//!   - [`SendError`]: Response sending errors

mod header;
pub use header::Headers;

mod message;
pub use message::PayloadSize;

pub mod query;

mod request;
pub use request::Request;
pub use request::RequestHeader;

mod response;
pub(crate) use response::lock_output;
pub use response::Output;
pub use response::ResponseSink;

mod error;
pub use error::BodyError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
