//! HTTP connection handling module
//!
//! # Components
//!
//! - [`HttpConnection`]: owns the buffered input and output of one accepted stream
//!   and serves requests on it one after another:
//!   - parse the next request head and install its body decoder
//!   - dispatch it to the [`Handler`](crate::handler::Handler)
//!   - flush the response bytes, then drain whatever body the handler left unread
//!   - repeat until the peer closes the stream or something fails
//! - [`ConnectionConfig`]: header size limit and buffer capacities
//!
//! A malformed request is answered with `400 Bad Request` (or `431` when the head
//! is too large) and the connection is closed. A panicking handler closes its
//! connection only.

mod config;
mod http_connection;

pub use config::ConnectionConfig;
pub use config::DEFAULT_BUFFER_SIZE;
pub use http_connection::HttpConnection;
