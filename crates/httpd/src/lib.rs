//! An asynchronous micro HTTP/1.1 server core
//!
//! This crate turns the byte stream of an accepted connection into a sequence of
//! requests and forwards whatever a handler writes back to the socket. It frames
//! request bodies (empty, `Content-Length`, chunked, `Expect: 100-continue`) and
//! leaves response framing entirely to the handler.
//!
//! # Features
//!
//! - Persistent connections, one request at a time
//! - Streaming request bodies read on demand by the handler
//! - Chunked transfer encoding
//! - Expect-continue mechanism
//! - Header size limit per request
//! - Handler panics confined to their connection
//!
//! # Example
//!
//! ```no_run
//! use micro_httpd::handler::Handler;
//! use micro_httpd::protocol::{Request, ResponseSink};
//! use micro_httpd::server::Server;
//! use tokio::io::{AsyncReadExt, AsyncWriteExt};
//! use tracing::{error, info, Level};
//! use tracing_subscriber::FmtSubscriber;
//!
//! struct HelloWorld;
//!
//! #[async_trait::async_trait]
//! impl Handler for HelloWorld {
//!     async fn serve(&self, sink: &mut ResponseSink<'_>, request: &mut Request<'_>) {
//!         info!(path = request.path(), "request path");
//!
//!         let mut body = Vec::new();
//!         if let Err(e) = request.body_mut().read_to_end(&mut body).await {
//!             error!(cause = %e, "can't read request body");
//!             return;
//!         }
//!
//!         let response_body = "Hello World!\r\n";
//!         let response = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{response_body}", response_body.len());
//!         if let Err(e) = sink.write_all(response.as_bytes()).await {
//!             error!(cause = %e, "can't write response");
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     let server = match Server::builder().address("127.0.0.1:8080").handler(HelloWorld).build() {
//!         Ok(server) => server,
//!         Err(e) => {
//!             error!(cause = %e, "invalid server configuration");
//!             return;
//!         }
//!     };
//!
//!     if let Err(e) = server.start().await {
//!         error!(cause = %e, "server stopped");
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`server`]: Listener accepting connections, one task each
//! - [`connection`]: Connection lifecycle: parse, dispatch, flush, drain, repeat
//! - [`codec`]: Request head parsing and body decoders
//! - [`protocol`]: Request, headers, response sink and error types
//! - [`handler`]: The request handler trait
//!
//! # Core Components
//!
//! ## Connection Handling
//!
//! The [`connection::HttpConnection`] type owns the buffered input and output of
//! one stream. Before the next request is parsed, the response bytes are flushed
//! and any request body the handler did not read is discarded, so the next request
//! starts at the right byte.
//!
//! ## Request Processing
//!
//! Requests are processed by types that implement the [`handler::Handler`] trait.
//! A handler gets the [`protocol::Request`] and a [`protocol::ResponseSink`] for
//! the duration of one call.
//!
//! ## Body Streaming
//!
//! Request bodies implement [`tokio::io::AsyncRead`] and are read straight from the
//! connection's input buffer. Nothing is buffered beyond what the handler asks for.
//!
//! ## Error Handling
//!
//! The crate uses custom error types that implement `std::error::Error`:
//!
//! - [`protocol::HttpError`]: Top-level error type
//! - [`protocol::ParseError`]: Request parsing errors
//! - [`protocol::BodyError`]: Body decoding errors
//! - [`protocol::SendError`]: Response sending errors
//!
//! # Limitations
//!
//! - HTTP/1.x only, no TLS
//! - Header names are matched exactly as received, not case-insensitively
//! - Query values are not percent-decoded
//! - Chunk extensions and trailers are rejected
//! - No connection timeouts

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
