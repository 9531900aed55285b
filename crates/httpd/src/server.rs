//! TCP listener that hands every accepted connection to its own task.
//!
//! ```no_run
//! use micro_httpd::handler::Handler;
//! use micro_httpd::protocol::{Request, ResponseSink};
//! use micro_httpd::server::Server;
//! use tokio::io::AsyncWriteExt;
//!
//! struct Ok200;
//!
//! #[async_trait::async_trait]
//! impl Handler for Ok200 {
//!     async fn serve(&self, sink: &mut ResponseSink<'_>, _request: &mut Request<'_>) {
//!         let _ = sink.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n").await;
//!     }
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::builder().address("127.0.0.1:8080").handler(Ok200).build()?;
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, info_span, warn};

use crate::connection::{ConnectionConfig, HttpConnection};
use crate::handler::Handler;

pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    handler: Option<Arc<dyn Handler>>,
    config: ConnectionConfig,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, handler: None, config: ConnectionConfig::default() }
    }

    /// Sets the address to listen on. Resolution failures are reported by [`ServerBuilder::build`].
    ///
    /// A string address needs a host, the host-less `":8080"` form is not portable.
    /// Use [`ServerBuilder::port`] to listen on every interface.
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(Iterator::collect));
        self
    }

    /// Listens on `port` of every IPv4 interface.
    pub fn port(self, port: u16) -> Self {
        self.address((Ipv4Addr::UNSPECIFIED, port))
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Limits the request line plus headers of every request, see [`ConnectionConfig::max_header_bytes`].
    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.config = self.config.max_header_bytes(max_header_bytes);
        self
    }

    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.config = self.config.read_buffer_size(read_buffer_size);
        self
    }

    pub fn write_buffer_size(mut self, write_buffer_size: usize) -> Self {
        self.config = self.config.write_buffer_size(write_buffer_size);
        self
    }

    pub fn connection_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(ServerBuildError::invalid_address)?;
        if address.is_empty() {
            return Err(ServerBuildError::invalid_address(io::Error::new(
                io::ErrorKind::InvalidInput,
                "address resolved to no socket address",
            )));
        }
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;

        Ok(Server { address, handler, config: self.config })
    }
}

pub struct Server {
    address: Vec<SocketAddr>,
    handler: Arc<dyn Handler>,
    config: ConnectionConfig,
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder").field("address", &self.address).field("config", &self.config).finish_non_exhaustive()
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("address", &self.address).field("config", &self.config).finish_non_exhaustive()
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("address must be set")]
    MissingAddress,
    #[error("handler must be set")]
    MissingHandler,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

impl ServerBuildError {
    fn invalid_address(source: io::Error) -> Self {
        Self::InvalidAddress { source }
    }
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Binds the configured address and accepts connections until the process ends.
    ///
    /// Only a bind failure returns.
    pub async fn start(self) -> io::Result<()> {
        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        self.serve(tcp_listener).await;
        Ok(())
    }

    /// Accepts connections from an already bound listener, forever.
    ///
    /// A failed accept is logged and skipped. Every connection is served on its
    /// own task, so a failing or panicking connection leaves the others alone.
    pub async fn serve(self, tcp_listener: TcpListener) {
        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let handler = Arc::clone(&self.handler);
            let config = self.config;
            let span = info_span!("connection", %remote_addr);

            tokio::spawn(
                async move {
                    let (reader, writer) = tcp_stream.into_split();
                    let connection = HttpConnection::with_config(reader, writer, config).with_remote_addr(remote_addr.to_string());
                    match connection.process(handler).await {
                        Ok(_) => {
                            info!("finished process, connection shutdown");
                        }
                        Err(e) => {
                            error!(cause = %e, "service has error, connection shutdown");
                        }
                    }
                }
                .instrument(span),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::protocol::{Request, ResponseSink};

    struct Noop;

    #[async_trait]
    impl Handler for Noop {
        async fn serve(&self, _sink: &mut ResponseSink<'_>, _request: &mut Request<'_>) {}
    }

    #[test]
    fn build_requires_address_and_handler() {
        assert!(matches!(Server::builder().handler(Noop).build(), Err(ServerBuildError::MissingAddress)));
        assert!(matches!(Server::builder().address("127.0.0.1:0").build(), Err(ServerBuildError::MissingHandler)));
    }

    #[test]
    fn build_rejects_unresolvable_address() {
        let result = Server::builder().address("not an address").handler(Noop).build();
        assert!(matches!(result, Err(ServerBuildError::InvalidAddress { .. })));
    }

    #[test]
    fn port_listens_on_every_interface() {
        let server = Server::builder().port(10086).handler(Noop).build().unwrap();
        assert_eq!(server.address(), &["0.0.0.0:10086".parse::<SocketAddr>().unwrap()]);
    }

    #[test]
    fn build_keeps_configuration() {
        let server = Server::builder().address("127.0.0.1:8080").handler(Noop).max_header_bytes(4096).read_buffer_size(1024).build().unwrap();

        assert_eq!(server.address(), &["127.0.0.1:8080".parse::<SocketAddr>().unwrap()]);
        assert_eq!(server.config().max_header_bytes, 4096);
        assert_eq!(server.config().read_buffer_size, 1024);
        assert_eq!(server.config().write_buffer_size, ConnectionConfig::default().write_buffer_size);
    }
}
