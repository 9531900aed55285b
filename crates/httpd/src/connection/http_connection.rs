use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, error, info};

use crate::codec::RequestDecoder;
use crate::connection::ConnectionConfig;
use crate::handler::Handler;
use crate::protocol::{HttpError, Output, ParseError, ResponseSink, SendError};

/// An HTTP connection that serves requests one at a time over a single stream
///
/// `HttpConnection` handles the full lifecycle of an HTTP/1.1 connection:
/// - Reading and decoding request heads within the header size limit
/// - Handing each request to the handler together with a raw response sink
/// - Flushing the response and draining the unread part of the request body
/// - Rejecting malformed requests and closing the stream
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    reader: BufReader<R>,
    output: Mutex<BufWriter<W>>,
    decoder: RequestDecoder,
    remote_addr: String,
}

impl<R, W> fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection").field("remote_addr", &self.remote_addr).field("decoder", &self.decoder).finish_non_exhaustive()
    }
}

/// What happens to the connection once a request has been served
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Disposition {
    KeepAlive,
    Close,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Send + Unpin,
    W: AsyncWrite + Send + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, ConnectionConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: ConnectionConfig) -> Self {
        Self {
            reader: BufReader::with_capacity(config.read_buffer_size, reader),
            output: Mutex::new(BufWriter::with_capacity(config.write_buffer_size, writer)),
            decoder: RequestDecoder::new(config.max_header_bytes),
            remote_addr: String::new(),
        }
    }

    /// Sets the peer address reported by [`Request::remote_addr`](crate::protocol::Request::remote_addr).
    pub fn with_remote_addr<S: Into<String>>(mut self, remote_addr: S) -> Self {
        self.remote_addr = remote_addr.into();
        self
    }

    /// Serves requests until the peer closes the stream or an error ends the connection.
    ///
    /// Returns `Ok(())` when the peer closed the stream between requests.
    ///
    /// Body bytes the handler left unread are drained before the next request is parsed;
    /// a body still owing its `100 Continue` sends it at that point.
    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + ?Sized,
    {
        loop {
            match self.serve_one(handler.as_ref()).await? {
                Disposition::KeepAlive => {}
                Disposition::Close => return Ok(()),
            }
        }
    }

    async fn serve_one<H>(&mut self, handler: &H) -> Result<Disposition, HttpError>
    where
        H: Handler + ?Sized,
    {
        let output: &Output<'_> = &self.output;

        let mut request = match self.decoder.decode(&mut self.reader, output, &self.remote_addr).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                info!("cant read more request, break this connection down");
                return Ok(Disposition::Close);
            }
            Err(e) => {
                error!(cause = %e, "can't receive next request, closing connection");
                if !e.is_io() {
                    // the connection is closed either way, a failed rejection changes nothing
                    if let Err(send_error) = send_rejection(output, rejection_status(&e)).await {
                        debug!(cause = %send_error, "failed to send rejection response");
                    }
                }
                return Err(e.into());
            }
        };

        let mut sink = ResponseSink::new(output);
        if let Err(panic) = AssertUnwindSafe(handler.serve(&mut sink, &mut request)).catch_unwind().await {
            let message = panic_message(&*panic);
            error!(message, "request handler panicked, closing connection");
            return Err(HttpError::handler_panic(message));
        }

        sink.flush().await.map_err(SendError::io)?;

        let discarded = request.body_mut().discard().await.map_err(ParseError::io)?;
        if discarded > 0 {
            debug!(discarded, "skipped request body unread by handler");
        }

        Ok(Disposition::KeepAlive)
    }
}

fn rejection_status(e: &ParseError) -> StatusCode {
    match e {
        ParseError::TooLargeHeader { .. } => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    }
}

async fn send_rejection<'conn>(output: &'conn Output<'conn>, status: StatusCode) -> Result<(), SendError> {
    let response = format!(
        "HTTP/1.1 {} {}\r\nConnection: close\r\nContent-Length: 0\r\n\r\n",
        status.as_str(),
        status.canonical_reason().unwrap_or_default()
    );

    let mut sink = ResponseSink::new(output);
    sink.write_all(response.as_bytes()).await?;
    sink.flush().await?;
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
