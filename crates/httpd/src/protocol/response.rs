//! The raw response byte sink handed to handlers.
//!
//! There is no status-line or header serialization here: whatever a handler
//! writes is forwarded verbatim to the connection's output buffer, which the
//! connection flushes once the handler returns.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

/// The buffered output of one connection.
///
/// It is shared between the [`ResponseSink`] and the `100 Continue` decorator of
/// the request body. The lock is only ever taken inside `poll_*` calls, so it is
/// never contended and never held across an `.await`.
pub type Output<'conn> = Mutex<dyn AsyncWrite + Send + Unpin + 'conn>;

pub(crate) fn lock_output<'a, 'conn>(
    output: &'a Output<'conn>,
) -> MutexGuard<'a, dyn AsyncWrite + Send + Unpin + 'conn> {
    output.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Forwards raw bytes to the connection's buffered output.
///
/// Use it through [`tokio::io::AsyncWriteExt`]:
///
/// ```no_run
/// # use micro_httpd::protocol::ResponseSink;
/// # async fn respond(sink: &mut ResponseSink<'_>) -> std::io::Result<()> {
/// use tokio::io::AsyncWriteExt;
///
/// sink.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok").await?;
/// # Ok(())
/// # }
/// ```
///
/// Shutting the sink down only flushes it; the socket belongs to the connection.
pub struct ResponseSink<'conn> {
    output: &'conn Output<'conn>,
}

impl<'conn> ResponseSink<'conn> {
    pub fn new(output: &'conn Output<'conn>) -> Self {
        Self { output }
    }
}

impl fmt::Debug for ResponseSink<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseSink").finish_non_exhaustive()
    }
}

impl AsyncWrite for ResponseSink<'_> {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let mut output = lock_output(self.output);
        Pin::new(&mut *output).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut output = lock_output(self.output);
        Pin::new(&mut *output).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.poll_flush(cx)
    }
}
