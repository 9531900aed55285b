//! The `Expect: 100-continue` decorator.
//!
//! A client sending `Expect: 100-continue` waits for an interim response before
//! transmitting the body. The decorator writes that interim response the first
//! time the handler reads the body, and never again for the same request.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, ReadBuf};
use tracing::debug;

use crate::codec::body::Body;
use crate::protocol::{Output, lock_output};

pub(crate) const CONTINUE: &[u8] = b"HTTP/1.1 100 Continue\r\n\r\n";

/// Wraps another body stream and emits `HTTP/1.1 100 Continue` on first read.
pub struct ExpectContinue<'conn> {
    inner: Box<Body<'conn>>,
    output: &'conn Output<'conn>,
    /// Bytes of [`CONTINUE`] already handed to the output
    written: usize,
    sent: bool,
}

impl<'conn> ExpectContinue<'conn> {
    pub fn new(inner: Body<'conn>, output: &'conn Output<'conn>) -> Self {
        Self { inner: Box::new(inner), output, written: 0, sent: false }
    }

    /// Returns true once the interim response has been written and flushed.
    pub fn is_sent(&self) -> bool {
        self.sent
    }

    fn poll_send_continue(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut output = lock_output(self.output);
        while self.written < CONTINUE.len() {
            let n = ready!(Pin::new(&mut *output).poll_write(cx, &CONTINUE[self.written..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.written += n;
        }
        ready!(Pin::new(&mut *output).poll_flush(cx))?;

        self.sent = true;
        debug!("sent 100-continue interim response");
        Poll::Ready(Ok(()))
    }
}

impl fmt::Debug for ExpectContinue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpectContinue").field("inner", &self.inner).field("sent", &self.sent).finish_non_exhaustive()
    }
}

impl AsyncRead for ExpectContinue<'_> {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let this = &mut *self;
        if !this.sent {
            ready!(this.poll_send_continue(cx))?;
        }
        Pin::new(&mut *this.inner).poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;

    use crate::codec::body::LengthDecoder;

    #[tokio::test]
    async fn sends_continue_once_before_body() {
        let output = Mutex::new(Vec::<u8>::new());
        let mut reader: &[u8] = b"HelloWorld";

        {
            let inner = Body::from(LengthDecoder::new(&mut reader, 10));
            let mut body = ExpectContinue::new(inner, &output);
            assert!(!body.is_sent());

            let mut buf = [0u8; 5];
            body.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf, b"Hello");
            assert!(body.is_sent());
            assert_eq!(&output.lock().unwrap()[..], CONTINUE);

            body.read_exact(&mut buf).await.unwrap();
            assert_eq!(&buf, b"World");
            assert_eq!(body.read(&mut buf).await.unwrap(), 0);
        }

        assert_eq!(&output.into_inner().unwrap()[..], CONTINUE);
    }

    #[tokio::test]
    async fn nothing_written_without_read() {
        let output = Mutex::new(Vec::<u8>::new());
        let mut reader: &[u8] = b"Hello";

        {
            let inner = Body::from(LengthDecoder::new(&mut reader, 5));
            let body = ExpectContinue::new(inner, &output);
            drop(body);
        }

        assert!(output.into_inner().unwrap().is_empty());
    }
}
