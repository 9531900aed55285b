//! The request handler capability.
//!
//! A handler receives one request at a time together with a [`ResponseSink`].
//! It reads as much of the request body as it wants and writes a complete,
//! correctly framed HTTP response to the sink; the connection adds nothing.
//! Both arguments are borrowed for the duration of the call only.

use std::sync::Arc;

use async_trait::async_trait;

use crate::protocol::{Request, ResponseSink};

#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, sink: &mut ResponseSink<'_>, request: &mut Request<'_>);
}

#[async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    async fn serve(&self, sink: &mut ResponseSink<'_>, request: &mut Request<'_>) {
        (**self).serve(sink, request).await
    }
}

#[async_trait]
impl<H> Handler for Box<H>
where
    H: Handler + ?Sized,
{
    async fn serve(&self, sink: &mut ResponseSink<'_>, request: &mut Request<'_>) {
        (**self).serve(sink, request).await
    }
}
