use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("handler panicked: {message}")]
    HandlerPanic { message: String },
}

impl HttpError {
    pub fn handler_panic<S: ToString>(message: S) -> Self {
        Self::HandlerPanic { message: message.to_string() }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, exceed the limit {max_size}")]
    TooLargeHeader { max_size: usize },

    #[error("invalid request line: {line:?}")]
    InvalidRequestLine { line: String },

    #[error("invalid http method: {method:?}")]
    InvalidMethod { method: String },

    #[error("invalid http uri: {uri:?}")]
    InvalidUri { uri: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("connection closed in the middle of the request head")]
    UnexpectedEof,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(max_size: usize) -> Self {
        Self::TooLargeHeader { max_size }
    }

    pub fn invalid_request_line<S: ToString>(line: S) -> Self {
        Self::InvalidRequestLine { line: line.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_uri<S: ToString>(uri: S) -> Self {
        Self::InvalidUri { uri: uri.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Whether the failure came from the socket rather than from the bytes the peer sent.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::UnexpectedEof)
    }
}

/// Failures while decoding a request body.
///
/// Body decoders are [`tokio::io::AsyncRead`] implementations, so these reach the
/// reader wrapped in an [`io::Error`]; use [`BodyError::from_io`] to get them back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    #[error("invalid chunk size line: {line:?}")]
    InvalidChunkSize { line: String },

    #[error("unsupported encoding format of chunk")]
    InvalidChunkTerminator,

    #[error("chunk size line exceed the limit {max_size}")]
    ChunkSizeLineTooLong { max_size: usize },

    #[error("connection closed with {remaining} body bytes outstanding")]
    UnexpectedEof { remaining: u64 },

    #[error("connection closed before the last chunk")]
    TruncatedChunks,
}

impl BodyError {
    pub fn invalid_chunk_size<S: ToString>(line: S) -> Self {
        Self::InvalidChunkSize { line: line.to_string() }
    }

    pub fn from_io(e: &io::Error) -> Option<&BodyError> {
        e.get_ref().and_then(|inner| inner.downcast_ref::<BodyError>())
    }
}

impl From<BodyError> for io::Error {
    fn from(e: BodyError) -> Self {
        let kind = match e {
            BodyError::UnexpectedEof { .. } | BodyError::TruncatedChunks => io::ErrorKind::UnexpectedEof,
            _ => io::ErrorKind::InvalidData,
        };
        io::Error::new(kind, e)
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_error_survives_io_wrapping() {
        let e: io::Error = BodyError::InvalidChunkTerminator.into();
        assert_eq!(e.kind(), io::ErrorKind::InvalidData);
        assert_eq!(BodyError::from_io(&e), Some(&BodyError::InvalidChunkTerminator));

        let e: io::Error = BodyError::UnexpectedEof { remaining: 3 }.into();
        assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof);

        let plain = io::Error::other("boom");
        assert_eq!(BodyError::from_io(&plain), None);
    }

    #[test]
    fn io_failures_are_distinguished() {
        assert!(ParseError::UnexpectedEof.is_io());
        assert!(ParseError::io(io::Error::from(io::ErrorKind::ConnectionReset)).is_io());
        assert!(!ParseError::invalid_header("unsupported protocol").is_io());
    }
}
