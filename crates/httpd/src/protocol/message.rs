/// Represents how the body of a request is delimited on the wire.
///
/// This enum is used to determine which body decoder is installed:
/// - Known length: read exactly that many bytes
/// - Chunked: decode chunked transfer encoding
/// - Empty: no body, every read reports end-of-stream
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    Empty,
}

impl PayloadSize {
    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }

    /// Returns true if the payload has a fixed length
    #[inline]
    pub fn is_fix_length(&self) -> bool {
        matches!(self, PayloadSize::Length(_))
    }
}
