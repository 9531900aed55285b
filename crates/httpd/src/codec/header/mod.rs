//! HTTP request head decoding
//!
//! # Components
//!
//! - [`HeaderDecoder`]: reads the request line and header lines from buffered input
//!   - Splits the request line into method, target and protocol
//!   - Keeps header names exactly as written, trims values
//!   - Enforces the header size limit

mod header_decoder;

pub use header_decoder::DEFAULT_MAX_HEADER_BYTES;
pub use header_decoder::HeaderDecoder;
