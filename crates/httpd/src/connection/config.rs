use crate::codec::DEFAULT_MAX_HEADER_BYTES;

/// Default capacity of the read and write buffers of a connection
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Per-connection limits and buffer sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Maximum size of the request line plus headers of one request, line terminators included
    pub max_header_bytes: usize,
    pub read_buffer_size: usize,
    pub write_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            read_buffer_size: DEFAULT_BUFFER_SIZE,
            write_buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ConnectionConfig {
    pub fn max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    pub fn write_buffer_size(mut self, write_buffer_size: usize) -> Self {
        self.write_buffer_size = write_buffer_size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.max_header_bytes, 1 << 20);
        assert_eq!(config.read_buffer_size, 8 * 1024);
        assert_eq!(config.write_buffer_size, 8 * 1024);
    }

    #[test]
    fn setters_chain() {
        let config = ConnectionConfig::default().max_header_bytes(512).read_buffer_size(64);
        assert_eq!(config.max_header_bytes, 512);
        assert_eq!(config.read_buffer_size, 64);
        assert_eq!(config.write_buffer_size, DEFAULT_BUFFER_SIZE);
    }
}
