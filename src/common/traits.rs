use crate::{PeerError, Result};

/// Largest length prefix [`StreamPeer::get_utf8_string`] accepts, in bytes
pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

/// Generic byte-stream peer
///
/// This trait defines the capability a host expects from any stream
/// implementation: full and partial reads and writes, plus a query for
/// how many bytes can be read without blocking. Callers hold peers as
/// `dyn StreamPeer` or through generics and never depend on the concrete
/// transport.
pub trait StreamPeer {
    /// Fills `buffer` completely, blocking until every byte has arrived
    fn get_data(&mut self, buffer: &mut [u8]) -> Result<()>;

    /// Receives at most `buffer.len()` bytes and returns how many were read
    fn get_partial_data(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Sends all of `data`
    fn put_data(&mut self, data: &[u8]) -> Result<()>;

    /// Sends a prefix of `data` and returns its length
    fn put_partial_data(&mut self, data: &[u8]) -> Result<usize>;

    /// Bytes ready to be read, or -1 if the peer is not open
    fn get_available_bytes(&self) -> i32;

    /// Sends a string as a little-endian u32 byte length followed by its UTF-8 bytes
    fn put_utf8_string(&mut self, value: &str) -> Result<()> {
        let len = u32::try_from(value.len()).map_err(|_| {
            PeerError::InvalidParameter(format!(
                "string of {} bytes does not fit a u32 length prefix",
                value.len()
            ))
        })?;
        self.put_data(&len.to_le_bytes())?;
        self.put_data(value.as_bytes())
    }

    /// Reads a string written by [`StreamPeer::put_utf8_string`]
    ///
    /// A prefix above [`MAX_STRING_LEN`] is rejected before anything is
    /// allocated; the string body is left unread.
    fn get_utf8_string(&mut self) -> Result<String> {
        let mut len = [0u8; 4];
        self.get_data(&mut len)?;
        let len = u32::from_le_bytes(len) as usize;
        if len > MAX_STRING_LEN {
            return Err(PeerError::InvalidParameter(format!(
                "string length {len} exceeds the {MAX_STRING_LEN} byte limit"
            )));
        }
        let mut bytes = vec![0u8; len];
        self.get_data(&mut bytes)?;
        Ok(String::from_utf8(bytes)?)
    }
}
