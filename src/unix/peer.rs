use crate::common::StreamPeer;
use crate::network::{UnixAddress, sys};
use crate::unix::UnixPeerConfig;
use crate::{PeerError, Result};
use std::io;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Unix domain stream socket exposed as a byte-stream peer
///
/// A peer starts closed, becomes open after a successful [`open`], and
/// returns to closed on [`close`], on drop, or when the remote end goes
/// away. Blocking mode is chosen before opening and stays fixed for the
/// lifetime of the connection.
///
/// # Examples
///
/// ```no_run
/// use streampeer::{StreamPeer, UnixStreamPeer};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut peer = UnixStreamPeer::new();
///     peer.open("/tmp/app.sock")?;
///
///     peer.put_data(b"hello")?;
///     let mut reply = [0u8; 5];
///     peer.get_data(&mut reply)?;
///
///     peer.close();
///     Ok(())
/// }
/// ```
///
/// [`open`]: UnixStreamPeer::open
/// [`close`]: UnixStreamPeer::close
#[derive(Debug)]
pub struct UnixStreamPeer {
    socket: Option<OwnedFd>,
    remote: Option<UnixAddress>,
    blocking: bool,
    path: PathBuf,
}

impl Default for UnixStreamPeer {
    fn default() -> Self {
        Self::new()
    }
}

impl UnixStreamPeer {
    /// Creates a closed peer in blocking mode
    pub fn new() -> Self {
        Self {
            socket: None,
            remote: None,
            blocking: true,
            path: PathBuf::new(),
        }
    }

    /// Creates a peer with the configured blocking mode and opens it
    pub fn connect(config: &UnixPeerConfig) -> Result<Self> {
        let mut peer = Self::new();
        peer.set_blocking_mode(config.blocking)?;
        peer.open(&config.socket_path)?;
        Ok(peer)
    }

    /// Connects to the listening socket at `path`
    ///
    /// On any failure the peer stays closed and no descriptor is leaked.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.is_open() {
            return Err(PeerError::AlreadyInUse);
        }

        let address = UnixAddress::new(path)?;
        let socket = sys::socket().map_err(PeerError::CantCreate)?;

        // Dropping `socket` on the error paths below releases it
        sys::connect(&socket, &address).map_err(|source| PeerError::CantConnect {
            path: path.to_path_buf(),
            source,
        })?;
        if !self.blocking {
            sys::set_nonblocking(&socket).map_err(PeerError::CantConfigure)?;
        }

        debug!(
            path = %path.display(),
            fd = socket.as_raw_fd(),
            blocking = self.blocking,
            "Opened Unix stream peer"
        );

        self.socket = Some(socket);
        self.remote = Some(address);
        self.path = path.to_path_buf();
        Ok(())
    }

    /// Releases the socket; does nothing if the peer is already closed
    pub fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            debug!(path = %self.path.display(), fd = socket.as_raw_fd(), "Closing Unix stream peer");
            sys::close(socket);
            self.remote = None;
            self.path = PathBuf::new();
        }
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    /// Path passed to [`UnixStreamPeer::open`], empty while closed
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Address of the connected endpoint, if open
    pub fn remote_address(&self) -> Option<&UnixAddress> {
        self.remote.as_ref()
    }

    /// Raw descriptor of the open socket, for callers that poll it themselves
    pub fn descriptor(&self) -> Option<RawFd> {
        self.socket.as_ref().map(AsRawFd::as_raw_fd)
    }

    /// Selects blocking mode for the next connection
    ///
    /// Fails with [`PeerError::AlreadyInUse`] while open.
    pub fn set_blocking_mode(&mut self, value: bool) -> Result<()> {
        if self.is_open() {
            return Err(PeerError::AlreadyInUse);
        }
        self.blocking = value;
        Ok(())
    }

    pub fn is_blocking_mode_enabled(&self) -> bool {
        self.blocking
    }

    fn fd(&self) -> Result<RawFd> {
        self.descriptor().ok_or(PeerError::Unconfigured)
    }

    fn remote_closed(&mut self) -> PeerError {
        warn!(path = %self.path.display(), "Connection closed by remote peer");
        self.close();
        PeerError::Eof
    }

    /// Closes the peer first if `err` means the connection is gone
    fn close_if_broken(&mut self, err: &io::Error) {
        if sys::is_broken(err) {
            warn!(path = %self.path.display(), error = %err, "Connection broken");
            self.close();
        }
    }
}

impl StreamPeer for UnixStreamPeer {
    fn get_data(&mut self, buffer: &mut [u8]) -> Result<()> {
        let fd = self.fd()?;
        if buffer.is_empty() {
            return Ok(());
        }
        let received = match sys::recv(fd, buffer, true) {
            Ok(received) => received,
            Err(e) => {
                self.close_if_broken(&e);
                return Err(PeerError::CantRead(e));
            }
        };
        trace!(fd, received, requested = buffer.len(), "get_data");

        if received == 0 {
            return Err(self.remote_closed());
        }
        if received != buffer.len() {
            return Err(PeerError::Failed {
                expected: buffer.len(),
                received,
            });
        }
        Ok(())
    }

    fn get_partial_data(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let fd = self.fd()?;
        if buffer.is_empty() {
            return Ok(0);
        }
        match sys::recv(fd, buffer, false) {
            Ok(0) => Err(self.remote_closed()),
            Ok(received) => {
                trace!(fd, received, requested = buffer.len(), "get_partial_data");
                Ok(received)
            }
            // Live but idle non-blocking socket
            Err(e) if sys::is_would_block(&e) => Ok(0),
            Err(e) => {
                self.close_if_broken(&e);
                Err(PeerError::CantRead(e))
            }
        }
    }

    fn put_data(&mut self, data: &[u8]) -> Result<()> {
        self.fd()?;

        let mut sent = 0;
        while sent < data.len() {
            let written = self.put_partial_data(&data[sent..])?;
            if written == 0 {
                // Non-blocking socket with a full send buffer
                sys::wait_writable(self.fd()?).map_err(PeerError::CantWrite)?;
            }
            sent += written;
        }
        Ok(())
    }

    fn put_partial_data(&mut self, data: &[u8]) -> Result<usize> {
        let fd = self.fd()?;
        if data.is_empty() {
            return Ok(0);
        }
        match sys::send(fd, data) {
            Ok(0) => Err(self.remote_closed()),
            Ok(sent) => {
                trace!(fd, sent, requested = data.len(), "put_partial_data");
                Ok(sent)
            }
            Err(e) if sys::is_would_block(&e) => Ok(0),
            Err(e) => {
                self.close_if_broken(&e);
                Err(PeerError::CantWrite(e))
            }
        }
    }

    fn get_available_bytes(&self) -> i32 {
        let Some(fd) = self.descriptor() else {
            return -1;
        };
        match sys::bytes_available(fd) {
            Ok(available) => i32::try_from(available).unwrap_or(i32::MAX),
            Err(e) => {
                warn!(fd, error = %e, "Failed to query available bytes");
                -1
            }
        }
    }
}

impl Drop for UnixStreamPeer {
    fn drop(&mut self) {
        self.close();
    }
}
