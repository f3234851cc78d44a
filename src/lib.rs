use std::path::PathBuf;
use thiserror::Error;

/// Error types for the streampeer library
#[derive(Error, Debug)]
pub enum PeerError {
    /// The peer is already open (or a setting was changed on a live peer)
    #[error("Peer is already in use")]
    AlreadyInUse,

    /// The OS failed to allocate a socket
    #[error("Failed to create socket: {0}")]
    CantCreate(#[source] std::io::Error),

    /// The OS connect call failed
    #[error("Failed to connect to {}: {source}", .path.display())]
    CantConnect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The connected socket could not be switched to non-blocking mode
    #[error("Failed to configure socket: {0}")]
    CantConfigure(#[source] std::io::Error),

    /// I/O was attempted on a closed peer
    #[error("Peer is not open")]
    Unconfigured,

    /// A malformed argument
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The socket path does not fit into `sockaddr_un`
    #[error("Socket path is {len} bytes long, the limit is {max}")]
    PathTooLong { len: usize, max: usize },

    /// The underlying receive reported an OS error
    #[error("Failed to read from socket: {0}")]
    CantRead(#[source] std::io::Error),

    /// The underlying send reported an OS error
    #[error("Failed to write to socket: {0}")]
    CantWrite(#[source] std::io::Error),

    /// The remote end closed the connection
    #[error("Connection closed by remote peer")]
    Eof,

    /// A full read returned an inconsistent byte count
    #[error("Expected {expected} bytes, received {received}")]
    Failed { expected: usize, received: usize },

    /// UTF-8 encoding errors
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PeerError {
    /// Returns true if this error left the peer closed because the
    /// connection can no longer be used
    pub fn is_disconnect(&self) -> bool {
        match self {
            PeerError::Eof => true,
            PeerError::CantRead(e) | PeerError::CantWrite(e) => network::sys::is_broken(e),
            _ => false,
        }
    }
}

/// Result type for the streampeer library
pub type Result<T> = std::result::Result<T, PeerError>;

pub mod common;
pub mod network;
pub mod unix;

// Re-export main types for convenience
pub use common::StreamPeer;
pub use network::UnixAddress;
pub use unix::{UnixPeerConfig, UnixStreamPeer};
