//! Unix domain stream socket peer
//!
//! This module provides [`UnixStreamPeer`], a client-side Unix domain
//! stream socket that implements the [`StreamPeer`](crate::StreamPeer)
//! byte-stream contract in either blocking or non-blocking mode.
//!
//! # Examples
//!
//! ```no_run
//! use streampeer::{StreamPeer, UnixPeerConfig, UnixStreamPeer};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = UnixPeerConfig::default()
//!         .with_socket_path("/tmp/app.sock".into())
//!         .with_blocking(false);
//!
//!     let mut peer = UnixStreamPeer::connect(&config)?;
//!     let mut buffer = [0u8; 1024];
//!     // Returns immediately, possibly with zero bytes
//!     let received = peer.get_partial_data(&mut buffer)?;
//!     println!("received {received} bytes");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod peer;


pub use config::UnixPeerConfig;
pub use peer::UnixStreamPeer;
