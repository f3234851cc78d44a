//! Common traits used across the streampeer library
//!
//! This module contains the byte-stream capability that every peer
//! implementation provides to its host.

pub mod traits;

pub use traits::{MAX_STRING_LEN, StreamPeer};
