//! Addressing and raw socket plumbing
//!
//! `address` turns filesystem paths into validated `sockaddr_un` values and
//! `sys` wraps the handful of libc calls the peer is built on.

pub mod address;
pub(crate) mod sys;

pub use address::UnixAddress;
