use crate::{PeerError, Result};
use std::fmt;
use std::mem::offset_of;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

const SUN_PATH_OFFSET: usize = offset_of!(libc::sockaddr_un, sun_path);

/// Longest path, in bytes, that fits into `sun_path` with its NUL terminator
pub const MAX_PATH_LEN: usize = std::mem::size_of::<libc::sockaddr_un>() - SUN_PATH_OFFSET - 1;

/// A Unix domain socket address backed by a fixed-size `sockaddr_un`
///
/// Construction validates the path against the platform's `sun_path`
/// capacity, so an oversized path is reported instead of overrunning the
/// buffer.
///
/// # Examples
///
/// ```
/// use streampeer::UnixAddress;
/// use std::path::Path;
///
/// let addr = UnixAddress::new(Path::new("/tmp/peer.sock")).unwrap();
/// assert_eq!(addr.path(), Path::new("/tmp/peer.sock"));
/// assert_eq!(addr.to_string(), "unix:/tmp/peer.sock");
/// ```
#[derive(Clone, Copy)]
pub struct UnixAddress {
    raw: libc::sockaddr_un,
    len: libc::socklen_t,
}

impl UnixAddress {
    /// Encodes `path` into a `sockaddr_un`
    pub fn new(path: &Path) -> Result<Self> {
        let bytes = path.as_os_str().as_bytes();

        if bytes.is_empty() {
            return Err(PeerError::InvalidParameter("socket path is empty".into()));
        }
        if bytes.contains(&0) {
            return Err(PeerError::InvalidParameter(format!(
                "socket path {} contains a NUL byte",
                path.display()
            )));
        }
        if bytes.len() > MAX_PATH_LEN {
            return Err(PeerError::PathTooLong {
                len: bytes.len(),
                max: MAX_PATH_LEN,
            });
        }

        // Safety: sockaddr_un is plain old data, all-zeroes is a valid value
        let mut raw: libc::sockaddr_un = unsafe { std::mem::zeroed() };
        raw.sun_family = libc::AF_UNIX as libc::sa_family_t;
        for (dst, &src) in raw.sun_path.iter_mut().zip(bytes) {
            *dst = src as libc::c_char;
        }

        // Family, path bytes and the terminating NUL
        let len = SUN_PATH_OFFSET + bytes.len() + 1;

        Ok(Self {
            raw,
            len: len as libc::socklen_t,
        })
    }

    /// Longest accepted path in bytes on this platform
    pub const fn max_path_len() -> usize {
        MAX_PATH_LEN
    }

    /// The path this address points at
    pub fn path(&self) -> &Path {
        let path_len = self.len as usize - SUN_PATH_OFFSET - 1;
        // Safety: c_char and u8 share size and alignment, and path_len is
        // within sun_path by construction
        let bytes =
            unsafe { std::slice::from_raw_parts(self.raw.sun_path.as_ptr().cast::<u8>(), path_len) };
        Path::new(std::ffi::OsStr::from_bytes(bytes))
    }

    pub(crate) fn as_ptr(&self) -> *const libc::sockaddr {
        (&self.raw as *const libc::sockaddr_un).cast()
    }

    pub(crate) fn socklen(&self) -> libc::socklen_t {
        self.len
    }
}

impl fmt::Display for UnixAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unix:{}", self.path().display())
    }
}

impl fmt::Debug for UnixAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnixAddress")
            .field("path", &self.path())
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_path() {
        let addr = UnixAddress::new(Path::new("/tmp/test.sock")).unwrap();
        assert_eq!(addr.path(), Path::new("/tmp/test.sock"));
        assert_eq!(addr.socklen() as usize, SUN_PATH_OFFSET + "/tmp/test.sock".len() + 1);
    }

    #[test]
    fn test_relative_path() {
        let addr = UnixAddress::new(Path::new("peer.sock")).unwrap();
        assert_eq!(addr.path(), Path::new("peer.sock"));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = UnixAddress::new(Path::new("")).unwrap_err();
        assert!(matches!(err, PeerError::InvalidParameter(_)));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let path = PathBuf::from(std::ffi::OsStr::from_bytes(b"/tmp/a\0b.sock"));
        let err = UnixAddress::new(&path).unwrap_err();
        assert!(matches!(err, PeerError::InvalidParameter(_)));
    }

    #[test]
    fn test_path_at_limit() {
        let path = PathBuf::from("a".repeat(MAX_PATH_LEN));
        let addr = UnixAddress::new(&path).unwrap();
        assert_eq!(addr.path(), path.as_path());
    }

    #[test]
    fn test_path_too_long() {
        let path = PathBuf::from("a".repeat(MAX_PATH_LEN + 1));
        match UnixAddress::new(&path) {
            Err(PeerError::PathTooLong { len, max }) => {
                assert_eq!(len, MAX_PATH_LEN + 1);
                assert_eq!(max, UnixAddress::max_path_len());
            }
            other => panic!("expected PathTooLong, got {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let addr = UnixAddress::new(Path::new("/run/app.sock")).unwrap();
        assert_eq!(addr.to_string(), "unix:/run/app.sock");
    }
}
