// Raw socket calls underneath UnixStreamPeer
//
// Every wrapper converts the libc return convention (-1 plus errno) into
// io::Result. recv, send and poll are retried on EINTR; connect and close
// are not, since a retried connect or close can act on a different state
// than the caller expects.

use super::UnixAddress;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use tracing::warn;

#[cfg(not(target_vendor = "apple"))]
const NOSIGNAL: libc::c_int = libc::MSG_NOSIGNAL;
// Apple targets lack MSG_NOSIGNAL and suppress SIGPIPE per socket with SO_NOSIGPIPE
#[cfg(target_vendor = "apple")]
const NOSIGNAL: libc::c_int = 0;

fn cvt(ret: libc::c_int) -> io::Result<libc::c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

fn cvt_size(ret: libc::ssize_t) -> io::Result<usize> {
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret as usize)
    }
}

fn retry<T>(mut f: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    loop {
        match f() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

/// Creates a close-on-exec `AF_UNIX` stream socket
pub fn socket() -> io::Result<OwnedFd> {
    #[cfg(not(target_vendor = "apple"))]
    let ty = libc::SOCK_STREAM | libc::SOCK_CLOEXEC;
    #[cfg(target_vendor = "apple")]
    let ty = libc::SOCK_STREAM;

    let fd = cvt(unsafe { libc::socket(libc::AF_UNIX, ty, 0) })?;
    // Safety: socket() just returned this descriptor and nothing else owns it
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };

    #[cfg(target_vendor = "apple")]
    {
        cvt(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) })?;
        set_nosigpipe(&fd)?;
    }

    Ok(fd)
}

#[cfg(target_vendor = "apple")]
fn set_nosigpipe(fd: &OwnedFd) -> io::Result<()> {
    let on: libc::c_int = 1;
    cvt(unsafe {
        libc::setsockopt(
            fd.as_raw_fd(),
            libc::SOL_SOCKET,
            libc::SO_NOSIGPIPE,
            &on as *const libc::c_int as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    })?;
    Ok(())
}

pub fn connect(fd: &OwnedFd, addr: &UnixAddress) -> io::Result<()> {
    cvt(unsafe { libc::connect(fd.as_raw_fd(), addr.as_ptr(), addr.socklen()) })?;
    Ok(())
}

/// Adds `O_NONBLOCK` to the descriptor's file status flags
pub fn set_nonblocking(fd: &OwnedFd) -> io::Result<()> {
    let flags = cvt(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_GETFL) })?;
    if flags & libc::O_NONBLOCK == 0 {
        cvt(unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFL, flags | libc::O_NONBLOCK) })?;
    }
    Ok(())
}

/// Single receive; with `wait_all` the kernel waits for the whole buffer
pub fn recv(fd: RawFd, buffer: &mut [u8], wait_all: bool) -> io::Result<usize> {
    let flags = if wait_all {
        NOSIGNAL | libc::MSG_WAITALL
    } else {
        NOSIGNAL
    };
    retry(|| {
        cvt_size(unsafe {
            libc::recv(
                fd,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buffer.len(),
                flags,
            )
        })
    })
}

pub fn send(fd: RawFd, data: &[u8]) -> io::Result<usize> {
    retry(|| {
        cvt_size(unsafe {
            libc::send(
                fd,
                data.as_ptr() as *const libc::c_void,
                data.len(),
                NOSIGNAL,
            )
        })
    })
}

/// Number of received bytes buffered in the kernel and not read yet
pub fn bytes_available(fd: RawFd) -> io::Result<usize> {
    let mut available: libc::c_int = 0;
    cvt(unsafe { libc::ioctl(fd, libc::FIONREAD, &mut available as *mut libc::c_int) })?;
    Ok(available.max(0) as usize)
}

/// Blocks until the socket accepts more data or reports an error/hangup
pub fn wait_writable(fd: RawFd) -> io::Result<()> {
    let mut pollfd = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    retry(|| cvt(unsafe { libc::poll(&mut pollfd, 1, -1) }))?;
    Ok(())
}

/// Releases the descriptor, logging instead of failing if close(2) reports an error
pub fn close(fd: OwnedFd) {
    let raw = fd.into_raw_fd();
    if unsafe { libc::close(raw) } == -1 {
        warn!(fd = raw, error = %io::Error::last_os_error(), "Failed to close socket");
    }
}

/// Errors after which the descriptor is no longer usable
pub fn is_broken(err: &io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc::EBADF | libc::EPIPE | libc::ECONNRESET | libc::ENOTCONN)
    )
}

pub fn is_would_block(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::WouldBlock
}
