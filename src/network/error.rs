//! Common error types for network operations

use core::fmt;

/// A raw error code reported by the platform network stack.
///
/// Platform calls return negative errno values. The wrapped value keeps the
/// sign the platform used, [`Errno::code`] always yields the negative form.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Errno(pub i32);

impl Errno {
    /// I/O error.
    pub const EIO: Errno = Errno(-5);
    /// Try again.
    pub const EAGAIN: Errno = Errno(-11);
    /// No such device.
    pub const ENODEV: Errno = Errno(-19);
    /// Invalid argument.
    pub const EINVAL: Errno = Errno(-22);
    /// Protocol error.
    pub const EPROTO: Errno = Errno(-71);
    /// Connection reset by peer.
    pub const ECONNRESET: Errno = Errno(-104);
    /// Connection refused.
    pub const ECONNREFUSED: Errno = Errno(-111);
    /// Operation timed out.
    pub const ETIMEDOUT: Errno = Errno(-116);
    /// Message too long.
    pub const EMSGSIZE: Errno = Errno(-122);
    /// Socket is not connected.
    pub const ENOTCONN: Errno = Errno(-128);

    /// Returns the code as a negative value.
    pub fn code(self) -> i32 {
        // `i32::MIN` has no positive counterpart, so negate only positive codes.
        if self.0 > 0 { -self.0 } else { self.0 }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A common error type for network operations.
///
/// Every variant maps to a negative errno-style code through
/// [`Error::code`], which is what the firmware entry point returns.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// No default network interface is present.
    DeviceNotFound,
    /// The platform refused the link connect request.
    Rejected(Errno),
    /// A bounded wait expired.
    Timeout,
    /// The CA certificate could not be registered.
    Credential(Errno),
    /// The TLS socket could not be created.
    Socket(Errno),
    /// A TLS socket option could not be applied.
    TlsConfig(Errno),
    /// The remote host name could not be resolved.
    NameResolution(Errno),
    /// The transport connection to the remote host failed.
    ConnectFailed(Errno),
    /// A read or write on an open connection failed.
    Transport(Errno),
    /// The connection was closed before the response was complete.
    ConnectionClosed,
    /// The peer sent something that is not a valid HTTP response.
    ProtocolError,
    /// A fixed-size buffer was too small.
    BufferOverflow,
}

impl Error {
    /// Returns the negative errno-style code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::DeviceNotFound => Errno::ENODEV.code(),
            Error::Timeout => Errno::ETIMEDOUT.code(),
            Error::Rejected(e)
            | Error::Credential(e)
            | Error::Socket(e)
            | Error::TlsConfig(e)
            | Error::NameResolution(e)
            | Error::ConnectFailed(e)
            | Error::Transport(e) => e.code(),
            Error::ConnectionClosed => Errno::ENOTCONN.code(),
            Error::ProtocolError => Errno::EPROTO.code(),
            Error::BufferOverflow => Errno::EMSGSIZE.code(),
        }
    }
}

impl From<Errno> for Error {
    fn from(errno: Errno) -> Self {
        let code = errno.code();
        if code == Errno::ETIMEDOUT.code() || code == Errno::EAGAIN.code() {
            Error::Timeout
        } else {
            Error::Transport(errno)
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::DeviceNotFound => write!(f, "no network interface found"),
            Error::Rejected(e) => write!(f, "connect request rejected ({e})"),
            Error::Timeout => write!(f, "timed out"),
            Error::Credential(e) => write!(f, "failed to register certificate ({e})"),
            Error::Socket(e) => write!(f, "failed to create socket ({e})"),
            Error::TlsConfig(e) => write!(f, "failed to configure TLS ({e})"),
            Error::NameResolution(e) => write!(f, "failed to resolve host ({e})"),
            Error::ConnectFailed(e) => write!(f, "failed to connect ({e})"),
            Error::Transport(e) => write!(f, "transport error ({e})"),
            Error::ConnectionClosed => write!(f, "connection closed"),
            Error::ProtocolError => write!(f, "malformed HTTP response"),
            Error::BufferOverflow => write!(f, "buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Errno {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=i32}", self.code())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::DeviceNotFound => defmt::write!(f, "DeviceNotFound"),
            Error::Rejected(e) => defmt::write!(f, "Rejected({})", e),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::Credential(e) => defmt::write!(f, "Credential({})", e),
            Error::Socket(e) => defmt::write!(f, "Socket({})", e),
            Error::TlsConfig(e) => defmt::write!(f, "TlsConfig({})", e),
            Error::NameResolution(e) => defmt::write!(f, "NameResolution({})", e),
            Error::ConnectFailed(e) => defmt::write!(f, "ConnectFailed({})", e),
            Error::Transport(e) => defmt::write!(f, "Transport({})", e),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::BufferOverflow => defmt::write!(f, "BufferOverflow"),
        }
    }
}
