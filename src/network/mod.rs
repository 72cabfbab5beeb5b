//! A network abstraction layer for embedded systems
//!
//! This module provides the traits the rest of the crate is written against.
//! The byte-stream traits ([`Read`], [`Write`], [`Close`]) describe an open
//! connection, while the capability traits in [`link`] and [`tls`] describe the
//! platform services that bring a link up and open secure sockets. Nothing in
//! here talks to hardware, so every sequence can be driven by fakes on a host.
//!

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application layer protocols
pub mod application;

/// Wi-Fi link establishment
pub mod link;

/// TLS socket setup
pub mod tls;

/// Re-exports of common traits
pub mod prelude {
    pub use super::link::LinkManager;
    pub use super::tls::{CredentialStore, TlsSocket, TransportProvider};
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Reading bytes from a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Writing bytes to a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Closing a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}
