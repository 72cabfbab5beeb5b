//! TLS socket setup.
//!
//! The TLS record layer, certificate validation and DNS all live in the
//! platform stack. This module only sequences the calls that produce a
//! connected TLS stream: register the trust anchor, create the socket, bind
//! the sec-tag and expected peer name to it, resolve and connect. A socket
//! that fails any step after creation is closed before the error is returned.

use core::net::SocketAddrV4;

use log::{debug, error, info, warn};

use crate::network::error::{Errno, Error};
use crate::network::{Close, Connect, Connection, Read, Write};

/// Identifier under which credentials are stored in the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SecTag(pub u32);

/// Kind of credential material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialKind {
    /// Certificate authority used to validate the peer.
    CaCertificate,
    /// Client certificate presented to the peer.
    ClientCertificate,
    /// Private key matching the client certificate.
    PrivateKey,
}

/// TLS protocol version requested at socket creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TlsVersion {
    /// TLS 1.2
    Tls12,
}

/// Platform credential storage.
pub trait CredentialStore {
    /// Stores `material` under `tag`.
    fn add(&mut self, tag: SecTag, kind: CredentialKind, material: &[u8]) -> Result<(), Errno>;
}

/// A TLS stream socket created by a [`TransportProvider`].
pub trait TlsSocket:
    Connection + Read<Error = Errno> + Write<Error = Errno> + Close<Error = Errno>
{
    /// Selects the credentials used for the handshake.
    fn set_sec_tags(&mut self, tags: &[SecTag]) -> Result<(), Errno>;

    /// Sets the name the peer certificate must be issued for.
    fn set_hostname(&mut self, hostname: &str) -> Result<(), Errno>;

    /// Bounds every blocking receive, in milliseconds.
    fn set_timeout(&mut self, timeout_ms: u32) -> Result<(), Errno>;

    /// Connects and runs the handshake.
    fn connect(&mut self, remote: SocketAddrV4) -> Result<(), Errno>;
}

/// Platform socket and resolver services.
pub trait TransportProvider {
    /// Socket type produced by this provider.
    type Socket: TlsSocket;

    /// Creates a TLS stream socket.
    fn socket(&mut self, version: TlsVersion) -> Result<Self::Socket, Errno>;

    /// Resolves `host` to an IPv4 socket address on `port`.
    fn resolve(&mut self, host: &str, port: u16) -> Result<SocketAddrV4, Errno>;
}

/// Settings of a [`TlsConnector`].
#[derive(Debug, Clone)]
pub struct TlsSettings {
    /// Tag the trust anchor is stored under.
    pub sec_tag: SecTag,
    /// Trust anchor.
    pub ca_certificate: &'static [u8],
    /// Name the peer certificate must carry.
    pub peer_hostname: &'static str,
    /// Remote port.
    pub port: u16,
}

/// Opens TLS connections through platform capabilities.
#[derive(Debug)]
pub struct TlsConnector<T: TransportProvider, S: CredentialStore> {
    transport: T,
    credentials: S,
    settings: TlsSettings,
    registered: bool,
}

impl<T: TransportProvider, S: CredentialStore> TlsConnector<T, S> {
    /// Creates a connector. The trust anchor is registered on first use.
    pub fn new(transport: T, credentials: S, settings: TlsSettings) -> Self {
        Self {
            transport,
            credentials,
            settings,
            registered: false,
        }
    }

    /// Returns the transport provider.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the credential store.
    pub fn credentials(&self) -> &S {
        &self.credentials
    }

    /// Opens a TLS connection to `host` on the configured port.
    pub fn open(&mut self, host: &str) -> Result<T::Socket, Error> {
        self.register_trust_anchor()?;

        let mut socket = self.transport.socket(TlsVersion::Tls12).map_err(|errno| {
            error!("Failed to create HTTPS socket ({})", errno);
            Error::Socket(errno)
        })?;

        if let Err(err) = self.establish(&mut socket, host) {
            close_quietly(socket);
            return Err(err);
        }

        info!("Connected to {}", host);
        Ok(socket)
    }

    fn register_trust_anchor(&mut self) -> Result<(), Error> {
        if self.registered {
            return Ok(());
        }
        if self.settings.ca_certificate.is_empty() {
            error!("No CA certificate configured");
            return Err(Error::Credential(Errno::EINVAL));
        }

        self.credentials
            .add(
                self.settings.sec_tag,
                CredentialKind::CaCertificate,
                self.settings.ca_certificate,
            )
            .map_err(|errno| {
                error!("Failed to register certificate: {}", errno);
                Error::Credential(errno)
            })?;
        self.registered = true;
        Ok(())
    }

    fn establish(&mut self, socket: &mut T::Socket, host: &str) -> Result<(), Error> {
        socket
            .set_sec_tags(&[self.settings.sec_tag])
            .map_err(|errno| {
                error!("Failed to set TLS_SEC_TAG_LIST option ({})", errno);
                Error::TlsConfig(errno)
            })?;

        socket
            .set_hostname(self.settings.peer_hostname)
            .map_err(|errno| {
                error!("Failed to set TLS_HOSTNAME option ({})", errno);
                Error::TlsConfig(errno)
            })?;

        let remote = self
            .transport
            .resolve(host, self.settings.port)
            .map_err(|errno| {
                error!("Failed to resolve {} ({})", host, errno);
                Error::NameResolution(errno)
            })?;
        debug!("{} resolved to {}", host, remote);

        socket.connect(remote).map_err(|errno| {
            error!("Failed to connect to {} ({})", host, errno);
            Error::ConnectFailed(errno)
        })
    }
}

impl<T: TransportProvider, S: CredentialStore> Connect for TlsConnector<T, S> {
    type Connection = T::Socket;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error> {
        self.open(remote)
    }
}

/// Closes `socket`, logging instead of returning a failure.
pub(crate) fn close_quietly<C: Close>(socket: C) {
    if let Err(err) = socket.close() {
        warn!("Failed to close socket: {:?}", err);
    }
}
