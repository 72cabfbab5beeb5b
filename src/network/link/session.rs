use core::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use log::{error, info, warn};

use super::{ConnectParams, EventMask, EventSlot, LinkEvent, LinkManager, Observer};
use crate::config::{AddressPolicy, LinkConfig, Strategy};
use crate::network::error::{Errno, Error};

// Step between two checks of the event slot or the interface address.
const POLL_INTERVAL_MS: u32 = 100;

/// Brings a Wi-Fi link up and acquires an IPv4 address.
///
/// The session owns the link manager and the delay provider, and borrows the
/// [`EventSlot`] its observer writes to. The observer is registered on the
/// first event-driven [`connect`](Self::connect) and unregistered when the
/// session is dropped.
pub struct ConnectivitySession<'a, L, D>
where
    L: LinkManager<'a>,
    D: DelayNs,
{
    link: L,
    delay: D,
    events: &'a EventSlot,
    config: LinkConfig,
    observing: bool,
}

impl<'a, L, D> ConnectivitySession<'a, L, D>
where
    L: LinkManager<'a>,
    D: DelayNs,
{
    /// Creates a session. Nothing is sent to the platform until
    /// [`connect`](Self::connect).
    pub fn new(link: L, delay: D, events: &'a EventSlot, config: LinkConfig) -> Self {
        Self {
            link,
            delay,
            events,
            config,
            observing: false,
        }
    }

    /// Returns the link manager.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Returns the link manager mutably.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Connects to the configured network and waits for an address.
    ///
    /// Returns the acquired address, or `None` when none showed up and the
    /// [`AddressPolicy`] allows carrying on without one.
    ///
    /// # Errors
    ///
    /// - [`Error::DeviceNotFound`] when there is no default interface
    /// - [`Error::Rejected`] when the platform refuses the connect request or
    ///   reports a failed association
    /// - [`Error::Timeout`] when the acknowledgment does not arrive in time,
    ///   or no address arrives under [`AddressPolicy::Fatal`]
    pub fn connect(&mut self) -> Result<Option<Ipv4Addr>, Error> {
        info!("Setting up WiFi connection");

        let Some(iface) = self.link.default_interface() else {
            error!("No network interface found");
            return Err(Error::DeviceNotFound);
        };

        if self.config.strategy == Strategy::EventDriven {
            self.request_link(iface)?;
        }
        let address = self.acquire_address(iface)?;

        if self.config.settle_ms > 0 {
            self.delay.delay_ms(self.config.settle_ms);
        }
        Ok(address)
    }

    fn request_link(&mut self, iface: L::Interface) -> Result<(), Error> {
        self.events.drain();
        if !self.observing {
            self.link.register_observer(
                iface,
                EventMask::CONNECT_RESULT | EventMask::DISCONNECT,
                Observer::new(self.events),
            );
            self.observing = true;
        }

        let params = ConnectParams {
            ssid: self.config.ssid,
            psk: self.config.psk,
            security: self.config.security,
            channel: self.config.channel,
        };
        info!("Connecting to '{}'", params.ssid);
        self.link.connect(iface, &params).map_err(|errno| {
            error!("Connect request failed: {}", errno);
            Error::Rejected(errno)
        })?;

        self.wait_for_ack()
    }

    fn wait_for_ack(&mut self) -> Result<(), Error> {
        let timeout = self.config.connect_timeout_ms;
        let mut waited = 0;
        loop {
            while let Some(event) = self.events.try_take() {
                match event {
                    LinkEvent::ConnectResult { status: 0 } => {
                        info!("Connected to '{}'", self.config.ssid);
                        return Ok(());
                    }
                    LinkEvent::ConnectResult { status } => {
                        error!("Connection failed ({})", status);
                        return Err(Error::Rejected(Errno(status)));
                    }
                    LinkEvent::Disconnected { reason } => {
                        warn!("Disconnected while connecting ({})", reason);
                    }
                }
            }

            if waited >= timeout {
                error!("No connection after {} ms", waited);
                return Err(Error::Timeout);
            }
            let step = POLL_INTERVAL_MS.min(timeout - waited);
            self.delay.delay_ms(step);
            waited += step;
        }
    }

    fn acquire_address(&mut self, iface: L::Interface) -> Result<Option<Ipv4Addr>, Error> {
        self.link.start_dhcp(iface);
        info!("Waiting for IP address assignment...");

        let timeout = self.config.address_timeout_ms;
        let mut waited = 0;
        loop {
            if let Some(address) = self.link.ipv4_address(iface) {
                info!("IPv4 address: {}", address);
                return Ok(Some(address));
            }
            if waited >= timeout {
                break;
            }
            let step = POLL_INTERVAL_MS.min(timeout - waited);
            self.delay.delay_ms(step);
            waited += step;
        }

        match self.config.address_policy {
            AddressPolicy::Fatal => {
                error!("Failed to get IP address");
                Err(Error::Timeout)
            }
            AddressPolicy::WarnAndContinue => {
                warn!("No IPv4 address after {} ms, continuing", timeout);
                Ok(None)
            }
        }
    }
}

impl<'a, L, D> Drop for ConnectivitySession<'a, L, D>
where
    L: LinkManager<'a>,
    D: DelayNs,
{
    fn drop(&mut self) {
        if self.observing {
            self.link.unregister_observer();
        }
    }
}

impl<'a, L, D> core::fmt::Debug for ConnectivitySession<'a, L, D>
where
    L: LinkManager<'a>,
    D: DelayNs,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConnectivitySession")
            .field("config", &self.config)
            .field("observing", &self.observing)
            .finish_non_exhaustive()
    }
}
