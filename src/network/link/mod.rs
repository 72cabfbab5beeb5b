//! Wi-Fi link establishment.
//!
//! The platform's connection manager is reached through [`LinkManager`]. It
//! reports progress asynchronously, from whatever context its driver runs in,
//! by pushing [`LinkEvent`]s through an [`Observer`]. The observer feeds a
//! single-slot [`EventSlot`] that the blocked caller polls with a bounded
//! wait. [`ConnectivitySession`] owns that sequence.

use core::net::Ipv4Addr;
use core::ops::BitOr;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::network::error::Errno;

mod session;

pub use session::ConnectivitySession;

/// Wi-Fi security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Security {
    /// WPA2 personal, pre-shared key.
    Wpa2Psk,
}

/// Channel selector for the connect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WifiChannel {
    /// Let the radio scan all channels.
    Any,
    /// Only try the given channel.
    Fixed(u8),
}

/// Parameters of a single connect request.
#[derive(Debug, Clone, Copy)]
pub struct ConnectParams<'p> {
    /// Network name.
    pub ssid: &'p str,
    /// Pre-shared key.
    pub psk: &'p str,
    /// Security mode.
    pub security: Security,
    /// Channel selector.
    pub channel: WifiChannel,
}

/// A notification from the platform connection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// The connect request finished. A zero status means associated.
    ConnectResult {
        /// Platform status code.
        status: i32,
    },
    /// The link went down.
    Disconnected {
        /// Platform reason code.
        reason: i32,
    },
}

/// Set of [`LinkEvent`] kinds an observer is registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventMask(u32);

impl EventMask {
    /// [`LinkEvent::ConnectResult`].
    pub const CONNECT_RESULT: EventMask = EventMask(1 << 0);
    /// [`LinkEvent::Disconnected`].
    pub const DISCONNECT: EventMask = EventMask(1 << 1);

    /// Returns `true` if every kind in `other` is also in `self`.
    pub fn contains(self, other: EventMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if `event` is one of the kinds in this mask.
    pub fn matches(self, event: &LinkEvent) -> bool {
        match event {
            LinkEvent::ConnectResult { .. } => self.contains(Self::CONNECT_RESULT),
            LinkEvent::Disconnected { .. } => self.contains(Self::DISCONNECT),
        }
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: EventMask) -> EventMask {
        EventMask(self.0 | rhs.0)
    }
}

/// Single-slot mailbox between the event producer and the waiting caller.
///
/// Capacity is one and it starts empty. A second event arriving before the
/// first one was consumed is dropped.
pub struct EventSlot {
    channel: Channel<CriticalSectionRawMutex, LinkEvent, 1>,
}

impl EventSlot {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Takes the pending event, if any.
    pub fn try_take(&self) -> Option<LinkEvent> {
        self.channel.try_receive().ok()
    }

    /// Discards a stale event left over from an earlier attempt.
    pub(crate) fn drain(&self) {
        while self.channel.try_receive().is_ok() {}
    }

    fn offer(&self, event: LinkEvent) -> bool {
        self.channel.try_send(event).is_ok()
    }
}

impl Default for EventSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for EventSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventSlot")
            .field("pending", &!self.channel.is_empty())
            .finish()
    }
}

/// Handle the platform uses to deliver [`LinkEvent`]s.
///
/// It is `Copy` and `Send`, so a driver may stash it and call
/// [`Observer::notify`] from its own context.
#[derive(Debug, Clone, Copy)]
pub struct Observer<'a> {
    slot: &'a EventSlot,
}

impl<'a> Observer<'a> {
    /// Creates an observer feeding `slot`.
    pub fn new(slot: &'a EventSlot) -> Self {
        Self { slot }
    }

    /// Delivers an event. Returns `false` if the slot was already full and
    /// the event was dropped.
    pub fn notify(&self, event: LinkEvent) -> bool {
        let accepted = self.slot.offer(event);
        if !accepted {
            warn!("Dropping link event {:?}, previous one not consumed", event);
        }
        accepted
    }
}

/// The platform's Wi-Fi and IP management services.
///
/// `'a` is the lifetime of the [`EventSlot`] the registered observer feeds.
pub trait LinkManager<'a> {
    /// Handle of a network interface.
    type Interface: Copy;

    /// Returns the default interface, if one exists.
    fn default_interface(&mut self) -> Option<Self::Interface>;

    /// Registers `observer` for the events in `mask` on `iface`.
    fn register_observer(&mut self, iface: Self::Interface, mask: EventMask, observer: Observer<'a>);

    /// Drops the registered observer. No events are delivered afterwards.
    fn unregister_observer(&mut self);

    /// Issues a connect request. Completion is reported through the observer.
    fn connect(&mut self, iface: Self::Interface, params: &ConnectParams<'_>) -> Result<(), Errno>;

    /// Starts DHCPv4 on `iface`.
    fn start_dhcp(&mut self, iface: Self::Interface);

    /// Returns the first IPv4 unicast address configured on `iface`.
    fn ipv4_address(&mut self, iface: Self::Interface) -> Option<Ipv4Addr>;
}
