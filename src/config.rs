//! Compile-time configuration.
//!
//! Credentials and endpoint details are baked into the firmware. The
//! defaults below read a few `IOTLINK_*` environment variables at build time
//! so that secrets stay out of the source tree:
//!
//! | Variable            | Field                     |
//! |---------------------|---------------------------|
//! | `IOTLINK_WIFI_SSID` | [`LinkConfig::ssid`]      |
//! | `IOTLINK_WIFI_PSK`  | [`LinkConfig::psk`]       |
//! | `IOTLINK_HOST`      | [`EndpointConfig::host`]  |
//! | `IOTLINK_URL`       | [`EndpointConfig::url`]   |
//!
//! The CA certificate has no default and is normally supplied with
//! `include_bytes!` from the firmware crate.

use crate::network::link::{Security, WifiChannel};
use crate::network::tls::SecTag;

const WIFI_SSID: &str = match option_env!("IOTLINK_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "",
};

const WIFI_PSK: &str = match option_env!("IOTLINK_WIFI_PSK") {
    Some(psk) => psk,
    None => "",
};

const HOST: &str = match option_env!("IOTLINK_HOST") {
    Some(host) => host,
    None => "iotlink-demo-default-rtdb.firebaseio.com",
};

const URL: &str = match option_env!("IOTLINK_URL") {
    Some(url) => url,
    None => "/sensors/latest.json",
};

/// Sec-tag under which the CA certificate is registered.
pub const CA_CERTIFICATE_TAG: SecTag = SecTag(1);

/// How the link is brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Strategy {
    /// Register for link events, request the connection, wait for the
    /// acknowledgment, then run DHCP.
    EventDriven,
    /// Assume the radio associates on its own, start DHCP and wait.
    DhcpAfterSleep,
}

/// What to do when no IPv4 address shows up within the grace period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressPolicy {
    /// Fail with [`Error::Timeout`](crate::network::error::Error::Timeout).
    Fatal,
    /// Log a warning and report success without an address.
    WarnAndContinue,
}

/// Wi-Fi link configuration.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Network name.
    pub ssid: &'static str,
    /// Pre-shared key.
    pub psk: &'static str,
    /// Security mode.
    pub security: Security,
    /// Channel selector.
    pub channel: WifiChannel,
    /// Connect strategy.
    pub strategy: Strategy,
    /// Behaviour when DHCP does not deliver an address in time.
    pub address_policy: AddressPolicy,
    /// Upper bound on the wait for the connect acknowledgment, in milliseconds.
    pub connect_timeout_ms: u32,
    /// Grace period for address acquisition, in milliseconds.
    pub address_timeout_ms: u32,
    /// Pause after the link is up, before the first request, in milliseconds.
    pub settle_ms: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            ssid: WIFI_SSID,
            psk: WIFI_PSK,
            security: Security::Wpa2Psk,
            channel: WifiChannel::Any,
            strategy: Strategy::EventDriven,
            address_policy: AddressPolicy::WarnAndContinue,
            connect_timeout_ms: 30_000,
            address_timeout_ms: 15_000,
            settle_ms: 2_000,
        }
    }
}

/// Remote HTTPS endpoint configuration.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Host name, used for DNS and the `Host` header.
    pub host: &'static str,
    /// Name the server certificate must carry.
    pub peer_hostname: &'static str,
    /// TCP port.
    pub port: u16,
    /// Request target.
    pub url: &'static str,
    /// Tag the CA certificate is registered under.
    pub sec_tag: SecTag,
    /// PEM or DER encoded trust anchor.
    pub ca_certificate: &'static [u8],
    /// Receive timeout applied to each request, in milliseconds.
    pub request_timeout_ms: u32,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: HOST,
            peer_hostname: HOST,
            port: 443,
            url: URL,
            sec_tag: CA_CERTIFICATE_TAG,
            ca_certificate: &[],
            request_timeout_ms: 10_000,
        }
    }
}

/// Complete device configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Wi-Fi link settings.
    pub link: LinkConfig,
    /// HTTPS endpoint settings.
    pub endpoint: EndpointConfig,
}
