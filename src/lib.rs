//! # iotlink - Wi-Fi to HTTPS for IoT devices
//!
//! A small `no_std` library that takes a device from "radio off" to
//! "talking HTTPS to a cloud endpoint". It sequences the platform's
//! connection manager, credential store and TLS sockets, and frames HTTP/1.1
//! on top of them. The platform itself stays behind traits, so the same code
//! runs against real drivers on the device and against fakes on a host.
//!
//! ## Features
//!
//! ### Link establishment
//! - Event-driven connect with a bounded wait for the acknowledgment
//! - DHCP with a grace period and an explicit policy for a missing address
//!
//! ### Secure requests
//! - Trust-anchor registration and TLS socket setup
//! - HTTP/1.1 client with partial and final response deliveries
//!
//! ### Telemetry sample
//! - Upload a JSON reading with PUT and read it back with GET
//!
//! ## Usage
//!
//! ```rust,ignore
//! use iotlink::app::{self, RequestSession, Telemetry};
//! use iotlink::config::Config;
//! use iotlink::network::link::{ConnectivitySession, EventSlot};
//!
//! static EVENTS: EventSlot = EventSlot::new();
//!
//! let config = Config::default();
//! let mut link = ConnectivitySession::new(wifi, delay, &EVENTS, config.link);
//! let mut requests: RequestSession<_, _> =
//!     RequestSession::new(sockets, credentials, config.endpoint);
//!
//! let result = app::run(&mut link, &mut requests, &Telemetry::default());
//! let status = app::exit_code(&result);
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting of error types for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// Network abstraction layer: byte-stream traits, link establishment, TLS
/// setup and the HTTP client.
pub mod network;

/// Compile-time device configuration.
pub mod config;

/// The telemetry sample built on top of the network layer.
pub mod app;
