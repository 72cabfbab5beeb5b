//! # Application Layer Network Protocols
//!
//! Application layer (OSI Layer 7) protocols built on the core network
//! traits.
//!
//! ## Available Protocols
//!
//! - **[`http`]**: HTTP/1.1 client for RESTful API communication
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any type implementing [`Connection`](crate::network::Connection)
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Use fixed-size buffers and minimal memory

/// HTTP client implementation.
///
/// Provides a simple HTTP/1.1 client suitable for embedded systems, with
/// partial and final response deliveries through a handler.
pub mod http;
