//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! This module provides a lightweight HTTP client designed for `no_std`
//! environments. It frames one request per call and streams the response
//! through a caller-supplied [`ResponseHandler`] using a fixed receive buffer,
//! so memory use is known up front.
//!
//! # Features
//!
//! - HTTP/1.1 request framing with `Host` and `Content-Length`
//! - GET, POST, PUT and DELETE
//! - Partial deliveries flagged [`FinalCall::More`], the last one
//!   [`FinalCall::Final`]
//! - Body truncated to the declared `Content-Length`
//!
//! # Usage
//!
//! ```rust,no_run
//! use iotlink::network::application::http::{Client, FinalCall, Method, Request, Response};
//! use iotlink::network::error::Error;
//! # use iotlink::network::Connection;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl iotlink::network::Read for MockConnection {
//! #     type Error = Error;
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl iotlink::network::Write for MockConnection {
//! #     type Error = Error;
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl iotlink::network::Close for MockConnection {
//! #     type Error = Error;
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let mut client = Client::new(MockConnection);
//! let mut recv_buf = [0u8; 512];
//!
//! let request = Request {
//!     method: Method::Get,
//!     url: "/api/status",
//!     host: "example.com",
//!     protocol: "HTTP/1.1",
//!     headers: heapless::Vec::new(),
//!     payload: None,
//! };
//!
//! let mut on_response = |rsp: &Response, data: &[u8], last: FinalCall, tag: &str| {
//!     if last == FinalCall::Final {
//!         let _ = (rsp.status_code, rsp.body(data), tag);
//!     }
//! };
//! let received = client.request(&request, &mut recv_buf, &mut on_response, "status")?;
//! # let _ = received;
//! # Ok::<(), Error>(())
//! ```

/// HTTP client implementation and supporting types.
///
/// Contains the main [`Client`](client::Client) struct and all related types
/// for making HTTP requests and handling responses.
pub mod client;

pub use client::{Client, FinalCall, Header, Headers, Method, Request, Response, ResponseHandler};
