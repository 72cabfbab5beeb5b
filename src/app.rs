//! The telemetry sample: join Wi-Fi, PUT a reading, GET it back.
//!
//! [`run`] is what a firmware `main` calls once the platform capabilities are
//! constructed. Every stage stops at its first error; [`exit_code`] turns the
//! outcome into the process status.

use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};
use log::{error, info};
use serde::Serialize;

use crate::config::EndpointConfig;
use crate::network::application::http::{
    Client, FinalCall, Header, Headers, Method, Request, Response, ResponseHandler,
};
use crate::network::error::Error;
use crate::network::link::{ConnectivitySession, LinkManager};
use crate::network::tls::{
    CredentialStore, TlsConnector, TlsSettings, TlsSocket, TransportProvider, close_quietly,
};

/// Default size of the receive buffer.
pub const RECV_BUF_LEN: usize = 2048;

const MAX_JSON_LEN: usize = 128;
const PROTOCOL: &str = "HTTP/1.1";

/// Tag passed to the response handler for the upload.
pub const PUT_TAG: &str = "telemetry PUT";
/// Tag passed to the response handler for the read-back.
pub const GET_TAG: &str = "telemetry GET";

/// One sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: u8,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            temperature: 25.5,
            humidity: 60,
        }
    }
}

impl Telemetry {
    /// Serializes the reading as a JSON object.
    pub fn to_json(&self) -> Result<String<MAX_JSON_LEN>, Error> {
        serde_json_core::to_string(self).map_err(|_| Error::BufferOverflow)
    }
}

/// Response handler that logs every delivery.
#[derive(Debug, Default)]
pub struct LogResponder {
    /// Number of deliveries seen, partial ones included.
    pub deliveries: usize,
    /// Status code of the last response.
    pub last_status: Option<u16>,
}

impl ResponseHandler for LogResponder {
    fn on_response(&mut self, response: &Response, data: &[u8], final_call: FinalCall, tag: &str) {
        self.deliveries += 1;
        self.last_status = Some(response.status_code);

        match final_call {
            FinalCall::More => info!("Partial data received ({} bytes)", response.data_len),
            FinalCall::Final => info!("All the data received ({} bytes)", response.data_len),
        }
        info!("Response to {}", tag);
        info!("Response status {} {}", response.status_code, response.status);

        let body = response.body(data);
        if body.is_empty() {
            info!("No payload received");
        } else {
            match core::str::from_utf8(body) {
                Ok(text) => info!("Payload: {}", text),
                Err(_) => info!("Payload: {} bytes of binary data", body.len()),
            }
        }
    }
}

/// Runs HTTPS requests against the configured endpoint, one TLS connection
/// per request.
///
/// The session owns the receive buffer. Every request overwrites it, so a
/// handler must not keep data from an earlier call.
pub struct RequestSession<T, S, const N: usize = RECV_BUF_LEN>
where
    T: TransportProvider,
    S: CredentialStore,
{
    connector: TlsConnector<T, S>,
    endpoint: EndpointConfig,
    recv_buf: [u8; N],
}

impl<T, S, const N: usize> RequestSession<T, S, N>
where
    T: TransportProvider,
    S: CredentialStore,
{
    /// Creates a session for `endpoint`.
    pub fn new(transport: T, credentials: S, endpoint: EndpointConfig) -> Self {
        let settings = TlsSettings {
            sec_tag: endpoint.sec_tag,
            ca_certificate: endpoint.ca_certificate,
            peer_hostname: endpoint.peer_hostname,
            port: endpoint.port,
        };
        Self {
            connector: TlsConnector::new(transport, credentials, settings),
            endpoint,
            recv_buf: [0; N],
        }
    }

    /// Returns the TLS connector.
    pub fn connector(&self) -> &TlsConnector<T, S> {
        &self.connector
    }

    /// Returns the receive buffer as the last request left it.
    pub fn recv_buffer(&self) -> &[u8] {
        &self.recv_buf
    }

    /// Performs one request and returns the number of bytes received.
    ///
    /// Every request carries `Connection: close`, so a response without a
    /// declared length ends when the server hangs up. The socket is closed
    /// before returning, whatever the outcome.
    pub fn execute<H: ResponseHandler>(
        &mut self,
        method: Method,
        payload: Option<&[u8]>,
        mut headers: Headers,
        handler: &mut H,
        tag: &str,
    ) -> Result<usize, Error> {
        headers
            .push(Header::new("Connection", "close")?)
            .map_err(|_| Error::BufferOverflow)?;

        let mut socket = self.connector.open(self.endpoint.host)?;
        if let Err(errno) = socket.set_timeout(self.endpoint.request_timeout_ms) {
            error!("Failed to set receive timeout ({})", errno);
            close_quietly(socket);
            return Err(Error::Socket(errno));
        }

        let request = Request {
            method,
            url: self.endpoint.url,
            host: self.endpoint.host,
            protocol: PROTOCOL,
            headers,
            payload,
        };

        let mut client = Client::new(socket);
        let result = client.request(&request, &mut self.recv_buf, handler, tag);
        close_quietly(client.into_inner());
        result
    }

    /// PUTs `value` as JSON.
    pub fn put_json<V, H>(&mut self, value: &V, handler: &mut H, tag: &str) -> Result<usize, Error>
    where
        V: Serialize,
        H: ResponseHandler,
    {
        let mut body = [0u8; MAX_JSON_LEN];
        let len = serde_json_core::to_slice(value, &mut body).map_err(|_| Error::BufferOverflow)?;

        let mut headers: Headers = Vec::new();
        headers
            .push(Header::new("Content-Type", "application/json")?)
            .map_err(|_| Error::BufferOverflow)?;

        self.execute(Method::Put, Some(&body[..len]), headers, handler, tag)
    }

    /// GETs the configured URL.
    pub fn get<H: ResponseHandler>(&mut self, handler: &mut H, tag: &str) -> Result<usize, Error> {
        self.execute(Method::Get, None, Vec::new(), handler, tag)
    }
}

impl<T, S, const N: usize> core::fmt::Debug for RequestSession<T, S, N>
where
    T: TransportProvider,
    S: CredentialStore,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RequestSession")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Connects once, uploads `telemetry`, then reads it back.
pub fn run<'a, L, D, T, S, const N: usize>(
    session: &mut ConnectivitySession<'a, L, D>,
    requests: &mut RequestSession<T, S, N>,
    telemetry: &Telemetry,
) -> Result<(), Error>
where
    L: LinkManager<'a>,
    D: DelayNs,
    T: TransportProvider,
    S: CredentialStore,
{
    info!("HTTPS telemetry client");

    info!("Connecting to Wi-Fi...");
    session.connect().map_err(|err| {
        error!("Failed to connect to Wi-Fi: {}", err.code());
        err
    })?;
    info!("Connected to Wi-Fi");

    let mut responder = LogResponder::default();

    info!("Sending data...");
    let sent = requests
        .put_json(telemetry, &mut responder, PUT_TAG)
        .map_err(|err| {
            error!("Failed to send data: {}", err.code());
            err
        })?;
    info!("{} completed ({} bytes)", PUT_TAG, sent);

    info!("Reading data...");
    let received = requests.get(&mut responder, GET_TAG).map_err(|err| {
        error!("Failed to read data: {}", err.code());
        err
    })?;
    info!("{} completed ({} bytes)", GET_TAG, received);

    info!("Operations completed successfully");
    Ok(())
}

/// Maps the outcome of [`run`] to a process status: zero or a negative code.
pub fn exit_code(result: &Result<(), Error>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => err.code(),
    }
}
