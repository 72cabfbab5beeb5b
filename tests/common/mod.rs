//! Fakes of the platform capabilities shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use iotlink::network::error::Errno;
use iotlink::network::link::{ConnectParams, EventMask, LinkEvent, LinkManager, Observer};
use iotlink::network::tls::{
    CredentialKind, CredentialStore, SecTag, TlsSocket, TlsVersion, TransportProvider,
};
use iotlink::network::{Close, Connection, Read, Write};

pub mod logger;

/// Ordered record of the platform calls a test made.
pub type Trace = Rc<RefCell<Vec<&'static str>>>;

pub fn trace() -> Trace {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn calls(trace: &Trace) -> Vec<&'static str> {
    trace.borrow().clone()
}

/// Delay that only counts.
#[derive(Debug, Clone, Default)]
pub struct FakeDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl FakeDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
    }
}

/// Delay that actually sleeps.
#[derive(Debug, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

/// Connection manager fake. The acknowledgment, when configured, is pushed
/// through the observer from inside `connect`.
#[derive(Debug)]
pub struct FakeLink<'a> {
    pub has_interface: bool,
    pub connect_result: Result<(), Errno>,
    pub ack: Option<LinkEvent>,
    pub address: Option<Ipv4Addr>,
    /// Number of address queries that come back empty before `address` shows up.
    pub address_after_polls: usize,
    pub mask: Option<EventMask>,
    pub last_ssid: Option<String>,
    polls: usize,
    observer: Option<Observer<'a>>,
    trace: Trace,
}

impl<'a> FakeLink<'a> {
    pub fn new(trace: &Trace) -> Self {
        Self {
            has_interface: true,
            connect_result: Ok(()),
            ack: Some(LinkEvent::ConnectResult { status: 0 }),
            address: Some(Ipv4Addr::new(192, 168, 1, 42)),
            address_after_polls: 0,
            mask: None,
            last_ssid: None,
            polls: 0,
            observer: None,
            trace: trace.clone(),
        }
    }

    pub fn is_observed(&self) -> bool {
        self.observer.is_some()
    }
}

impl<'a> LinkManager<'a> for FakeLink<'a> {
    type Interface = u8;

    fn default_interface(&mut self) -> Option<u8> {
        self.trace.borrow_mut().push("default_interface");
        self.has_interface.then_some(1)
    }

    fn register_observer(&mut self, _iface: u8, mask: EventMask, observer: Observer<'a>) {
        self.trace.borrow_mut().push("register_observer");
        self.mask = Some(mask);
        self.observer = Some(observer);
    }

    fn unregister_observer(&mut self) {
        self.trace.borrow_mut().push("unregister_observer");
        self.observer = None;
    }

    fn connect(&mut self, _iface: u8, params: &ConnectParams<'_>) -> Result<(), Errno> {
        self.trace.borrow_mut().push("connect");
        self.last_ssid = Some(params.ssid.to_string());
        self.connect_result?;
        if let (Some(observer), Some(event)) = (self.observer, self.ack) {
            observer.notify(event);
        }
        Ok(())
    }

    fn start_dhcp(&mut self, _iface: u8) {
        self.trace.borrow_mut().push("start_dhcp");
    }

    fn ipv4_address(&mut self, _iface: u8) -> Option<Ipv4Addr> {
        self.polls += 1;
        if self.polls > self.address_after_polls {
            self.address
        } else {
            None
        }
    }
}

/// Outcome of each option call on a [`FakeSocket`].
#[derive(Debug, Clone, Copy)]
pub struct SocketPlan {
    pub sec_tags: Result<(), Errno>,
    pub hostname: Result<(), Errno>,
    pub timeout: Result<(), Errno>,
    pub connect: Result<(), Errno>,
    /// Returned once the scripted chunks run out, instead of end of stream.
    pub read_error: Option<Errno>,
}

impl Default for SocketPlan {
    fn default() -> Self {
        Self {
            sec_tags: Ok(()),
            hostname: Ok(()),
            timeout: Ok(()),
            connect: Ok(()),
            read_error: None,
        }
    }
}

/// Socket provider fake. Each created socket takes the next scripted response.
#[derive(Debug)]
pub struct FakeTransport {
    pub socket_result: Result<(), Errno>,
    pub resolve_result: Result<SocketAddrV4, Errno>,
    pub plan: SocketPlan,
    pub responses: VecDeque<Vec<Vec<u8>>>,
    pub sent: Rc<RefCell<Vec<Vec<u8>>>>,
    pub hostnames: Rc<RefCell<Vec<String>>>,
    trace: Trace,
}

impl FakeTransport {
    pub fn new(trace: &Trace) -> Self {
        Self {
            socket_result: Ok(()),
            resolve_result: Ok(SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 7), 443)),
            plan: SocketPlan::default(),
            responses: VecDeque::new(),
            sent: Rc::new(RefCell::new(Vec::new())),
            hostnames: Rc::new(RefCell::new(Vec::new())),
            trace: trace.clone(),
        }
    }

    /// Queues one response, delivered in reads of at most `chunk` bytes.
    pub fn respond(&mut self, response: &[u8], chunk: usize) {
        self.responses
            .push_back(response.chunks(chunk).map(<[u8]>::to_vec).collect());
    }
}

impl TransportProvider for FakeTransport {
    type Socket = FakeSocket;

    fn socket(&mut self, version: TlsVersion) -> Result<FakeSocket, Errno> {
        assert_eq!(version, TlsVersion::Tls12);
        self.trace.borrow_mut().push("socket");
        self.socket_result?;
        self.sent.borrow_mut().push(Vec::new());
        Ok(FakeSocket {
            plan: self.plan,
            chunks: self.responses.pop_front().unwrap_or_default().into(),
            index: self.sent.borrow().len() - 1,
            sent: self.sent.clone(),
            hostnames: self.hostnames.clone(),
            trace: self.trace.clone(),
        })
    }

    fn resolve(&mut self, _host: &str, port: u16) -> Result<SocketAddrV4, Errno> {
        self.trace.borrow_mut().push("resolve");
        self.resolve_result
            .map(|addr| SocketAddrV4::new(*addr.ip(), port))
    }
}

#[derive(Debug)]
pub struct FakeSocket {
    plan: SocketPlan,
    chunks: VecDeque<Vec<u8>>,
    index: usize,
    sent: Rc<RefCell<Vec<Vec<u8>>>>,
    hostnames: Rc<RefCell<Vec<String>>>,
    trace: Trace,
}

impl Read for FakeSocket {
    type Error = Errno;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return match self.plan.read_error {
                Some(errno) => Err(errno),
                None => Ok(0),
            };
        };
        let len = chunk.len().min(buf.len());
        buf[..len].copy_from_slice(&chunk[..len]);
        if len < chunk.len() {
            self.chunks.push_front(chunk.split_off(len));
        }
        Ok(len)
    }
}

impl Write for FakeSocket {
    type Error = Errno;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.sent.borrow_mut()[self.index].extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for FakeSocket {
    type Error = Errno;

    fn close(self) -> Result<(), Self::Error> {
        self.trace.borrow_mut().push("close");
        Ok(())
    }
}

impl Connection for FakeSocket {}

impl TlsSocket for FakeSocket {
    fn set_sec_tags(&mut self, tags: &[SecTag]) -> Result<(), Errno> {
        assert!(!tags.is_empty());
        self.trace.borrow_mut().push("set_sec_tags");
        self.plan.sec_tags
    }

    fn set_hostname(&mut self, hostname: &str) -> Result<(), Errno> {
        self.trace.borrow_mut().push("set_hostname");
        self.hostnames.borrow_mut().push(hostname.to_string());
        self.plan.hostname
    }

    fn set_timeout(&mut self, _timeout_ms: u32) -> Result<(), Errno> {
        self.trace.borrow_mut().push("set_timeout");
        self.plan.timeout
    }

    fn connect(&mut self, _remote: SocketAddrV4) -> Result<(), Errno> {
        self.trace.borrow_mut().push("socket_connect");
        self.plan.connect
    }
}

/// Credential store fake.
#[derive(Debug)]
pub struct FakeCredentials {
    pub result: Result<(), Errno>,
    pub added: Vec<(SecTag, CredentialKind, usize)>,
    trace: Trace,
}

impl FakeCredentials {
    pub fn new(trace: &Trace) -> Self {
        Self {
            result: Ok(()),
            added: Vec::new(),
            trace: trace.clone(),
        }
    }
}

impl CredentialStore for FakeCredentials {
    fn add(&mut self, tag: SecTag, kind: CredentialKind, material: &[u8]) -> Result<(), Errno> {
        self.trace.borrow_mut().push("credential_add");
        self.result?;
        self.added.push((tag, kind, material.len()));
        Ok(())
    }
}

/// Byte-stream connection serving canned reads, for driving the HTTP client
/// directly.
#[derive(Debug, Default)]
pub struct MockConnection {
    chunks: VecDeque<Vec<u8>>,
    pub writes: Vec<u8>,
    pub read_error: Option<Errno>,
}

impl MockConnection {
    pub fn new(data: &[u8], chunk: usize) -> Self {
        Self {
            chunks: data.chunks(chunk).map(<[u8]>::to_vec).collect(),
            writes: Vec::new(),
            read_error: None,
        }
    }
}

impl Read for MockConnection {
    type Error = Errno;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return match self.read_error {
                Some(errno) => Err(errno),
                None => Ok(0),
            };
        };
        let len = chunk.len().min(buf.len());
        buf[..len].copy_from_slice(&chunk[..len]);
        if len < chunk.len() {
            self.chunks.push_front(chunk.split_off(len));
        }
        Ok(len)
    }
}

impl Write for MockConnection {
    type Error = Errno;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.writes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Errno;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for MockConnection {}

/// Builds an HTTP/1.1 response with a `Content-Length` header.
pub fn http_response(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}
