use crate::network::error::Error;
use crate::network::{Connection, Read, Write};
use core::fmt::Write as _;
use heapless::{String, Vec};

const MAX_HEADERS: usize = 16;
const MAX_HEADER_NAME_LEN: usize = 64;
const MAX_HEADER_VALUE_LEN: usize = 256;
const MAX_REQUEST_LEN: usize = 2048;
const MAX_STATUS_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Header list carried by a [`Request`].
pub type Headers = Vec<Header, MAX_HEADERS>;

#[derive(Debug, Clone)]
pub struct Header {
    pub name: String<MAX_HEADER_NAME_LEN>,
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    /// Builds a header. Line breaks in either part, or an empty or
    /// colon-bearing name, are refused so a header cannot spill into the
    /// next line of the request.
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        if name.is_empty() || name.contains(':') || has_line_break(name) || has_line_break(value) {
            return Err(Error::ProtocolError);
        }
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::BufferOverflow)?,
            value: String::try_from(value).map_err(|_| Error::BufferOverflow)?,
        })
    }
}

/// Request descriptor, built for one call and dropped after it.
#[derive(Debug)]
pub struct Request<'a> {
    pub method: Method,
    pub url: &'a str,
    pub host: &'a str,
    pub protocol: &'a str,
    pub headers: Headers,
    pub payload: Option<&'a [u8]>,
}

/// Whether more response data follows a handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FinalCall {
    More,
    Final,
}

/// Response descriptor handed to a [`ResponseHandler`].
///
/// It describes the bytes currently in the receive buffer but does not hold
/// them. They arrive separately as the `data` argument of the handler.
#[derive(Debug, Clone)]
pub struct Response {
    pub status_code: u16,
    pub status: String<MAX_STATUS_LEN>,
    pub content_length: Option<usize>,
    /// Offset of the first body byte in this delivery.
    pub body_start: usize,
    /// Number of valid bytes in the receive buffer for this delivery.
    pub data_len: usize,
    /// Bytes received so far, headers included.
    pub total_len: usize,
}

impl Response {
    /// Body part of a delivery.
    pub fn body<'d>(&self, data: &'d [u8]) -> &'d [u8] {
        data.get(self.body_start..self.data_len).unwrap_or(&[])
    }
}

pub trait ResponseHandler {
    fn on_response(&mut self, response: &Response, data: &[u8], final_call: FinalCall, tag: &str);
}

impl<F> ResponseHandler for F
where
    F: FnMut(&Response, &[u8], FinalCall, &str),
{
    fn on_response(&mut self, response: &Response, data: &[u8], final_call: FinalCall, tag: &str) {
        self(response, data, final_call, tag)
    }
}

pub struct Client<C: Connection> {
    connection: C,
}

impl<C: Connection> core::fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl<C> Client<C>
where
    C: Connection,
    <C as Read>::Error: Into<Error>,
    <C as Write>::Error: Into<Error>,
{
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Gives back the connection, typically to close it.
    pub fn into_inner(self) -> C {
        self.connection
    }

    /// Sends `request` and streams the response through `handler`.
    ///
    /// The response is received into `recv_buf`. Each time it fills up the
    /// handler sees it with [`FinalCall::More`] and the buffer is reused from
    /// the start. The last delivery is flagged [`FinalCall::Final`]. Returns
    /// the number of bytes received, headers included and anything past the
    /// declared `Content-Length` excluded.
    ///
    /// Responses that cannot carry a body (1xx, 204, 304) end with their
    /// header block. Any other response without a `Content-Length` is read
    /// until the peer closes the connection.
    ///
    /// The whole response header block must fit in `recv_buf`.
    pub fn request<H: ResponseHandler>(
        &mut self,
        request: &Request<'_>,
        recv_buf: &mut [u8],
        handler: &mut H,
        tag: &str,
    ) -> Result<usize, Error> {
        // --- Build Request ---
        let request_buf = encode_request(request)?;

        // --- Send Request ---
        self.write_all(&request_buf)?;
        self.connection.flush().map_err(Into::<Error>::into)?;

        // --- Receive Response ---
        if recv_buf.is_empty() {
            return Err(Error::BufferOverflow);
        }

        let mut head: Option<Head> = None;
        let mut filled = 0;
        let mut total = 0;
        let mut body_start = 0;
        let mut body_seen = 0;

        loop {
            if filled == recv_buf.len() {
                // A full buffer without a parsed head means the headers do not fit.
                let parsed = head.as_ref().ok_or(Error::BufferOverflow)?;
                let response = parsed.describe(body_start, filled, total);
                handler.on_response(&response, &recv_buf[..filled], FinalCall::More, tag);
                filled = 0;
                body_start = 0;
            }

            let n = self
                .connection
                .read(&mut recv_buf[filled..])
                .map_err(Into::<Error>::into)?;
            if n == 0 {
                // Connection closed by the peer
                let parsed = head.as_ref().ok_or(Error::ConnectionClosed)?;
                if parsed.expected_body().is_some_and(|len| body_seen < len) {
                    return Err(Error::ConnectionClosed);
                }
                break;
            }
            filled += n;
            total += n;

            if head.is_some() {
                body_seen += n;
            } else if let Some(end) = find_slice(&recv_buf[..filled], b"\r\n\r\n") {
                head = Some(parse_head(&recv_buf[..end])?);
                body_start = end + 4;
                body_seen = filled - body_start;
            }

            if let Some(len) = head.as_ref().and_then(Head::expected_body) {
                if body_seen >= len {
                    // Drop anything the peer sent past the declared length.
                    let excess = body_seen - len;
                    filled -= excess;
                    total -= excess;
                    break;
                }
            }
        }

        let parsed = head.as_ref().ok_or(Error::ProtocolError)?;
        let response = parsed.describe(body_start, filled, total);
        handler.on_response(&response, &recv_buf[..filled], FinalCall::Final, tag);

        Ok(total)
    }

    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            match self.connection.write(buf).map_err(Into::<Error>::into)? {
                0 => return Err(Error::ConnectionClosed),
                n => buf = &buf[n..],
            }
        }
        Ok(())
    }
}

/// Parsed status line and the headers the client acts on.
#[derive(Debug)]
struct Head {
    status_code: u16,
    status: String<MAX_STATUS_LEN>,
    content_length: Option<usize>,
}

impl Head {
    /// Body length the response is complete at, if it is known up front.
    fn expected_body(&self) -> Option<usize> {
        // 1xx, 204 and 304 never carry a body, whatever the headers say.
        if (100..200).contains(&self.status_code) || matches!(self.status_code, 204 | 304) {
            Some(0)
        } else {
            self.content_length
        }
    }

    fn describe(&self, body_start: usize, data_len: usize, total_len: usize) -> Response {
        Response {
            status_code: self.status_code,
            status: self.status.clone(),
            content_length: self.content_length,
            body_start: body_start.min(data_len),
            data_len,
            total_len,
        }
    }
}

fn encode_request(request: &Request<'_>) -> Result<Vec<u8, MAX_REQUEST_LEN>, Error> {
    let mut request_buf: Vec<u8, MAX_REQUEST_LEN> = Vec::new();

    // Request line
    let mut push = |bytes: &[u8]| {
        request_buf
            .extend_from_slice(bytes)
            .map_err(|_| Error::BufferOverflow)
    };
    push(request.method.as_str().as_bytes())?;
    push(b" ")?;
    push(request.url.as_bytes())?;
    push(b" ")?;
    push(request.protocol.as_bytes())?;
    push(b"\r\n")?;

    // Headers
    push(b"Host: ")?;
    push(request.host.as_bytes())?;
    push(b"\r\n")?;
    for header in &request.headers {
        push(header.name.as_bytes())?;
        push(b": ")?;
        push(header.value.as_bytes())?;
        push(b"\r\n")?;
    }

    // Body
    if let Some(payload) = request.payload {
        let mut len_str: String<20> = String::new();
        write!(len_str, "{}", payload.len()).map_err(|_| Error::BufferOverflow)?;
        push(b"Content-Length: ")?;
        push(len_str.as_bytes())?;
        push(b"\r\n\r\n")?;
        push(payload)?;
    } else {
        push(b"\r\n")?;
    }

    Ok(request_buf)
}

fn parse_head(header_data: &[u8]) -> Result<Head, Error> {
    let header_str = core::str::from_utf8(header_data).map_err(|_| Error::ProtocolError)?;
    let mut lines = header_str.lines();

    // Parse status line
    let status_line = lines.next().ok_or(Error::ProtocolError)?;
    let mut status_parts = status_line.splitn(3, ' ');
    let version = status_parts.next().ok_or(Error::ProtocolError)?;
    if !version.starts_with("HTTP/") {
        return Err(Error::ProtocolError);
    }
    let status_code = status_parts
        .next()
        .ok_or(Error::ProtocolError)?
        .parse::<u16>()
        .map_err(|_| Error::ProtocolError)?;

    let mut status = String::new();
    for c in status_parts.next().unwrap_or("").trim().chars() {
        if status.push(c).is_err() {
            break;
        }
    }

    // Parse headers
    let mut content_length = None;
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ':');
        let name = parts.next().ok_or(Error::ProtocolError)?.trim();
        let value = parts.next().ok_or(Error::ProtocolError)?.trim();

        if name.eq_ignore_ascii_case("Content-Length") {
            content_length = Some(value.parse::<usize>().map_err(|_| Error::ProtocolError)?);
        }
    }

    Ok(Head {
        status_code,
        status,
        content_length,
    })
}

fn has_line_break(text: &str) -> bool {
    text.bytes().any(|b| b == b'\r' || b == b'\n')
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
