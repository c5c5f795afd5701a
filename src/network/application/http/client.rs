use crate::network::error::Error;
use crate::network::{Connection, write_all};
use core::fmt::Write;
use heapless::{String, Vec};

/// Maximum number of headers on a request or response.
pub const MAX_HEADERS: usize = 16;
/// Maximum header name length.
pub const MAX_HEADER_NAME_LEN: usize = 64;
/// Maximum header value length.
pub const MAX_HEADER_VALUE_LEN: usize = 256;
/// Size of the request and response buffers.
pub const MAX_MESSAGE_LEN: usize = 2048;

/// Request methods supported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name
    pub name: String<MAX_HEADER_NAME_LEN>,
    /// Header value
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

impl Header {
    /// Builds a header, failing if either part exceeds its capacity.
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        Ok(Self {
            name: String::try_from(name).map_err(|_| Error::BufferOverflow)?,
            value: String::try_from(value).map_err(|_| Error::BufferOverflow)?,
        })
    }
}

/// An outgoing request.
#[derive(Debug)]
pub struct Request<'a> {
    /// Request method
    pub method: Method,
    /// Absolute path, e.g. `/device/D1/asset/temp`
    pub path: &'a str,
    /// Headers sent verbatim, in order
    pub headers: Vec<Header, MAX_HEADERS>,
    /// Optional body
    pub body: Option<&'a [u8]>,
}

/// A parsed response.
#[derive(Debug)]
pub struct Response {
    /// Numeric status code
    pub status_code: u16,
    /// Response headers in arrival order
    pub headers: Vec<Header, MAX_HEADERS>,
    /// Response body, cut at `Content-Length` when present and at
    /// [`MAX_MESSAGE_LEN`] bytes in any case
    pub body: Vec<u8, MAX_MESSAGE_LEN>,
}

impl Response {
    /// Body as text, or `None` if it is not UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.body).ok()
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Minimal HTTP/1.1 client over a single connection.
#[derive(Debug)]
pub struct Client<C: Connection> {
    connection: C,
}

impl<C: Connection> Client<C> {
    /// Wraps an established connection.
    pub fn new(connection: C) -> Self {
        Self { connection }
    }

    /// Gives the connection back, e.g. to close it.
    pub fn into_inner(self) -> C {
        self.connection
    }

    /// Sends `request` and reads one response.
    pub fn request(&mut self, request: &Request) -> Result<Response, Error> {
        let request_buf = encode_request(request)?;

        write_all(&mut self.connection, &request_buf)?;
        self.connection.flush().map_err(|_| Error::WriteError)?;

        // --- Receive Response ---
        let mut response_buf = [0u8; MAX_MESSAGE_LEN];
        let mut total_read = 0;
        loop {
            match self.connection.read(&mut response_buf[total_read..]) {
                Ok(0) if total_read > 0 => break,
                Ok(0) => return Err(Error::ConnectionClosed),
                Ok(n) => {
                    total_read += n;
                    if total_read >= response_buf.len() {
                        break;
                    }
                    if find_slice(&response_buf[..total_read], b"\r\n\r\n").is_some() {
                        break;
                    }
                }
                Err(_) => return Err(Error::ReadError),
            }
        }

        let response_data = &response_buf[..total_read];
        let header_end_pos = find_slice(response_data, b"\r\n\r\n").ok_or(Error::ProtocolError)?;
        let header_str = core::str::from_utf8(&response_data[..header_end_pos])
            .map_err(|_| Error::ProtocolError)?;
        let body_data = &response_data[header_end_pos + 4..];

        let mut lines = header_str.lines();

        // Status line: "HTTP/1.1 200 OK"
        let status_line = lines.next().ok_or(Error::ProtocolError)?;
        let mut status_parts = status_line.splitn(3, ' ');
        status_parts.next();
        let status_code = status_parts
            .next()
            .ok_or(Error::ProtocolError)?
            .parse::<u16>()
            .map_err(|_| Error::ProtocolError)?;

        let mut headers: Vec<Header, MAX_HEADERS> = Vec::new();
        let mut content_length: Option<usize> = None;
        for line in lines.filter(|l| !l.is_empty()) {
            let (name, value) = line.split_once(':').ok_or(Error::ProtocolError)?;
            let (name, value) = (name.trim(), value.trim());

            if name.eq_ignore_ascii_case("Content-Length") {
                content_length = value.parse::<usize>().ok();
            }

            // Headers beyond capacity are dropped, the body still matters.
            if let Ok(header) = Header::new(name, value) {
                let _ = headers.push(header);
            }
        }

        let mut body: Vec<u8, MAX_MESSAGE_LEN> =
            Vec::from_slice(body_data).map_err(|_| Error::BufferOverflow)?;
        if let Some(len) = content_length {
            // a body beyond capacity is kept truncated, the rest stays unread
            while body.len() < len && !body.is_full() {
                let mut temp_buf = [0u8; 256];
                let read_len = (len - body.len())
                    .min(temp_buf.len())
                    .min(body.capacity() - body.len());

                match self.connection.read(&mut temp_buf[..read_len]) {
                    Ok(0) => return Err(Error::ConnectionClosed),
                    Ok(n) => body
                        .extend_from_slice(&temp_buf[..n])
                        .map_err(|_| Error::BufferOverflow)?,
                    Err(_) => return Err(Error::ReadError),
                }
            }
            body.truncate(len);
        }

        Ok(Response {
            status_code,
            headers,
            body,
        })
    }
}

/// Serializes the request line, headers and body.
///
/// `Content-Length` is added for bodies unless the caller supplied one.
fn encode_request(request: &Request) -> Result<Vec<u8, MAX_MESSAGE_LEN>, Error> {
    let mut buf: Vec<u8, MAX_MESSAGE_LEN> = Vec::new();
    let mut put = |bytes: &[u8]| buf.extend_from_slice(bytes).map_err(|_| Error::BufferOverflow);

    put(request.method.as_str().as_bytes())?;
    put(b" ")?;
    put(request.path.as_bytes())?;
    put(b" HTTP/1.1\r\n")?;

    let mut has_content_length = false;
    for header in &request.headers {
        if header.name.eq_ignore_ascii_case("Content-Length") {
            has_content_length = true;
        }
        put(header.name.as_bytes())?;
        put(b": ")?;
        put(header.value.as_bytes())?;
        put(b"\r\n")?;
    }

    if let Some(body) = request.body {
        if !has_content_length {
            let mut len_str: String<10> = String::new();
            write!(len_str, "{}", body.len()).map_err(|_| Error::BufferOverflow)?;
            put(b"Content-Length: ")?;
            put(len_str.as_bytes())?;
            put(b"\r\n")?;
        }
        put(b"\r\n")?;
        put(body)?;
    } else {
        put(b"\r\n")?;
    }

    Ok(buf)
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
