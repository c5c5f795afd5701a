//! REST seam used by the device for asset registration.

use super::client::{Client, Header, MAX_HEADERS, Method, Request, Response};
use crate::network::error::Error;
use crate::network::{Close, Connect};
use core::fmt::Write;
use heapless::{String, Vec};

/// Maximum host name length.
pub const MAX_HOST_LEN: usize = 64;
/// Maximum content type length.
pub const MAX_CONTENT_TYPE_LEN: usize = 64;
/// Port used when the host carries none.
pub const DEFAULT_PORT: u16 = 80;

/// A REST client bound to one API host.
pub trait Rest {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Targets `host` for all following requests.
    fn begin(&mut self, host: &str) -> Result<(), Self::Error>;

    /// Sets the `Content-Type` sent with request bodies.
    fn set_content_type(&mut self, content_type: &str) -> Result<(), Self::Error>;

    /// Issues a `PUT` of `body` to `path` with extra `headers`.
    fn put(&mut self, path: &str, headers: &[Header], body: &[u8])
    -> Result<Response, Self::Error>;
}

/// [`Rest`] implementation that dials a new connection per request.
#[derive(Debug)]
pub struct RestClient<N: Connect> {
    connector: N,
    host: Option<String<MAX_HOST_LEN>>,
    content_type: Option<String<MAX_CONTENT_TYPE_LEN>>,
}

impl<N: Connect> RestClient<N> {
    /// Creates an unconfigured client; call [`Rest::begin`] before use.
    pub fn new(connector: N) -> Self {
        Self {
            connector,
            host: None,
            content_type: None,
        }
    }

    /// Host set by the last [`Rest::begin`].
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Content type set by the last [`Rest::set_content_type`].
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Borrow the connector.
    pub fn connector(&self) -> &N {
        &self.connector
    }

    fn send(&mut self, method: Method, path: &str, extra: &[Header], body: &[u8]) -> Result<Response, Error> {
        let host = self.host.as_ref().ok_or(Error::NotOpen)?;

        let mut remote: String<{ MAX_HOST_LEN + 6 }> = String::new();
        if host.contains(':') {
            remote.push_str(host).map_err(|_| Error::InvalidAddress)?;
        } else {
            write!(remote, "{}:{}", host, DEFAULT_PORT).map_err(|_| Error::InvalidAddress)?;
        }

        let mut headers: Vec<Header, MAX_HEADERS> = Vec::new();
        headers
            .push(Header::new("Host", host)?)
            .map_err(|_| Error::BufferOverflow)?;
        if let Some(content_type) = &self.content_type {
            headers
                .push(Header::new("Content-Type", content_type)?)
                .map_err(|_| Error::BufferOverflow)?;
        }
        for header in extra {
            headers
                .push(header.clone())
                .map_err(|_| Error::BufferOverflow)?;
        }

        let connection = self
            .connector
            .connect(&remote)
            .map_err(|_| Error::ConnectionRefused)?;
        let mut client = Client::new(connection);
        let response = client.request(&Request {
            method,
            path,
            headers,
            body: Some(body),
        });
        // closing is best effort, the response is what matters
        let _ = client.into_inner().close();
        response
    }
}

impl<N: Connect> Rest for RestClient<N> {
    type Error = Error;

    fn begin(&mut self, host: &str) -> Result<(), Error> {
        if host.is_empty() {
            return Err(Error::InvalidAddress);
        }
        self.host = Some(String::try_from(host).map_err(|_| Error::InvalidAddress)?);
        Ok(())
    }

    fn set_content_type(&mut self, content_type: &str) -> Result<(), Error> {
        self.content_type =
            Some(String::try_from(content_type).map_err(|_| Error::BufferOverflow)?);
        Ok(())
    }

    fn put(&mut self, path: &str, headers: &[Header], body: &[u8]) -> Result<Response, Error> {
        self.send(Method::Put, path, headers, body)
    }
}
