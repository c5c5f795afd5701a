//! HTTP/1.1 support for asset registration.
//!
//! [`client::Client`] is a small request/response codec over any
//! [`Connection`](crate::network::Connection) with fixed-size buffers.
//! [`rest::RestClient`] layers the [`Rest`] seam on top of it: it remembers
//! the API host and content type, dials a fresh connection per request and
//! issues the `PUT` the device uses to register assets.
//!
//! ```rust,no_run
//! use smartliving::network::application::http::{Header, Rest, RestClient};
//! # use smartliving::network::{Connect, Connection};
//! # struct Conn;
//! # impl Connection for Conn {}
//! # impl smartliving::network::Read for Conn {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl smartliving::network::Write for Conn {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl smartliving::network::Close for Conn {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Tcp;
//! # impl Connect for Tcp {
//! #     type Connection = Conn;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<Conn, ()> { Ok(Conn) }
//! # }
//!
//! let mut rest = RestClient::new(Tcp);
//! rest.begin("api.smartliving.io").unwrap();
//! rest.set_content_type("application/json").unwrap();
//! // let response = rest.put("/device/D1/asset/temp", &[], br#"{"title":"temp"}"#)?;
//! ```

/// HTTP client implementation and supporting types.
pub mod client;

/// REST seam and its connector-backed implementation.
pub mod rest;

pub use client::{Client, Header, Method, Request, Response};
pub use rest::{Rest, RestClient};
