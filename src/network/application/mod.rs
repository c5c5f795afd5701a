//! # Application Layer Network Protocols
//!
//! The two protocols a SmartLiving device speaks: MQTT for state updates and
//! commands, HTTP for asset registration. Each protocol has two layers:
//!
//! - a byte-level `Client` that works with any type implementing
//!   [`Connection`](crate::network::Connection), and
//! - a seam trait ([`mqtt::MqttSession`], [`http::Rest`]) that the
//!   [`Device`](crate::device::Device) drives, with a bundled implementation
//!   ([`mqtt::Session`], [`http::RestClient`]) built on a
//!   [`Connect`](crate::network::Connect) connector.
//!
//! Firmware that already has an MQTT or REST stack can implement the seam
//! traits directly and skip the bundled clients.
//!
//! ```rust,no_run
//! use smartliving::network::application::http::{Client, Request, Method};
//! # use smartliving::network::Connection;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl smartliving::network::Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl smartliving::network::Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl smartliving::network::Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//!
//! let mut client = Client::new(MockConnection);
//! let request = Request {
//!     method: Method::Put,
//!     path: "/device/D1/asset/temp",
//!     headers: heapless::Vec::new(),
//!     body: Some(br#"{"title":"temp"}"#),
//! };
//! // let response = client.request(&request)?;
//! ```

/// HTTP/1.1 client and the REST seam used for asset registration.
pub mod http;

/// MQTT 3.1.1 client and the session seam used for state and commands.
pub mod mqtt;
