//! MQTT 3.1.1 support for state updates and commands.
//!
//! [`client::Client`] is a small packet codec over any
//! [`Connection`](crate::network::Connection). [`session::Session`] wraps it
//! in the [`MqttSession`] seam: it keeps the client parameters, dials the
//! broker through a [`Connect`](crate::network::Connect) connector on demand
//! and turns broker traffic into [`Event`]s for the device to dispatch.
//!
//! ```rust,no_run
//! use smartliving::network::application::mqtt::{MqttSession, QoS, Session, Setup};
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
//! let mut session = Session::new(Tcp);
//! session.begin(&Setup {
//!     client_id: "WeatherStation",
//!     username: "C1:C1",
//!     password: "secret",
//!     keep_alive_seconds: 30,
//!     clean_session: true,
//! }).unwrap();
//! // session.connect("broker.smartliving.io", 1883)?;
//! // session.publish("client.C1.out.device.D1.asset.temp.state", b"0|21", QoS::AtMostOnce)?;
//! ```

/// Packet-level client.
pub mod client;

/// Session seam and its connector-backed implementation.
pub mod session;

pub use client::{Client, Options, Packet, PublishPacket, QoS};
pub use session::{Event, MqttSession, Session, Setup};
