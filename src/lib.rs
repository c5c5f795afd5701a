//! # smartliving - SmartLiving device library
//!
//! Connects a microcontroller-based weather station to the SmartLiving IoT
//! platform over WiFi. State updates and commands travel over MQTT; assets
//! (sensors and actuators) are registered once through the REST API.
//!
//! The crate is `no_std`, allocation-free and single-threaded. The
//! [`Device`](device::Device) is driven from the firmware's control loop and
//! talks to its collaborators through three traits:
//!
//! - [`Wifi`](network::wifi::Wifi): the WiFi station driver,
//! - [`MqttSession`](network::application::mqtt::MqttSession): the MQTT client,
//! - [`Rest`](network::application::http::Rest): the REST client.
//!
//! MQTT and REST implementations over any TCP [`Connect`](network::Connect)
//! connector ship with the crate; the WiFi driver is always
//! platform-specific.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use smartliving::device::{AssetType, Command, Device, DeviceInfo};
//! use smartliving::network::application::{http::RestClient, mqtt::Session};
//! # use smartliving::network::{Connect, Connection, wifi::{Response, Wifi}};
//! # #[derive(Clone, Copy)] struct Tcp;
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
//! # impl Connect for Tcp {
//! #     type Connection = Conn;
//! #     type Error = ();
//! #     fn connect(&mut self, _remote: &str) -> Result<Conn, ()> { Ok(Conn) }
//! # }
//! # struct Station;
//! # impl Wifi for Station {
//! #     type Error = ();
//! #     fn process(&mut self) -> Result<Option<Response>, ()> { Ok(None) }
//! # }
//!
//! let info = DeviceInfo::new("device-id", "client-id", "client-key").unwrap();
//! let mut device = Device::new(Station, Session::new(Tcp), RestClient::new(Tcp), info);
//!
//! let mut on_command = |command: &Command| {
//!     // drive the actuator named command.name with command.value
//!     let _ = command;
//! };
//! device.set_command_handler(&mut on_command);
//! device.set_auto_echo(true);
//!
//! device.connect().unwrap();
//! let _ = device.add_asset("temperature", AssetType::Sensor, "number");
//!
//! loop {
//!     device.process().unwrap();
//!     if device.is_connected() {
//!         let _ = device.send("temperature", "21.5");
//!     }
//! }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Mirror device log lines and errors to defmt

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

/// The SmartLiving device: asset registration, state publishing and
/// command dispatch.
pub mod device;

/// Network abstraction layer: connection traits, the WiFi seam and the
/// MQTT and HTTP clients.
pub mod network;
