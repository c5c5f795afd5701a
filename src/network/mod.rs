//! A network abstraction layer for embedded systems
//!
//! The traits in this module describe a byte-stream connection and the
//! connector that opens one. The bundled MQTT and HTTP clients are written
//! against them, so any TCP stack (smoltcp, an AT-command modem, a host
//! `TcpStream`) can carry the device's traffic.

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application layer protocols (MQTT, HTTP)
pub mod application;

/// WiFi station driver seam
pub mod wifi;

/// Re-exports of common traits
pub mod prelude {
    pub use super::wifi::Wifi;
    pub use super::{Close, Connect, Connection, Read, Write};
}

/// Byte-oriented read half of a connection.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte-oriented write half of a connection.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Consuming shutdown of a connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open a connection to `remote`, given as `host:port`
    fn connect(&mut self, remote: &str) -> Result<Self::Connection, Self::Error>;
}

/// Writes all of `buf`, retrying short writes.
pub(crate) fn write_all<C: Write>(connection: &mut C, mut buf: &[u8]) -> Result<(), error::Error> {
    while !buf.is_empty() {
        match connection.write(buf) {
            Ok(0) => return Err(error::Error::ConnectionClosed),
            Ok(n) => buf = &buf[n..],
            Err(_) => return Err(error::Error::WriteError),
        }
    }
    Ok(())
}

/// Fills `buf` completely, failing if the peer closes first.
pub(crate) fn read_exact<C: Read>(connection: &mut C, buf: &mut [u8]) -> Result<(), error::Error> {
    let mut total_read = 0;
    while total_read < buf.len() {
        match connection.read(&mut buf[total_read..]) {
            Ok(0) => return Err(error::Error::ConnectionClosed),
            Ok(n) => total_read += n,
            Err(_) => return Err(error::Error::ReadError),
        }
    }
    Ok(())
}
