//! The MQTT seam the device drives, and a connector-backed implementation.

use super::client::{Client, Options, Packet, PublishPacket, QoS};
use crate::network::error::Error;
use crate::network::{Close, Connect};
use core::fmt::Write;
use heapless::{Deque, String};

/// Maximum broker host name length.
pub const MAX_HOST_LEN: usize = 64;
/// Maximum client identifier length.
pub const MAX_CLIENT_ID_LEN: usize = 64;
/// Maximum user name length.
pub const MAX_USERNAME_LEN: usize = 132;
/// Maximum password length.
pub const MAX_PASSWORD_LEN: usize = 64;

/// Fixed client parameters handed to [`MqttSession::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setup<'a> {
    /// Client identifier sent in CONNECT.
    pub client_id: &'a str,
    /// User name sent in CONNECT.
    pub username: &'a str,
    /// Password sent in CONNECT.
    pub password: &'a str,
    /// Keep-alive interval in seconds.
    pub keep_alive_seconds: u16,
    /// Whether the broker should discard previous session state.
    pub clean_session: bool,
}

/// Lifecycle and data notifications from an MQTT session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The broker accepted the connection.
    Connected,
    /// The connection was closed, locally or by the peer.
    Disconnected,
    /// The broker acknowledged the publish with this packet identifier.
    Published(u16),
    /// A message arrived on a subscribed topic.
    Data(PublishPacket),
}

/// An MQTT client as seen by the device.
///
/// Implementations must not invoke any device code themselves: lifecycle
/// changes and incoming messages are reported through [`MqttSession::poll`],
/// which the device drains from its control loop.
pub trait MqttSession {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Stores the client parameters used by every following connect.
    fn begin(&mut self, setup: &Setup<'_>) -> Result<(), Self::Error>;

    /// Opens the connection to `host:port` and performs the handshake.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Self::Error>;

    /// Closes the connection if one is open.
    fn disconnect(&mut self) -> Result<(), Self::Error>;

    /// Publishes `payload` on `topic`.
    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Self::Error>;

    /// Subscribes to a topic filter.
    fn subscribe(&mut self, filter: &str, qos: QoS) -> Result<(), Self::Error>;

    /// Returns the next pending event, if any.
    fn poll(&mut self) -> Result<Option<Event>, Self::Error>;
}

#[derive(Debug)]
struct StoredSetup {
    client_id: String<MAX_CLIENT_ID_LEN>,
    username: String<MAX_USERNAME_LEN>,
    password: String<MAX_PASSWORD_LEN>,
    keep_alive_seconds: u16,
    clean_session: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Connected,
    Disconnected,
}

/// [`MqttSession`] backed by [`Client`] over connections from `N`.
#[derive(Debug)]
pub struct Session<N: Connect> {
    connector: N,
    setup: Option<StoredSetup>,
    client: Option<Client<N::Connection>>,
    notices: Deque<Notice, 4>,
}

impl<N: Connect> Session<N> {
    /// Creates an unconfigured session; call [`MqttSession::begin`] first.
    pub fn new(connector: N) -> Self {
        Self {
            connector,
            setup: None,
            client: None,
            notices: Deque::new(),
        }
    }

    /// Whether a broker connection is currently open.
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    /// Sends a keep-alive ping.
    ///
    /// The session has no clock; firmware calls this from a timer at an
    /// interval shorter than the keep-alive passed to `begin`.
    pub fn ping(&mut self) -> Result<(), Error> {
        let client = self.client.as_mut().ok_or(Error::NotOpen)?;
        client.ping()
    }

    /// Borrow the connector.
    pub fn connector(&self) -> &N {
        &self.connector
    }

    fn notify(&mut self, notice: Notice) {
        if self.notices.is_full() {
            self.notices.pop_front();
        }
        let _ = self.notices.push_back(notice);
    }

    fn drop_connection(&mut self) {
        if let Some(mut client) = self.client.take() {
            // the peer may already be gone, close regardless
            let _ = client.disconnect();
            let _ = client.into_inner().close();
            self.notify(Notice::Disconnected);
        }
    }

    fn next_notice(&mut self) -> Option<Event> {
        self.notices.pop_front().map(|notice| match notice {
            Notice::Connected => Event::Connected,
            Notice::Disconnected => Event::Disconnected,
        })
    }
}

impl<N: Connect> MqttSession for Session<N> {
    type Error = Error;

    fn begin(&mut self, setup: &Setup<'_>) -> Result<(), Error> {
        if self.client.is_some() {
            return Err(Error::ProtocolError);
        }
        if setup.client_id.is_empty() {
            return Err(Error::ProtocolError);
        }
        self.setup = Some(StoredSetup {
            client_id: String::try_from(setup.client_id).map_err(|_| Error::BufferOverflow)?,
            username: String::try_from(setup.username).map_err(|_| Error::BufferOverflow)?,
            password: String::try_from(setup.password).map_err(|_| Error::BufferOverflow)?,
            keep_alive_seconds: setup.keep_alive_seconds,
            clean_session: setup.clean_session,
        });
        Ok(())
    }

    fn connect(&mut self, host: &str, port: u16) -> Result<(), Error> {
        if self.client.is_some() {
            return Ok(());
        }
        let setup = self.setup.as_ref().ok_or(Error::NotOpen)?;

        let mut remote: String<{ MAX_HOST_LEN + 6 }> = String::new();
        write!(remote, "{}:{}", host, port).map_err(|_| Error::InvalidAddress)?;

        let connection = self
            .connector
            .connect(&remote)
            .map_err(|_| Error::ConnectionRefused)?;
        let options = Options {
            client_id: &setup.client_id,
            keep_alive_seconds: setup.keep_alive_seconds,
            clean_session: setup.clean_session,
            username: (!setup.username.is_empty()).then_some(setup.username.as_str()),
            password: (!setup.password.is_empty()).then_some(setup.password.as_bytes()),
        };
        self.client = Some(Client::connect(connection, options)?);
        self.notify(Notice::Connected);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Error> {
        self.drop_connection();
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Error> {
        let client = self.client.as_mut().ok_or(Error::NotOpen)?;
        client.publish(topic, payload, qos).map(|_| ())
    }

    fn subscribe(&mut self, filter: &str, qos: QoS) -> Result<(), Error> {
        let client = self.client.as_mut().ok_or(Error::NotOpen)?;
        client.subscribe(filter, qos).map(|_| ())
    }

    fn poll(&mut self) -> Result<Option<Event>, Error> {
        if let Some(event) = self.next_notice() {
            return Ok(Some(event));
        }

        loop {
            let Some(client) = self.client.as_mut() else {
                return Ok(None);
            };
            match client.poll() {
                Ok(Some(Packet::Publish(packet))) => return Ok(Some(Event::Data(packet))),
                Ok(Some(Packet::PubAck(packet_id))) => return Ok(Some(Event::Published(packet_id))),
                Ok(Some(_)) => continue,
                Ok(None) => return Ok(None),
                Err(_) => {
                    // the peer is gone or the stream lost framing
                    self.drop_connection();
                    return Ok(self.next_notice());
                }
            }
        }
    }
}
