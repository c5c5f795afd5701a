//! An MQTT client implementation based on the MQTT 3.1.1 specification.
//!
//! The client speaks the subset a telemetry device needs: CONNECT with
//! credentials, PUBLISH at QoS 0/1/2, SUBSCRIBE, PINGREQ and DISCONNECT.
//! Incoming packets are decoded by [`Client::poll`], which also sends the
//! acknowledgements the broker expects for inbound QoS 1/2 messages.

use crate::network::error::Error;
use crate::network::{Connection, read_exact, write_all};
use heapless::{String, Vec};

// MQTT control packet types (fixed header, upper nibble)
const CONNECT: u8 = 0x10;
const CONNACK: u8 = 0x20;
const PUBLISH: u8 = 0x30;
const PUBACK: u8 = 0x40;
const PUBREC: u8 = 0x50;
const PUBREL: u8 = 0x60;
const PUBCOMP: u8 = 0x70;
const SUBSCRIBE: u8 = 0x82;
const SUBACK: u8 = 0x90;
const PINGREQ: u8 = 0xC0;
const PINGRESP: u8 = 0xD0;
const DISCONNECT: u8 = 0xE0;

const PROTOCOL_NAME: &[u8] = b"MQTT";
const PROTOCOL_LEVEL: u8 = 4; // MQTT 3.1.1

/// Largest packet (after the fixed header) the client will send or accept.
pub const MAX_PACKET_LEN: usize = 1024;
/// Maximum topic length of an incoming message.
pub const MAX_TOPIC_LEN: usize = 256;

/// An incoming publish message.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublishPacket {
    /// The topic of the message.
    pub topic: String<MAX_TOPIC_LEN>,
    /// The payload of the message.
    pub payload: Vec<u8, MAX_PACKET_LEN>,
}

/// Quality of Service levels for MQTT messages.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum QoS {
    /// At most once delivery.
    AtMostOnce = 0,
    /// At least once delivery.
    AtLeastOnce = 1,
    /// Exactly once delivery.
    ExactlyOnce = 2,
}

impl QoS {
    fn from_bits(bits: u8) -> Result<Self, Error> {
        match bits {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(Error::ProtocolError),
        }
    }
}

/// A decoded packet from the broker.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Packet {
    /// An application message on a subscribed topic.
    Publish(PublishPacket),
    /// The broker acknowledged a QoS 1 publish.
    PubAck(u16),
    /// The broker answered a subscription; `None` means it was rejected.
    SubAck {
        /// Identifier of the SUBSCRIBE being answered.
        packet_id: u16,
        /// QoS granted by the broker.
        granted: Option<QoS>,
    },
    /// Answer to [`Client::ping`].
    PingResp,
    /// Any other packet, already consumed and handled.
    Other(u8),
}

/// Options for configuring the MQTT client connection.
#[derive(Debug, Clone)]
pub struct Options<'a> {
    /// The client identifier, must be unique.
    pub client_id: &'a str,
    /// The keep-alive time in seconds.
    pub keep_alive_seconds: u16,
    /// Whether to start a clean session.
    pub clean_session: bool,
    /// User name sent in CONNECT.
    pub username: Option<&'a str>,
    /// Password sent in CONNECT; only used together with a user name.
    pub password: Option<&'a [u8]>,
}

/// An MQTT 3.1.1 client.
#[derive(Debug)]
pub struct Client<C: Connection> {
    connection: C,
    next_packet_id: u16,
}

impl<C: Connection> Client<C> {
    /// Establishes an MQTT connection with the server.
    ///
    /// Sends `CONNECT` and waits for `CONNACK`. A non-zero return code maps
    /// to [`Error::ConnectionRefused`].
    pub fn connect(mut connection: C, options: Options) -> Result<Self, Error> {
        let mut packet: Vec<u8, MAX_PACKET_LEN> = Vec::new();

        // --- Variable Header ---
        push_bytes(&mut packet, PROTOCOL_NAME)?;
        push(&mut packet, &[PROTOCOL_LEVEL])?;

        let mut connect_flags = 0u8;
        if options.clean_session {
            connect_flags |= 0x02;
        }
        if options.username.is_some() {
            connect_flags |= 0x80;
            if options.password.is_some() {
                connect_flags |= 0x40;
            }
        }
        push(&mut packet, &[connect_flags])?;
        push(&mut packet, &options.keep_alive_seconds.to_be_bytes())?;

        // --- Payload ---
        push_bytes(&mut packet, options.client_id.as_bytes())?;
        if let Some(username) = options.username {
            push_bytes(&mut packet, username.as_bytes())?;
            if let Some(password) = options.password {
                push_bytes(&mut packet, password)?;
            }
        }

        send_packet(&mut connection, CONNECT, &packet)?;

        let mut connack_buf = [0u8; 4];
        read_exact(&mut connection, &mut connack_buf)?;

        if connack_buf[0] != CONNACK || connack_buf[1] != 2 {
            return Err(Error::ProtocolError);
        }

        match connack_buf[3] {
            0 => Ok(Self {
                connection,
                next_packet_id: 1,
            }),
            1..=5 => Err(Error::ConnectionRefused),
            _ => Err(Error::ProtocolError),
        }
    }

    /// Publishes a message to a topic.
    ///
    /// Returns the packet identifier used for QoS 1 and 2, which the broker
    /// echoes back in its acknowledgement.
    pub fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<Option<u16>, Error> {
        let mut packet: Vec<u8, MAX_PACKET_LEN> = Vec::new();

        push_bytes(&mut packet, topic.as_bytes())?;
        let packet_id = if qos == QoS::AtMostOnce {
            None
        } else {
            let id = self.allocate_packet_id();
            push(&mut packet, &id.to_be_bytes())?;
            Some(id)
        };
        push(&mut packet, payload)?;

        send_packet(&mut self.connection, PUBLISH | ((qos as u8) << 1), &packet)?;
        Ok(packet_id)
    }

    /// Subscribes to a topic filter.
    ///
    /// Returns the packet identifier; the broker's answer arrives through
    /// [`Client::poll`] as [`Packet::SubAck`].
    pub fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<u16, Error> {
        let mut packet: Vec<u8, MAX_PACKET_LEN> = Vec::new();

        let packet_id = self.allocate_packet_id();
        push(&mut packet, &packet_id.to_be_bytes())?;
        push_bytes(&mut packet, topic.as_bytes())?;
        push(&mut packet, &[qos as u8])?;

        send_packet(&mut self.connection, SUBSCRIBE, &packet)?;
        Ok(packet_id)
    }

    /// Sends `PINGREQ`; the broker answers with [`Packet::PingResp`].
    pub fn ping(&mut self) -> Result<(), Error> {
        send_packet(&mut self.connection, PINGREQ, &[])
    }

    /// Sends `DISCONNECT`. The connection stays open; see [`Client::into_inner`].
    pub fn disconnect(&mut self) -> Result<(), Error> {
        send_packet(&mut self.connection, DISCONNECT, &[])
    }

    /// Gives the connection back, e.g. to close it.
    pub fn into_inner(self) -> C {
        self.connection
    }

    /// Polls the connection for one incoming packet.
    ///
    /// Returns `Ok(None)` when no data is waiting.
    pub fn poll(&mut self) -> Result<Option<Packet>, Error> {
        let mut header = [0u8; 1];
        match self.connection.read(&mut header) {
            Ok(0) => return Ok(None),
            Ok(_) => {}
            Err(_) => return Err(Error::ReadError),
        }

        let remaining_len = self.read_remaining_length()?;
        if remaining_len > MAX_PACKET_LEN {
            return Err(Error::BufferOverflow);
        }
        let mut body = [0u8; MAX_PACKET_LEN];
        let body = &mut body[..remaining_len];
        read_exact(&mut self.connection, body)?;

        let packet = match header[0] & 0xF0 {
            PUBLISH => {
                let qos = QoS::from_bits((header[0] >> 1) & 0x03)?;
                let (topic, rest) = split_prefixed(body)?;

                let payload = match qos {
                    QoS::AtMostOnce => rest,
                    QoS::AtLeastOnce | QoS::ExactlyOnce => {
                        let packet_id = read_u16(rest)?;
                        let ack = if qos == QoS::AtLeastOnce { PUBACK } else { PUBREC };
                        send_packet(&mut self.connection, ack, &packet_id.to_be_bytes())?;
                        &rest[2..]
                    }
                };

                // The packet is consumed and acknowledged either way. A topic
                // that cannot be stored is skipped, the stream stays usable.
                match decode_topic(topic) {
                    Some(topic) => Packet::Publish(PublishPacket {
                        topic,
                        payload: Vec::from_slice(payload).map_err(|_| Error::BufferOverflow)?,
                    }),
                    None => Packet::Other(PUBLISH),
                }
            }
            PUBACK => Packet::PubAck(read_u16(body)?),
            PUBREL => {
                let packet_id = read_u16(body)?;
                send_packet(&mut self.connection, PUBCOMP, &packet_id.to_be_bytes())?;
                Packet::Other(PUBREL)
            }
            SUBACK => {
                let packet_id = read_u16(body)?;
                let code = *body.get(2).ok_or(Error::ProtocolError)?;
                Packet::SubAck {
                    packet_id,
                    granted: QoS::from_bits(code).ok(),
                }
            }
            PINGRESP => Packet::PingResp,
            other => Packet::Other(other),
        };

        Ok(Some(packet))
    }

    fn allocate_packet_id(&mut self) -> u16 {
        let id = self.next_packet_id;
        // zero is not a valid packet identifier
        self.next_packet_id = self.next_packet_id.checked_add(1).unwrap_or(1);
        id
    }

    fn read_remaining_length(&mut self) -> Result<usize, Error> {
        let mut value = 0usize;
        let mut multiplier = 1usize;
        for _ in 0..4 {
            let mut byte = [0u8; 1];
            read_exact(&mut self.connection, &mut byte)?;
            value += (byte[0] & 0x7F) as usize * multiplier;
            if byte[0] & 0x80 == 0 {
                return Ok(value);
            }
            multiplier *= 128;
        }
        Err(Error::ProtocolError)
    }
}

/// Writes fixed header, remaining length and `body`, then flushes.
fn send_packet<C: Connection>(connection: &mut C, header: u8, body: &[u8]) -> Result<(), Error> {
    let mut fixed_header: Vec<u8, 5> = Vec::new();
    fixed_header.push(header).map_err(|_| Error::BufferOverflow)?;
    encode_remaining_length(&mut fixed_header, body.len())?;

    write_all(connection, &fixed_header)?;
    write_all(connection, body)?;
    connection.flush().map_err(|_| Error::WriteError)
}

/// Topic as stored in [`PublishPacket`], or `None` if it is not UTF-8 or
/// longer than [`MAX_TOPIC_LEN`].
fn decode_topic(bytes: &[u8]) -> Option<String<MAX_TOPIC_LEN>> {
    let topic = core::str::from_utf8(bytes).ok()?;
    String::try_from(topic).ok()
}

/// Appends a two-byte length prefix followed by `bytes`.
fn push_bytes<const N: usize>(buf: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), Error> {
    let len = u16::try_from(bytes.len()).map_err(|_| Error::BufferOverflow)?;
    push(buf, &len.to_be_bytes())?;
    push(buf, bytes)
}

fn push<const N: usize>(buf: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), Error> {
    buf.extend_from_slice(bytes).map_err(|_| Error::BufferOverflow)
}

/// Splits a length-prefixed field off the front of `buf`.
fn split_prefixed(buf: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    let len = read_u16(buf)? as usize;
    let rest = &buf[2..];
    if rest.len() < len {
        return Err(Error::ProtocolError);
    }
    Ok(rest.split_at(len))
}

fn read_u16(buf: &[u8]) -> Result<u16, Error> {
    match buf {
        [hi, lo, ..] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(Error::ProtocolError),
    }
}

/// Encodes the remaining length field for an MQTT packet.
///
/// Each byte carries seven bits of the length; the high bit marks a
/// continuation. At most four bytes are allowed.
fn encode_remaining_length(buf: &mut Vec<u8, 5>, mut len: usize) -> Result<(), Error> {
    loop {
        if buf.is_full() {
            return Err(Error::ProtocolError);
        }
        let mut byte = (len % 128) as u8;
        len /= 128;
        if len > 0 {
            byte |= 0x80;
        }
        buf.push(byte).map_err(|_| Error::ProtocolError)?;
        if len == 0 {
            break;
        }
    }
    Ok(())
}
