//! Mock collaborators shared by the integration tests.

#![allow(dead_code)]

use smartliving::network::application::http::{Header, Response, Rest};
use smartliving::network::application::mqtt::{Event, MqttSession, PublishPacket, QoS, Setup};
use smartliving::network::error::Error;
use smartliving::network::wifi::{Response as WifiResponse, StationStatus, Wifi};
use smartliving::network::{Close, Connect, Connection, Read, Write};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// WiFi driver that replays queued notifications.
#[derive(Debug, Default)]
pub struct MockWifi {
    pub pending: VecDeque<WifiResponse>,
    pub pumped: usize,
}

impl MockWifi {
    pub fn push_status(&mut self, status: StationStatus) {
        self.pending.push_back(WifiResponse::status(status));
    }

    pub fn push_raw(&mut self, args: &[u32]) {
        self.pending.push_back(WifiResponse {
            args: heapless::Vec::from_slice(args).unwrap(),
        });
    }
}

impl Wifi for MockWifi {
    type Error = ();

    fn process(&mut self) -> Result<Option<WifiResponse>, ()> {
        self.pumped += 1;
        Ok(self.pending.pop_front())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub qos: QoS,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSetup {
    pub client_id: String,
    pub username: String,
    pub password: String,
    pub keep_alive_seconds: u16,
    pub clean_session: bool,
}

/// MQTT session that records every call and behaves like a well-mannered
/// broker: connecting queues `Connected`, disconnecting queues `Disconnected`.
#[derive(Debug, Default)]
pub struct MockMqtt {
    pub fail_begin: bool,
    pub fail_connect: bool,
    pub setup: Option<StoredSetup>,
    pub connected: bool,
    pub connects: Vec<(String, u16)>,
    pub disconnects: usize,
    pub published: Vec<Published>,
    pub subscriptions: Vec<(String, QoS)>,
    pub events: VecDeque<Event>,
    /// Optional timeline shared with the test, one entry per publish.
    pub journal: Option<Rc<RefCell<Vec<String>>>>,
}

impl MockMqtt {
    pub fn deliver(&mut self, topic: &str, payload: &str) {
        self.events.push_back(Event::Data(PublishPacket {
            topic: heapless::String::try_from(topic).unwrap(),
            payload: heapless::Vec::from_slice(payload.as_bytes()).unwrap(),
        }));
    }
}

impl MqttSession for MockMqtt {
    type Error = Error;

    fn begin(&mut self, setup: &Setup<'_>) -> Result<(), Error> {
        if self.fail_begin {
            return Err(Error::ProtocolError);
        }
        self.setup = Some(StoredSetup {
            client_id: setup.client_id.to_string(),
            username: setup.username.to_string(),
            password: setup.password.to_string(),
            keep_alive_seconds: setup.keep_alive_seconds,
            clean_session: setup.clean_session,
        });
        Ok(())
    }

    fn connect(&mut self, host: &str, port: u16) -> Result<(), Error> {
        self.connects.push((host.to_string(), port));
        if self.fail_connect {
            return Err(Error::ConnectionRefused);
        }
        self.connected = true;
        self.events.push_back(Event::Connected);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), Error> {
        self.disconnects += 1;
        if self.connected {
            self.connected = false;
            self.events.push_back(Event::Disconnected);
        }
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<(), Error> {
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(format!("publish {topic}"));
        }
        self.published.push(Published {
            topic: topic.to_string(),
            payload: String::from_utf8(payload.to_vec()).unwrap(),
            qos,
        });
        Ok(())
    }

    fn subscribe(&mut self, filter: &str, qos: QoS) -> Result<(), Error> {
        self.subscriptions.push((filter.to_string(), qos));
        Ok(())
    }

    fn poll(&mut self) -> Result<Option<Event>, Error> {
        Ok(self.events.pop_front())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Put {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// REST client that records requests and answers with a canned response.
#[derive(Debug)]
pub struct MockRest {
    pub host: Option<String>,
    pub content_type: Option<String>,
    pub puts: Vec<Put>,
    pub status: u16,
    pub reply: &'static str,
}

impl Default for MockRest {
    fn default() -> Self {
        Self {
            host: None,
            content_type: None,
            puts: Vec::new(),
            status: 200,
            reply: r#"{"id":"asset-1"}"#,
        }
    }
}

impl Rest for MockRest {
    type Error = Error;

    fn begin(&mut self, host: &str) -> Result<(), Error> {
        self.host = Some(host.to_string());
        Ok(())
    }

    fn set_content_type(&mut self, content_type: &str) -> Result<(), Error> {
        self.content_type = Some(content_type.to_string());
        Ok(())
    }

    fn put(&mut self, path: &str, headers: &[Header], body: &[u8]) -> Result<Response, Error> {
        self.puts.push(Put {
            path: path.to_string(),
            headers: headers
                .iter()
                .map(|h| (h.name.to_string(), h.value.to_string()))
                .collect(),
            body: String::from_utf8(body.to_vec()).unwrap(),
        });
        Ok(Response {
            status_code: self.status,
            headers: heapless::Vec::new(),
            body: heapless::Vec::from_slice(self.reply.as_bytes()).unwrap(),
        })
    }
}

/// Byte-level state shared between a [`MockNetwork`] and its connections.
#[derive(Debug, Default)]
pub struct Wire {
    /// Bytes the peer will send, consumed by reads.
    pub inbound: VecDeque<u8>,
    /// Everything the client wrote.
    pub outbound: Vec<u8>,
    /// Remote addresses dialled, in order.
    pub dialled: Vec<String>,
    pub closed: usize,
}

/// Connector handing out connections backed by one shared [`Wire`].
#[derive(Debug, Clone, Default)]
pub struct MockNetwork {
    pub wire: Rc<RefCell<Wire>>,
}

impl MockNetwork {
    pub fn feed(&self, bytes: &[u8]) {
        self.wire.borrow_mut().inbound.extend(bytes.iter().copied());
    }

    pub fn take_outbound(&self) -> Vec<u8> {
        std::mem::take(&mut self.wire.borrow_mut().outbound)
    }
}

#[derive(Debug)]
pub struct MockConnection {
    wire: Rc<RefCell<Wire>>,
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        let len = buf.len().min(wire.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(wire.inbound.drain(..len)) {
            *slot = byte;
        }
        Ok(len)
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.wire.borrow_mut().outbound.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().closed += 1;
        Ok(())
    }
}

impl Connection for MockConnection {}

impl Connect for MockNetwork {
    type Connection = MockConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<MockConnection, Error> {
        self.wire.borrow_mut().dialled.push(remote.to_string());
        Ok(MockConnection {
            wire: Rc::clone(&self.wire),
        })
    }
}
