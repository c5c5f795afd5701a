//! Round trips against a real broker.
//!
//! Ignored by default. Run with `cargo test --test live -- --ignored`;
//! `TEST_MQTT_HOST` and `TEST_MQTT_PORT` (read from `.env` when present)
//! select the broker.

use dotenvy::dotenv;
use smartliving::device::{Config, Device, DeviceInfo};
use smartliving::network::application::http::{Header, Rest, Response};
use smartliving::network::application::mqtt::{Event, MqttSession, QoS, Session, Setup};
use smartliving::network::error::Error;
use smartliving::network::wifi::{Response as WifiResponse, StationStatus, Wifi};
use smartliving::network::{Close, Connect, Connection, Read, Write};
use std::env;
use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::TcpStream;
use std::time::Duration;

struct NetConnection {
    stream: TcpStream,
}

impl Read for NetConnection {
    type Error = Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.stream.read(buf) {
            Ok(n) => Ok(n),
            // nothing arrived within the read timeout
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
            Err(_) => Err(Error::ReadError),
        }
    }
}

impl Write for NetConnection {
    type Error = Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream.write(buf).map_err(|_| Error::WriteError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|_| Error::WriteError)
    }
}

impl Close for NetConnection {
    type Error = Error;
    fn close(self) -> Result<(), Self::Error> {
        self.stream
            .shutdown(std::net::Shutdown::Both)
            .map_err(|_| Error::ConnectionClosed)
    }
}

impl Connection for NetConnection {}

struct Tcp;

impl Connect for Tcp {
    type Connection = NetConnection;
    type Error = Error;

    fn connect(&mut self, remote: &str) -> Result<NetConnection, Error> {
        let stream = TcpStream::connect(remote).map_err(|_| Error::ConnectionRefused)?;
        stream
            .set_read_timeout(Some(Duration::from_millis(500)))
            .map_err(|_| Error::ConnectionRefused)?;
        Ok(NetConnection { stream })
    }
}

/// Station that is already associated.
struct Associated {
    reported: bool,
}

impl Wifi for Associated {
    type Error = ();

    fn process(&mut self) -> Result<Option<WifiResponse>, ()> {
        if self.reported {
            return Ok(None);
        }
        self.reported = true;
        Ok(Some(WifiResponse::status(StationStatus::GotIp)))
    }
}

/// REST stand-in; asset registration is not exercised here.
struct NoRest;

impl Rest for NoRest {
    type Error = Error;

    fn begin(&mut self, _host: &str) -> Result<(), Error> {
        Ok(())
    }

    fn set_content_type(&mut self, _content_type: &str) -> Result<(), Error> {
        Ok(())
    }

    fn put(&mut self, _path: &str, _headers: &[Header], _body: &[u8]) -> Result<Response, Error> {
        Err(Error::NotOpen)
    }
}

fn broker() -> (&'static str, u16) {
    dotenv().ok();
    let host = env::var("TEST_MQTT_HOST").unwrap_or("test.mosquitto.org".to_string());
    let port = env::var("TEST_MQTT_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1883);
    (Box::leak(host.into_boxed_str()), port)
}

fn observer(host: &str, port: u16, client_id: &str, filter: &str) -> Session<Tcp> {
    let mut session = Session::new(Tcp);
    session
        .begin(&Setup {
            client_id,
            username: "",
            password: "",
            keep_alive_seconds: 30,
            clean_session: true,
        })
        .unwrap();
    session.connect(host, port).expect("Failed to connect to broker");
    assert_eq!(session.poll().unwrap(), Some(Event::Connected));
    session.subscribe(filter, QoS::AtMostOnce).unwrap();
    session
}

fn wait_for_data(session: &mut Session<Tcp>) -> Option<(String, String)> {
    for _ in 0..20 {
        if let Some(Event::Data(packet)) = session.poll().unwrap() {
            let payload = String::from_utf8(packet.payload.to_vec()).unwrap();
            return Some((packet.topic.to_string(), payload));
        }
    }
    None
}

#[test]
#[ignore]
fn test_session_round_trip() {
    let (host, port) = broker();
    let topic = "smartliving-live/round-trip";
    let mut session = observer(host, port, "smartliving-live-rt", topic);

    session.publish(topic, b"hello", QoS::AtMostOnce).unwrap();
    let (received_topic, payload) = wait_for_data(&mut session).expect("no message");
    assert_eq!(received_topic, topic);
    assert_eq!(payload, "hello");

    session.disconnect().unwrap();
}

#[test]
#[ignore]
fn test_device_state_reaches_broker() {
    let (host, port) = broker();
    let state_topic = "client.live-client.out.device.live-device.asset.temp.state";
    let mut watcher = observer(host, port, "smartliving-live-watch", state_topic);

    let info = DeviceInfo::new("live-device", "live-client", "").unwrap();
    let config = Config {
        broker_host: host,
        broker_port: port,
        client_name: "smartliving-live-device",
        ..Config::default()
    };
    let mut device = Device::with_config(
        Associated { reported: false },
        Session::new(Tcp),
        NoRest,
        info,
        config,
    );
    device.connect().unwrap();
    for _ in 0..5 {
        device.process().unwrap();
    }
    assert!(device.is_connected());

    device.send_with_timestamp("temp", "21.5", 1_700_000_000).unwrap();
    let (topic, payload) = wait_for_data(&mut watcher).expect("no state update");
    assert_eq!(topic, state_topic);
    assert_eq!(payload, "1700000000|21.5");
}
