use criterion::{BatchSize, Criterion, Throughput};
use smartliving::network::application::mqtt::client::{Client, Options, QoS};
use smartliving::network::error::Error;
use smartliving::network::{Close, Connection, Read, Write};
use std::collections::VecDeque;

/// Connection that replays scripted broker bytes and discards writes.
struct Loopback {
    inbound: VecDeque<u8>,
}

impl Read for Loopback {
    type Error = Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let len = buf.len().min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..len)) {
            *slot = byte;
        }
        Ok(len)
    }
}

impl Write for Loopback {
    type Error = Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for Loopback {
    type Error = Error;
    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Connection for Loopback {}

fn connected(inbound: &[u8]) -> Client<Loopback> {
    let mut bytes = VecDeque::from(vec![0x20, 0x02, 0x00, 0x00]);
    bytes.extend(inbound.iter().copied());
    let opts = Options {
        client_id: "smartliving-bench",
        keep_alive_seconds: 30,
        clean_session: true,
        username: Some("client:client"),
        password: Some(b"key"),
    };
    Client::connect(Loopback { inbound: bytes }, opts).expect("Failed to connect")
}

fn publish_frame(topic: &str, payload: &[u8]) -> Vec<u8> {
    let len = 2 + topic.len() + payload.len();
    let mut frame = vec![0x30, len as u8];
    frame.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    frame.extend_from_slice(topic.as_bytes());
    frame.extend_from_slice(payload);
    frame
}

pub fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("mqtt_publish");
    let payload = b"1700000000|21.5";
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("publish_qos0", |b| {
        b.iter_batched_ref(
            || connected(&[]),
            |client| {
                client
                    .publish("client.C1.out.device.D1.asset.temp.state", payload, QoS::AtMostOnce)
                    .expect("Failed to publish");
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_poll(c: &mut Criterion) {
    let mut group = c.benchmark_group("mqtt_poll");
    let frame = publish_frame("client.C1.in.device.D1.asset.led.command", b"true");
    group.throughput(Throughput::Bytes(frame.len() as u64));
    group.bench_function("poll_publish", |b| {
        b.iter_batched_ref(
            || connected(&frame),
            |client| {
                let packet = client.poll().expect("Failed to poll");
                assert!(packet.is_some());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}
