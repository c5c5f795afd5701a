use criterion::{criterion_group, criterion_main};

mod mqtt;

criterion_group!(
    benches,
    device::bench_send,
    device::bench_command_dispatch,
    mqtt::bench_publish,
    mqtt::bench_poll
);
criterion_main!(benches);
