use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use imutel::packet::{read_packets, DecodedPacket, SensorTriplet};

fn bench_read_packets(c: &mut Criterion) {
    let frame = DecodedPacket {
        timestamp: 1,
        accel: vec![SensorTriplet { x: 1.0, y: 2.0, z: 3.0 }],
        gyro: vec![SensorTriplet { x: 4.0, y: 5.0, z: 6.0 }],
    }
    .encode()
    .unwrap();

    let mut data: Vec<u8> = Vec::new();
    for _ in 0..1000 {
        data.extend_from_slice(&frame);
    }

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("read_packets", |b| {
        b.iter(|| {
            let n = read_packets(Cursor::new(&data)).filter(Result::is_ok).count();
            assert_eq!(n, 1000);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_read_packets);
criterion_main!(benches);
