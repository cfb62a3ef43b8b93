use bytes::Bytes;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use meshcore::protocol::{decode, encode};
use meshcore::{Advert, DeviceRole, Message, PayloadCodec, PayloadType, Position, RouteType};

fn sample_message(payload_len: usize) -> Message {
    Message::new(RouteType::Flood, PayloadType::GroupText, vec![0xA5u8; payload_len])
        .with_path(vec![0x11u8, 0x22, 0x33])
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for payload_len in [16usize, 64, 184] {
        let msg = sample_message(payload_len);
        let mut out = [0u8; 255];
        group.throughput(Throughput::Bytes(payload_len as u64));
        group.bench_with_input(BenchmarkId::new("encode", payload_len), &msg, |b, msg| {
            b.iter(|| {
                black_box(encode(msg, &mut out).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("codec");

    for payload_len in [16usize, 64, 184] {
        let encoded = Bytes::from(sample_message(payload_len).encode_to_vec().unwrap());
        group.throughput(Throughput::Bytes(payload_len as u64));
        group.bench_with_input(
            BenchmarkId::new("decode", payload_len),
            &encoded,
            |b, encoded| {
                // Bytes clone is a refcount bump, decode slices without copying
                b.iter(|| {
                    black_box(decode(encoded.clone()).unwrap());
                });
            },
        );
    }

    group.finish();
}

fn bench_advert(c: &mut Criterion) {
    let mut group = c.benchmark_group("advert");

    let mut advert = Advert::new([0x42; 32], 1_700_000_000);
    advert.role = DeviceRole::ChatNode;
    advert.position = Some(Position {
        latitude: 52_370_216,
        longitude: 4_895_168,
    });
    advert.name = Some("benchmark-node".into());
    let encoded = advert.to_bytes().unwrap();

    group.bench_function("encode", |b| {
        let mut out = [0u8; 184];
        b.iter(|| {
            black_box(advert.encode(&mut out).unwrap());
        });
    });

    group.bench_function("decode", |b| {
        b.iter(|| {
            black_box(Advert::decode(encoded.clone()).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_advert);
criterion_main!(benches);
