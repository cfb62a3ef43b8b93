//! Authentication pipeline benchmarks
//!
//! Measures MAC search over the keyring and full inbound processing.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use meshcore::{
    Advert, ChannelKey, ChatMessage, GroupTextContent, InboundPipeline, Keyring, MeshCrypto,
    MessageSink, PayloadCodec, RouteType, open_group_text, seal_group_text,
};

struct Discard;

impl MessageSink for Discard {
    fn deliver_text(&mut self, message: ChatMessage) {
        black_box(message);
    }

    fn deliver_advert(&mut self, advert: &Advert, verified: bool) {
        black_box((advert, verified));
    }
}

/// Keyring with `len - 1` decoys ahead of the public channel.
fn keyring_with_decoys(len: usize) -> Keyring {
    let mut keyring: Keyring = (1..len)
        .map(|i| ChannelKey::new(format!("decoy-{i}"), [i as u8; 16]))
        .collect();
    keyring.push(ChannelKey::public());
    keyring
}

fn bench_open(c: &mut Criterion) {
    let mut group = c.benchmark_group("open_group_text");
    let content = GroupTextContent::plain(1_700_000_000, "Alice: benchmarking the keyring");
    let sealed = seal_group_text(&content, &ChannelKey::public(), &MeshCrypto).unwrap();

    for keys in [1usize, 4, 16] {
        let keyring = keyring_with_decoys(keys);
        group.bench_with_input(BenchmarkId::from_parameter(keys), &keyring, |b, keyring| {
            b.iter(|| {
                black_box(open_group_text(&sealed, keyring, &MeshCrypto).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    let content = GroupTextContent::plain(1_700_000_000, "Alice: hi");
    let frame = seal_group_text(&content, &ChannelKey::public(), &MeshCrypto)
        .unwrap()
        .to_message(RouteType::Flood)
        .unwrap()
        .encode_to_vec()
        .unwrap();

    group.bench_function("group_text", |b| {
        let mut pipeline =
            InboundPipeline::new(Keyring::with_public_channel(), MeshCrypto, Discard);
        b.iter(|| {
            black_box(pipeline.process(&frame).unwrap());
        });
    });

    let identity = meshcore::Identity::from_seed([7; 32]);
    let mut advert = Advert::new([0; 32], 1_700_000_000);
    advert.name = Some("bench".into());
    meshcore::sign_advert(&mut advert, &identity).unwrap();
    let advert_frame = advert
        .to_message(RouteType::Flood)
        .unwrap()
        .encode_to_vec()
        .unwrap();

    group.bench_function("advert", |b| {
        let mut pipeline = InboundPipeline::new(Keyring::new(), MeshCrypto, Discard);
        b.iter(|| {
            black_box(pipeline.process(&advert_frame).unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_open, bench_pipeline);
criterion_main!(benches);
