use std::cell::Cell;

use bytes::Bytes;
use meshcore::crypto::{Block, BlockCipher, MessageAuthenticator, SignatureVerifier};
use meshcore::protocol::{CIPHER_KEY_SIZE, ErrorKind, PUB_KEY_SIZE, SIGNATURE_SIZE};
use meshcore::{
    Advert, ChannelKey, ChatMessage, DeviceRole, Error, GroupText, GroupTextContent, Identity,
    InboundOutcome, InboundPipeline, InboundState, Keyring, MeshCrypto, Message, MessageSink,
    PacketHeader, PayloadCodec, PayloadType, RejectReason, RouteType, seal_group_text,
    sign_advert,
};

/// Delegates to `MeshCrypto` and counts block decryptions.
#[derive(Default)]
struct CountingCrypto {
    decrypt_calls: Cell<usize>,
}

impl MessageAuthenticator for CountingCrypto {
    fn mac(&self, key: &[u8], data: &[u8], out: &mut [u8]) {
        MeshCrypto.mac(key, data, out);
    }
}

impl BlockCipher for CountingCrypto {
    fn encrypt_block(&self, key: &[u8; CIPHER_KEY_SIZE], block: &mut Block) {
        MeshCrypto.encrypt_block(key, block);
    }

    fn decrypt_block(&self, key: &[u8; CIPHER_KEY_SIZE], block: &mut Block) {
        self.decrypt_calls.set(self.decrypt_calls.get() + 1);
        MeshCrypto.decrypt_block(key, block);
    }
}

impl SignatureVerifier for CountingCrypto {
    fn verify(
        &self,
        signature: &[u8; SIGNATURE_SIZE],
        message: &[u8],
        public_key: &[u8; PUB_KEY_SIZE],
    ) -> bool {
        MeshCrypto.verify(signature, message, public_key)
    }
}

#[derive(Default)]
struct Recorder {
    texts: Vec<ChatMessage>,
    adverts: Vec<(Advert, bool)>,
    undeliverable: Vec<(u8, RejectReason)>,
}

impl MessageSink for Recorder {
    fn deliver_text(&mut self, message: ChatMessage) {
        self.texts.push(message);
    }

    fn deliver_advert(&mut self, advert: &Advert, verified: bool) {
        self.adverts.push((advert.clone(), verified));
    }

    fn undeliverable(&mut self, channel_hash: u8, reason: RejectReason) {
        self.undeliverable.push((channel_hash, reason));
    }
}

fn group_text_frame(content: &GroupTextContent, key: &ChannelKey) -> Vec<u8> {
    seal_group_text(content, key, &MeshCrypto)
        .unwrap()
        .to_message(RouteType::Flood)
        .unwrap()
        .encode_to_vec()
        .unwrap()
}

#[test]
fn public_channel_message_is_authenticated_and_delivered() {
    let key = ChannelKey::public();
    let content = GroupTextContent::plain(1_700_000_000, "Alice: hi");

    let sealed = seal_group_text(&content, &key, &MeshCrypto).unwrap();
    assert_eq!(sealed.channel_hash, 0x11);
    assert_eq!(sealed.data.len(), 16);

    let frame = sealed
        .to_message(RouteType::Flood)
        .unwrap()
        .encode_to_vec()
        .unwrap();
    assert_eq!(frame[0], 0x15);
    // header, path length, channel hash, MAC, one block
    assert_eq!(frame.len(), 1 + 1 + 1 + 2 + 16);

    let mut pipeline = InboundPipeline::new(
        Keyring::with_public_channel(),
        MeshCrypto,
        Recorder::default(),
    );
    let outcome = pipeline.process(&frame).unwrap();
    assert_eq!(
        outcome,
        InboundOutcome::TextDelivered {
            channel_hash: 0x11,
            key_index: 0
        }
    );
    assert_eq!(outcome.state(), InboundState::Delivered);

    let sink = pipeline.into_sink();
    assert_eq!(sink.texts.len(), 1);
    let delivered = &sink.texts[0];
    assert_eq!(delivered.channel_hash, 0x11);
    assert_eq!(delivered.channel_name, "public");
    assert_eq!(delivered.sender.as_deref(), Some("Alice"));
    assert_eq!(delivered.text, "hi");
    assert_eq!(delivered.timestamp, 1_700_000_000);
    assert!(delivered.verified);
}

#[test]
fn mac_mismatch_never_decrypts() {
    let foreign = ChannelKey::new("elsewhere", [0x5C; CIPHER_KEY_SIZE]);
    let frame = group_text_frame(&GroupTextContent::plain(9, "Mallory: hello"), &foreign);

    let keyring: Keyring = [
        ChannelKey::public(),
        ChannelKey::from_hex("test", "9cd8fcf22a47333b591d96a2b848b73f").unwrap(),
    ]
    .into_iter()
    .collect();
    let mut pipeline =
        InboundPipeline::new(keyring, CountingCrypto::default(), Recorder::default());

    let outcome = pipeline.process(&frame).unwrap();
    assert_eq!(
        outcome,
        InboundOutcome::TextRejected {
            channel_hash: foreign.hash(),
            reason: RejectReason::NoMatchingKey
        }
    );
    assert_eq!(pipeline.crypto().decrypt_calls.get(), 0);
    assert!(pipeline.sink().texts.is_empty());
    assert_eq!(
        pipeline.sink().undeliverable,
        vec![(foreign.hash(), RejectReason::NoMatchingKey)]
    );
}

#[test]
fn matching_mac_decrypts_each_block_once() {
    let frame = group_text_frame(
        &GroupTextContent::plain(9, "Bob: a message spanning more than one block"),
        &ChannelKey::public(),
    );
    let mut pipeline = InboundPipeline::new(
        Keyring::with_public_channel(),
        CountingCrypto::default(),
        Recorder::default(),
    );

    pipeline.process(&frame).unwrap();
    let blocks = (frame.len() - 5) / 16;
    assert_eq!(pipeline.crypto().decrypt_calls.get(), blocks);
    assert_eq!(pipeline.sink().texts[0].text, "a message spanning more than one block");
}

#[test]
fn invalid_advert_signature_is_still_delivered() {
    let identity = Identity::from_seed([0x21; 32]);
    let mut advert = Advert::new([0; PUB_KEY_SIZE], 1_700_000_500);
    advert.role = DeviceRole::Repeater;
    advert.name = Some("hilltop".into());
    sign_advert(&mut advert, &identity).unwrap();
    advert.signature[10] ^= 0x01;

    let frame = advert
        .to_message(RouteType::Flood)
        .unwrap()
        .encode_to_vec()
        .unwrap();

    let mut pipeline = InboundPipeline::new(Keyring::new(), MeshCrypto, Recorder::default());
    let outcome = pipeline.process(&frame).unwrap();
    assert_eq!(outcome, InboundOutcome::AdvertDelivered { verified: false });

    let sink = pipeline.into_sink();
    assert_eq!(sink.adverts.len(), 1);
    let (delivered, verified) = &sink.adverts[0];
    assert!(!verified);
    assert_eq!(delivered.name.as_deref(), Some("hilltop"));
    assert_eq!(delivered.role, DeviceRole::Repeater);
}

#[test]
fn signed_advert_verifies_over_transport_route() {
    let identity = Identity::from_seed([0x42; 32]);
    let mut advert = Advert::new([0; PUB_KEY_SIZE], 12);
    advert.extra2 = Some(0xBEEF);
    sign_advert(&mut advert, &identity).unwrap();

    let frame = advert
        .to_message(RouteType::TransportFlood)
        .unwrap()
        .with_path(vec![0xA1u8, 0xB2])
        .encode_to_vec()
        .unwrap();

    let mut pipeline = InboundPipeline::new(Keyring::new(), MeshCrypto, Recorder::default());
    assert_eq!(
        pipeline.process(&frame).unwrap(),
        InboundOutcome::AdvertDelivered { verified: true }
    );
    assert_eq!(pipeline.sink().adverts[0].0.extra2, Some(0xBEEF));
}

#[test]
fn header_bytes_for_group_text() {
    // route in bits 0-1, type in bits 2-5, version in bits 6-7
    let flood = PacketHeader::new(RouteType::Flood, PayloadType::GroupText);
    assert_eq!(flood.to_byte(), 0b0001_0101);

    let transport_flood = PacketHeader::new(RouteType::TransportFlood, PayloadType::GroupText);
    assert_eq!(transport_flood.to_byte(), 0b0001_0100);

    let decoded = PacketHeader::from_byte(0x14);
    assert_eq!(decoded.route(), RouteType::TransportFlood);
    assert_eq!(decoded.payload_type(), PayloadType::GroupText);
    assert_eq!(decoded.version(), 0);
}

#[test]
fn extra2_only_advert_layout() {
    let mut advert = Advert::new([0x11; PUB_KEY_SIZE], 1);
    advert.extra2 = Some(0x0201);
    let bytes = advert.to_bytes().unwrap();

    let flags = bytes[100];
    assert_eq!(flags & 0xF0, 0x40);
    assert_eq!(&bytes[101..], &[0x01, 0x02]);
}

#[test]
fn oversized_group_text_writes_nothing() {
    let group_text = GroupText {
        channel_hash: 0x11,
        mac: [0xAB, 0xCD],
        data: Bytes::from(vec![0x77; 182]),
    };
    let mut out = [0xEEu8; 255];
    let err = group_text.encode(&mut out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CapacityExceeded);
    assert!(out.iter().all(|&b| b == 0));
}

#[test]
fn malformed_frames_are_discarded() {
    let mut pipeline = InboundPipeline::new(
        Keyring::with_public_channel(),
        MeshCrypto,
        Recorder::default(),
    );

    // path length runs past the end
    let err = pipeline.process(&[0x15, 0x20, 0x01]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);

    // group text shorter than its fixed prefix
    let frame = Message::new(RouteType::Flood, PayloadType::GroupText, vec![0x11u8, 0x00])
        .encode_to_vec()
        .unwrap();
    assert!(matches!(
        pipeline.process(&frame),
        Err(Error::Truncated { .. })
    ));

    assert!(pipeline.sink().texts.is_empty());
    assert!(pipeline.sink().undeliverable.is_empty());
}
