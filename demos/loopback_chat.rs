//! Two chat nodes talking over an in-memory radio.
//!
//! ```text
//! RUST_LOG=meshcore=trace cargo run --example loopback_chat [alice.toml]
//! ```
//!
//! The optional argument replaces Alice's built-in configuration.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use meshcore::payload::Position;
use meshcore::protocol::metrics_snapshot;
use meshcore::{
    Advert, ChatMessage, DeviceRole, InboundOutcome, MemoryRadio, MeshCrypto, MeshNode,
    MessageSink, NodeConfig, RejectReason,
};
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

const ALICE: &str = r#"
nickname = "Alice"

[identity]
private_key = "4f1c7a3e9b2d8c6a5f0e1d2c3b4a59687766554433221100ffeeddccbbaa9988"

[[channels]]
name = "public"
key = "8b3387e9c5cdea6ac9e5edbaa115cd72"
"#;

const BOB: &str = r#"
nickname = "Bob"
"#;

/// Prints everything it receives.
struct Console {
    owner: &'static str,
}

impl MessageSink for Console {
    fn deliver_text(&mut self, message: ChatMessage) {
        println!(
            "{:>5} | #{} {}: {}",
            self.owner,
            message.channel_name,
            message.sender.as_deref().unwrap_or("?"),
            message.text
        );
    }

    fn deliver_advert(&mut self, advert: &Advert, verified: bool) {
        println!(
            "{:>5} | advert from {} ({}, {})",
            self.owner,
            advert.name.as_deref().unwrap_or("<unnamed>"),
            advert.role,
            if verified { "verified" } else { "UNVERIFIED" }
        );
    }

    fn undeliverable(&mut self, channel_hash: u8, reason: RejectReason) {
        println!("{:>5} | dropped message on {channel_hash:#04x}: {reason}", self.owner);
    }
}

fn now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

fn drain(node: &mut MeshNode<MemoryRadio, Console, MeshCrypto>) {
    loop {
        match node.poll(Duration::from_millis(20)) {
            Ok(Some(InboundOutcome::Unhandled(kind))) => warn!(%kind, "unhandled packet"),
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(err) => warn!(error = %err, "poll failed"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();
    fmt().with_env_filter(filter).with_target(true).init();

    let alice_config = match std::env::args().nth(1) {
        Some(path) => NodeConfig::from_file(&path).inspect_err(|err| {
            error!("failed to load configuration from {path}: {err}");
        })?,
        None => NodeConfig::from_toml(ALICE)?,
    };
    let bob_config = NodeConfig::from_toml(BOB)?;

    let (alice_radio, bob_radio) = MemoryRadio::pair();
    let mut alice = MeshNode::from_config(
        &alice_config,
        alice_radio,
        MeshCrypto,
        Console { owner: "alice" },
    )?;
    let mut bob = MeshNode::from_config(
        &bob_config,
        bob_radio,
        MeshCrypto,
        Console { owner: "bob" },
    )?;
    info!(alice = ?alice, bob = ?bob, "nodes ready");

    if alice.identity().is_some() {
        let name = alice.nickname().to_string();
        alice.send_advert(
            now(),
            Some(name.as_str()),
            DeviceRole::ChatNode,
            Some(Position {
                latitude: 47_376_887,
                longitude: 8_541_694,
            }),
        )?;
    }
    alice.send_group_text(0, "hi", now())?;
    drain(&mut bob);

    bob.send_group_text(0, "hello Alice, loud and clear", now())?;
    drain(&mut alice);

    let metrics = metrics_snapshot();
    info!(
        sent = metrics.sent_packets,
        received = metrics.received_packets,
        delivered = metrics.delivered_messages,
        auth_failures = metrics.auth_failures,
        "done"
    );
    Ok(())
}
