//! Meshcore - packet format, payload codecs and authentication for a LoRa mesh
//!
//! This library implements the Meshcore over-the-air packet format, the
//! acknowledgement, advert, group text and request payloads it carries, and
//! the authenticate-then-decrypt pipeline that turns raw radio frames into
//! verified chat messages.
//!
//! # Quick Start
//!
//! ```rust
//! use meshcore::{
//!     ChannelKey, GroupTextContent, Keyring, MeshCrypto, PayloadCodec, RouteType,
//!     seal_group_text, open_group_text, GroupText,
//! };
//!
//! // Seal a message for the public channel
//! let content = GroupTextContent::plain(1_700_000_000, "Alice: hi");
//! let sealed = seal_group_text(&content, &ChannelKey::public(), &MeshCrypto)?;
//! let frame = sealed.to_message(RouteType::Flood)?.encode_to_vec()?;
//! assert_eq!(frame[0], 0x15);
//!
//! // Decode and open it again
//! let message = meshcore::Message::decode(&frame)?;
//! let group_text = GroupText::from_message(&message)?;
//! let opened = open_group_text(&group_text, &Keyring::with_public_channel(), &MeshCrypto)
//!     .expect("public channel key matches");
//! assert_eq!(opened.content.sender_and_body(), (Some("Alice"), "hi"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Layers
//!
//! - **Packet codec** ([`protocol`]) - header bit-packing, transport codes,
//!   path and payload sections
//! - **Payload codecs** ([`payload`]) - one [`PayloadCodec`] per payload type
//! - **Authentication** ([`auth`]) - MAC check before decryption, advert
//!   signature verification
//! - **Node** ([`node`]) - radio polling and outbound composition

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod auth;
pub mod config;
pub mod crypto;
pub mod keyring;
pub mod node;
pub mod payload;
pub mod protocol;
pub mod radio;

pub use auth::{
    ChatMessage, ComposeError, InboundOutcome, InboundPipeline, InboundState, MessageSink,
    RejectReason, open_group_text, seal_group_text, sign_advert, verify_advert,
};
pub use config::{ConfigError, NodeConfig};
pub use crypto::{CryptoError, Identity, MeshCrypto};
pub use keyring::{ChannelKey, Keyring};
pub use node::{MeshNode, NodeError};
pub use payload::{
    Ack, Advert, DeviceRole, GroupText, GroupTextContent, PayloadCodec, Position, Request,
};
pub use protocol::{
    Error, MAX_PATH_SIZE, MAX_PAYLOAD_SIZE, MAX_TRANS_UNIT, Message, PacketHeader, PayloadType,
    Result, RouteType,
};
pub use radio::{MemoryRadio, Radio, RadioError, RadioSettings};

/// Meshcore packet format version emitted by this crate
pub const PROTOCOL_VERSION: u8 = protocol::PacketHeader::CURRENT_VERSION;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
