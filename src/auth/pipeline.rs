//! Inbound packet processing.
//!
//! One raw frame goes in; at most one delivery comes out. Group texts move
//! through [`InboundState`] in order and every transition is logged at
//! trace level:
//!
//! ```text
//! Received -> MacChecking -> Authenticated -> Decrypted -> Delivered
//!                  |               |               |
//!                  +---------------+---------------+----> Rejected
//! ```

use std::fmt;

use bytes::Bytes;
use tracing::{debug, instrument, trace};

use super::advert::verify_advert;
use super::group::{RejectReason, open_group_text};
use super::sink::{ChatMessage, MessageSink};
use crate::crypto::CryptoSuite;
use crate::keyring::Keyring;
use crate::payload::{Ack, GroupText, PayloadCodec, Request};
use crate::protocol::metrics::{Metrics, PacketDirection};
use crate::protocol::{Message, PayloadType, Result, decode};

/// Processing state of an inbound group text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundState {
    /// Frame decoded
    Received,
    /// Trying channel keys
    MacChecking,
    /// A key's MAC matched
    Authenticated,
    /// Plaintext recovered
    Decrypted,
    /// Handed to the sink
    Delivered,
    /// Dropped
    Rejected,
}

impl fmt::Display for InboundState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::MacChecking => "mac-checking",
            Self::Authenticated => "authenticated",
            Self::Decrypted => "decrypted",
            Self::Delivered => "delivered",
            Self::Rejected => "rejected",
        };
        write!(f, "{name}")
    }
}

#[inline]
pub(crate) fn log_transition(channel_hash: u8, from: InboundState, to: InboundState) {
    trace!(channel_hash, %from, %to, "inbound state");
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Group text authenticated and delivered
    TextDelivered {
        /// Channel hash from the envelope
        channel_hash: u8,
        /// Keyring position of the matching key
        key_index: usize,
    },
    /// Group text dropped
    TextRejected {
        /// Channel hash from the envelope
        channel_hash: u8,
        /// Why it was dropped
        reason: RejectReason,
    },
    /// Advert delivered, with its signature check result
    AdvertDelivered {
        /// Whether the signature matched
        verified: bool,
    },
    /// Acknowledgement decoded
    Ack(Ack),
    /// Request envelope decoded; the body stays encrypted
    Request(Request),
    /// Payload type this node does not handle
    Unhandled(PayloadType),
}

impl InboundOutcome {
    /// Terminal state reached by the frame.
    ///
    /// Only outcomes that reached the sink count as delivered.
    #[must_use]
    pub const fn state(&self) -> InboundState {
        match self {
            Self::TextDelivered { .. } | Self::AdvertDelivered { .. } => InboundState::Delivered,
            Self::TextRejected { .. } => InboundState::Rejected,
            Self::Ack(_) | Self::Request(_) | Self::Unhandled(_) => InboundState::Received,
        }
    }
}

/// Authenticate-then-decrypt pipeline.
///
/// Holds the keyring, the crypto backend and the sink. Processing takes
/// `&mut self`, so a pipeline handles one frame at a time.
pub struct InboundPipeline<C, S> {
    keyring: Keyring,
    crypto: C,
    sink: S,
}

impl<C: CryptoSuite, S: MessageSink> InboundPipeline<C, S> {
    /// Create a pipeline.
    pub fn new(keyring: Keyring, crypto: C, sink: S) -> Self {
        Self {
            keyring,
            crypto,
            sink,
        }
    }

    /// Channel keys in priority order.
    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    /// Crypto backend.
    pub fn crypto(&self) -> &C {
        &self.crypto
    }

    /// Delivery sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable delivery sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the pipeline and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Process one raw frame.
    ///
    /// Malformed frames return an error and deliver nothing. Frames that
    /// decode but fail authentication are not errors; they come back as
    /// [`InboundOutcome::TextRejected`].
    #[instrument(level = "debug", skip_all, fields(len = raw.len()))]
    pub fn process(&mut self, raw: &[u8]) -> Result<InboundOutcome> {
        self.process_bytes(Bytes::copy_from_slice(raw))
    }

    /// Process one raw frame without copying it.
    pub fn process_bytes(&mut self, raw: Bytes) -> Result<InboundOutcome> {
        let message = decode(raw).inspect_err(|err| {
            Metrics::record_decode_error();
            debug!(error = %err, "discarding malformed frame");
        })?;
        Metrics::record_packet(PacketDirection::Received, message.payload_type());

        self.handle_message(&message).inspect_err(|err| {
            Metrics::record_decode_error();
            debug!(
                error = %err,
                payload_type = %message.payload_type(),
                "discarding malformed payload"
            );
        })
    }

    /// Dispatch an already decoded packet on its payload type.
    pub fn handle_message(&mut self, message: &Message) -> Result<InboundOutcome> {
        match message.payload_type() {
            PayloadType::GroupText => self.handle_group_text(message),
            PayloadType::Advert => self.handle_advert(message),
            PayloadType::Ack => Ok(InboundOutcome::Ack(Ack::from_message(message)?)),
            PayloadType::Request => Ok(InboundOutcome::Request(Request::from_message(message)?)),
            other => {
                debug!(payload_type = %other, "ignoring unhandled payload type");
                Ok(InboundOutcome::Unhandled(other))
            }
        }
    }

    fn handle_group_text(&mut self, message: &Message) -> Result<InboundOutcome> {
        let group_text = GroupText::from_message(message)?;
        let channel_hash = group_text.channel_hash;
        log_transition(channel_hash, InboundState::Received, InboundState::MacChecking);

        match open_group_text(&group_text, &self.keyring, &self.crypto) {
            Ok(opened) => {
                let (sender, body) = opened.content.sender_and_body();
                let chat = ChatMessage {
                    channel_hash,
                    channel_name: opened.channel_name.clone(),
                    sender: sender.map(str::to_string),
                    text: body.to_string(),
                    timestamp: opened.content.timestamp,
                    verified: true,
                };
                self.sink.deliver_text(chat);
                Metrics::record_delivery();
                log_transition(channel_hash, InboundState::Decrypted, InboundState::Delivered);
                Ok(InboundOutcome::TextDelivered {
                    channel_hash,
                    key_index: opened.key_index,
                })
            }
            Err(reason) => {
                Metrics::record_auth_failure();
                self.sink.undeliverable(channel_hash, reason);
                trace!(channel_hash, %reason, to = %InboundState::Rejected, "inbound state");
                Ok(InboundOutcome::TextRejected {
                    channel_hash,
                    reason,
                })
            }
        }
    }

    fn handle_advert(&mut self, message: &Message) -> Result<InboundOutcome> {
        let checked = verify_advert(message.payload(), &self.crypto)?;
        if !checked.verified {
            Metrics::record_invalid_signature();
        }
        self.sink.deliver_advert(&checked.advert, checked.verified);
        Metrics::record_delivery();
        Ok(InboundOutcome::AdvertDelivered {
            verified: checked.verified,
        })
    }
}

impl<C, S> fmt::Debug for InboundPipeline<C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundPipeline")
            .field("keys", &self.keyring.len())
            .finish_non_exhaustive()
    }
}
