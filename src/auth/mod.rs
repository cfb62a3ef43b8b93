//! Authenticate-then-decrypt pipeline for inbound adverts and group texts,
//! plus the matching outbound sealing and signing steps.

mod advert;
mod group;
mod pipeline;
mod sink;

use thiserror::Error;

use crate::crypto::CryptoError;

pub use advert::{VerifiedAdvert, sign_advert, verify_advert};
pub use group::{OpenedGroupText, RejectReason, open_group_text, seal_group_text};
pub use pipeline::{InboundOutcome, InboundPipeline, InboundState};
pub use sink::{ChatMessage, MessageSink};

/// Failure while composing an outbound payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    /// Payload does not fit the wire format
    #[error(transparent)]
    Codec(#[from] crate::protocol::Error),
    /// Cipher step failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
