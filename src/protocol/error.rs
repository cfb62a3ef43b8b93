//! Meshcore codec error types

use thiserror::Error;

use super::PayloadType;

/// Errors produced by the packet and payload codecs.
///
/// Every variant is fatal to the single encode/decode call that produced it
/// and never to the caller: the packet is discarded (or not transmitted).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input was empty
    #[error("empty input")]
    Empty,

    /// Not enough bytes remain for a field that is structurally present
    #[error("truncated {field}: need {needed} bytes, got {got}")]
    Truncated {
        /// Field being read
        field: &'static str,
        /// Bytes required
        needed: usize,
        /// Bytes remaining
        got: usize,
    },

    /// Declared length exceeds the field's capacity
    #[error("{field} length {len} exceeds maximum {max}")]
    LengthExceeded {
        /// Field whose length overflowed
        field: &'static str,
        /// Declared or inferred length
        len: usize,
        /// Capacity
        max: usize,
    },

    /// Raw frame is longer than the radio MTU
    #[error("packet too large: {size} bytes (max {max})")]
    PacketTooLarge {
        /// Frame size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Outbound field does not fit its wire capacity
    #[error("{field} too large: {size} bytes (max {max})")]
    CapacityExceeded {
        /// Field being written
        field: &'static str,
        /// Field size
        size: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Packet carries a different payload type than the codec expects
    #[error("unexpected payload type: expected {expected}, found {found}")]
    UnexpectedPayloadType {
        /// Codec payload type
        expected: PayloadType,
        /// Packet payload type
        found: PayloadType,
    },

    /// Output buffer too small
    #[error("buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall {
        /// Needed size
        needed: usize,
        /// Actual size
        got: usize,
    },
}

/// Coarse classification of codec failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inbound bytes are structurally invalid; discard the packet.
    MalformedInput,
    /// Outbound value does not fit; do not transmit.
    CapacityExceeded,
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Empty
            | Self::Truncated { .. }
            | Self::LengthExceeded { .. }
            | Self::PacketTooLarge { .. }
            | Self::UnexpectedPayloadType { .. } => ErrorKind::MalformedInput,
            Self::CapacityExceeded { .. } | Self::BufferTooSmall { .. } => {
                ErrorKind::CapacityExceeded
            }
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
