//! Meshcore packet layer
//!
//! This module provides the outer packet framing: the packed header byte,
//! optional transport codes, the hop path and the opaque payload.

mod codec;
mod error;
mod header;
mod message;
pub(crate) mod metrics;
mod types;

pub use codec::{decode, encode, encode_to_vec, implicit_payload_len};
pub use error::{Error, ErrorKind, Result};
pub use header::PacketHeader;
pub use message::{Message, TransportCodes};
pub use metrics::{MetricsSnapshot, snapshot as metrics_snapshot};
pub use types::{PayloadType, ReservedType, RouteType};

/// Largest frame the radio carries (one-byte length fields throughout).
pub const MAX_TRANS_UNIT: usize = 255;

/// Maximum number of hop hashes in a path.
pub const MAX_PATH_SIZE: usize = 64;

/// Maximum payload size in bytes.
pub const MAX_PAYLOAD_SIZE: usize = 184;

/// Header size in bytes.
pub const HEADER_SIZE: usize = 1;

/// Size of the two transport codes carried by transport routes.
pub const TRANSPORT_CODES_SIZE: usize = 4;

/// Ed25519 public key size.
pub const PUB_KEY_SIZE: usize = 32;

/// Ed25519 signature size.
pub const SIGNATURE_SIZE: usize = 64;

/// Group channel key size (AES-128).
pub const CIPHER_KEY_SIZE: usize = 16;

/// Cipher block size.
pub const CIPHER_BLOCK_SIZE: usize = 16;

/// Truncated MAC size carried on the wire.
pub const CIPHER_MAC_SIZE: usize = 2;

/// Maximum advertised node name length (not NUL terminated on the wire).
pub const MAX_NAME_SIZE: usize = 32;
