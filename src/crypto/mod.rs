//! Cryptographic primitives consumed by the authentication pipeline.
//!
//! The pipeline only sees the traits below. [`MeshCrypto`] implements them
//! with HMAC-SHA256, AES-128 and Ed25519; tests substitute their own.

mod blocks;
mod identity;
mod suite;

use thiserror::Error;

use crate::protocol::{CIPHER_KEY_SIZE, PUB_KEY_SIZE, SIGNATURE_SIZE};

pub use blocks::{decrypt_blocks, encrypt_blocks, pad_to_block};
pub use identity::Identity;
pub use suite::MeshCrypto;

/// A single cipher block
pub type Block = [u8; crate::protocol::CIPHER_BLOCK_SIZE];

/// Error type for cryptographic operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CryptoError {
    /// Key material of unexpected length.
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength {
        /// Required length
        expected: usize,
        /// Provided length
        got: usize,
    },
    /// Key material is not valid hex.
    #[error("invalid hex key: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// Data is not a whole number of cipher blocks.
    #[error("data length {len} is not a multiple of the block size")]
    UnalignedData {
        /// Data length
        len: usize,
    },
}

/// Keyed MAC over ciphertext.
pub trait MessageAuthenticator {
    /// Compute the MAC of `data` under `key`, truncated to `out.len()` bytes.
    fn mac(&self, key: &[u8], data: &[u8], out: &mut [u8]);
}

/// Raw single-block cipher.
pub trait BlockCipher {
    /// Encrypt one block in place.
    fn encrypt_block(&self, key: &[u8; CIPHER_KEY_SIZE], block: &mut Block);

    /// Decrypt one block in place.
    fn decrypt_block(&self, key: &[u8; CIPHER_KEY_SIZE], block: &mut Block);
}

/// Advert signature verification.
pub trait SignatureVerifier {
    /// Whether `signature` is valid for `message` under `public_key`.
    fn verify(
        &self,
        signature: &[u8; SIGNATURE_SIZE],
        message: &[u8],
        public_key: &[u8; PUB_KEY_SIZE],
    ) -> bool;
}

/// Signs outbound adverts with the device keypair.
pub trait AdvertSigner {
    /// Public half of the signing key.
    fn public_key(&self) -> [u8; PUB_KEY_SIZE];

    /// Sign `message`.
    fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE];
}

/// Everything the inbound pipeline needs.
pub trait CryptoSuite: MessageAuthenticator + BlockCipher + SignatureVerifier {}

impl<T: MessageAuthenticator + BlockCipher + SignatureVerifier> CryptoSuite for T {}

pub(crate) fn copy_checked<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CryptoError> {
    if bytes.len() != N {
        return Err(CryptoError::InvalidKeyLength {
            expected: N,
            got: bytes.len(),
        });
    }
    let mut array = [0u8; N];
    array.copy_from_slice(bytes);
    Ok(array)
}

/// Parse a fixed-size key from hex.
pub fn key_from_hex<const N: usize>(hex_key: &str) -> Result<[u8; N], CryptoError> {
    let bytes = hex::decode(hex_key.trim())?;
    copy_checked(&bytes)
}
