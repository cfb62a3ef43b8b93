//! Group channel keys.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::crypto::{CryptoError, key_from_hex};
use crate::protocol::CIPHER_KEY_SIZE;

/// Well-known key of the public channel.
pub const PUBLIC_CHANNEL_KEY: [u8; CIPHER_KEY_SIZE] = [
    0x8b, 0x33, 0x87, 0xe9, 0xc5, 0xcd, 0xea, 0x6a, 0xc9, 0xe5, 0xed, 0xba, 0xa1, 0x15, 0xcd, 0x72,
];

/// Name of the public channel.
pub const PUBLIC_CHANNEL_NAME: &str = "public";

/// A named shared channel key.
#[derive(Clone, PartialEq, Eq)]
pub struct ChannelKey {
    name: String,
    secret: [u8; CIPHER_KEY_SIZE],
}

impl ChannelKey {
    /// Create from raw key bytes.
    pub fn new(name: impl Into<String>, secret: [u8; CIPHER_KEY_SIZE]) -> Self {
        Self {
            name: name.into(),
            secret,
        }
    }

    /// Create from a hex-encoded key.
    pub fn from_hex(name: impl Into<String>, secret_hex: &str) -> Result<Self, CryptoError> {
        Ok(Self::new(name, key_from_hex::<CIPHER_KEY_SIZE>(secret_hex)?))
    }

    /// The public channel.
    #[must_use]
    pub fn public() -> Self {
        Self::new(PUBLIC_CHANNEL_NAME, PUBLIC_CHANNEL_KEY)
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw key bytes.
    #[must_use]
    pub const fn secret(&self) -> &[u8; CIPHER_KEY_SIZE] {
        &self.secret
    }

    /// Channel hash announced on the wire: first byte of SHA-256(key).
    #[must_use]
    pub fn hash(&self) -> u8 {
        Sha256::digest(self.secret)[0]
    }
}

impl fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelKey")
            .field("name", &self.name)
            .field("hash", &format_args!("{:#04x}", self.hash()))
            .finish_non_exhaustive()
    }
}

/// Ordered set of channel keys. Earlier keys win when several match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyring {
    keys: Vec<ChannelKey>,
}

impl Keyring {
    /// Empty keyring.
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Keyring holding only the public channel.
    #[must_use]
    pub fn with_public_channel() -> Self {
        Self {
            keys: vec![ChannelKey::public()],
        }
    }

    /// Append a key at the lowest priority.
    pub fn push(&mut self, key: ChannelKey) {
        self.keys.push(key);
    }

    /// Keys in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &ChannelKey> {
        self.keys.iter()
    }

    /// Key at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChannelKey> {
        self.keys.get(index)
    }

    /// Key by channel name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&ChannelKey> {
        self.keys.iter().find(|key| key.name == name)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the keyring is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<ChannelKey> for Keyring {
    fn from_iter<I: IntoIterator<Item = ChannelKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_channel_hash() {
        assert_eq!(ChannelKey::public().hash(), 0x11);
    }

    #[test]
    fn test_keyring_order() {
        let keyring: Keyring = [
            ChannelKey::public(),
            ChannelKey::from_hex("test", "9cd8fcf22a47333b591d96a2b848b73f").unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(keyring.len(), 2);
        assert_eq!(keyring.get(0).unwrap().name(), "public");
        assert_eq!(keyring.by_name("test").unwrap().secret()[0], 0x9c);
        assert_eq!(keyring.by_name("test").unwrap().hash(), 0xd9);
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", ChannelKey::public());
        assert!(debug.contains("public"));
        assert!(debug.contains("0x11"));
        assert!(!debug.contains("8b"));
    }
}
