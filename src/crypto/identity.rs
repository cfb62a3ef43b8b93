use std::fmt;

use ed25519_dalek::{Signer, SigningKey};

use super::{AdvertSigner, CryptoError, key_from_hex};
use crate::protocol::{PUB_KEY_SIZE, SIGNATURE_SIZE};

/// Ed25519 seed length.
pub const SEED_SIZE: usize = 32;

/// Device keypair used to sign outbound adverts.
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
}

impl Identity {
    /// Build from a 32-byte seed.
    #[must_use]
    pub fn from_seed(seed: [u8; SEED_SIZE]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed),
        }
    }

    /// Build from a hex-encoded 32-byte seed.
    pub fn from_hex(seed_hex: &str) -> Result<Self, CryptoError> {
        Ok(Self::from_seed(key_from_hex::<SEED_SIZE>(seed_hex)?))
    }
}

impl AdvertSigner for Identity {
    fn public_key(&self) -> [u8; PUB_KEY_SIZE] {
        self.signing_key.verifying_key().to_bytes()
    }

    fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_SIZE] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("public_key", &hex::encode(self.public_key()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{MeshCrypto, SignatureVerifier};

    #[test]
    fn test_sign_and_verify() {
        let identity = Identity::from_seed([7u8; SEED_SIZE]);
        let signature = identity.sign(b"advert body");

        assert!(MeshCrypto.verify(&signature, b"advert body", &identity.public_key()));
        assert!(!MeshCrypto.verify(&signature, b"advert bodz", &identity.public_key()));
    }

    #[test]
    fn test_debug_hides_secret() {
        let identity = Identity::from_hex(&"11".repeat(SEED_SIZE)).unwrap();
        let debug = format!("{identity:?}");
        assert!(debug.contains(&hex::encode(identity.public_key())));
        assert!(!debug.contains(&"11".repeat(SEED_SIZE)));
    }
}
