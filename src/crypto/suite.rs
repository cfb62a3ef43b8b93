//! HMAC-SHA256 / AES-128 / Ed25519 primitives.

use aes::Aes128;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::{Block, BlockCipher, MessageAuthenticator, SignatureVerifier};
use crate::protocol::{CIPHER_KEY_SIZE, PUB_KEY_SIZE, SIGNATURE_SIZE};

type HmacSha256 = Hmac<Sha256>;

/// Default primitives used by Meshcore peers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshCrypto;

impl MessageAuthenticator for MeshCrypto {
    fn mac(&self, key: &[u8], data: &[u8], out: &mut [u8]) {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
            .expect("HMAC accepts keys of any length");
        mac.update(data);
        let tag = mac.finalize().into_bytes();
        let len = out.len().min(tag.len());
        out[..len].copy_from_slice(&tag[..len]);
    }
}

impl BlockCipher for MeshCrypto {
    fn encrypt_block(&self, key: &[u8; CIPHER_KEY_SIZE], block: &mut Block) {
        let cipher = Aes128::new(GenericArray::from_slice(key));
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }

    fn decrypt_block(&self, key: &[u8; CIPHER_KEY_SIZE], block: &mut Block) {
        let cipher = Aes128::new(GenericArray::from_slice(key));
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }
}

impl SignatureVerifier for MeshCrypto {
    fn verify(
        &self,
        signature: &[u8; SIGNATURE_SIZE],
        message: &[u8],
        public_key: &[u8; PUB_KEY_SIZE],
    ) -> bool {
        let Ok(key) = VerifyingKey::from_bytes(public_key) else {
            return false;
        };
        key.verify(message, &Signature::from_bytes(signature)).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc_4231_case_2_truncated() {
        let mut out = [0u8; 4];
        MeshCrypto.mac(b"Jefe", b"what do ya want for nothing?", &mut out);
        assert_eq!(hex::encode(out), "5bdcc146");
    }

    #[test]
    fn fips_197_aes128_vector() {
        let key: [u8; 16] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ];
        let mut block: Block = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        MeshCrypto.encrypt_block(&key, &mut block);
        assert_eq!(hex::encode(block), "69c4e0d86a7b0430d8cdb78070b4c55a");
        MeshCrypto.decrypt_block(&key, &mut block);
        assert_eq!(hex::encode(block), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn rejects_garbage_signature() {
        let public_key = [0x01; PUB_KEY_SIZE];
        assert!(!MeshCrypto.verify(&[0u8; SIGNATURE_SIZE], b"msg", &public_key));
    }
}
