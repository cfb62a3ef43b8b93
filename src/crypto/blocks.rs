//! Raw block mode for group channel ciphertext.
//!
//! Every 16-byte block is encrypted on its own with the channel key: no IV,
//! no chaining. Identical plaintext blocks give identical ciphertext blocks,
//! which leaks structure. Deployed peers speak exactly this format, so it is
//! reproduced as is; changing it breaks interoperability.

use super::{Block, BlockCipher, CryptoError};
use crate::protocol::{CIPHER_BLOCK_SIZE, CIPHER_KEY_SIZE};

fn check_aligned(data: &[u8]) -> Result<(), CryptoError> {
    if data.len() % CIPHER_BLOCK_SIZE != 0 {
        return Err(CryptoError::UnalignedData { len: data.len() });
    }
    Ok(())
}

/// Encrypt `data` in place, block by block.
pub fn encrypt_blocks<C: BlockCipher + ?Sized>(
    cipher: &C,
    key: &[u8; CIPHER_KEY_SIZE],
    data: &mut [u8],
) -> Result<(), CryptoError> {
    check_aligned(data)?;
    for chunk in data.chunks_exact_mut(CIPHER_BLOCK_SIZE) {
        let mut block: Block = [0u8; CIPHER_BLOCK_SIZE];
        block.copy_from_slice(chunk);
        cipher.encrypt_block(key, &mut block);
        chunk.copy_from_slice(&block);
    }
    Ok(())
}

/// Decrypt `data` in place, block by block.
pub fn decrypt_blocks<C: BlockCipher + ?Sized>(
    cipher: &C,
    key: &[u8; CIPHER_KEY_SIZE],
    data: &mut [u8],
) -> Result<(), CryptoError> {
    check_aligned(data)?;
    for chunk in data.chunks_exact_mut(CIPHER_BLOCK_SIZE) {
        let mut block: Block = [0u8; CIPHER_BLOCK_SIZE];
        block.copy_from_slice(chunk);
        cipher.decrypt_block(key, &mut block);
        chunk.copy_from_slice(&block);
    }
    Ok(())
}

/// Zero-pad `data` up to the next block boundary.
pub fn pad_to_block(data: &mut Vec<u8>) {
    let padded = data.len().div_ceil(CIPHER_BLOCK_SIZE) * CIPHER_BLOCK_SIZE;
    data.resize(padded, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::MeshCrypto;

    const KEY: [u8; CIPHER_KEY_SIZE] = [0x2B; CIPHER_KEY_SIZE];

    #[test]
    fn test_blocks_roundtrip() {
        let mut data = b"thirty-two bytes of plain text!!".to_vec();
        let original = data.clone();
        encrypt_blocks(&MeshCrypto, &KEY, &mut data).unwrap();
        assert_ne!(data, original);
        decrypt_blocks(&MeshCrypto, &KEY, &mut data).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn test_no_chaining() {
        let mut data = [0x41u8; 32];
        encrypt_blocks(&MeshCrypto, &KEY, &mut data).unwrap();
        assert_eq!(data[..16], data[16..]);
    }

    #[test]
    fn test_unaligned_rejected() {
        let mut data = [0u8; 17];
        assert_eq!(
            decrypt_blocks(&MeshCrypto, &KEY, &mut data),
            Err(CryptoError::UnalignedData { len: 17 })
        );
    }

    #[test]
    fn test_pad_to_block() {
        let mut data = vec![1u8; 14];
        pad_to_block(&mut data);
        assert_eq!(data.len(), 16);
        assert_eq!(&data[14..], &[0, 0]);

        let mut aligned = vec![1u8; 32];
        pad_to_block(&mut aligned);
        assert_eq!(aligned.len(), 32);

        let mut empty = Vec::new();
        pad_to_block(&mut empty);
        assert!(empty.is_empty());
    }
}
