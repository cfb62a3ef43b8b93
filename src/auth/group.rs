//! Group text MAC check, decryption and sealing.

use std::fmt;

use bytes::Bytes;
use subtle::ConstantTimeEq;
use tracing::{debug, trace};

use super::ComposeError;
use super::pipeline::{InboundState, log_transition};
use crate::crypto::{
    BlockCipher, MessageAuthenticator, decrypt_blocks, encrypt_blocks, pad_to_block,
};
use crate::keyring::{ChannelKey, Keyring};
use crate::payload::{GROUP_TEXT_MAX_DATA, GroupText, GroupTextContent};
use crate::protocol::{CIPHER_MAC_SIZE, Error};

/// Why an inbound group text was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No keyring entry produced a matching MAC
    NoMatchingKey,
    /// MAC matched but the ciphertext is not block aligned
    UnalignedCiphertext,
    /// MAC matched but the plaintext is too short to parse
    MalformedPlaintext,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NoMatchingKey => "no matching channel key",
            Self::UnalignedCiphertext => "ciphertext not block aligned",
            Self::MalformedPlaintext => "malformed plaintext",
        };
        write!(f, "{reason}")
    }
}

/// An authenticated and decrypted group text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedGroupText {
    /// Channel hash from the envelope
    pub channel_hash: u8,
    /// Position of the matching key in the keyring
    pub key_index: usize,
    /// Name of the matching channel
    pub channel_name: String,
    /// Decrypted content
    pub content: GroupTextContent,
}

/// Find the first key whose truncated MAC matches, in keyring order.
fn find_key<'k, M: MessageAuthenticator + ?Sized>(
    group_text: &GroupText,
    keyring: &'k Keyring,
    mac: &M,
) -> Option<(usize, &'k ChannelKey)> {
    keyring.iter().enumerate().find(|(index, key)| {
        let mut computed = [0u8; CIPHER_MAC_SIZE];
        mac.mac(key.secret(), &group_text.data, &mut computed);
        let matched: bool = computed[..].ct_eq(&group_text.mac[..]).into();
        trace!(key_index = index, channel = key.name(), matched, "checked channel MAC");
        matched
    })
}

/// Authenticate and decrypt a group text against `keyring`.
///
/// Keys are tried in order and the first MAC match wins. Nothing is
/// decrypted unless a MAC matches.
pub fn open_group_text<C: MessageAuthenticator + BlockCipher + ?Sized>(
    group_text: &GroupText,
    keyring: &Keyring,
    crypto: &C,
) -> Result<OpenedGroupText, RejectReason> {
    let channel_hash = group_text.channel_hash;

    let Some((key_index, key)) = find_key(group_text, keyring, crypto) else {
        debug!(channel_hash, keys = keyring.len(), "no channel key matched MAC");
        return Err(RejectReason::NoMatchingKey);
    };
    log_transition(channel_hash, InboundState::MacChecking, InboundState::Authenticated);

    let mut plaintext = group_text.data.to_vec();
    if decrypt_blocks(crypto, key.secret(), &mut plaintext).is_err() {
        debug!(channel_hash, len = plaintext.len(), "ciphertext not block aligned");
        return Err(RejectReason::UnalignedCiphertext);
    }
    let content =
        GroupTextContent::decode(&plaintext).map_err(|_| RejectReason::MalformedPlaintext)?;
    log_transition(channel_hash, InboundState::Authenticated, InboundState::Decrypted);

    Ok(OpenedGroupText {
        channel_hash,
        key_index,
        channel_name: key.name().to_string(),
        content,
    })
}

/// Encrypt and MAC `content` for the channel `key`.
///
/// The plaintext is zero-padded to the block size, encrypted block by
/// block, and the MAC is computed over the ciphertext.
pub fn seal_group_text<C: MessageAuthenticator + BlockCipher + ?Sized>(
    content: &GroupTextContent,
    key: &ChannelKey,
    crypto: &C,
) -> Result<GroupText, ComposeError> {
    let mut data = content.encode()?;
    pad_to_block(&mut data);
    if data.len() > GROUP_TEXT_MAX_DATA {
        return Err(Error::CapacityExceeded {
            field: "group text data",
            size: data.len(),
            max: GROUP_TEXT_MAX_DATA,
        }
        .into());
    }
    encrypt_blocks(crypto, key.secret(), &mut data)?;

    let mut mac = [0u8; CIPHER_MAC_SIZE];
    crypto.mac(key.secret(), &data, &mut mac);

    Ok(GroupText {
        channel_hash: key.hash(),
        mac,
        data: Bytes::from(data),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::MeshCrypto;

    fn keyring() -> Keyring {
        [
            ChannelKey::public(),
            ChannelKey::from_hex("test", "9cd8fcf22a47333b591d96a2b848b73f").unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_seal_then_open() {
        let content = GroupTextContent::plain(1_700_000_000, "Alice: hi");
        let sealed = seal_group_text(&content, &ChannelKey::public(), &MeshCrypto).unwrap();
        assert_eq!(sealed.channel_hash, 0x11);
        assert_eq!(sealed.data.len(), 16);

        let opened = open_group_text(&sealed, &keyring(), &MeshCrypto).unwrap();
        assert_eq!(opened.key_index, 0);
        assert_eq!(opened.channel_name, "public");
        assert_eq!(opened.content, content);
    }

    #[test]
    fn test_second_key_matches() {
        let ring = keyring();
        let test_key = ring.by_name("test").unwrap();
        let content = GroupTextContent::plain(5, "Bob: on test");
        let sealed = seal_group_text(&content, test_key, &MeshCrypto).unwrap();

        let opened = open_group_text(&sealed, &ring, &MeshCrypto).unwrap();
        assert_eq!(opened.key_index, 1);
        assert_eq!(opened.content.text, "Bob: on test");
    }

    #[test]
    fn test_tampered_mac_rejected() {
        let content = GroupTextContent::plain(1, "Eve: hi");
        let mut sealed = seal_group_text(&content, &ChannelKey::public(), &MeshCrypto).unwrap();
        sealed.mac[0] ^= 0xFF;
        assert_eq!(
            open_group_text(&sealed, &keyring(), &MeshCrypto),
            Err(RejectReason::NoMatchingKey)
        );
    }

    #[test]
    fn test_unaligned_ciphertext_rejected() {
        let data = Bytes::from_static(&[0x42; 20]);
        let mut mac = [0u8; CIPHER_MAC_SIZE];
        MeshCrypto.mac(&ChannelKey::public().secret()[..], &data, &mut mac);
        let grp = GroupText {
            channel_hash: 0x11,
            mac,
            data,
        };
        assert_eq!(
            open_group_text(&grp, &keyring(), &MeshCrypto),
            Err(RejectReason::UnalignedCiphertext)
        );
    }

    #[test]
    fn test_empty_ciphertext_is_malformed() {
        let mut mac = [0u8; CIPHER_MAC_SIZE];
        MeshCrypto.mac(&ChannelKey::public().secret()[..], &[], &mut mac);
        let grp = GroupText {
            channel_hash: 0x11,
            mac,
            data: Bytes::new(),
        };
        assert_eq!(
            open_group_text(&grp, &keyring(), &MeshCrypto),
            Err(RejectReason::MalformedPlaintext)
        );
    }

    #[test]
    fn test_seal_rejects_oversized_text() {
        let content = GroupTextContent::plain(1, "x".repeat(172));
        let result = seal_group_text(&content, &ChannelKey::public(), &MeshCrypto);
        assert!(matches!(
            result,
            Err(ComposeError::Codec(Error::CapacityExceeded { .. }))
        ));
    }
}
