//! Group text payload and its decrypted content
//!
//! # Wire Format
//!
//! ```text
//! [CHANNEL HASH (1)] [MAC (2)] [CIPHERTEXT (rest, block aligned)]
//! ```
//!
//! Decrypted content: `[TIMESTAMP (4)] [TEXT TYPE (1)] [TEXT] [ZERO PADDING]`.

use bytes::Bytes;

use super::{FieldReader, FieldWriter, PayloadCodec};
use crate::protocol::{CIPHER_MAC_SIZE, Error, MAX_PAYLOAD_SIZE, PayloadType, Result};

/// Maximum ciphertext carried by a group text payload.
pub const GROUP_TEXT_MAX_DATA: usize = MAX_PAYLOAD_SIZE - 1 - CIPHER_MAC_SIZE;

/// Text type tag for plain text
pub const TEXT_TYPE_PLAIN: u8 = 0x00;

/// Group text envelope. `data` is opaque ciphertext here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupText {
    /// Selects the channel key
    pub channel_hash: u8,
    /// Truncated MAC over `data`
    pub mac: [u8; CIPHER_MAC_SIZE],
    /// Ciphertext
    pub data: Bytes,
}

impl PayloadCodec for GroupText {
    const PAYLOAD_TYPE: PayloadType = PayloadType::GroupText;

    fn write_fields(&self, writer: &mut FieldWriter<'_>) -> Result<()> {
        if self.data.len() > GROUP_TEXT_MAX_DATA {
            return Err(Error::CapacityExceeded {
                field: "group text data",
                size: self.data.len(),
                max: GROUP_TEXT_MAX_DATA,
            });
        }
        writer.put_u8("group text channel hash", self.channel_hash)?;
        writer.put_slice("group text mac", &self.mac)?;
        writer.put_slice("group text data", &self.data)
    }

    fn read_fields(reader: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            channel_hash: reader.read_u8("group text channel hash")?,
            mac: reader.read_array::<CIPHER_MAC_SIZE>("group text mac")?,
            data: reader.read_rest(),
        })
    }
}

/// Decrypted group text content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTextContent {
    /// Sender clock, seconds since the Unix epoch
    pub timestamp: u32,
    /// Text type tag
    pub text_type: u8,
    /// Message text, conventionally "sender: message"
    pub text: String,
}

impl GroupTextContent {
    /// Size of timestamp and text type
    pub const HEADER_SIZE: usize = 5;

    /// Create plain text content
    pub fn plain(timestamp: u32, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            text_type: TEXT_TYPE_PLAIN,
            text: text.into(),
        }
    }

    /// Encode without padding.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = [0u8; GROUP_TEXT_MAX_DATA];
        let mut writer = FieldWriter::new(&mut buf, GROUP_TEXT_MAX_DATA);
        writer.put_u32("group text timestamp", self.timestamp)?;
        writer.put_u8("group text type", self.text_type)?;
        writer.put_slice("group text body", self.text.as_bytes())?;
        let len = writer.position();
        Ok(buf[..len].to_vec())
    }

    /// Decode decrypted plaintext.
    ///
    /// The text ends at the first NUL of the sender's block padding.
    pub fn decode(plaintext: &[u8]) -> Result<Self> {
        let mut reader = FieldReader::new(Bytes::copy_from_slice(plaintext));
        let timestamp = reader.read_u32("group text timestamp")?;
        let text_type = reader.read_u8("group text type")?;
        let rest = reader.peek_rest();
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        Ok(Self {
            timestamp,
            text_type,
            text: String::from_utf8_lossy(&rest[..end]).into_owned(),
        })
    }

    /// Split the "sender: message" convention
    #[must_use]
    pub fn sender_and_body(&self) -> (Option<&str>, &str) {
        sender_and_body(&self.text)
    }
}

/// Split text at the first ':' into sender and body, dropping one space
/// after the colon. Text without a colon has no sender.
#[must_use]
pub fn sender_and_body(text: &str) -> (Option<&str>, &str) {
    match text.split_once(':') {
        Some((sender, body)) => (Some(sender), body.strip_prefix(' ').unwrap_or(body)),
        None => (None, text),
    }
}
