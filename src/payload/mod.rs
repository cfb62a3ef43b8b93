//! Meshcore payload codecs
//!
//! Each payload type implements [`PayloadCodec`]: a pair of field-level
//! writers and readers, with the buffer handling shared here.

mod ack;
mod advert;
mod field;
mod group_text;
mod request;

use bytes::Bytes;

use crate::protocol::{Error, MAX_PAYLOAD_SIZE, Message, PayloadType, Result, RouteType};

pub use ack::Ack;
pub use advert::{Advert, AdvertFlags, DeviceRole, Position, ReservedRole, signed_message};
pub use field::{FieldReader, FieldWriter};
pub use group_text::{
    GROUP_TEXT_MAX_DATA, GroupText, GroupTextContent, TEXT_TYPE_PLAIN, sender_and_body,
};
pub use request::{REQUEST_MAX_CIPHERTEXT, Request};

/// Serialize/deserialize capability shared by all payload types.
pub trait PayloadCodec: Sized {
    /// Packet type carrying this payload
    const PAYLOAD_TYPE: PayloadType;

    /// Write every field in wire order.
    fn write_fields(&self, writer: &mut FieldWriter<'_>) -> Result<()>;

    /// Read every field in wire order.
    fn read_fields(reader: &mut FieldReader) -> Result<Self>;

    /// Encode into `out`, returning the payload length.
    ///
    /// `out` is zero-filled first and again on failure, so it never holds a
    /// partial payload.
    fn encode(&self, out: &mut [u8]) -> Result<usize> {
        out.fill(0);
        let result = {
            let mut writer = FieldWriter::new(out, MAX_PAYLOAD_SIZE);
            self.write_fields(&mut writer).map(|()| writer.position())
        };
        if result.is_err() {
            out.fill(0);
        }
        result
    }

    /// Encode into a new buffer
    fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = [0u8; MAX_PAYLOAD_SIZE];
        let len = self.encode(&mut buf)?;
        Ok(Bytes::copy_from_slice(&buf[..len]))
    }

    /// Decode from a packet payload
    fn decode(payload: Bytes) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::LengthExceeded {
                field: "payload",
                len: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        let mut reader = FieldReader::new(payload);
        Self::read_fields(&mut reader)
    }

    /// Wrap in a packet on the given route
    fn to_message(&self, route: RouteType) -> Result<Message> {
        Ok(Message::new(route, Self::PAYLOAD_TYPE, self.to_bytes()?))
    }

    /// Decode the payload of a packet, checking its type
    fn from_message(message: &Message) -> Result<Self> {
        if message.payload_type() != Self::PAYLOAD_TYPE {
            return Err(Error::UnexpectedPayloadType {
                expected: Self::PAYLOAD_TYPE,
                found: message.payload_type(),
            });
        }
        Self::decode(message.payload().clone())
    }
}
