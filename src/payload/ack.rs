use super::{FieldReader, FieldWriter, PayloadCodec};
use crate::protocol::{PayloadType, Result};

/// Acknowledgement payload: a single 32-bit integrity value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Ack {
    /// Checksum of the acknowledged message
    pub crc: u32,
}

impl Ack {
    /// Wire size
    pub const SIZE: usize = 4;

    /// Create an ack for `crc`
    #[must_use]
    pub const fn new(crc: u32) -> Self {
        Self { crc }
    }
}

impl PayloadCodec for Ack {
    const PAYLOAD_TYPE: PayloadType = PayloadType::Ack;

    fn write_fields(&self, writer: &mut FieldWriter<'_>) -> Result<()> {
        writer.put_u32("ack crc", self.crc)
    }

    fn read_fields(reader: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            crc: reader.read_u32("ack crc")?,
        })
    }
}
