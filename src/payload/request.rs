use bytes::Bytes;

use super::{FieldReader, FieldWriter, PayloadCodec};
use crate::protocol::{CIPHER_MAC_SIZE, Error, MAX_PAYLOAD_SIZE, PayloadType, Result};

/// Maximum ciphertext carried by a request payload.
pub const REQUEST_MAX_CIPHERTEXT: usize = MAX_PAYLOAD_SIZE - CIPHER_MAC_SIZE - 2;

/// Direct request payload
///
/// ```text
/// [DEST HASH (1)] [SRC HASH (1)] [MAC (2)] [CIPHERTEXT (rest)]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Abbreviated hash of the destination node
    pub destination_hash: u8,
    /// Abbreviated hash of the source node
    pub source_hash: u8,
    /// Truncated MAC over `ciphertext`
    pub mac: [u8; CIPHER_MAC_SIZE],
    /// Encrypted timestamp and request blob
    pub ciphertext: Bytes,
}

const CIPHERTEXT_FIELD: &str = "request ciphertext";

fn check_outbound(len: usize) -> Result<()> {
    if len > REQUEST_MAX_CIPHERTEXT {
        return Err(Error::CapacityExceeded {
            field: CIPHERTEXT_FIELD,
            size: len,
            max: REQUEST_MAX_CIPHERTEXT,
        });
    }
    Ok(())
}

fn check_inbound(len: usize) -> Result<()> {
    if len > REQUEST_MAX_CIPHERTEXT {
        return Err(Error::LengthExceeded {
            field: CIPHERTEXT_FIELD,
            len,
            max: REQUEST_MAX_CIPHERTEXT,
        });
    }
    Ok(())
}

impl PayloadCodec for Request {
    const PAYLOAD_TYPE: PayloadType = PayloadType::Request;

    fn write_fields(&self, writer: &mut FieldWriter<'_>) -> Result<()> {
        check_outbound(self.ciphertext.len())?;
        writer.put_u8("request destination hash", self.destination_hash)?;
        writer.put_u8("request source hash", self.source_hash)?;
        writer.put_slice("request mac", &self.mac)?;
        writer.put_slice("request ciphertext", &self.ciphertext)
    }

    fn read_fields(reader: &mut FieldReader) -> Result<Self> {
        let destination_hash = reader.read_u8("request destination hash")?;
        let source_hash = reader.read_u8("request source hash")?;
        let mac = reader.read_array::<CIPHER_MAC_SIZE>("request mac")?;
        check_inbound(reader.remaining())?;
        Ok(Self {
            destination_hash,
            source_hash,
            mac,
            ciphertext: reader.read_rest(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        let request = Request {
            destination_hash: 0xD1,
            source_hash: 0x5C,
            mac: [0x01, 0x02],
            ciphertext: Bytes::from_static(b"sealed"),
        };
        let bytes = request.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0xD1, 0x5C, 0x01, 0x02]);
        assert_eq!(&bytes[4..], b"sealed");
        assert_eq!(Request::decode(bytes).unwrap(), request);
    }

    #[test]
    fn test_request_capacity_enforced() {
        let request = Request {
            destination_hash: 0,
            source_hash: 0,
            mac: [0; CIPHER_MAC_SIZE],
            ciphertext: Bytes::from(vec![0; REQUEST_MAX_CIPHERTEXT + 1]),
        };
        assert!(matches!(
            request.to_bytes(),
            Err(Error::CapacityExceeded {
                field: "request ciphertext",
                ..
            })
        ));

        let full = Request {
            ciphertext: Bytes::from(vec![0; REQUEST_MAX_CIPHERTEXT]),
            ..request
        };
        assert_eq!(full.to_bytes().unwrap().len(), MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn test_request_oversized_ciphertext_is_malformed() {
        let mut raw = vec![0xD1, 0x5C, 0x01, 0x02];
        raw.extend(std::iter::repeat_n(0u8, REQUEST_MAX_CIPHERTEXT + 1));
        let err = Request::read_fields(&mut FieldReader::new(Bytes::from(raw))).unwrap_err();
        assert_eq!(
            err,
            Error::LengthExceeded {
                field: "request ciphertext",
                len: REQUEST_MAX_CIPHERTEXT + 1,
                max: REQUEST_MAX_CIPHERTEXT,
            }
        );
        assert_eq!(err.kind(), crate::protocol::ErrorKind::MalformedInput);
    }

    #[test]
    fn test_request_truncated() {
        let result = Request::decode(Bytes::from_static(&[0xD1, 0x5C, 0x01]));
        assert!(matches!(
            result,
            Err(Error::Truncated {
                field: "request mac",
                ..
            })
        ));
    }
}
