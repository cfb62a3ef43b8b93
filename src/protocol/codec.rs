//! Meshcore packet codec (encode/decode)
//!
//! This module frames payloads in the outer header and path sections.

use bytes::Bytes;
use tracing::trace;

use super::{
    Error, HEADER_SIZE, MAX_PATH_SIZE, MAX_PAYLOAD_SIZE, MAX_TRANS_UNIT, Message, PacketHeader,
    Result, TRANSPORT_CODES_SIZE, TransportCodes,
};

/// Size of the encoded message, before capacity checks.
fn encoded_len(message: &Message) -> usize {
    let codes = if message.route().has_transport_codes() {
        TRANSPORT_CODES_SIZE
    } else {
        0
    };
    HEADER_SIZE + codes + 1 + message.path().len() + message.payload().len()
}

/// Encode a message into `out`
///
/// # Format
///
/// ```text
/// [HEADER (1)] [TRANSPORT CODES (4, transport routes only)] [PATH LEN (1)] [PATH] [PAYLOAD]
/// ```
///
/// `out` is zero-filled before anything else, so a failed call never leaves
/// stale bytes behind. Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error if:
/// - The path is longer than [`MAX_PATH_SIZE`]
/// - The payload is longer than [`MAX_PAYLOAD_SIZE`]
/// - `out` cannot hold the encoded message
pub fn encode(message: &Message, out: &mut [u8]) -> Result<usize> {
    out.fill(0);

    let path = message.path();
    let payload = message.payload();

    if path.len() > MAX_PATH_SIZE {
        return Err(Error::CapacityExceeded {
            field: "path",
            size: path.len(),
            max: MAX_PATH_SIZE,
        });
    }
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::CapacityExceeded {
            field: "payload",
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }

    let total_size = encoded_len(message);
    if out.len() < total_size {
        return Err(Error::BufferTooSmall {
            needed: total_size,
            got: out.len(),
        });
    }

    let mut position = 0;

    out[position] = message.header().to_byte();
    position += HEADER_SIZE;

    if message.route().has_transport_codes() {
        let codes = message.transport_codes().unwrap_or_default();
        out[position..position + TRANSPORT_CODES_SIZE].copy_from_slice(&codes.to_bytes());
        position += TRANSPORT_CODES_SIZE;
    }

    // Path length fits in a byte: checked against MAX_PATH_SIZE above
    out[position] = path.len() as u8;
    position += 1;

    out[position..position + path.len()].copy_from_slice(path);
    position += path.len();

    out[position..position + payload.len()].copy_from_slice(payload);
    position += payload.len();

    trace!(
        route = %message.route(),
        payload_type = %message.payload_type(),
        len = position,
        "encoded packet"
    );

    Ok(position)
}

/// Encode a message into a new buffer sized to fit.
pub fn encode_to_vec(message: &Message) -> Result<Vec<u8>> {
    let mut out = vec![0u8; MAX_TRANS_UNIT];
    let len = encode(message, &mut out)?;
    out.truncate(len);
    Ok(out)
}

/// Length of the payload that follows the path.
///
/// The wire format has no payload length field: whatever remains after the
/// path is payload. A corrupted path length silently moves this boundary,
/// so callers bounds-check the result.
#[must_use]
pub const fn implicit_payload_len(total_size: usize, consumed: usize) -> usize {
    total_size.saturating_sub(consumed)
}

/// Decode a message from bytes
///
/// # Format
///
/// ```text
/// [HEADER (1)] [TRANSPORT CODES (4, transport routes only)] [PATH LEN (1)] [PATH] [PAYLOAD]
/// ```
///
/// Path and payload are zero-copy slices of `bytes`.
///
/// # Errors
///
/// Returns an error if:
/// - Input is empty or longer than [`MAX_TRANS_UNIT`]
/// - Transport codes, path length or path are truncated
/// - The path length exceeds [`MAX_PATH_SIZE`]
/// - The remaining payload exceeds [`MAX_PAYLOAD_SIZE`]
pub fn decode(bytes: Bytes) -> Result<Message> {
    let total_size = bytes.len();

    if total_size == 0 {
        return Err(Error::Empty);
    }
    if total_size > MAX_TRANS_UNIT {
        return Err(Error::PacketTooLarge {
            size: total_size,
            max: MAX_TRANS_UNIT,
        });
    }

    let header = PacketHeader::from_byte(bytes[0]);
    let mut position = HEADER_SIZE;

    let transport_codes = if header.route().has_transport_codes() {
        let remaining = total_size - position;
        if remaining < TRANSPORT_CODES_SIZE {
            return Err(Error::Truncated {
                field: "transport codes",
                needed: TRANSPORT_CODES_SIZE,
                got: remaining,
            });
        }
        let mut raw = [0u8; TRANSPORT_CODES_SIZE];
        raw.copy_from_slice(&bytes[position..position + TRANSPORT_CODES_SIZE]);
        position += TRANSPORT_CODES_SIZE;
        Some(TransportCodes::from_bytes(raw))
    } else {
        None
    };

    if position >= total_size {
        return Err(Error::Truncated {
            field: "path length",
            needed: 1,
            got: 0,
        });
    }
    let path_len = usize::from(bytes[position]);
    position += 1;

    if path_len > MAX_PATH_SIZE {
        return Err(Error::LengthExceeded {
            field: "path",
            len: path_len,
            max: MAX_PATH_SIZE,
        });
    }
    let remaining = total_size - position;
    if remaining < path_len {
        return Err(Error::Truncated {
            field: "path",
            needed: path_len,
            got: remaining,
        });
    }
    let path = bytes.slice(position..position + path_len);
    position += path_len;

    let payload_len = implicit_payload_len(total_size, position);
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(Error::LengthExceeded {
            field: "payload",
            len: payload_len,
            max: MAX_PAYLOAD_SIZE,
        });
    }
    let payload = bytes.slice(position..position + payload_len);

    trace!(
        route = %header.route(),
        payload_type = %header.payload_type(),
        path_len,
        payload_len,
        "decoded packet"
    );

    Ok(Message::from_parts(header, transport_codes, path, payload))
}
