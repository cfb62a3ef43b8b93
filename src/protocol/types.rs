//! Meshcore route and payload types

use std::fmt;

/// Mesh forwarding mode (header bits 0-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RouteType {
    /// Flood mode plus transport codes
    TransportFlood = 0x0,
    /// Flood mode, path is built up hop by hop
    Flood = 0x1,
    /// Direct route, path is supplied
    Direct = 0x2,
    /// Direct route plus transport codes
    TransportDirect = 0x3,
}

impl RouteType {
    /// Decode from the low two bits of `value`.
    #[must_use]
    pub const fn from_bits(value: u8) -> Self {
        match value & 0x03 {
            0x0 => Self::TransportFlood,
            0x1 => Self::Flood,
            0x2 => Self::Direct,
            _ => Self::TransportDirect,
        }
    }

    /// Convert to the two-bit wire value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether packets on this route carry two transport codes after the header.
    ///
    /// This is the only gate for the transport code section on both the
    /// encode and decode paths.
    #[must_use]
    pub const fn has_transport_codes(self) -> bool {
        matches!(self, Self::TransportFlood | Self::TransportDirect)
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TransportFlood => "Transport flood",
            Self::Flood => "Flood",
            Self::Direct => "Direct",
            Self::TransportDirect => "Transport direct",
        };
        write!(f, "{name}")
    }
}

/// Payload types (header bits 2-5)
///
/// All sixteen nibble values decode; the unassigned ones are kept as
/// [`PayloadType::Reserved`] so they survive a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadType {
    /// Request (dest/src hashes, MAC, encrypted timestamp + blob)
    Request,
    /// Response to a request or anonymous request
    Response,
    /// Plain text message (dest/src hashes, MAC, encrypted timestamp + text)
    TextMessage,
    /// Simple acknowledgement
    Ack,
    /// Node advertising its identity
    Advert,
    /// Unverified group text message (channel hash, MAC, encrypted text)
    GroupText,
    /// Unverified group datagram
    GroupData,
    /// Generic request with an ephemeral public key
    AnonRequest,
    /// Returned path
    Path,
    /// Path trace collecting SNR per hop
    Trace,
    /// One of a set of packets
    Multipart,
    /// Application defined raw bytes
    RawCustom,
    /// Unassigned nibble value (0xB-0xE)
    Reserved(ReservedType),
}

/// Unassigned payload type nibble.
///
/// Only [`PayloadType::from_bits`] builds one, so a reserved type never
/// aliases an assigned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReservedType(u8);

impl ReservedType {
    /// Four-bit wire value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl PayloadType {
    /// Decode from the low four bits of `value`.
    #[must_use]
    pub const fn from_bits(value: u8) -> Self {
        match value & 0x0F {
            0x0 => Self::Request,
            0x1 => Self::Response,
            0x2 => Self::TextMessage,
            0x3 => Self::Ack,
            0x4 => Self::Advert,
            0x5 => Self::GroupText,
            0x6 => Self::GroupData,
            0x7 => Self::AnonRequest,
            0x8 => Self::Path,
            0x9 => Self::Trace,
            0xA => Self::Multipart,
            0xF => Self::RawCustom,
            other => Self::Reserved(ReservedType(other)),
        }
    }

    /// Convert to the four-bit wire value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Request => 0x0,
            Self::Response => 0x1,
            Self::TextMessage => 0x2,
            Self::Ack => 0x3,
            Self::Advert => 0x4,
            Self::GroupText => 0x5,
            Self::GroupData => 0x6,
            Self::AnonRequest => 0x7,
            Self::Path => 0x8,
            Self::Trace => 0x9,
            Self::Multipart => 0xA,
            Self::RawCustom => 0xF,
            Self::Reserved(reserved) => reserved.0,
        }
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Request => "Request",
            Self::Response => "Response",
            Self::TextMessage => "Plain text message",
            Self::Ack => "Acknowledgement",
            Self::Advert => "Node advertisement",
            Self::GroupText => "Group text message (unverified)",
            Self::GroupData => "Group data message (unverified)",
            Self::AnonRequest => "Anonymous request",
            Self::Path => "Returned path",
            Self::Trace => "Trace",
            Self::Multipart => "Multipart",
            Self::RawCustom => "Custom raw",
            Self::Reserved(_) => "Unknown",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_type_roundtrip() {
        for nibble in 0u8..16 {
            let payload_type = PayloadType::from_bits(nibble);
            assert_eq!(payload_type.as_u8(), nibble);
        }
        assert!(matches!(
            PayloadType::from_bits(0x0C),
            PayloadType::Reserved(reserved) if reserved.value() == 0x0C
        ));
    }

    #[test]
    fn test_every_byte_decodes_stably() {
        for value in 0u8..=255 {
            let payload_type = PayloadType::from_bits(value);
            assert_eq!(payload_type.as_u8(), value & 0x0F);
            assert_eq!(PayloadType::from_bits(payload_type.as_u8()), payload_type);
        }
    }

    #[test]
    fn test_transport_routes() {
        assert!(RouteType::TransportFlood.has_transport_codes());
        assert!(RouteType::TransportDirect.has_transport_codes());
        assert!(!RouteType::Flood.has_transport_codes());
        assert!(!RouteType::Direct.has_transport_codes());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(RouteType::Flood.to_string(), "Flood");
        assert_eq!(PayloadType::Advert.to_string(), "Node advertisement");
        assert_eq!(PayloadType::from_bits(0xB).to_string(), "Unknown");
    }
}
