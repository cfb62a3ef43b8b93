//! Meshcore packet header
//!
//! The header is a single packed byte.

use super::{PayloadType, RouteType};

const ROUTE_SHIFT: u8 = 0;
const ROUTE_MASK: u8 = 0x03;
const TYPE_SHIFT: u8 = 2;
const TYPE_MASK: u8 = 0x0F;
const VERSION_SHIFT: u8 = 6;
const VERSION_MASK: u8 = 0x03;

/// Meshcore packet header (1 byte)
///
/// # Wire Format
///
/// ```text
///  7   6   5   4   3   2   1   0
/// +---+---+---+---+---+---+---+---+
/// |version|  payload type |route|
/// +---+---+---+---+---+---+---+---+
/// ```
///
/// Kept as three narrow fields so encode and decode stay symmetric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    route: RouteType,
    payload_type: PayloadType,
    version: u8,
}

impl PacketHeader {
    /// Version this crate emits (wire value 0)
    pub const CURRENT_VERSION: u8 = 0;

    /// Create a new header with the current version
    #[must_use]
    pub const fn new(route: RouteType, payload_type: PayloadType) -> Self {
        Self {
            route,
            payload_type,
            version: Self::CURRENT_VERSION,
        }
    }

    /// Create a header with an explicit version (masked to two bits)
    #[must_use]
    pub const fn with_version(route: RouteType, payload_type: PayloadType, version: u8) -> Self {
        Self {
            route,
            payload_type,
            version: version & VERSION_MASK,
        }
    }

    /// Get route type
    #[must_use]
    pub const fn route(&self) -> RouteType {
        self.route
    }

    /// Get payload type
    #[must_use]
    pub const fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    /// Get version
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.version
    }

    /// Pack into the wire byte
    #[must_use]
    pub const fn to_byte(&self) -> u8 {
        ((self.route.as_u8() & ROUTE_MASK) << ROUTE_SHIFT)
            | ((self.payload_type.as_u8() & TYPE_MASK) << TYPE_SHIFT)
            | ((self.version & VERSION_MASK) << VERSION_SHIFT)
    }

    /// Unpack from the wire byte. Every byte value is a valid header.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        Self {
            route: RouteType::from_bits((byte >> ROUTE_SHIFT) & ROUTE_MASK),
            payload_type: PayloadType::from_bits((byte >> TYPE_SHIFT) & TYPE_MASK),
            version: (byte >> VERSION_SHIFT) & VERSION_MASK,
        }
    }
}
