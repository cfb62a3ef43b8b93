//! Meshcore packet envelope

use bytes::Bytes;

use super::{PacketHeader, PayloadType, RouteType};

/// Two 16-bit codes scoping a packet to a pre-established transport path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TransportCodes(pub [u16; 2]);

impl TransportCodes {
    /// Encode as four little-endian bytes
    #[must_use]
    pub fn to_bytes(self) -> [u8; 4] {
        let mut bytes = [0u8; 4];
        bytes[0..2].copy_from_slice(&self.0[0].to_le_bytes());
        bytes[2..4].copy_from_slice(&self.0[1].to_le_bytes());
        bytes
    }

    /// Decode from four little-endian bytes
    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self([
            u16::from_le_bytes([bytes[0], bytes[1]]),
            u16::from_le_bytes([bytes[2], bytes[3]]),
        ])
    }
}

/// Meshcore packet
///
/// Constructed fresh per send or receive. Transport codes are present
/// exactly when the route requires them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: PacketHeader,
    transport_codes: Option<TransportCodes>,
    path: Bytes,
    payload: Bytes,
}

impl Message {
    /// Create a new message with an empty path
    pub fn new(route: RouteType, payload_type: PayloadType, payload: impl Into<Bytes>) -> Self {
        Self::from_parts(
            PacketHeader::new(route, payload_type),
            route.has_transport_codes().then(TransportCodes::default),
            Bytes::new(),
            payload.into(),
        )
    }

    /// Assemble a message from already validated parts
    pub(crate) fn from_parts(
        header: PacketHeader,
        transport_codes: Option<TransportCodes>,
        path: Bytes,
        payload: Bytes,
    ) -> Self {
        Self {
            header,
            transport_codes,
            path,
            payload,
        }
    }

    /// Set transport codes. Ignored for routes that do not carry them.
    #[must_use]
    pub fn with_transport_codes(mut self, codes: TransportCodes) -> Self {
        if self.header.route().has_transport_codes() {
            self.transport_codes = Some(codes);
        }
        self
    }

    /// Set the hop path
    #[must_use]
    pub fn with_path(mut self, path: impl Into<Bytes>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the header version
    #[must_use]
    pub fn with_version(mut self, version: u8) -> Self {
        self.header =
            PacketHeader::with_version(self.header.route(), self.header.payload_type(), version);
        self
    }

    /// Get header
    #[must_use]
    pub const fn header(&self) -> &PacketHeader {
        &self.header
    }

    /// Get route type
    #[must_use]
    pub const fn route(&self) -> RouteType {
        self.header.route()
    }

    /// Get payload type
    #[must_use]
    pub const fn payload_type(&self) -> PayloadType {
        self.header.payload_type()
    }

    /// Get version
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.header.version()
    }

    /// Get transport codes
    #[must_use]
    pub const fn transport_codes(&self) -> Option<TransportCodes> {
        self.transport_codes
    }

    /// Get path
    #[must_use]
    pub fn path(&self) -> &Bytes {
        &self.path
    }

    /// Get payload
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Encode message into `out`, returning the number of bytes written
    pub fn encode(&self, out: &mut [u8]) -> super::Result<usize> {
        super::encode(self, out)
    }

    /// Encode message to a freshly allocated buffer
    pub fn encode_to_vec(&self) -> super::Result<Vec<u8>> {
        super::encode_to_vec(self)
    }

    /// Decode message from bytes
    pub fn decode(bytes: &[u8]) -> super::Result<Self> {
        super::decode(Bytes::copy_from_slice(bytes))
    }
}
