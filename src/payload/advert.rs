//! Node advertisement payload
//!
//! # Wire Format
//!
//! ```text
//! [PUBLIC KEY (32)] [TIMESTAMP (4)] [SIGNATURE (64)]
//! [FLAGS (1)] [LAT (4) LON (4)]? [EXTRA1 (2)]? [EXTRA2 (2)]? [NAME (rest)]?
//! ```
//!
//! Everything from the flags byte on is "application data". The optional
//! sections carry no lengths, so their order is fixed by [`OPTIONAL_SECTIONS`]
//! and the name, which runs to the end of the payload, must come last.

use std::fmt;

use bytes::Bytes;

use super::{FieldReader, FieldWriter, PayloadCodec};
use crate::protocol::{
    Error, MAX_NAME_SIZE, MAX_PAYLOAD_SIZE, PUB_KEY_SIZE, PayloadType, Result, SIGNATURE_SIZE,
};

/// Size of public key + timestamp + signature.
pub const ADVERT_FIXED_SIZE: usize = PUB_KEY_SIZE + 4 + SIGNATURE_SIZE;

/// Role a node announces (low nibble of the flags byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DeviceRole {
    /// Unspecified
    #[default]
    Unknown,
    /// Companion chat node
    ChatNode,
    /// Repeater
    Repeater,
    /// Room server
    RoomServer,
    /// Sensor
    Sensor,
    /// Unassigned nibble value
    Reserved(ReservedRole),
}

/// Unassigned role nibble, built only by [`DeviceRole::from_bits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReservedRole(u8);

impl ReservedRole {
    /// Four-bit wire value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl DeviceRole {
    /// Decode from the low four bits of `value`.
    #[must_use]
    pub const fn from_bits(value: u8) -> Self {
        match value & AdvertFlags::ROLE_MASK {
            0 => Self::Unknown,
            1 => Self::ChatNode,
            2 => Self::Repeater,
            3 => Self::RoomServer,
            4 => Self::Sensor,
            other => Self::Reserved(ReservedRole(other)),
        }
    }

    /// Convert to the four-bit wire value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::ChatNode => 1,
            Self::Repeater => 2,
            Self::RoomServer => 3,
            Self::Sensor => 4,
            Self::Reserved(reserved) => reserved.0,
        }
    }
}

impl fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ChatNode => "Chat Node",
            Self::Repeater => "Repeater",
            Self::RoomServer => "Room Server",
            Self::Sensor => "Sensor",
            Self::Unknown | Self::Reserved(_) => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// Advert flags byte: role nibble plus four presence bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvertFlags(u8);

impl AdvertFlags {
    /// Role bits
    pub const ROLE_MASK: u8 = 0x0F;
    /// Latitude/longitude follow
    pub const HAS_POSITION: u8 = 1 << 4;
    /// First extra field follows
    pub const HAS_EXTRA1: u8 = 1 << 5;
    /// Second extra field follows
    pub const HAS_EXTRA2: u8 = 1 << 6;
    /// Name follows (always last)
    pub const HAS_NAME: u8 = 1 << 7;

    /// Create from byte
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        Self(value)
    }

    /// Convert to byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Set a flag
    #[must_use]
    pub const fn with(mut self, flag: u8) -> Self {
        self.0 |= flag;
        self
    }

    /// Check if flag is set
    #[must_use]
    pub const fn has(self, flag: u8) -> bool {
        (self.0 & flag) != 0
    }

    /// Role nibble
    #[must_use]
    pub const fn role(self) -> DeviceRole {
        DeviceRole::from_bits(self.0)
    }
}

/// Fixed-point coordinates as carried on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Latitude in millionths of a degree
    pub latitude: i32,
    /// Longitude in millionths of a degree
    pub longitude: i32,
}

/// Node advertisement payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advert {
    /// Ed25519 public key of the advertising node
    pub public_key: [u8; PUB_KEY_SIZE],
    /// Sender clock, seconds since the Unix epoch
    pub timestamp: u32,
    /// Signature over public key, timestamp and application data
    pub signature: [u8; SIGNATURE_SIZE],
    /// Announced role
    pub role: DeviceRole,
    /// Optional position
    pub position: Option<Position>,
    /// Optional first extra field
    pub extra1: Option<u16>,
    /// Optional second extra field
    pub extra2: Option<u16>,
    /// Optional node name (at most 32 bytes of UTF-8)
    pub name: Option<String>,
}

/// One optional section of the application data.
struct OptionalSection {
    flag: u8,
    present: fn(&Advert) -> bool,
    write: fn(&Advert, &mut FieldWriter<'_>) -> Result<()>,
    read: fn(&mut Advert, &mut FieldReader) -> Result<()>,
}

/// Optional sections in wire order.
const OPTIONAL_SECTIONS: [OptionalSection; 4] = [
    OptionalSection {
        flag: AdvertFlags::HAS_POSITION,
        present: has_position,
        write: write_position,
        read: read_position,
    },
    OptionalSection {
        flag: AdvertFlags::HAS_EXTRA1,
        present: has_extra1,
        write: write_extra1,
        read: read_extra1,
    },
    OptionalSection {
        flag: AdvertFlags::HAS_EXTRA2,
        present: has_extra2,
        write: write_extra2,
        read: read_extra2,
    },
    OptionalSection {
        flag: AdvertFlags::HAS_NAME,
        present: has_name,
        write: write_name,
        read: read_name,
    },
];

// The name consumes the rest of the payload, nothing may follow it.
const _: () = assert!(OPTIONAL_SECTIONS[OPTIONAL_SECTIONS.len() - 1].flag == AdvertFlags::HAS_NAME);

fn has_position(advert: &Advert) -> bool {
    advert.position.is_some()
}

fn write_position(advert: &Advert, writer: &mut FieldWriter<'_>) -> Result<()> {
    if let Some(position) = advert.position {
        writer.put_i32("advert latitude", position.latitude)?;
        writer.put_i32("advert longitude", position.longitude)?;
    }
    Ok(())
}

fn read_position(advert: &mut Advert, reader: &mut FieldReader) -> Result<()> {
    if reader.remaining() < 8 {
        return Err(Error::Truncated {
            field: "advert position",
            needed: 8,
            got: reader.remaining(),
        });
    }
    advert.position = Some(Position {
        latitude: reader.read_i32("advert latitude")?,
        longitude: reader.read_i32("advert longitude")?,
    });
    Ok(())
}

fn has_extra1(advert: &Advert) -> bool {
    advert.extra1.is_some()
}

fn write_extra1(advert: &Advert, writer: &mut FieldWriter<'_>) -> Result<()> {
    match advert.extra1 {
        Some(value) => writer.put_u16("advert extra1", value),
        None => Ok(()),
    }
}

fn read_extra1(advert: &mut Advert, reader: &mut FieldReader) -> Result<()> {
    advert.extra1 = Some(reader.read_u16("advert extra1")?);
    Ok(())
}

fn has_extra2(advert: &Advert) -> bool {
    advert.extra2.is_some()
}

fn write_extra2(advert: &Advert, writer: &mut FieldWriter<'_>) -> Result<()> {
    match advert.extra2 {
        Some(value) => writer.put_u16("advert extra2", value),
        None => Ok(()),
    }
}

fn read_extra2(advert: &mut Advert, reader: &mut FieldReader) -> Result<()> {
    advert.extra2 = Some(reader.read_u16("advert extra2")?);
    Ok(())
}

fn has_name(advert: &Advert) -> bool {
    advert.name.is_some()
}

fn write_name(advert: &Advert, writer: &mut FieldWriter<'_>) -> Result<()> {
    let Some(name) = &advert.name else {
        return Ok(());
    };
    if name.len() > MAX_NAME_SIZE {
        return Err(Error::CapacityExceeded {
            field: "advert name",
            size: name.len(),
            max: MAX_NAME_SIZE,
        });
    }
    writer.put_slice("advert name", name.as_bytes())
}

fn read_name(advert: &mut Advert, reader: &mut FieldReader) -> Result<()> {
    if reader.remaining() > MAX_NAME_SIZE {
        return Err(Error::LengthExceeded {
            field: "advert name",
            len: reader.remaining(),
            max: MAX_NAME_SIZE,
        });
    }
    let raw = reader.read_rest();
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    advert.name = Some(String::from_utf8_lossy(&raw[..end]).into_owned());
    Ok(())
}

impl Advert {
    /// Create an unsigned advert with no optional fields
    #[must_use]
    pub const fn new(public_key: [u8; PUB_KEY_SIZE], timestamp: u32) -> Self {
        Self {
            public_key,
            timestamp,
            signature: [0u8; SIGNATURE_SIZE],
            role: DeviceRole::Unknown,
            position: None,
            extra1: None,
            extra2: None,
            name: None,
        }
    }

    /// Flags byte implied by the role and the present optional fields
    #[must_use]
    pub fn flags(&self) -> AdvertFlags {
        OPTIONAL_SECTIONS
            .iter()
            .filter(|section| (section.present)(self))
            .fold(AdvertFlags::from_u8(self.role.as_u8()), |flags, section| {
                flags.with(section.flag)
            })
    }

    fn write_app_data(&self, writer: &mut FieldWriter<'_>) -> Result<()> {
        writer.put_u8("advert flags", self.flags().as_u8())?;
        for section in &OPTIONAL_SECTIONS {
            if (section.present)(self) {
                (section.write)(self, writer)?;
            }
        }
        Ok(())
    }

    /// Encode the application data (flags byte and optional sections)
    pub fn app_data(&self) -> Result<Bytes> {
        let mut buf = [0u8; MAX_PAYLOAD_SIZE - ADVERT_FIXED_SIZE];
        let mut writer = FieldWriter::new(&mut buf, MAX_PAYLOAD_SIZE - ADVERT_FIXED_SIZE);
        self.write_app_data(&mut writer)?;
        let len = writer.position();
        Ok(Bytes::copy_from_slice(&buf[..len]))
    }

    /// Message this advert's signature covers, built from its own fields.
    ///
    /// Used when signing outbound adverts. Inbound verification must use
    /// [`signed_message`] on the raw payload instead.
    pub fn signing_message(&self) -> Result<Vec<u8>> {
        let app_data = self.app_data()?;
        let mut message = Vec::with_capacity(PUB_KEY_SIZE + 4 + app_data.len());
        message.extend_from_slice(&self.public_key);
        message.extend_from_slice(&self.timestamp.to_le_bytes());
        message.extend_from_slice(&app_data);
        Ok(message)
    }
}

/// Rebuild the signed message from a raw advert payload.
///
/// The signature covers `public key || timestamp || application data`; the
/// application data is taken byte for byte from the wire, never re-encoded.
pub fn signed_message(raw_payload: &[u8]) -> Result<Vec<u8>> {
    if raw_payload.len() < ADVERT_FIXED_SIZE {
        return Err(Error::Truncated {
            field: "advert",
            needed: ADVERT_FIXED_SIZE,
            got: raw_payload.len(),
        });
    }
    let signed_prefix = PUB_KEY_SIZE + 4;
    let app_data = &raw_payload[ADVERT_FIXED_SIZE..];
    let mut message = Vec::with_capacity(signed_prefix + app_data.len());
    message.extend_from_slice(&raw_payload[..signed_prefix]);
    message.extend_from_slice(app_data);
    Ok(message)
}

impl PayloadCodec for Advert {
    const PAYLOAD_TYPE: PayloadType = PayloadType::Advert;

    fn write_fields(&self, writer: &mut FieldWriter<'_>) -> Result<()> {
        writer.put_slice("advert public key", &self.public_key)?;
        writer.put_u32("advert timestamp", self.timestamp)?;
        writer.put_slice("advert signature", &self.signature)?;
        self.write_app_data(writer)
    }

    fn read_fields(reader: &mut FieldReader) -> Result<Self> {
        let public_key = reader.read_array::<PUB_KEY_SIZE>("advert public key")?;
        let timestamp = reader.read_u32("advert timestamp")?;
        let mut advert = Self::new(public_key, timestamp);
        advert.signature = reader.read_array::<SIGNATURE_SIZE>("advert signature")?;

        // Application data is optional as a whole
        if reader.is_empty() {
            return Ok(advert);
        }

        let flags = AdvertFlags::from_u8(reader.read_u8("advert flags")?);
        advert.role = flags.role();

        for section in &OPTIONAL_SECTIONS {
            if flags.has(section.flag) {
                (section.read)(&mut advert, reader)?;
            }
        }

        Ok(advert)
    }
}
