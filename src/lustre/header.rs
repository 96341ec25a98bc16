//! Layout header decoding.
//!
//! The `lustre.lov` extended attribute starts with a 32-bit magic telling
//! which of several on-disk structures follows. Only the layout generation is
//! extracted; where it lives depends on the structure:
//!
//! | Format | Structure | Generation |
//! |--------|-----------|------------|
//! | `LOV_USER_MAGIC_V1` | `lov_user_md_v1` | `u16` at offset 30 |
//! | `LOV_USER_MAGIC_V3` | `lov_user_md_v3` | `u16` at offset 30 |
//! | `LOV_USER_MAGIC_SPECIFIC` | `lov_user_md_v3` | `u16` at offset 30 |
//! | `LOV_USER_MAGIC_COMP_V1` | `lov_comp_md_v1` | `u32` at offset 8 |
//! | `LOV_USER_MAGIC_SEL` | `lov_comp_md_v1` | `u32` at offset 8 |
//! | `LOV_USER_MAGIC_FOREIGN` | `lov_foreign_md` | none, reported as `u32::MAX` |
//!
//! All fields are little-endian, as stored by Lustre.

use crate::MetaError;

/// On-disk layout formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutFormat {
    /// Plain layout.
    V1,
    /// Plain layout with a pool name.
    V3,
    /// Plain layout on an explicit list of OSTs.
    Specific,
    /// Composite layout.
    CompV1,
    /// Self-extending composite layout.
    Sel,
    /// Layout handled outside of Lustre.
    Foreign,
}

#[derive(Debug, Clone, Copy)]
enum Generation {
    U16At(usize),
    U32At(usize),
    Absent,
}

impl LayoutFormat {
    /// Every known format.
    pub const ALL: [LayoutFormat; 6] = [
        LayoutFormat::V1,
        LayoutFormat::V3,
        LayoutFormat::Specific,
        LayoutFormat::CompV1,
        LayoutFormat::Sel,
        LayoutFormat::Foreign,
    ];

    /// Magic number identifying the format.
    pub const fn magic(self) -> u32 {
        match self {
            LayoutFormat::V1 => 0x0BD1_0BD0,
            LayoutFormat::V3 => 0x0BD3_0BD0,
            LayoutFormat::Specific => 0x0BD5_0BD0,
            LayoutFormat::CompV1 => 0x0BD6_0BD0,
            LayoutFormat::Foreign => 0x0BD7_0BD0,
            LayoutFormat::Sel => 0x0BD8_0BD0,
        }
    }

    /// Name of the format, as recorded under the `magic` key.
    pub const fn name(self) -> &'static str {
        match self {
            LayoutFormat::V1 => "LOV_USER_MAGIC_V1",
            LayoutFormat::V3 => "LOV_USER_MAGIC_V3",
            LayoutFormat::Specific => "LOV_USER_MAGIC_SPECIFIC",
            LayoutFormat::CompV1 => "LOV_USER_MAGIC_COMP_V1",
            LayoutFormat::Sel => "LOV_USER_MAGIC_SEL",
            LayoutFormat::Foreign => "LOV_USER_MAGIC_FOREIGN",
        }
    }

    /// The format identified by `magic`, if known.
    pub fn from_magic(magic: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.magic() == magic)
    }

    const fn generation(self) -> Generation {
        match self {
            LayoutFormat::V1 | LayoutFormat::V3 | LayoutFormat::Specific => Generation::U16At(30),
            LayoutFormat::CompV1 | LayoutFormat::Sel => Generation::U32At(8),
            LayoutFormat::Foreign => Generation::Absent,
        }
    }
}

/// The decoded head of a `lustre.lov` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutHeader {
    /// Format of the layout.
    pub format: LayoutFormat,
    /// Layout generation, bumped on every layout change.
    pub generation: u32,
}

fn field<const N: usize>(
    raw: &[u8],
    offset: usize,
    format: LayoutFormat,
) -> Result<[u8; N], MetaError> {
    raw.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| MetaError::InvalidFormat {
            what: "layout header",
            details: format!(
                "{} truncated to {} bytes (need {})",
                format.name(),
                raw.len(),
                offset + N
            ),
        })
}

impl LayoutHeader {
    /// Decode the head of a raw `lustre.lov` attribute.
    ///
    /// # Errors
    ///
    /// - [`MetaError::InvalidFormat`] on an unknown magic or a buffer too
    ///   short for its format
    pub fn decode(raw: &[u8]) -> Result<Self, MetaError> {
        let magic = raw
            .get(..4)
            .and_then(|bytes| bytes.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or_else(|| MetaError::InvalidFormat {
                what: "layout header",
                details: format!("{} bytes, too short for a magic", raw.len()),
            })?;

        let format = LayoutFormat::from_magic(magic).ok_or_else(|| MetaError::InvalidFormat {
            what: "layout header",
            details: format!("unknown magic {magic:#010x}"),
        })?;

        let generation = match format.generation() {
            Generation::U16At(offset) => u32::from(u16::from_le_bytes(field(raw, offset, format)?)),
            Generation::U32At(offset) => u32::from_le_bytes(field(raw, offset, format)?),
            Generation::Absent => u32::MAX,
        };

        Ok(Self { format, generation })
    }
}
