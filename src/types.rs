//! Core types shared by backends and the extraction pipeline.

use crate::Id;

/// Version of the backend plugin API implemented by this crate.
///
/// [`PluginRegistry`](crate::PluginRegistry) refuses plugins advertising any
/// other version.
pub const BACKEND_API_VERSION: u32 = 1;

const S_IFMT: u32 = 0o170000;
const S_IFDIR: u32 = 0o040000;
const S_IFREG: u32 = 0o100000;
const S_IFLNK: u32 = 0o120000;

/// Type of a scanned entry, derived once from its mode.
///
/// At most one flag is set; other file types (fifos, sockets, devices) have
/// none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryKind {
    /// Directory.
    pub is_dir: bool,
    /// Regular file.
    pub is_reg: bool,
    /// Symbolic link.
    pub is_symlink: bool,
}

impl EntryKind {
    /// Classify a `st_mode` / `stx_mode` value.
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        let format = mode & S_IFMT;
        Self {
            is_dir: format == S_IFDIR,
            is_reg: format == S_IFREG,
            is_symlink: format == S_IFLNK,
        }
    }
}

/// Projection of the fields a backend should fill in an [`FsEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FsEntryMask(u32);

impl FsEntryMask {
    /// The entry's identifier.
    pub const ID: Self = Self(0x1);
    /// The parent's identifier.
    pub const PARENT_ID: Self = Self(0x2);
    /// The entry's name.
    pub const NAME: Self = Self(0x4);
    /// Every field.
    pub const ALL: Self = Self(0x7);

    /// Raw bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Returns `true` if every field of `other` is requested.
    #[inline]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two projections.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// An entry as returned by a backend lookup.
///
/// Fields not requested, or that the backend could not fill, are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FsEntry {
    /// Identifier of the entry.
    pub id: Option<Id>,
    /// Identifier of the parent entry.
    pub parent_id: Option<Id>,
    /// Name of the entry in its parent.
    pub name: Option<String>,
}
