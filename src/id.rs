//! Entry identifiers.
//!
//! An [`Id`] uniquely identifies an fsentry of a filesystem for the whole
//! life of that filesystem. Its content is opaque: most backends build it
//! from a kernel file handle (see `name_to_handle_at(2)`) or from a Lustre
//! fid, and only ever compare it byte for byte.
//!
//! By convention an empty `Id` stands for the parent of a filesystem root,
//! something that does not exist.
//!
//! # Example
//!
//! ```rust
//! use fsindex_backend::{Id, LuFid};
//!
//! let fid: LuFid = "[0x200000007:0x1:0x0]".parse()?;
//! let id = Id::from_lu_fid(&fid)?;
//!
//! // Serialize several ids back to back into one caller-managed buffer
//! let mut storage = [0u8; 128];
//! let mut cursor = &mut storage[..];
//! let copy = id.copy_into(&mut cursor)?;
//! assert_eq!(copy, id);
//! assert_eq!(cursor.len(), 128 - id.len());
//! # Ok::<(), fsindex_backend::MetaError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use crate::MetaError;

/// `handle_type` of file handles exported by Lustre.
pub const FILEID_LUSTRE: i32 = 0x97;

/// Size in bytes of a [`LuFid`] in its native representation.
pub const LU_FID_SIZE: usize = 16;

/// A unique, owned identifier for an fsentry.
///
/// Two ids are equal if and only if their bytes are equal. An `Id` always
/// owns a private copy of its bytes and never aliases the buffer or native
/// handle it was built from.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Id {
    data: Box<[u8]>,
}

impl Id {
    /// Create an id holding a copy of `data`.
    ///
    /// # Errors
    ///
    /// - [`MetaError::OutOfMemory`] if the copy cannot be allocated
    pub fn new(data: &[u8]) -> Result<Self, MetaError> {
        let mut owned = Vec::new();
        owned
            .try_reserve_exact(data.len())
            .map_err(|_| MetaError::OutOfMemory { operation: "id" })?;
        owned.extend_from_slice(data);
        Ok(Self {
            data: owned.into_boxed_slice(),
        })
    }

    /// The id of a filesystem root's parent (empty).
    #[inline]
    pub fn root_parent() -> Self {
        Self::default()
    }

    /// Build an id from a native file handle.
    ///
    /// The id holds the native-endian `handle_type` followed by the handle
    /// bytes; it shares no memory with `handle`.
    pub fn from_file_handle(handle: &FileHandle) -> Result<Self, MetaError> {
        let type_bytes = handle.handle_type.to_ne_bytes();
        let mut data = Vec::new();
        data.try_reserve_exact(type_bytes.len() + handle.bytes.len())
            .map_err(|_| MetaError::OutOfMemory { operation: "id" })?;
        data.extend_from_slice(&type_bytes);
        data.extend_from_slice(&handle.bytes);
        Ok(Self {
            data: data.into_boxed_slice(),
        })
    }

    /// Build an id from a Lustre fid.
    ///
    /// The fid is wrapped in the file handle Lustre itself would export for
    /// it: type [`FILEID_LUSTRE`], the fid, then a zeroed parent fid. Ids built
    /// this way match those built from `name_to_handle_at(2)` on a Lustre
    /// client.
    pub fn from_lu_fid(fid: &LuFid) -> Result<Self, MetaError> {
        let mut bytes = Vec::with_capacity(2 * LU_FID_SIZE);
        bytes.extend_from_slice(&fid.to_ne_bytes());
        bytes.extend_from_slice(&[0u8; LU_FID_SIZE]);

        Self::from_file_handle(&FileHandle {
            handle_type: FILEID_LUSTRE,
            bytes,
        })
    }

    /// The raw bytes of the id.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes in the id.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for the root-parent sentinel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Borrow this id.
    #[inline]
    pub fn as_id_ref(&self) -> IdRef<'_> {
        IdRef { data: &self.data }
    }

    /// Copy this id to the front of `buffer`, then advance `buffer` past it.
    ///
    /// This is a bump allocator over a caller-managed region: many ids can be
    /// serialized contiguously without any heap allocation. The returned
    /// [`IdRef`] points into the consumed part of the buffer.
    ///
    /// # Errors
    ///
    /// - [`MetaError::OutOfBuffer`] if fewer than [`len`](Self::len) bytes
    ///   remain; `buffer` is left untouched
    pub fn copy_into<'b>(&self, buffer: &mut &'b mut [u8]) -> Result<IdRef<'b>, MetaError> {
        self.as_id_ref().copy_into(buffer)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", hex::encode(&self.data))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.data))
    }
}

impl PartialEq<IdRef<'_>> for Id {
    fn eq(&self, other: &IdRef<'_>) -> bool {
        *self.data == *other.data
    }
}

/// A borrowed identifier, typically pointing into a serialization buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdRef<'a> {
    data: &'a [u8],
}

impl<'a> IdRef<'a> {
    /// Borrow raw bytes as an id.
    #[inline]
    pub const fn from_bytes(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// The raw bytes of the id.
    #[inline]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Number of bytes in the id.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for the root-parent sentinel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Copy into a new owned [`Id`].
    pub fn to_owned_id(&self) -> Result<Id, MetaError> {
        Id::new(self.data)
    }

    /// See [`Id::copy_into`].
    pub fn copy_into<'b>(&self, buffer: &mut &'b mut [u8]) -> Result<IdRef<'b>, MetaError> {
        let available = buffer.len();
        if available < self.data.len() {
            return Err(MetaError::OutOfBuffer {
                needed: self.data.len(),
                available,
            });
        }

        let (head, tail) = std::mem::take(buffer).split_at_mut(self.data.len());
        head.copy_from_slice(self.data);
        *buffer = tail;
        Ok(IdRef { data: head })
    }
}

impl PartialEq<Id> for IdRef<'_> {
    fn eq(&self, other: &Id) -> bool {
        *self.data == *other.data
    }
}

/// A native file handle, as returned by `name_to_handle_at(2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHandle {
    /// Filesystem-specific handle type.
    pub handle_type: i32,
    /// Opaque handle bytes.
    pub bytes: Vec<u8>,
}

/// A Lustre file identifier.
///
/// Displays and parses in the usual `[0xSEQ:0xOID:0xVER]` form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LuFid {
    /// Sequence number.
    pub seq: u64,
    /// Object id within the sequence.
    pub oid: u32,
    /// Version.
    pub ver: u32,
}

impl LuFid {
    /// Native in-memory representation (`struct lu_fid`).
    pub fn to_ne_bytes(&self) -> [u8; LU_FID_SIZE] {
        let mut bytes = [0u8; LU_FID_SIZE];
        bytes[0..8].copy_from_slice(&self.seq.to_ne_bytes());
        bytes[8..12].copy_from_slice(&self.oid.to_ne_bytes());
        bytes[12..16].copy_from_slice(&self.ver.to_ne_bytes());
        bytes
    }
}

impl fmt::Display for LuFid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}:{:#x}:{:#x}]", self.seq, self.oid, self.ver)
    }
}

impl FromStr for LuFid {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MetaError::InvalidFormat {
            what: "lustre fid",
            details: s.to_string(),
        };

        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        let mut fields = inner.split(':');
        let mut next_hex = || -> Result<u64, MetaError> {
            let field = fields.next().ok_or_else(invalid)?;
            let digits = field
                .strip_prefix("0x")
                .or_else(|| field.strip_prefix("0X"))
                .ok_or_else(invalid)?;
            u64::from_str_radix(digits, 16).map_err(|_| invalid())
        };

        let seq = next_hex()?;
        let oid = u32::try_from(next_hex()?).map_err(|_| invalid())?;
        let ver = u32::try_from(next_hex()?).map_err(|_| invalid())?;
        if fields.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { seq, oid, ver })
    }
}
