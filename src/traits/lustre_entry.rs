//! Native metadata queries on one open Lustre entry.
//!
//! A [`LustreEntry`] wraps whatever the directory walker opened (typically a
//! file descriptor) and exposes the `liblustreapi` / ioctl queries the
//! extraction pipeline needs. Every call is synchronous and may block on a
//! round trip to a metadata server.

use crate::{Layout, LuFid, MetaError};

/// Name of the extended attribute holding the raw layout.
pub const XATTR_LUSTRE_LOV: &str = "lustre.lov";

/// HSM state of a regular file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HsmState {
    /// `HS_*` state flags.
    pub states: u32,
    /// Archive the file belongs to.
    pub archive_id: u32,
}

/// Striping of a directory across metadata targets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirStripe {
    /// Hash function distributing entries over the shards.
    pub hash_type: u32,
    /// MDT index of each shard, in stripe order.
    pub mdt_indices: Vec<u32>,
}

/// Native queries on one open entry.
pub trait LustreEntry {
    /// The entry's fid.
    fn fid(&self) -> Result<LuFid, MetaError>;

    /// HSM state. Only meaningful for regular files.
    fn hsm_state(&self) -> Result<HsmState, MetaError>;

    /// The entry's layout.
    fn layout(&self) -> Result<Box<dyn Layout + '_>, MetaError>;

    /// Raw value of extended attribute `name`.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NoData`] if the attribute does not exist
    fn get_xattr(&self, name: &str) -> Result<Vec<u8>, MetaError>;

    /// Directory striping.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NoData`] if the directory is not striped
    fn dir_stripe(&self) -> Result<DirStripe, MetaError>;

    /// Index of the MDT holding the entry's inode.
    fn mdt_index(&self) -> Result<i32, MetaError>;
}
