//! Backend handles.
//!
//! A [`Backend`] is a live handle on one filesystem (or on one subtree of
//! it, see [`Backend::branch`]). Dropping the handle destroys it.
//!
//! # Example
//!
//! ```rust
//! use fsindex_backend::{Backend, FsEntryMask, MetaError};
//!
//! // Generic function that scopes any backend to one of its directories
//! fn scope_to(backend: &dyn Backend, path: &str) -> Result<Box<dyn Backend>, MetaError> {
//!     let entry = backend.fsentry_from_path(path, FsEntryMask::ID)?;
//!     let id = entry.id.ok_or(MetaError::NoData { operation: "fsentry_from_path" })?;
//!     backend.branch(&id)
//! }
//! ```

use crate::{FsEntry, FsEntryMask, Id, MetaError};

/// A live handle on a storage backend.
///
/// # Thread Safety
///
/// Handles are `Send` so a resolved backend can be moved to the thread that
/// drives the scan. They are not required to be `Sync`.
///
/// # Object Safety
///
/// This trait is object-safe; plugins hand out `Box<dyn Backend>`.
pub trait Backend: Send {
    /// Name of the backend (usually the plugin name).
    fn name(&self) -> &str;

    /// Look up the entry at `path`, filling only the fields in `mask`.
    ///
    /// `path` is interpreted relative to the root of this handle.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NotFound`] if nothing lives at `path`
    /// - [`MetaError::NativeQuery`] if the underlying lookup failed
    fn fsentry_from_path(&self, path: &str, mask: FsEntryMask) -> Result<FsEntry, MetaError>;

    /// Create a new handle scoped to the subtree rooted at `id`.
    ///
    /// The returned branch is independent from `self`: dropping `self`
    /// afterwards must not invalidate it.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NotFound`] if `id` does not exist
    /// - [`MetaError::Backend`] if the backend cannot branch
    fn branch(&self, id: &Id) -> Result<Box<dyn Backend>, MetaError>;
}
