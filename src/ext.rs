//! # Extension Traits
//!
//! Convenience methods for backends.
//!
//! [`BackendExt`] has a blanket implementation, so any [`Backend`] (boxed or
//! not) gets it for free.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`fsentry_id`](BackendExt::fsentry_id) | Identifier of the entry at a path |

use crate::{Backend, FsEntryMask, Id, MetaError};

/// Extension methods for any backend.
///
/// # Example
///
/// ```rust
/// use fsindex_backend::{Backend, BackendExt, MetaError};
///
/// fn scope_to(backend: &dyn Backend, path: &str) -> Result<Box<dyn Backend>, MetaError> {
///     let id = backend.fsentry_id(path)?;
///     backend.branch(&id)
/// }
/// ```
pub trait BackendExt: Backend {
    /// Look up only the identifier of the entry at `path`.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NoData`] if the backend returned the entry without
    ///   an identifier
    /// - any error from [`Backend::fsentry_from_path`]
    fn fsentry_id(&self, path: &str) -> Result<Id, MetaError> {
        self.fsentry_from_path(path, FsEntryMask::ID)?
            .id
            .ok_or(MetaError::NoData {
                operation: "fsentry_from_path",
            })
    }
}

impl<B: Backend + ?Sized> BackendExt for B {}
