//! # fsindex-backend
//!
//! Core types for **filesystem indexing backends**: entry identifiers, typed
//! attribute extraction and URI-addressed backend handles.
//!
//! A filesystem walker visits entries and, for each one, collects metadata
//! as a list of `key → value` pairs. This crate provides the pieces that sit
//! between the walker and the filesystem:
//!
//! - an opaque, backend-defined entry [`Id`];
//! - a per-entry [`Arena`] backing the pair values;
//! - the Lustre attribute extraction pipeline ([`ns_xattrs`]), including the
//!   striped-layout decoder;
//! - the resolution of locators such as `lustre://scratch/projects` into live
//!   [`Backend`] handles ([`backend_from_uri`]).
//!
//! Scheduling the walk, persisting the records and querying them are left to
//! the caller.
//!
//! ---
//!
//! ## Quick Start
//!
//! Opening a backend from a locator:
//!
//! ```rust
//! use fsindex_backend::{backend_from_uri, Backend, BackendPlugin, MetaError, PluginRegistry};
//! # use fsindex_backend::{FsEntry, FsEntryMask, Id};
//! # struct Posix;
//! # impl Backend for Posix {
//! #     fn name(&self) -> &str { "posix" }
//! #     fn fsentry_from_path(&self, _: &str, _: FsEntryMask) -> Result<FsEntry, MetaError> {
//! #         Ok(FsEntry { id: Some(Id::new(b"root")?), ..Default::default() })
//! #     }
//! #     fn branch(&self, _: &Id) -> Result<Box<dyn Backend>, MetaError> { Ok(Box::new(Posix)) }
//! # }
//! # struct PosixPlugin;
//! # impl BackendPlugin for PosixPlugin {
//! #     fn name(&self) -> &str { "posix" }
//! #     fn new_backend(&self, _: &str) -> Result<Box<dyn Backend>, MetaError> { Ok(Box::new(Posix)) }
//! # }
//!
//! let mut registry = PluginRegistry::new();
//! registry.register(PosixPlugin);
//!
//! // Scoped to the subtree rooted at /home
//! let backend = backend_from_uri(&registry, "posix://rootfs/home")?;
//! assert_eq!(backend.name(), "posix");
//! # Ok::<(), fsindex_backend::ResolveError>(())
//! ```
//!
//! Extracting the Lustre attributes of one entry:
//!
//! ```rust,ignore
//! use fsindex_backend::{ns_xattrs, Arena, MAX_NS_XATTRS};
//!
//! let mut arena = Arena::new();
//! for (entry, stat) in walk {
//!     let mut pairs = Vec::with_capacity(MAX_NS_XATTRS);
//!     ns_xattrs(&entry, stat.st_mode, &mut pairs, &arena)?;
//!     persist(&pairs);
//!     drop(pairs);
//!     arena.reset();
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Id`], [`IdRef`] | Opaque entry identifier, owned or borrowed |
//! | [`LuFid`] | Lustre file identifier |
//! | [`Arena`] | Bump storage for the values of one entry |
//! | [`Value`], [`ValuePair`] | Typed attribute and its key |
//! | [`FsEntry`], [`FsEntryMask`] | Entry lookup result and field projection |
//! | [`Uri`], [`RawUri`] | Backend locator |
//! | [`MetaError`], [`ResolveError`] | Error types with context |
//!
//! ---
//!
//! ## Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Backend`] | Live handle on a filesystem or one of its subtrees |
//! | [`BackendPlugin`] | Opens backends by filesystem name |
//! | [`PluginLoader`] | Finds plugins by name |
//! | [`LustreEntry`] | Native Lustre queries on one entry |
//! | [`Layout`], [`LayoutComponent`] | Native access to a file layout |
//! | [`BackendExt`] | Convenience methods for any backend |
//!
//! ---
//!
//! ## Error Handling
//!
//! Operations return `Result<T, MetaError>`. Errors carry context:
//!
//! ```rust
//! use fsindex_backend::MetaError;
//!
//! let err = MetaError::OutOfBuffer { needed: 24, available: 16 };
//! assert_eq!(err.to_string(), "out of buffer: need 24 bytes, 16 available");
//! ```
//!
//! Resolution errors also name the step that failed, see [`ResolveStep`].
//!
//! ---
//!
//! ## Thread Safety
//!
//! Extraction is meant to run on one worker per scanned entry. Every worker
//! owns its [`Arena`] and pair buffer; nothing is shared between workers.
//! Backend handles are `Send`, plugins and loaders are `Send + Sync`.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Enable serialization for [`Value`], [`Id`], [`LuFid`], etc. and [`value::pairs_to_json`] |

// Private modules
mod arena;
mod error;
mod ext;
mod id;
mod registry;
mod resolver;
mod traits;
mod types;
mod uri;

// Public modules
pub mod lustre;
pub mod value;

// Public re-exports - error types
pub use error::{MetaError, ResolveError, ResolveStep};

// Public re-exports - core types
pub use arena::{Arena, DEFAULT_CHUNK_SIZE};
pub use id::{FILEID_LUSTRE, FileHandle, Id, IdRef, LU_FID_SIZE, LuFid};
pub use types::{BACKEND_API_VERSION, EntryKind, FsEntry, FsEntryMask};
pub use value::{Value, ValuePair};

// Public re-exports - backend traits
pub use traits::{Backend, BackendPlugin, PluginLoader};

// Public re-exports - Lustre native traits
pub use traits::{
    ComponentSelect, ComponentVisitor, DirStripe, HsmState, LCME_FL_INIT, Layout, LayoutComponent,
    LustreEntry, XATTR_LUSTRE_LOV,
};

// Public re-exports - extraction
pub use lustre::{ExtractContext, MAX_NS_XATTRS, ns_xattrs};

// Public re-exports - resolution
pub use registry::PluginRegistry;
pub use resolver::{backend_from_parsed, backend_from_uri};
pub use uri::{ID_MARKER, RawUri, Uri, percent_decode};

// Public re-exports - infrastructure
pub use ext::BackendExt;
