//! # Traits
//!
//! The seams between this crate and the code around it.
//!
//! | Trait | Implemented by | Used for |
//! |-------|----------------|----------|
//! | [`Backend`] | backend plugins | path lookups and branching |
//! | [`BackendPlugin`] | backend plugins | opening a filesystem by name |
//! | [`PluginLoader`] | [`PluginRegistry`](crate::PluginRegistry), dynamic loaders | finding a plugin by name |
//! | [`LustreEntry`] | native bindings | per-entry metadata queries |
//! | [`Layout`], [`LayoutComponent`] | native bindings | reading a file layout |
//! | [`ComponentVisitor`] | the layout decoder | receiving layout components |
//!
//! ## Thread Safety
//!
//! Plugins and loaders are `Send + Sync`: one registry is shared by every
//! resolver. Backends are only `Send`. The native traits carry no bound at
//! all: each scanning worker queries its own entries.

mod backend;
mod layout;
mod lustre_entry;
mod plugin;

pub use backend::Backend;
pub use layout::{ComponentSelect, ComponentVisitor, LCME_FL_INIT, Layout, LayoutComponent};
pub use lustre_entry::{DirStripe, HsmState, LustreEntry, XATTR_LUSTRE_LOV};
pub use plugin::{BackendPlugin, PluginLoader};
