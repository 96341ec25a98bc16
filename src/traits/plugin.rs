//! Backend plugins and plugin loaders.

use std::sync::Arc;

use crate::{BACKEND_API_VERSION, Backend, MetaError};

/// A backend implementation, able to open filesystems by name.
pub trait BackendPlugin: Send + Sync {
    /// Name under which the plugin is loaded (the URI scheme).
    fn name(&self) -> &str;

    /// Backend API version the plugin was written against.
    fn api_version(&self) -> u32 {
        BACKEND_API_VERSION
    }

    /// Open the filesystem called `fsname`.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NotFound`] if `fsname` does not exist
    /// - [`MetaError::Backend`] for any other instantiation failure
    fn new_backend(&self, fsname: &str) -> Result<Box<dyn Backend>, MetaError>;
}

/// Something that can find a [`BackendPlugin`] by name.
pub trait PluginLoader: Send + Sync {
    /// Load the plugin called `name`.
    ///
    /// # Errors
    ///
    /// - [`MetaError::PluginNotFound`] if no such plugin exists
    /// - [`MetaError::PluginIncompatible`] if the plugin's API version differs
    fn load(&self, name: &str) -> Result<Arc<dyn BackendPlugin>, MetaError>;
}
