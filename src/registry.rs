//! # Plugin Registry
//!
//! In-process [`PluginLoader`].
//!
//! Backends compiled into the program register themselves once at startup;
//! [`backend_from_uri`](crate::backend_from_uri) then finds them by URI
//! scheme. A loader opening shared objects can implement [`PluginLoader`]
//! itself and apply the same version check.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{BACKEND_API_VERSION, BackendPlugin, MetaError, PluginLoader};

/// Name-indexed set of backend plugins.
///
/// # Example
///
/// ```rust
/// use fsindex_backend::{Backend, BackendPlugin, MetaError, PluginLoader, PluginRegistry};
///
/// struct Nothing;
///
/// impl BackendPlugin for Nothing {
///     fn name(&self) -> &str {
///         "nothing"
///     }
///
///     fn new_backend(&self, fsname: &str) -> Result<Box<dyn Backend>, MetaError> {
///         Err(MetaError::NotFound { path: fsname.to_string() })
///     }
/// }
///
/// let mut registry = PluginRegistry::new();
/// registry.register(Nothing);
/// assert!(registry.load("nothing").is_ok());
/// assert!(registry.load("posix").is_err());
/// ```
#[derive(Default)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn BackendPlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `plugin` under its own name.
    ///
    /// Returns the plugin previously registered under that name, if any.
    pub fn register<P>(&mut self, plugin: P) -> Option<Arc<dyn BackendPlugin>>
    where
        P: BackendPlugin + 'static,
    {
        self.register_arc(Arc::new(plugin))
    }

    /// Register an already shared plugin.
    pub fn register_arc(
        &mut self,
        plugin: Arc<dyn BackendPlugin>,
    ) -> Option<Arc<dyn BackendPlugin>> {
        tracing::debug!(plugin = plugin.name(), "registering backend plugin");
        self.plugins.insert(plugin.name().to_string(), plugin)
    }

    /// Names of the registered plugins, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl PluginLoader for PluginRegistry {
    fn load(&self, name: &str) -> Result<Arc<dyn BackendPlugin>, MetaError> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| MetaError::PluginNotFound {
                name: name.to_string(),
            })?;

        let found = plugin.api_version();
        if found != BACKEND_API_VERSION {
            return Err(MetaError::PluginIncompatible {
                name: name.to_string(),
                found,
                expected: BACKEND_API_VERSION,
            });
        }

        Ok(Arc::clone(plugin))
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Backend;

    struct Stub {
        name: &'static str,
        version: u32,
    }

    impl BackendPlugin for Stub {
        fn name(&self) -> &str {
            self.name
        }

        fn api_version(&self) -> u32 {
            self.version
        }

        fn new_backend(&self, _fsname: &str) -> Result<Box<dyn Backend>, MetaError> {
            Err(MetaError::Backend("stub".into()))
        }
    }

    #[test]
    fn load_registered_plugin() {
        let mut registry = PluginRegistry::new();
        registry.register(Stub {
            name: "posix",
            version: BACKEND_API_VERSION,
        });
        let plugin = registry.load("posix").unwrap();
        assert_eq!(plugin.name(), "posix");
    }

    #[test]
    fn load_unknown_plugin() {
        let registry = PluginRegistry::new();
        let err = registry.load("posix").err().unwrap();
        assert!(matches!(err, MetaError::PluginNotFound { ref name } if name == "posix"));
    }

    #[test]
    fn load_incompatible_plugin() {
        let mut registry = PluginRegistry::new();
        registry.register(Stub {
            name: "old",
            version: BACKEND_API_VERSION + 1,
        });
        let err = registry.load("old").err().unwrap();
        assert!(matches!(err, MetaError::PluginIncompatible { .. }));
    }

    #[test]
    fn register_replaces_previous() {
        let mut registry = PluginRegistry::new();
        assert!(registry
            .register(Stub {
                name: "lustre",
                version: 1
            })
            .is_none());
        assert!(registry
            .register(Stub {
                name: "lustre",
                version: 1
            })
            .is_some());
        registry.register(Stub {
            name: "posix",
            version: 1,
        });
        assert_eq!(registry.names(), vec!["lustre", "posix"]);
    }

    #[test]
    fn registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PluginRegistry>();
    }
}
