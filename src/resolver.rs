//! # URI resolution
//!
//! [`backend_from_uri`] turns a locator into a live backend handle:
//!
//! ```text
//! parse ──► load plugin ──► instantiate ──► resolve path ──► branch
//!                                      └──────── id ───────────┘
//! ```
//!
//! Every failure is fatal and reported as a [`ResolveError`] naming the step
//! that failed. No handle survives a failed resolution: the unscoped handle
//! is dropped on every exit path once a branch was derived from it.

use tracing::debug;

use crate::{
    Backend, BackendExt, Id, MetaError, PluginLoader, RawUri, ResolveError, ResolveStep, Uri,
    percent_decode,
};

/// Open the backend addressed by `locator`.
///
/// | Locator | Result |
/// |---------|--------|
/// | `<backend>://<fsname>` | the whole filesystem |
/// | `<backend>://<fsname>/<path>` or `#<path>` | a branch rooted at `<path>` |
/// | `<backend>://<fsname>#[<id>]` | a branch rooted at `<id>` |
///
/// # Errors
///
/// A [`ResolveError`] whose [`step`](ResolveError::step) is:
///
/// - [`Parse`](ResolveStep::Parse) for a malformed locator
/// - [`Load`](ResolveStep::Load) if no compatible plugin is found
/// - [`Instantiate`](ResolveStep::Instantiate) if the plugin cannot open the
///   filesystem
/// - [`Resolve`](ResolveStep::Resolve) if the path does not lead to an
///   identifier
/// - [`Branch`](ResolveStep::Branch) if the backend cannot branch
///
/// # Example
///
/// ```rust
/// use fsindex_backend::{backend_from_uri, PluginRegistry, ResolveStep};
///
/// let registry = PluginRegistry::new();
/// let err = backend_from_uri(&registry, "posix://home").err().unwrap();
/// assert_eq!(err.step, ResolveStep::Load);
/// ```
pub fn backend_from_uri(
    loader: &dyn PluginLoader,
    locator: &str,
) -> Result<Box<dyn Backend>, ResolveError> {
    let uri = RawUri::parse(locator)
        .and_then(|raw| Uri::from_raw(&raw))
        .map_err(ResolveError::at(ResolveStep::Parse))?;
    debug!(
        backend = uri.backend(),
        fsname = uri.fsname(),
        id = %uri.id(),
        path = uri.path(),
        "parsed locator"
    );

    backend_from_parsed(loader, &uri)
}

/// Open the backend addressed by an already parsed `uri`.
///
/// See [`backend_from_uri`].
pub fn backend_from_parsed(
    loader: &dyn PluginLoader,
    uri: &Uri,
) -> Result<Box<dyn Backend>, ResolveError> {
    let plugin = loader
        .load(uri.backend())
        .map_err(ResolveError::at(ResolveStep::Load))?;
    debug!(plugin = plugin.name(), "loaded backend plugin");

    let backend = plugin
        .new_backend(uri.fsname())
        .map_err(ResolveError::at(ResolveStep::Instantiate))?;
    debug!(backend = backend.name(), fsname = uri.fsname(), "instantiated backend");

    if let Some(path) = uri.path() {
        let id = resolve_path(backend.as_ref(), path)
            .map_err(ResolveError::at(ResolveStep::Resolve))?;
        debug!(path, %id, "resolved locator path");
        return branch(backend, &id);
    }

    if !uri.id().is_empty() {
        return branch(backend, uri.id());
    }

    Ok(backend)
}

fn resolve_path(backend: &dyn Backend, path: &str) -> Result<Id, MetaError> {
    let decoded = String::from_utf8(percent_decode(path)?).map_err(|_| MetaError::InvalidUri {
        uri: path.to_string(),
        reason: "path is not UTF-8".into(),
    })?;
    backend.fsentry_id(&decoded)
}

/// Branch `backend` on `id`, consuming the unscoped handle either way.
fn branch(backend: Box<dyn Backend>, id: &Id) -> Result<Box<dyn Backend>, ResolveError> {
    let branched = backend.branch(id);
    drop(backend);

    let branched = branched.map_err(ResolveError::at(ResolveStep::Branch))?;
    debug!(%id, "branched backend");
    Ok(branched)
}
