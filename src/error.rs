//! Error types for identifier handling, attribute extraction and URI resolution.

use std::fmt;

/// `ENODATA` as reported by Linux (no such attribute / no data available).
const ENODATA: i32 = 61;

/// Error type shared by every fallible operation of the crate.
///
/// Variants carry enough context (operation name, sizes, offending input) to
/// tell which native query or which decoding step failed. Uses
/// `#[non_exhaustive]` for forward compatibility.
///
/// # Examples
///
/// ```rust
/// use fsindex_backend::MetaError;
///
/// let err = MetaError::OutOfBuffer { needed: 16, available: 4 };
/// assert_eq!(err.to_string(), "out of buffer: need 16 bytes, 4 available");
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    // Resource errors
    /// An allocation could not be satisfied.
    #[error("{operation}: out of memory")]
    OutOfMemory {
        /// The operation that needed memory.
        operation: &'static str,
    },

    /// A caller-supplied buffer is too small.
    #[error("out of buffer: need {needed} bytes, {available} available")]
    OutOfBuffer {
        /// Number of bytes the copy requires.
        needed: usize,
        /// Number of bytes left in the buffer.
        available: usize,
    },

    // Data errors
    /// Raw metadata has an unrecognized discriminator or an impossible shape.
    #[error("invalid {what}: {details}")]
    InvalidFormat {
        /// What was being decoded.
        what: &'static str,
        /// Details about the problem.
        details: String,
    },

    /// The queried source holds no data. Callers decide whether that matters.
    #[error("{operation}: no data available")]
    NoData {
        /// The query that found nothing.
        operation: &'static str,
    },

    /// A native metadata call failed.
    #[error("{operation} failed: {source}")]
    NativeQuery {
        /// The native call that failed.
        operation: &'static str,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Path does not exist in the backend.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    // Addressing errors
    /// A locator string is not a valid URI.
    #[error("invalid uri '{uri}': {reason}")]
    InvalidUri {
        /// The offending locator.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No backend plugin is registered under that name.
    #[error("backend plugin not found: {name}")]
    PluginNotFound {
        /// The requested backend name.
        name: String,
    },

    /// The plugin was built against another backend API version.
    #[error("backend plugin {name}: api version {found}, expected {expected}")]
    PluginIncompatible {
        /// The plugin name.
        name: String,
        /// API version the plugin advertises.
        found: u32,
        /// API version this crate implements.
        expected: u32,
    },

    /// Generic backend error.
    #[error("backend error: {0}")]
    Backend(String),
}

impl MetaError {
    /// Returns `true` for [`MetaError::NoData`].
    #[inline]
    pub fn is_no_data(&self) -> bool {
        matches!(self, MetaError::NoData { .. })
    }
}

impl From<std::io::Error> for MetaError {
    fn from(error: std::io::Error) -> Self {
        if error.raw_os_error() == Some(ENODATA) {
            return MetaError::NoData { operation: "io" };
        }
        match error.kind() {
            std::io::ErrorKind::OutOfMemory => MetaError::OutOfMemory { operation: "io" },
            std::io::ErrorKind::NotFound => MetaError::NotFound {
                path: String::new(),
            },
            _ => MetaError::NativeQuery {
                operation: "io",
                source: error,
            },
        }
    }
}

/// Step of [`backend_from_uri`](crate::backend_from_uri) that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveStep {
    /// Syntactic or semantic parsing of the locator.
    Parse,
    /// Loading the backend plugin.
    Load,
    /// Instantiating a backend for the filesystem name.
    Instantiate,
    /// Resolving the locator path to an identifier.
    Resolve,
    /// Branching the backend on an identifier.
    Branch,
}

impl fmt::Display for ResolveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            ResolveStep::Parse => "parse",
            ResolveStep::Load => "load",
            ResolveStep::Instantiate => "instantiate",
            ResolveStep::Resolve => "resolve",
            ResolveStep::Branch => "branch",
        };
        f.write_str(step)
    }
}

/// A failed URI resolution: which step failed and why.
#[derive(Debug, thiserror::Error)]
#[error("{step}: {source}")]
pub struct ResolveError {
    /// The step that failed.
    pub step: ResolveStep,
    /// The underlying error.
    #[source]
    pub source: MetaError,
}

impl ResolveError {
    pub(crate) fn at(step: ResolveStep) -> impl FnOnce(MetaError) -> Self {
        move |source| ResolveError { step, source }
    }
}
