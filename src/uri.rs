//! # Locators
//!
//! Backends and the entries they hold are addressed with URIs:
//!
//! ```text
//! <backend>://<fsname>[/<path>][#<path>|#[<id>]]
//! ```
//!
//! | Locator | Meaning |
//! |---------|---------|
//! | `lustre://scratch` | the whole `scratch` filesystem |
//! | `lustre://scratch/projects/a` | the subtree rooted at `/projects/a` |
//! | `lustre://scratch#/projects/a` | same, path given as a fragment |
//! | `lustre://scratch#[%01%02]` | the subtree rooted at id `01 02` |
//! | `lustre://scratch#[0x200000007:0x1:0x0]` | the subtree rooted at that Lustre fid |
//!
//! Parsing happens in two steps: [`RawUri::parse`] splits the string
//! following the RFC 3986 generic syntax without interpreting anything, then
//! [`Uri::from_raw`] validates and decodes the parts.

use crate::{Id, LuFid, MetaError};

/// Fragments starting with this character hold an identifier, not a path.
pub const ID_MARKER: char = '[';

fn invalid(uri: &str, reason: impl Into<String>) -> MetaError {
    MetaError::InvalidUri {
        uri: uri.to_string(),
        reason: reason.into(),
    }
}

/// Syntactic components of a URI.
///
/// No component is decoded or validated beyond what splitting needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawUri<'a> {
    /// Scheme, without the trailing `:`.
    pub scheme: &'a str,
    /// Authority, without the leading `//`, if any.
    pub authority: Option<&'a str>,
    /// Path, possibly empty.
    pub path: &'a str,
    /// Query, without the leading `?`.
    pub query: Option<&'a str>,
    /// Fragment, without the leading `#`.
    pub fragment: Option<&'a str>,
}

impl<'a> RawUri<'a> {
    /// Split `input` into its components.
    ///
    /// # Errors
    ///
    /// - [`MetaError::InvalidUri`] if `input` has no valid scheme
    pub fn parse(input: &'a str) -> Result<Self, MetaError> {
        let (scheme, rest) = input
            .split_once(':')
            .ok_or_else(|| invalid(input, "missing scheme"))?;

        let mut chars = scheme.chars();
        let valid_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
        if !valid_scheme {
            return Err(invalid(input, format!("invalid scheme '{scheme}'")));
        }

        let (rest, fragment) = match rest.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment)),
            None => (rest, None),
        };
        let (rest, query) = match rest.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (rest, None),
        };
        let (authority, path) = match rest.strip_prefix("//") {
            Some(hier) => {
                let end = hier.find('/').unwrap_or(hier.len());
                (Some(&hier[..end]), &hier[end..])
            }
            None => (None, rest),
        };

        Ok(Self {
            scheme,
            authority,
            path,
            query,
            fragment,
        })
    }
}

/// A validated locator.
///
/// Always derived from a [`RawUri`] through [`Uri::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    backend: String,
    fsname: String,
    id: Id,
    path: Option<String>,
}

impl Uri {
    /// Validate and decode `raw`.
    ///
    /// A fragment starting with [`ID_MARKER`] holds an identifier; any other
    /// fragment is a path. The path, from the fragment or from the URI
    /// itself, is kept percent-encoded.
    ///
    /// # Errors
    ///
    /// - [`MetaError::InvalidUri`] if there is no authority (missing `://`),
    ///   the filesystem name is empty, an embedded id is malformed, or a path
    ///   is given both in the URI and in the fragment
    pub fn from_raw(raw: &RawUri<'_>) -> Result<Self, MetaError> {
        let whole = raw.to_string();

        let authority = raw
            .authority
            .ok_or_else(|| invalid(&whole, "expected '<backend>://<fsname>'"))?;
        let fsname = String::from_utf8(percent_decode(authority)?)
            .map_err(|_| invalid(&whole, "filesystem name is not UTF-8"))?;
        if fsname.is_empty() {
            return Err(invalid(&whole, "empty filesystem name"));
        }

        let mut path = match raw.path {
            "" | "/" => None,
            path => Some(path.to_string()),
        };

        let mut id = Id::root_parent();
        match raw.fragment {
            None | Some("") => {}
            Some(fragment) if fragment.starts_with(ID_MARKER) => {
                id = parse_embedded_id(fragment).map_err(|e| match e {
                    MetaError::InvalidUri { reason, .. } => invalid(&whole, reason),
                    other => other,
                })?;
            }
            Some(fragment) => {
                if path.is_some() {
                    return Err(invalid(&whole, "path given both in the uri and the fragment"));
                }
                path = Some(fragment.to_string());
            }
        }

        Ok(Self {
            backend: raw.scheme.to_string(),
            fsname,
            id,
            path,
        })
    }

    /// Name of the backend plugin.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Name of the filesystem.
    pub fn fsname(&self) -> &str {
        &self.fsname
    }

    /// Embedded identifier, empty if none.
    pub fn id(&self) -> &Id {
        &self.id
    }

    /// Percent-encoded path, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl std::str::FromStr for Uri {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::from_raw(&RawUri::parse(s)?)
    }
}

impl std::fmt::Display for RawUri<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if let Some(authority) = self.authority {
            write!(f, "//{authority}")?;
        }
        f.write_str(self.path)?;
        if let Some(query) = self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

/// Decode `[<id>]`: a Lustre fid or percent-encoded raw bytes.
fn parse_embedded_id(fragment: &str) -> Result<Id, MetaError> {
    let inner = fragment
        .strip_prefix(ID_MARKER)
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| invalid(fragment, "unterminated identifier"))?;

    if inner.starts_with("0x") && inner.contains(':') {
        let fid: LuFid = inner
            .parse()
            .map_err(|_| invalid(fragment, format!("invalid lustre fid '{inner}'")))?;
        return Id::from_lu_fid(&fid);
    }

    Id::new(&percent_decode(inner)?)
}

/// Decode `%XX` escapes.
///
/// # Errors
///
/// - [`MetaError::InvalidUri`] on a truncated or non-hexadecimal escape
///
/// # Example
///
/// ```rust
/// use fsindex_backend::percent_decode;
///
/// assert_eq!(percent_decode("a%20b%2Fc")?, b"a b/c");
/// # Ok::<(), fsindex_backend::MetaError>(())
/// ```
pub fn percent_decode(input: &str) -> Result<Vec<u8>, MetaError> {
    for escape in input.split('%').skip(1) {
        let digits = escape
            .as_bytes()
            .get(..2)
            .ok_or_else(|| invalid(input, "truncated percent escape"))?;
        if !digits.iter().all(u8::is_ascii_hexdigit) {
            return Err(invalid(input, "invalid percent escape"));
        }
    }
    Ok(urlencoding::decode_binary(input.as_bytes()).into_owned())
}
