//! Typed attribute values.
//!
//! Every attribute extracted from an fsentry is a [`ValuePair`]: a key and a
//! [`Value`]. String and binary payloads borrow their bytes from the
//! [`Arena`](crate::Arena) that backs the extraction; sequences own their
//! elements.

/// A typed attribute value.
///
/// Sequences are homogeneous by convention, not by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Value<'a> {
    /// Signed 32-bit integer.
    Int32(i32),
    /// Unsigned 32-bit integer.
    Uint32(u32),
    /// Unsigned 64-bit integer.
    Uint64(u64),
    /// Size-prefixed string.
    String(&'a str),
    /// Opaque bytes.
    Binary(&'a [u8]),
    /// Ordered list of values.
    Sequence(Vec<Value<'a>>),
}

impl<'a> Value<'a> {
    /// The binary payload, if this is a [`Value::Binary`].
    #[inline]
    pub fn as_binary(&self) -> Option<&'a [u8]> {
        match self {
            Value::Binary(data) => Some(data),
            _ => None,
        }
    }

    /// The elements, if this is a [`Value::Sequence`].
    #[inline]
    pub fn as_sequence(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::Sequence(values) => Some(values),
            _ => None,
        }
    }

    /// The integer, if this is a [`Value::Uint64`].
    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint64(integer) => Some(*integer),
            _ => None,
        }
    }
}

/// A key/value attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValuePair<'a> {
    /// Attribute name.
    pub key: &'a str,
    /// Attribute value.
    pub value: Value<'a>,
}

impl<'a> ValuePair<'a> {
    /// Create a pair.
    #[inline]
    pub fn new(key: &'a str, value: Value<'a>) -> Self {
        Self { key, value }
    }
}

/// Find the value stored under `key`.
pub fn find<'p, 'a>(pairs: &'p [ValuePair<'a>], key: &str) -> Option<&'p Value<'a>> {
    pairs
        .iter()
        .find(|pair| pair.key == key)
        .map(|pair| &pair.value)
}

/// Render pairs as a JSON object, for callers persisting records.
///
/// Later pairs win when a key repeats.
#[cfg(feature = "serde")]
pub fn pairs_to_json(pairs: &[ValuePair<'_>]) -> Result<serde_json::Value, crate::MetaError> {
    let mut object = serde_json::Map::with_capacity(pairs.len());
    for pair in pairs {
        let value = serde_json::to_value(&pair.value)
            .map_err(|e| crate::MetaError::Backend(format!("json: {e}")))?;
        object.insert(pair.key.to_string(), value);
    }
    Ok(serde_json::Value::Object(object))
}
