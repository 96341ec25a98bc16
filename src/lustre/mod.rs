//! # Lustre attribute extraction
//!
//! Turns the Lustre-specific metadata of one scanned entry into
//! [`ValuePair`]s.
//!
//! ## Producers
//!
//! [`ns_xattrs`] runs a fixed list of producers, in order:
//!
//! | Producer | Entries | Keys |
//! |----------|---------|------|
//! | fid | all | `fid` |
//! | hsm | regular files | `hsm_state`, `hsm_archive_id` |
//! | layout | all but symlinks | `flags`, `magic`, `gen`, `mirror_count`, `stripe_count`, `stripe_size`, `pattern`, `comp_flags`, `pool`, `mirror_id`, `begin`, `end`, `ost` |
//! | mdt | all but symlinks | `mdt_idx`, `mdt_hash`, `mdt_count` (directories) or `mdt_index` |
//!
//! then normalizes the retention attribute (see [`retention`]).
//!
//! ## Failure policy
//!
//! A failing producer aborts the whole entry: the pair buffer is truncated
//! back to what it held before the call and the error is returned. The only
//! tolerated failure is an unstriped directory, which simply yields no `mdt_*`
//! pair.

pub mod header;
pub mod layout;
pub mod retention;

use tracing::debug;

use crate::{Arena, EntryKind, LustreEntry, MetaError, Value, ValuePair};

/// Upper bound on the number of pairs [`ns_xattrs`] appends for one entry.
pub const MAX_NS_XATTRS: usize = 19;

/// Per-entry state handed to every producer.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    /// Type of the entry being scanned.
    pub kind: EntryKind,
    /// Arena backing string and binary values.
    pub arena: &'a Arena,
}

impl<'a> ExtractContext<'a> {
    /// Create a context for an entry of type `kind`.
    pub fn new(kind: EntryKind, arena: &'a Arena) -> Self {
        Self { kind, arena }
    }

    /// A binary value holding a copy of `data`.
    pub fn binary(&self, data: &[u8]) -> Result<Value<'a>, MetaError> {
        Ok(Value::Binary(self.arena.push(data)?))
    }

    /// A string value holding a copy of `s`.
    pub fn string(&self, s: &str) -> Result<Value<'a>, MetaError> {
        Ok(Value::String(self.arena.push_str(s)?))
    }
}

/// A producer appends pairs and returns how many it appended.
type Producer = for<'a> fn(
    &dyn LustreEntry,
    &ExtractContext<'a>,
    &mut Vec<ValuePair<'a>>,
) -> Result<usize, MetaError>;

const PRODUCERS: [(&str, Producer); 4] = [
    ("fid", fid_pairs),
    ("hsm", hsm_pairs),
    ("layout", layout::layout_pairs),
    ("mdt", mdt_pairs),
];

/// Extract the Lustre attributes of one entry.
///
/// `mode` is the entry's `st_mode`. Pairs are appended to `pairs`; pairs
/// already in the buffer (the inode's extended attributes, as collected by the
/// directory walker) are left in place, except for the retention attribute
/// which is normalized in place.
///
/// Returns the number of pairs appended.
///
/// # Errors
///
/// Any error from a native query, except [`MetaError::NoData`] on directory
/// striping. On error `pairs` holds exactly what it held before the call.
///
/// # Example
///
/// ```rust,ignore
/// let arena = Arena::new();
/// let mut pairs = Vec::with_capacity(MAX_NS_XATTRS);
/// let count = ns_xattrs(&entry, stat.st_mode, &mut pairs, &arena)?;
/// persist(&pairs);
/// ```
pub fn ns_xattrs<'a>(
    entry: &dyn LustreEntry,
    mode: u32,
    pairs: &mut Vec<ValuePair<'a>>,
    arena: &'a Arena,
) -> Result<usize, MetaError> {
    let ctx = ExtractContext::new(EntryKind::from_mode(mode), arena);
    let start = pairs.len();

    pairs
        .try_reserve(MAX_NS_XATTRS)
        .map_err(|_| MetaError::OutOfMemory {
            operation: "ns_xattrs",
        })?;

    for (name, producer) in PRODUCERS {
        match producer(entry, &ctx, pairs) {
            Ok(count) => debug!(producer = name, count, "collected lustre attributes"),
            Err(e) => {
                debug!(producer = name, error = %e, "lustre attribute extraction failed");
                pairs.truncate(start);
                return Err(e);
            }
        }
    }

    retention::normalize(pairs);

    Ok(pairs.len() - start)
}

fn fid_pairs<'a>(
    entry: &dyn LustreEntry,
    ctx: &ExtractContext<'a>,
    pairs: &mut Vec<ValuePair<'a>>,
) -> Result<usize, MetaError> {
    let fid = entry.fid()?;
    pairs.push(ValuePair::new("fid", ctx.binary(&fid.to_ne_bytes())?));
    Ok(1)
}

fn hsm_pairs<'a>(
    entry: &dyn LustreEntry,
    ctx: &ExtractContext<'a>,
    pairs: &mut Vec<ValuePair<'a>>,
) -> Result<usize, MetaError> {
    if !ctx.kind.is_reg {
        return Ok(0);
    }

    let hsm = entry.hsm_state()?;
    pairs.push(ValuePair::new("hsm_state", Value::Uint32(hsm.states)));
    pairs.push(ValuePair::new("hsm_archive_id", Value::Uint32(hsm.archive_id)));
    Ok(2)
}

fn mdt_pairs<'a>(
    entry: &dyn LustreEntry,
    ctx: &ExtractContext<'a>,
    pairs: &mut Vec<ValuePair<'a>>,
) -> Result<usize, MetaError> {
    if ctx.kind.is_dir {
        let stripe = match entry.dir_stripe() {
            Ok(stripe) => stripe,
            Err(e) if e.is_no_data() => return Ok(0),
            Err(e) => return Err(e),
        };

        let count = u32::try_from(stripe.mdt_indices.len()).map_err(|_| {
            MetaError::InvalidFormat {
                what: "directory striping",
                details: format!("{} shards", stripe.mdt_indices.len()),
            }
        })?;
        let mdt_idx = stripe
            .mdt_indices
            .iter()
            .map(|&mdt| Value::Uint32(mdt))
            .collect();

        pairs.push(ValuePair::new("mdt_idx", Value::Sequence(mdt_idx)));
        pairs.push(ValuePair::new("mdt_hash", Value::Uint32(stripe.hash_type)));
        pairs.push(ValuePair::new("mdt_count", Value::Uint32(count)));
        Ok(3)
    } else if !ctx.kind.is_symlink {
        let mdt = entry.mdt_index()?;
        pairs.push(ValuePair::new("mdt_index", Value::Int32(mdt)));
        Ok(1)
    } else {
        Ok(0)
    }
}
