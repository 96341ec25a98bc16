//! Striped-layout decoder.
//!
//! A Lustre layout is a list of components, each covering an extent of the
//! file and striped over a set of OSTs. Composite layouts may hold several
//! mirrors of the same extents and may declare components that are not yet
//! instantiated (bound to OSTs).
//!
//! The decoder collects per-component attributes into parallel sequences,
//! one slot per component, and the OSTs of every component into a single
//! `ost` sequence:
//!
//! ```text
//! stripe_count: [ 1,        4,                        4 ]
//! comp_flags:   [ INIT,     INIT,                     0 ]
//! ost:          [ 3,        0, 1, 2, 5,               u64::MAX ]
//!                 comp 0    comp 1                    comp 2 (not instantiated)
//! ```

use tracing::trace;

use super::ExtractContext;
use super::header::LayoutHeader;
use crate::{
    Arena, ComponentSelect, ComponentVisitor, LCME_FL_INIT, Layout, LayoutComponent, LustreEntry,
    MetaError, Value, ValuePair, XATTR_LUSTRE_LOV,
};

/// OST placeholder recorded for a component that is not instantiated.
pub const OST_NOT_INSTANTIATED: u64 = u64::MAX;

/// Largest number of OSTs a single component can be striped over.
///
/// Caps the room reserved up front for one component; stripe counts above
/// it (such as the `LLAPI_LAYOUT_*` sentinels) only grow the list as OSTs are
/// actually reported.
pub const LOV_MAX_STRIPE_COUNT: u64 = 2000;

fn out_of_memory() -> MetaError {
    MetaError::OutOfMemory {
        operation: "layout",
    }
}

/// Growable list of OST indices with explicit capacity tracking.
///
/// Capacity grows to `capacity + required` whenever `required` more entries
/// would not fit; the logical length never exceeds the capacity and growth
/// never disturbs entries already appended.
#[derive(Debug)]
pub struct PlacementTargets<'a> {
    values: Vec<Value<'a>>,
    capacity: usize,
}

impl<'a> PlacementTargets<'a> {
    /// Create an empty list able to hold `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Result<Self, MetaError> {
        let mut values = Vec::new();
        values
            .try_reserve_exact(capacity)
            .map_err(|_| out_of_memory())?;
        Ok(Self { values, capacity })
    }

    /// Make room for `required` more entries.
    pub fn reserve(&mut self, required: usize) -> Result<(), MetaError> {
        let needed = self
            .values
            .len()
            .checked_add(required)
            .ok_or_else(out_of_memory)?;
        if needed <= self.capacity {
            return Ok(());
        }

        let capacity = self
            .capacity
            .checked_add(required)
            .ok_or_else(out_of_memory)?;
        self.values
            .try_reserve_exact(capacity - self.values.len())
            .map_err(|_| out_of_memory())?;
        self.capacity = capacity;
        Ok(())
    }

    /// Append one OST index. Room must have been made with [`reserve`](Self::reserve).
    pub fn push(&mut self, ost: u64) {
        debug_assert!(self.values.len() < self.capacity);
        self.values.push(Value::Uint64(ost));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no entry was appended.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of entries that fit without growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The entries, in order.
    pub fn as_slice(&self) -> &[Value<'a>] {
        &self.values
    }

    fn into_values(self) -> Vec<Value<'a>> {
        self.values
    }
}

/// Working state of the layout decoder.
///
/// Feed it components with [`accumulate`](Self::accumulate) (plain layouts)
/// or by passing it to [`Layout::iterate_components`] as a visitor (composite
/// layouts), then turn it into pairs with [`into_pairs`](Self::into_pairs).
#[derive(Debug)]
pub struct ComponentAccumulator<'a> {
    arena: &'a Arena,
    composite: bool,
    stripe_count: Vec<Value<'a>>,
    stripe_size: Vec<Value<'a>>,
    pattern: Vec<Value<'a>>,
    comp_flags: Vec<Value<'a>>,
    pool: Vec<Value<'a>>,
    mirror_id: Vec<Value<'a>>,
    begin: Vec<Value<'a>>,
    end: Vec<Value<'a>>,
    ost: PlacementTargets<'a>,
}

fn component_slots<'a>(length: usize) -> Result<Vec<Value<'a>>, MetaError> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(length)
        .map_err(|_| out_of_memory())?;
    Ok(slots)
}

impl<'a> ComponentAccumulator<'a> {
    /// Allocate room for `components` components.
    ///
    /// Composite layouts also track each component's mirror and extent.
    pub fn new(components: usize, composite: bool, arena: &'a Arena) -> Result<Self, MetaError> {
        let extra = if composite { components } else { 0 };
        Ok(Self {
            arena,
            composite,
            stripe_count: component_slots(components)?,
            stripe_size: component_slots(components)?,
            pattern: component_slots(components)?,
            comp_flags: component_slots(components)?,
            pool: component_slots(components)?,
            mirror_id: component_slots(extra)?,
            begin: component_slots(extra)?,
            end: component_slots(extra)?,
            ost: PlacementTargets::with_capacity(components)?,
        })
    }

    /// Number of components accumulated so far.
    pub fn component_count(&self) -> usize {
        self.stripe_count.len()
    }

    /// The OSTs accumulated so far.
    pub fn placement_targets(&self) -> &PlacementTargets<'a> {
        &self.ost
    }

    /// Record one component.
    pub fn accumulate<C>(&mut self, component: &C) -> Result<(), MetaError>
    where
        C: LayoutComponent + ?Sized,
    {
        let stripe_count = component.stripe_count()?;
        let stripe_size = component.stripe_size()?;
        let pattern = component.pattern()?;
        let flags = component.comp_flags()?;
        let arena = self.arena;
        let pool = arena.push_str(&component.pool_name()?)?;

        let instantiated = flags == LCME_FL_INIT || !self.composite;
        trace!(
            index = self.component_count(),
            stripe_count,
            stripe_size,
            instantiated,
            "layout component"
        );

        if instantiated {
            // stripe_count may be a sentinel far above any real OST count
            let expected = usize::try_from(stripe_count.min(LOV_MAX_STRIPE_COUNT))
                .map_err(|_| out_of_memory())?;
            self.ost.reserve(expected)?;
            for stripe in 0..stripe_count {
                match component.ost_index(stripe)? {
                    Some(ost) => {
                        self.ost.reserve(1)?;
                        self.ost.push(ost);
                    }
                    None => break,
                }
            }
        } else {
            self.ost.reserve(1)?;
            self.ost.push(OST_NOT_INSTANTIATED);
        }

        if self.composite {
            let (begin, end) = component.extent()?;
            let mirror_id = component.mirror_id()?;
            self.begin.push(Value::Uint64(begin));
            self.end.push(Value::Uint64(end));
            self.mirror_id.push(Value::Uint32(mirror_id));
        }

        self.stripe_count.push(Value::Uint64(stripe_count));
        self.stripe_size.push(Value::Uint64(stripe_size));
        self.pattern.push(Value::Uint64(pattern));
        self.comp_flags.push(Value::Uint32(flags));
        self.pool.push(Value::String(pool));

        Ok(())
    }

    /// Append one sequence pair per attribute, then the `ost` sequence.
    ///
    /// Returns the number of pairs appended.
    pub fn into_pairs(self, pairs: &mut Vec<ValuePair<'a>>) -> usize {
        let mut sequences = vec![
            ("stripe_count", self.stripe_count),
            ("stripe_size", self.stripe_size),
            ("pattern", self.pattern),
            ("comp_flags", self.comp_flags),
            ("pool", self.pool),
        ];
        if self.composite {
            sequences.push(("mirror_id", self.mirror_id));
            sequences.push(("begin", self.begin));
            sequences.push(("end", self.end));
        }
        sequences.push(("ost", self.ost.into_values()));

        let count = sequences.len();
        pairs.extend(
            sequences
                .into_iter()
                .map(|(key, values)| ValuePair::new(key, Value::Sequence(values))),
        );
        count
    }
}

impl ComponentVisitor for ComponentAccumulator<'_> {
    fn visit(&mut self, component: &dyn LayoutComponent) -> Result<(), MetaError> {
        self.accumulate(component)
    }
}

/// Number of components of a composite layout: the id of its last one.
///
/// Leaves the first component selected.
fn component_count(layout: &mut dyn Layout) -> Result<usize, MetaError> {
    layout.select_component(ComponentSelect::Last)?;
    let last = layout.component_id()?;
    layout.select_component(ComponentSelect::First)?;
    usize::try_from(last).map_err(|_| MetaError::InvalidFormat {
        what: "layout",
        details: format!("component id {last}"),
    })
}

/// Layout producer: see the [module documentation](self).
pub(crate) fn layout_pairs<'a>(
    entry: &dyn LustreEntry,
    ctx: &ExtractContext<'a>,
    pairs: &mut Vec<ValuePair<'a>>,
) -> Result<usize, MetaError> {
    if ctx.kind.is_symlink {
        return Ok(0);
    }

    let start = pairs.len();
    let mut layout = entry.layout()?;

    pairs.push(ValuePair::new("flags", Value::Uint32(layout.flags()?)));

    if ctx.kind.is_reg {
        let raw = entry.get_xattr(XATTR_LUSTRE_LOV)?;
        let header = LayoutHeader::decode(&raw)?;
        pairs.push(ValuePair::new("magic", ctx.string(header.format.name())?));
        pairs.push(ValuePair::new("gen", Value::Uint32(header.generation)));
    }

    let composite = layout.is_composite();
    let mut components = 1;
    if composite {
        let mirror_count = layout.mirror_count()?;
        pairs.push(ValuePair::new(
            "mirror_count",
            Value::Uint32(u32::from(mirror_count)),
        ));
        components = component_count(&mut *layout)?;
    }

    let mut accumulator = ComponentAccumulator::new(components, composite, ctx.arena)?;
    if composite {
        layout.iterate_components(&mut accumulator)?;
    } else {
        accumulator.accumulate(layout.as_ref())?;
    }
    accumulator.into_pairs(pairs);

    Ok(pairs.len() - start)
}
