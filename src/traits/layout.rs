//! Native access to Lustre file layouts.
//!
//! These traits mirror what `liblustreapi` offers on a `struct llapi_layout`:
//! a layout holds one or more components; one of them is "current" and the
//! per-component getters read from it. Iteration over components is driven by
//! the native side, which hands each component to a [`ComponentVisitor`].
//!
//! # Example
//!
//! ```rust
//! use fsindex_backend::{ComponentVisitor, LayoutComponent, MetaError};
//!
//! // A visitor summing the stripe counts of every component
//! struct TotalStripes(u64);
//!
//! impl ComponentVisitor for TotalStripes {
//!     fn visit(&mut self, component: &dyn LayoutComponent) -> Result<(), MetaError> {
//!         self.0 += component.stripe_count()?;
//!         Ok(())
//!     }
//! }
//! ```

use crate::MetaError;

/// Component flag: the component is instantiated (bound to OSTs).
pub const LCME_FL_INIT: u32 = 0x0000_0010;

/// Which component of a layout to make current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentSelect {
    /// The first component.
    First,
    /// The last component.
    Last,
}

/// Per-component attributes of a layout.
///
/// For a plain (non-composite) layout these describe the layout itself.
pub trait LayoutComponent {
    /// Number of stripes.
    fn stripe_count(&self) -> Result<u64, MetaError>;

    /// Stripe size in bytes.
    fn stripe_size(&self) -> Result<u64, MetaError>;

    /// Striping pattern.
    fn pattern(&self) -> Result<u64, MetaError>;

    /// Component flags (`LCME_FL_*`).
    fn comp_flags(&self) -> Result<u32, MetaError>;

    /// OST pool name, empty if none.
    fn pool_name(&self) -> Result<String, MetaError>;

    /// Index of the OST holding stripe `stripe`.
    ///
    /// Returns `Ok(None)` once there is no more stripe to report, which may
    /// happen before `stripe_count` is reached.
    fn ost_index(&self, stripe: u64) -> Result<Option<u64>, MetaError>;

    /// Extent `(begin, end)` of the file covered by the component.
    fn extent(&self) -> Result<(u64, u64), MetaError>;

    /// Mirror the component belongs to.
    fn mirror_id(&self) -> Result<u32, MetaError>;
}

/// Receives each component of a composite layout in turn.
pub trait ComponentVisitor {
    /// Handle one component. An error stops the iteration.
    fn visit(&mut self, component: &dyn LayoutComponent) -> Result<(), MetaError>;
}

/// A file layout.
pub trait Layout: LayoutComponent {
    /// Layout-wide flags.
    fn flags(&self) -> Result<u32, MetaError>;

    /// Returns `true` for composite (PFL, FLR, SEL) layouts.
    fn is_composite(&self) -> bool;

    /// Number of mirrors of a composite layout.
    fn mirror_count(&self) -> Result<u16, MetaError>;

    /// Make `which` the current component.
    fn select_component(&mut self, which: ComponentSelect) -> Result<(), MetaError>;

    /// Identifier of the current component.
    fn component_id(&self) -> Result<u32, MetaError>;

    /// Call `visitor` on every component, first to last, synchronously.
    ///
    /// Stops at, and returns, the first error.
    fn iterate_components(&mut self, visitor: &mut dyn ComponentVisitor) -> Result<(), MetaError>;
}
