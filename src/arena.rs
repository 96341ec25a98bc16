//! Append-only byte arena.
//!
//! Attribute values produced while scanning one entry borrow their bytes
//! from an [`Arena`] so that they outlive the native buffers they were read
//! from. Every slice handed out stays valid until the owner calls
//! [`Arena::reset`], which needs `&mut self`: the borrow checker guarantees an
//! extraction result is fully consumed before the arena is recycled.
//!
//! An arena is `Send` but not `Sync`. Each scanning worker owns its own.

use std::cell::Cell;

use bumpalo::Bump;

use crate::MetaError;

/// Default size of the first arena chunk, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Append-only byte region handing out stable slices.
///
/// # Example
///
/// ```rust
/// use fsindex_backend::Arena;
///
/// let mut arena = Arena::new();
/// let pool = arena.push_str("flash")?;
/// let raw = arena.push(&[1, 2, 3])?;
/// assert_eq!(pool, "flash");
/// assert_eq!(raw, &[1, 2, 3]);
///
/// arena.reset();
/// # Ok::<(), fsindex_backend::MetaError>(())
/// ```
#[derive(Debug)]
pub struct Arena {
    bump: Bump,
    used: Cell<usize>,
    limit: Option<usize>,
}

impl Arena {
    /// Create an arena starting with a [`DEFAULT_CHUNK_SIZE`] chunk.
    pub fn new() -> Self {
        Self::with_chunk_size(DEFAULT_CHUNK_SIZE)
    }

    /// Create an arena whose first chunk holds `chunk_size` bytes.
    ///
    /// Later chunks are sized by the arena as it grows.
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            bump: Bump::with_capacity(chunk_size),
            used: Cell::new(0),
            limit: None,
        }
    }

    /// Cap the number of bytes the arena accepts between two resets.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn claim(&self, len: usize) -> Result<(), MetaError> {
        let used = self
            .used
            .get()
            .checked_add(len)
            .filter(|&used| self.limit.is_none_or(|limit| used <= limit))
            .ok_or(MetaError::OutOfMemory { operation: "arena" })?;
        self.used.set(used);
        Ok(())
    }

    /// Copy `data` into the arena.
    ///
    /// # Errors
    ///
    /// - [`MetaError::OutOfMemory`] if the copy would exceed the arena limit
    pub fn push(&self, data: &[u8]) -> Result<&[u8], MetaError> {
        self.claim(data.len())?;
        Ok(self.bump.alloc_slice_copy(data))
    }

    /// Copy a string into the arena.
    ///
    /// # Errors
    ///
    /// - [`MetaError::OutOfMemory`] if the copy would exceed the arena limit
    pub fn push_str(&self, s: &str) -> Result<&str, MetaError> {
        self.claim(s.len())?;
        Ok(self.bump.alloc_str(s))
    }

    /// Total number of bytes pushed since the last reset.
    pub fn used(&self) -> usize {
        self.used.get()
    }

    /// Forget everything pushed so far.
    ///
    /// The largest chunk is kept for reuse.
    pub fn reset(&mut self) {
        self.bump.reset();
        self.used.set(0);
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_copies() {
        let arena = Arena::new();
        let mut source = vec![1u8, 2, 3];
        let copy = arena.push(&source).unwrap();
        source[0] = 9;
        assert_eq!(copy, &[1, 2, 3]);
    }

    #[test]
    fn slices_survive_chunk_growth() {
        let arena = Arena::with_chunk_size(8);
        let mut slices = Vec::new();
        for i in 0..64u8 {
            slices.push(arena.push(&[i; 5]).unwrap());
        }
        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(*slice, &[i as u8; 5]);
        }
        assert_eq!(arena.used(), 64 * 5);
    }

    #[test]
    fn oversized_push_grows_the_arena() {
        let arena = Arena::with_chunk_size(4);
        let small = arena.push(b"ab").unwrap();
        let big = arena.push(&[7u8; 100]).unwrap();
        assert_eq!(small, b"ab");
        assert_eq!(big.len(), 100);
    }

    #[test]
    fn limit_reports_out_of_memory() {
        let arena = Arena::new().with_limit(8);
        arena.push(b"12345").unwrap();
        let err = arena.push_str("6789").unwrap_err();
        assert!(matches!(err, MetaError::OutOfMemory { operation: "arena" }));
        assert_eq!(arena.used(), 5);
        assert_eq!(arena.push(b"678").unwrap(), b"678");
    }

    #[test]
    fn reset_restores_the_budget() {
        let mut arena = Arena::new().with_limit(4);
        arena.push(b"full").unwrap();
        assert!(arena.push(b"x").is_err());
        arena.reset();
        assert_eq!(arena.push(b"x").unwrap(), b"x");
    }

    #[test]
    fn empty_push_is_free() {
        let arena = Arena::new();
        assert!(arena.push(&[]).unwrap().is_empty());
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn reset_empties_the_arena() {
        let mut arena = Arena::new();
        arena.push_str("hello").unwrap();
        assert_eq!(arena.used(), 5);
        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.push_str("again").unwrap(), "again");
    }

    #[test]
    fn arena_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<Arena>();
    }
}
