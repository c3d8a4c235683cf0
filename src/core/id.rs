/*!
 * ID Generation System
 * Type-safe ID wrappers and monotonic generators
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ============================================================================
// Type-Safe ID Wrappers
// ============================================================================

/// Process ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(pub u64);

/// Memory block ID (arena key, never an address)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub u64);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for Pid {
    fn from(raw: u64) -> Self {
        Pid(raw)
    }
}

impl From<u64> for BlockId {
    fn from(raw: u64) -> Self {
        BlockId(raw)
    }
}

// ============================================================================
// ID Generator Trait
// ============================================================================

/// Generic ID generator interface
pub trait IdGenerator<T> {
    /// Generate next ID
    fn next(&self) -> T;

    /// Peek at the ID the next call will return (for debugging)
    fn current(&self) -> T;
}

// ============================================================================
// Monotonic Generator
// ============================================================================

/// Monotonic counter; IDs are never recycled
pub struct MonotonicGenerator<T> {
    counter: Arc<AtomicU64>,
    _marker: PhantomData<T>,
}

impl<T> MonotonicGenerator<T> {
    /// Create new generator starting at given value
    #[inline]
    pub fn new(start: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(start)),
            _marker: PhantomData,
        }
    }

    /// Create new generator starting at 1
    #[inline]
    pub fn default_start() -> Self {
        Self::new(1)
    }
}

impl<T> Clone for MonotonicGenerator<T> {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
            _marker: PhantomData,
        }
    }
}

impl<T> Default for MonotonicGenerator<T> {
    fn default() -> Self {
        Self::default_start()
    }
}

impl<T> fmt::Debug for MonotonicGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonotonicGenerator")
            .field("next", &self.counter.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T: From<u64>> IdGenerator<T> for MonotonicGenerator<T> {
    #[inline]
    fn next(&self) -> T {
        T::from(self.counter.fetch_add(1, Ordering::SeqCst))
    }

    #[inline]
    fn current(&self) -> T {
        T::from(self.counter.load(Ordering::Relaxed))
    }
}

/// Process ID generator (no recycling - ids identify a process for its whole life)
pub type PidGenerator = MonotonicGenerator<Pid>;

/// Block ID generator
pub type BlockIdGenerator = MonotonicGenerator<BlockId>;

// ============================================================================
// Tests
// ============================================================================
