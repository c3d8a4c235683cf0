/*!
 * Memory Traits
 * Read-only heap view for observers and renderers
 */

use super::types::{BlockSnapshot, HeapStats};
use crate::core::types::Size;

/// Heap state provider
///
/// Presentation code depends on this, never on the allocator itself.
pub trait MemoryInfo {
    /// Ordered block view, head to tail
    fn snapshot(&self) -> Vec<BlockSnapshot>;

    /// Aggregate statistics
    fn stats(&self) -> HeapStats;

    /// Total size of Free blocks
    fn external_fragmentation(&self) -> Size;

    /// Capacity used as the denominator for proportional display
    fn total_capacity(&self) -> Size;

    /// Per-split overhead
    fn overhead(&self) -> Size;
}
