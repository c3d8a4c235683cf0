/*!
 * Memory Module
 * Simulated heap: placement, partitioning, release and compaction
 */

pub mod block;
pub mod heap;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use block::MemoryBlock;
pub use heap::{Blocks, Heap};
pub use traits::*;
pub use types::*;
