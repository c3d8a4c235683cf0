/*!
 * Simulated Heap
 *
 * Fixed-capacity heap modelled as an ordered, doubly-linked sequence of blocks.
 *
 * ## Layout
 *
 * Blocks live in an id-keyed arena; `prev`/`next` ids give the logical order
 * from head to tail. The heap is the only thing that changes that order:
 * - **Construction**: `add` prepends, so a declared size list ends up reversed
 * - **Allocation**: first-fit or best-fit search, optional split of the chosen block
 * - **Release**: the block turns Free in place, no coalescing
 * - **Compaction**: every Free block is folded into one new block at the head
 *
 * Sizes are abstract units; there is no address arithmetic.
 */

mod allocator;
mod compaction;

use super::block::MemoryBlock;
use super::traits::MemoryInfo;
use super::types::{BlockSnapshot, HeapStats};
use crate::core::id::{BlockId, BlockIdGenerator, IdGenerator};
use crate::core::types::Size;
use ahash::RandomState;
use log::info;
use std::collections::HashMap;
use std::fmt;

/// Simulated heap
pub struct Heap {
    blocks: HashMap<BlockId, MemoryBlock, RandomState>,
    head: Option<BlockId>,
    ids: BlockIdGenerator,
    // Sum of sizes passed to `add`; display only
    total_capacity: Size,
    // Fixed bookkeeping cost charged once per split
    overhead: Size,
    splits: usize,
}

impl Heap {
    /// Create an empty heap with the given per-split overhead
    pub fn new(overhead: Size) -> Self {
        Self {
            blocks: HashMap::with_hasher(RandomState::new()),
            head: None,
            ids: BlockIdGenerator::default_start(),
            total_capacity: 0,
            overhead,
            splits: 0,
        }
    }

    /// Build a heap by adding each configured size in declaration order
    pub fn initialize(block_sizes: &[Size], overhead: Size) -> Self {
        let mut heap = Self::new(overhead);
        for &size in block_sizes {
            heap.add(size);
        }
        info!(
            "Heap initialized with {} blocks, {} units total (split overhead {})",
            heap.len(),
            heap.total_capacity,
            overhead
        );
        heap
    }

    /// Prepend a new Free block and count it towards total capacity
    pub fn add(&mut self, size: Size) -> BlockId {
        let id = self.ids.next();
        self.push_front(MemoryBlock::new(id, size));
        self.total_capacity += size;
        id
    }

    fn push_front(&mut self, mut block: MemoryBlock) {
        let id = block.id();
        block.prev = None;
        block.next = self.head;
        if let Some(old_head) = self.head.and_then(|h| self.blocks.get_mut(&h)) {
            old_head.prev = Some(id);
        }
        self.head = Some(id);
        self.blocks.insert(id, block);
    }

    /// Insert `block` directly after `anchor`
    fn insert_after(&mut self, anchor: BlockId, mut block: MemoryBlock) {
        let id = block.id();
        let next = self.blocks.get(&anchor).and_then(|a| a.next);

        block.prev = Some(anchor);
        block.next = next;
        if let Some(next_block) = next.and_then(|n| self.blocks.get_mut(&n)) {
            next_block.prev = Some(id);
        }
        if let Some(anchor_block) = self.blocks.get_mut(&anchor) {
            anchor_block.next = Some(id);
        }
        self.blocks.insert(id, block);
    }

    /// Splice a block out of the sequence and drop it from the arena
    fn unlink(&mut self, id: BlockId) -> Option<MemoryBlock> {
        let block = self.blocks.remove(&id)?;
        match block.prev.and_then(|p| self.blocks.get_mut(&p)) {
            Some(prev) => prev.next = block.next,
            None => self.head = block.next,
        }
        if let Some(next) = block.next.and_then(|n| self.blocks.get_mut(&n)) {
            next.prev = block.prev;
        }
        Some(block)
    }

    /// Iterate blocks head to tail
    pub fn iter(&self) -> Blocks<'_> {
        Blocks {
            heap: self,
            cursor: self.head,
        }
    }

    pub fn block(&self, id: BlockId) -> Option<&MemoryBlock> {
        self.blocks.get(&id)
    }

    pub fn head(&self) -> Option<BlockId> {
        self.head
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn total_capacity(&self) -> Size {
        self.total_capacity
    }

    pub fn overhead(&self) -> Size {
        self.overhead
    }

    /// Number of splits performed so far
    pub fn splits(&self) -> usize {
        self.splits
    }

    /// Sum of the sizes of all Free blocks, contiguous or not
    pub fn external_fragmentation(&self) -> Size {
        self.iter().filter(|b| b.is_free()).map(|b| b.size()).sum()
    }

    /// Ordered, side-effect free view for rendering
    pub fn snapshot(&self) -> Vec<BlockSnapshot> {
        self.iter().map(MemoryBlock::snapshot).collect()
    }

    pub fn stats(&self) -> HeapStats {
        let mut stats = HeapStats {
            total_capacity: self.total_capacity,
            split_overhead: self.overhead,
            block_count: 0,
            free_blocks: 0,
            occupied_blocks: 0,
            largest_free_block: 0,
            external_fragmentation: 0,
            splits: self.splits,
        };
        for block in self.iter() {
            stats.block_count += 1;
            if block.is_free() {
                stats.free_blocks += 1;
                stats.external_fragmentation += block.size();
                stats.largest_free_block = stats.largest_free_block.max(block.size());
            } else {
                stats.occupied_blocks += 1;
            }
        }
        stats
    }
}

impl MemoryInfo for Heap {
    fn snapshot(&self) -> Vec<BlockSnapshot> {
        Heap::snapshot(self)
    }

    fn stats(&self) -> HeapStats {
        Heap::stats(self)
    }

    fn external_fragmentation(&self) -> Size {
        Heap::external_fragmentation(self)
    }

    fn total_capacity(&self) -> Size {
        self.total_capacity
    }

    fn overhead(&self) -> Size {
        self.overhead
    }
}

impl fmt::Debug for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Heap")
            .field("blocks", &self.iter().collect::<Vec<_>>())
            .field("total_capacity", &self.total_capacity)
            .field("overhead", &self.overhead)
            .field("splits", &self.splits)
            .finish()
    }
}

impl fmt::Display for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::monitoring::render::format_layout(&self.snapshot()))
    }
}

/// Head-to-tail block iterator
pub struct Blocks<'a> {
    heap: &'a Heap,
    cursor: Option<BlockId>,
}

impl<'a> Iterator for Blocks<'a> {
    type Item = &'a MemoryBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.heap.blocks.get(&self.cursor?)?;
        self.cursor = block.next;
        Some(block)
    }
}
