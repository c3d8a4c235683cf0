/*!
 * Heap Compaction
 * Fold scattered free space into a single block at the head
 */

use super::super::block::MemoryBlock;
use super::Heap;
use crate::core::id::IdGenerator;
use crate::core::types::Size;
use log::info;

impl Heap {
    /// Merge every Free block into one new Free block at the head
    ///
    /// Occupied blocks are not relocated and keep their relative order. A
    /// merged block is inserted even when nothing was free. Returns the
    /// number of units gathered.
    pub fn compact(&mut self) -> Size {
        let mut reclaimed: Size = 0;
        let mut merged = 0usize;
        let mut cursor = self.head;

        while let Some(id) = cursor {
            let Some(block) = self.blocks.get(&id) else {
                break;
            };
            cursor = block.next;
            if block.is_free() {
                if let Some(removed) = self.unlink(id) {
                    reclaimed += removed.size();
                    merged += 1;
                }
            }
        }

        let id = self.ids.next();
        self.push_front(MemoryBlock::new(id, reclaimed));

        info!(
            "Compacted {} free blocks into block {} ({} units at head, {} blocks remain)",
            merged,
            id,
            reclaimed,
            self.len()
        );
        reclaimed
    }
}
