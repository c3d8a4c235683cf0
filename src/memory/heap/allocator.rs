/*!
 * Heap Allocator
 * Placement search, partitioning and release
 */

use super::super::block::MemoryBlock;
use super::super::types::{AllocationStrategy, Grant, HeapError, HeapResult};
use super::Heap;
use crate::core::id::{BlockId, IdGenerator};
use crate::core::types::Size;
use crate::process::Process;
use log::{debug, info, warn};

impl Heap {
    /// Place `process` in a Free block
    ///
    /// Returns `Ok(None)` when no Free block is large enough; that is a normal
    /// outcome and nothing is retried here. With `fragmentation_mode` set the
    /// whole block is granted and the unused remainder is reported in the
    /// grant instead of being split off.
    pub fn request_allocation(
        &mut self,
        process: &mut Process,
        strategy: AllocationStrategy,
        fragmentation_mode: bool,
    ) -> HeapResult<Option<Grant>> {
        let pid = process.id();
        if process.size() == 0 {
            warn!("Rejected zero-sized request from PID {}", pid);
            return Err(HeapError::InvalidSize { pid, size: 0 });
        }
        if let Some(block) = process.allocated_block() {
            warn!("PID {} requested memory while holding block {}", pid, block);
            return Err(HeapError::AlreadyAllocated { pid, block });
        }

        let Some(mut candidate) = self.find_initial_valid_block(process.size()) else {
            debug!(
                "No free block fits PID {} ({} units, {} units free)",
                pid,
                process.size(),
                self.external_fragmentation()
            );
            return Ok(None);
        };

        if strategy == AllocationStrategy::BestFit {
            candidate = self.find_best_fit_block(candidate, process.size());
        }

        Ok(Some(self.allocate_block(candidate, process, fragmentation_mode)))
    }

    /// First Free block, head to tail, with at least `size` units
    fn find_initial_valid_block(&self, size: Size) -> Option<BlockId> {
        self.iter().find(|b| b.fits(size)).map(MemoryBlock::id)
    }

    /// Scan past `start` for a strictly smaller fitting block; ties keep the earlier one
    fn find_best_fit_block(&self, start: BlockId, size: Size) -> BlockId {
        let Some(first) = self.blocks.get(&start) else {
            return start;
        };
        let mut best = first;
        let mut cursor = first.next;
        while let Some(block) = cursor.and_then(|id| self.blocks.get(&id)) {
            if block.fits(size) && block.size() < best.size() {
                best = block;
            }
            cursor = block.next;
        }
        best.id()
    }

    fn allocate_block(
        &mut self,
        candidate: BlockId,
        process: &mut Process,
        fragmentation_mode: bool,
    ) -> Grant {
        let pid = process.id();
        let block_size = self.blocks.get(&candidate).map_or(0, MemoryBlock::size);
        let needed = process.size() + self.overhead;
        // Positive part of `block_size - (size + overhead)`
        let leftover = block_size.saturating_sub(needed);

        let mut grant = Grant {
            block: candidate,
            split: false,
            internal_fragmentation: 0,
        };

        if !fragmentation_mode {
            if leftover > 0 {
                self.partition_block(candidate, process.size(), leftover);
                grant.split = true;
            }
        } else {
            grant.internal_fragmentation = leftover;
        }

        if let Some(block) = self.blocks.get_mut(&candidate) {
            block.assign(Some(pid));
        }
        process.bind(candidate);

        info!(
            "Allocated block {} ({} units) to PID {} requesting {} [split: {}, internal fragmentation: {}]",
            candidate,
            block_size,
            pid,
            process.size(),
            grant.split,
            grant.internal_fragmentation
        );
        grant
    }

    /// Shrink `block` to `size` and insert a Free remainder of `leftover` after it
    fn partition_block(&mut self, block: BlockId, size: Size, leftover: Size) {
        let remainder = self.ids.next();
        if let Some(target) = self.blocks.get_mut(&block) {
            target.shrink_to(size);
        }
        self.insert_after(block, MemoryBlock::split_remainder(remainder, leftover));
        self.splits += 1;

        debug!(
            "Split block {}: keeping {} units, new free block {} with {} units (overhead {})",
            block, size, remainder, leftover, self.overhead
        );
    }

    /// Release `process` from its block
    ///
    /// Returns the internal fragmentation that disappears with it
    /// (`block.size - process.size`). The freed block is not merged with Free
    /// neighbours.
    pub fn deallocate_process(&mut self, process: &mut Process) -> HeapResult<Size> {
        let pid = process.id();
        let Some(block_id) = process.allocated_block() else {
            warn!("Attempted to deallocate PID {} which holds no block", pid);
            return Err(HeapError::NotAllocated(pid));
        };

        let Some(block) = self
            .blocks
            .get_mut(&block_id)
            .filter(|b| b.occupant() == Some(pid))
        else {
            warn!("Block {} does not hold PID {}", block_id, pid);
            return Err(HeapError::Inconsistent { pid, block: block_id });
        };

        let delta = block.size().saturating_sub(process.size());
        let size = block.size();
        block.assign(None);
        process.unbind();

        info!(
            "Deallocated block {} ({} units) from PID {}, {} units now free",
            block_id,
            size,
            pid,
            self.external_fragmentation()
        );
        Ok(delta)
    }
}
