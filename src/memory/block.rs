/*!
 * Memory Block
 * One node of the heap's ordered block sequence
 */

use super::types::{BlockSnapshot, BlockState};
use crate::core::id::{BlockId, Pid};
use crate::core::types::Size;

/// Contiguous heap region, linked to its neighbours by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryBlock {
    id: BlockId,
    size: Size,
    occupant: Option<Pid>,
    pub(super) prev: Option<BlockId>,
    pub(super) next: Option<BlockId>,
    from_split: bool,
}

impl MemoryBlock {
    pub(super) fn new(id: BlockId, size: Size) -> Self {
        Self {
            id,
            size,
            occupant: None,
            prev: None,
            next: None,
            from_split: false,
        }
    }

    pub(super) fn split_remainder(id: BlockId, size: Size) -> Self {
        Self {
            from_split: true,
            ..Self::new(id, size)
        }
    }

    /// Bind or unbind the occupant. The only way occupancy changes.
    pub fn assign(&mut self, occupant: Option<Pid>) {
        self.occupant = occupant;
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub(super) fn shrink_to(&mut self, size: Size) {
        self.size = size;
    }

    pub fn occupant(&self) -> Option<Pid> {
        self.occupant
    }

    pub fn state(&self) -> BlockState {
        if self.occupant.is_some() {
            BlockState::Occupied
        } else {
            BlockState::Free
        }
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn from_split(&self) -> bool {
        self.from_split
    }

    pub fn prev(&self) -> Option<BlockId> {
        self.prev
    }

    pub fn next(&self) -> Option<BlockId> {
        self.next
    }

    /// Free and at least `size` units
    #[inline]
    pub(super) fn fits(&self, size: Size) -> bool {
        self.is_free() && self.size >= size
    }

    pub fn snapshot(&self) -> BlockSnapshot {
        BlockSnapshot {
            size: self.size,
            state: self.state(),
            process_id: self.occupant,
            from_split: self.from_split,
        }
    }
}
