/*!
 * Process Types
 * Simulated processes and their errors
 */

use crate::core::id::{BlockId, IdGenerator, Pid};
use crate::core::types::{Lifetime, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Process not found: {0}")]
    ProcessNotFound(Pid),

    #[error("Invalid process request: size {size}, lifetime {lifetime} (both must be positive)")]
    InvalidRequest { size: Size, lifetime: Lifetime },
}

/// A unit of memory demand with a finite lifetime
///
/// A process never owns its block; it only remembers which block the heap bound it to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    id: Pid,
    size: Size,
    remaining_lifetime: Lifetime,
    allocated_block: Option<BlockId>,
}

impl Process {
    /// Create a process, drawing its id from `ids`
    pub fn new<G>(ids: &G, size: Size, lifetime: Lifetime) -> ProcessResult<Self>
    where
        G: IdGenerator<Pid>,
    {
        if size == 0 || lifetime < 1 {
            return Err(ProcessError::InvalidRequest { size, lifetime });
        }
        Ok(Self {
            id: ids.next(),
            size,
            remaining_lifetime: lifetime,
            allocated_block: None,
        })
    }

    pub fn id(&self) -> Pid {
        self.id
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn remaining_lifetime(&self) -> Lifetime {
        self.remaining_lifetime
    }

    pub fn allocated_block(&self) -> Option<BlockId> {
        self.allocated_block
    }

    pub fn is_allocated(&self) -> bool {
        self.allocated_block.is_some()
    }

    /// Age by one step. No lower bound; callers check `is_expired`.
    pub fn tick(&mut self) {
        self.remaining_lifetime -= 1;
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_lifetime < 1
    }

    pub(crate) fn bind(&mut self, block: BlockId) {
        self.allocated_block = Some(block);
    }

    pub(crate) fn unbind(&mut self) {
        self.allocated_block = None;
    }

    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.id,
            size: self.size,
            remaining_lifetime: self.remaining_lifetime,
            block: self.allocated_block,
        }
    }
}

/// Process table row for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub size: Size,
    pub remaining_lifetime: Lifetime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockId>,
}
