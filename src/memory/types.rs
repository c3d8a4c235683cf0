/*!
 * Memory Types
 * Common types for the simulated heap
 */

use crate::core::id::{BlockId, Pid};
use crate::core::types::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Heap operation result
pub type HeapResult<T> = Result<T, HeapError>;

/// Heap errors
///
/// Allocation failure is not an error; these are caller precondition violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapError {
    #[error("Invalid request size for PID {pid}: {size} units (must be positive)")]
    InvalidSize { pid: Pid, size: Size },

    #[error("PID {pid} is already allocated to block {block}")]
    AlreadyAllocated { pid: Pid, block: BlockId },

    #[error("PID {0} is not allocated")]
    NotAllocated(Pid),

    #[error("Block {block} does not hold PID {pid}")]
    Inconsistent { pid: Pid, block: BlockId },
}

/// Placement strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStrategy {
    /// First Free block large enough, in sequence order
    FirstFit,
    /// Smallest Free block large enough, earliest on ties
    #[default]
    BestFit,
}

impl fmt::Display for AllocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AllocationStrategy::FirstFit => write!(f, "first-fit"),
            AllocationStrategy::BestFit => write!(f, "best-fit"),
        }
    }
}

impl FromStr for AllocationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-fit" | "first" | "firstfit" => Ok(AllocationStrategy::FirstFit),
            "best-fit" | "best" | "bestfit" => Ok(AllocationStrategy::BestFit),
            other => Err(format!("unknown allocation strategy '{}'", other)),
        }
    }
}

/// Block occupancy state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    Free,
    Occupied,
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BlockState::Free => f.pad("FREE"),
            BlockState::Occupied => f.pad("OCCUPIED"),
        }
    }
}

/// Successful placement of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grant {
    pub block: BlockId,
    /// Whether the chosen block was partitioned
    pub split: bool,
    /// Internal fragmentation the caller should add to its running total
    pub internal_fragmentation: Size,
}

/// Read-only view of one block, head to tail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub size: Size,
    pub state: BlockState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_id: Option<Pid>,
    pub from_split: bool,
}

impl BlockSnapshot {
    pub fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }

    /// Percentage of the heap this block occupies when drawn
    ///
    /// Split-born blocks also carry the overhead their split consumed.
    pub fn display_share(&self, total_capacity: Size, overhead: Size) -> f64 {
        if total_capacity == 0 {
            return 0.0;
        }
        let total = total_capacity as f64;
        let mut share = self.size as f64 / total * 100.0;
        if self.from_split {
            share += overhead as f64 / total * 100.0;
        }
        share
    }
}

/// Heap statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapStats {
    pub total_capacity: Size,
    pub split_overhead: Size,
    pub block_count: usize,
    pub free_blocks: usize,
    pub occupied_blocks: usize,
    pub largest_free_block: Size,
    pub external_fragmentation: Size,
    pub splits: usize,
}

impl HeapStats {
    /// Free space as a percentage of total capacity
    pub fn free_percentage(&self) -> f64 {
        if self.total_capacity == 0 {
            0.0
        } else {
            self.external_fragmentation as f64 / self.total_capacity as f64 * 100.0
        }
    }
}
