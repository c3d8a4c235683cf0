/*!
 * Step Reports
 * What happened during one simulation step, plus the resulting heap state
 */

use crate::core::id::{BlockId, Pid};
use crate::core::types::{Size, Step};
use crate::memory::{AllocationStrategy, BlockSnapshot, HeapStats};
use crate::process::ProcessInfo;
use serde::{Deserialize, Serialize};

/// A single observable event inside a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StepEvent {
    /// A waiting process was placed
    Allocated {
        pid: Pid,
        block: BlockId,
        split: bool,
        internal_fragmentation: Size,
    },
    /// No Free block fit; the process waits for the next step
    Deferred { pid: Pid, size: Size },
    /// Free blocks were merged after a failed allocation
    Compacted { reclaimed: Size },
    /// An expired process gave its block back
    Released {
        pid: Pid,
        block: BlockId,
        internal_fragmentation: Size,
    },
}

/// Snapshot pushed to observers after each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: Step,
    pub strategy: AllocationStrategy,
    pub fragmentation: bool,
    pub compaction: bool,
    pub events: Vec<StepEvent>,
    pub blocks: Vec<BlockSnapshot>,
    pub stats: HeapStats,
    pub internal_fragmentation: Size,
    pub processes: Vec<ProcessInfo>,
}

impl StepReport {
    pub fn allocations(&self) -> usize {
        self.count(|e| matches!(e, StepEvent::Allocated { .. }))
    }

    pub fn deferrals(&self) -> usize {
        self.count(|e| matches!(e, StepEvent::Deferred { .. }))
    }

    pub fn compactions(&self) -> usize {
        self.count(|e| matches!(e, StepEvent::Compacted { .. }))
    }

    pub fn releases(&self) -> usize {
        self.count(|e| matches!(e, StepEvent::Released { .. }))
    }

    pub fn external_fragmentation(&self) -> Size {
        self.stats.external_fragmentation
    }

    fn count<F: Fn(&StepEvent) -> bool>(&self, pred: F) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
