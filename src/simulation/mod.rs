/*!
 * Simulation Context
 *
 * Owns the heap, the process table and the fragmentation counters, and
 * advances them one discrete step at a time. Nothing here depends on a
 * clock or a rendering surface; `scheduler` paces the steps and observers
 * consume the reports.
 */

pub mod config;
pub mod observer;
pub mod report;

pub use config::{parse_workload, SimulationConfig};
pub use observer::{JsonObserver, RecordingObserver, StepObserver, TracingObserver};
pub use report::{StepEvent, StepReport};

use crate::core::errors::{ConfigError, SimulationResult};
use crate::core::id::Pid;
use crate::core::types::{Lifetime, Size, Step};
use crate::memory::{AllocationStrategy, Heap};
use crate::process::{ProcessResult, ProcessTable};
use tracing::{debug, info};

/// Explicit simulation context
#[derive(Debug)]
pub struct Simulation {
    heap: Heap,
    processes: ProcessTable,
    config: SimulationConfig,
    internal_fragmentation: Size,
    step: Step,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let heap = Heap::initialize(&config.block_sizes, config.split_overhead);
        info!(
            strategy = %config.strategy,
            fragmentation = config.fragmentation,
            compaction = config.compaction,
            capacity = heap.total_capacity(),
            "simulation created"
        );
        Ok(Self {
            heap,
            processes: ProcessTable::new(),
            config,
            internal_fragmentation: 0,
            step: 0,
        })
    }

    /// Queue a new process; it competes for memory from the next step on
    pub fn submit(&mut self, size: Size, lifetime: Lifetime) -> ProcessResult<Pid> {
        self.processes.create(size, lifetime)
    }

    pub fn set_strategy(&mut self, strategy: AllocationStrategy) {
        self.config.strategy = strategy;
    }

    pub fn set_fragmentation(&mut self, enabled: bool) {
        self.config.fragmentation = enabled;
    }

    pub fn set_compaction(&mut self, enabled: bool) {
        self.config.compaction = enabled;
    }

    /// Advance the simulation by one step
    ///
    /// Processes are visited in creation order. A waiting process gets one
    /// allocation attempt; if it fails and compaction is on, the heap is
    /// compacted but the process only retries next step. An allocated
    /// process is aged and released once its lifetime runs out.
    ///
    /// # Errors
    ///
    /// Fails only when the heap and the process table disagree about a
    /// binding, which the table's own operations never produce. The step
    /// counter is left unchanged, but heap changes made earlier in the same
    /// step stay applied and their events are dropped; discard the
    /// simulation after an error.
    pub fn step(&mut self) -> SimulationResult<StepReport> {
        let step = self.step + 1;
        let mut events = Vec::new();
        let Self {
            heap,
            processes,
            config,
            internal_fragmentation,
            ..
        } = self;

        for process in processes.iter_mut() {
            if !process.is_allocated() {
                match heap.request_allocation(process, config.strategy, config.fragmentation)? {
                    Some(grant) => {
                        *internal_fragmentation += grant.internal_fragmentation;
                        events.push(StepEvent::Allocated {
                            pid: process.id(),
                            block: grant.block,
                            split: grant.split,
                            internal_fragmentation: grant.internal_fragmentation,
                        });
                    }
                    None => {
                        events.push(StepEvent::Deferred {
                            pid: process.id(),
                            size: process.size(),
                        });
                        if config.compaction {
                            let reclaimed = heap.compact();
                            events.push(StepEvent::Compacted { reclaimed });
                        }
                    }
                }
            } else {
                process.tick();
                if process.is_expired() {
                    let Some(block) = process.allocated_block() else {
                        continue;
                    };
                    let delta = heap.deallocate_process(process)?;
                    *internal_fragmentation = internal_fragmentation.saturating_sub(delta);
                    events.push(StepEvent::Released {
                        pid: process.id(),
                        block,
                        internal_fragmentation: delta,
                    });
                }
            }
        }

        // Only released processes can be expired: waiting ones are never ticked
        processes.retain(|p| !p.is_expired());
        self.step = step;

        debug!(
            step = self.step,
            events = events.len(),
            active = self.processes.len(),
            "step finished"
        );
        Ok(self.report(events))
    }

    /// Run `steps` steps back to back, collecting every report
    pub fn run(&mut self, steps: Step) -> SimulationResult<Vec<StepReport>> {
        (0..steps).map(|_| self.step()).collect()
    }

    /// Report for the current state with the given events
    pub fn report(&self, events: Vec<StepEvent>) -> StepReport {
        StepReport {
            step: self.step,
            strategy: self.config.strategy,
            fragmentation: self.config.fragmentation,
            compaction: self.config.compaction,
            events,
            blocks: self.heap.snapshot(),
            stats: self.heap.stats(),
            internal_fragmentation: self.internal_fragmentation,
            processes: self.processes.infos(),
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Running internal fragmentation total
    pub fn internal_fragmentation(&self) -> Size {
        self.internal_fragmentation
    }

    pub fn external_fragmentation(&self) -> Size {
        self.heap.external_fragmentation()
    }

    /// Number of steps completed
    pub fn current_step(&self) -> Step {
        self.step
    }

    /// No process is active
    pub fn is_idle(&self) -> bool {
        self.processes.is_empty()
    }
}
