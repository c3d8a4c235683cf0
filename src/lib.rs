/*!
 * Allocation Simulator Library
 * First-fit / best-fit heap simulation with fragmentation accounting and compaction
 */

pub mod core;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod simulation;

// Re-exports
pub use crate::core::errors::{ConfigError, SimulationError, SimulationResult};
pub use crate::core::id::{BlockId, Pid};
pub use memory::{
    AllocationStrategy, BlockSnapshot, BlockState, Grant, Heap, HeapError, HeapResult, HeapStats,
    MemoryBlock, MemoryInfo,
};
pub use monitoring::init_tracing;
pub use process::{Process, ProcessError, ProcessInfo, ProcessTable};
pub use scheduler::{Clock, IntervalClock, ManualClock, RunLimits, SimulationCommand, SimulationTask};
pub use simulation::{
    JsonObserver, RecordingObserver, Simulation, SimulationConfig, StepEvent, StepObserver,
    StepReport, TracingObserver,
};
