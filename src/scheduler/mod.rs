/*!
 * Scheduler Module
 * Clock abstraction and the background task that paces simulation steps
 */

pub mod clock;
pub mod task;

// Re-export for convenience
pub use clock::{Clock, IntervalClock, ManualClock};
pub use task::{RunLimits, SimulationCommand, SimulationTask};
