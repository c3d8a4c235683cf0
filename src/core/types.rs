/*!
 * Core Types
 * Common types used across the simulator
 */

/// Capacity in abstract size units
pub type Size = usize;

/// Remaining lifetime in simulation steps (may go negative, see `Process::tick`)
pub type Lifetime = i64;

/// Simulation step counter
pub type Step = u64;
