/*!
 * Process Module
 * Simulated processes and the process table
 */

pub mod table;
pub mod types;

// Re-export for convenience
pub use table::ProcessTable;
pub use types::{Process, ProcessError, ProcessInfo, ProcessResult};
