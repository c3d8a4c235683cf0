/*!
 * Simulation Limits and Defaults
 *
 * Centralized location for default configuration values.
 */

use super::types::Size;

// =============================================================================
// HEAP LAYOUT
// =============================================================================

/// Initial block sizes, in declaration order
/// Blocks are prepended on construction, so the head-to-tail layout is the reverse
pub const DEFAULT_BLOCK_SIZES: [Size; 6] = [450, 150, 70, 50, 300, 200];

/// Bookkeeping cost charged once per split
pub const DEFAULT_SPLIT_OVERHEAD: Size = 0;

// =============================================================================
// DRIVER
// =============================================================================

/// Interval between simulation steps (1 second)
pub const DEFAULT_STEP_INTERVAL_MS: u64 = 1000;

// =============================================================================
// PRESENTATION
// =============================================================================

/// Blocks whose display share falls at or below this percentage get no label
pub const LABEL_HIDE_THRESHOLD_PCT: f64 = 2.0;

/// Blocks must exceed this percentage to show their occupant's pid
pub const LABEL_PID_THRESHOLD_PCT: f64 = 10.0;
