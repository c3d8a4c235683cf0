/*!
 * Text Rendering
 * Plain-text views of heap snapshots and process tables
 */

use crate::core::limits::{LABEL_HIDE_THRESHOLD_PCT, LABEL_PID_THRESHOLD_PCT};
use crate::core::types::Size;
use crate::memory::{BlockSnapshot, MemoryInfo};
use crate::process::ProcessInfo;
use std::fmt::Write;

/// One-line layout, head to tail: `[| 60*1 | 140 | 300 |]`
///
/// Occupied blocks are starred and followed by their occupant's pid.
pub fn format_layout(blocks: &[BlockSnapshot]) -> String {
    let mut out = String::from("[|");
    for block in blocks {
        let _ = match block.process_id {
            Some(pid) => write!(out, " {}*{} |", block.size, pid),
            None => write!(out, " {} |", block.size),
        };
    }
    out.push(']');
    out
}

/// Label a renderer would draw on a block, if any
///
/// Tiny blocks get no label; the pid only shows on blocks large enough to fit it.
pub fn block_label(block: &BlockSnapshot, total_capacity: Size, overhead: Size) -> Option<String> {
    let share = block.display_share(total_capacity, overhead);
    if share <= LABEL_HIDE_THRESHOLD_PCT {
        return None;
    }
    match block.process_id {
        Some(pid) if share > LABEL_PID_THRESHOLD_PCT => {
            Some(format!("{}K (PID {})", block.size, pid))
        }
        _ => Some(format!("{}K", block.size)),
    }
}

/// Multi-line heap view with proportional shares
pub fn format_heap<M: MemoryInfo + ?Sized>(heap: &M) -> String {
    let total = heap.total_capacity();
    let overhead = heap.overhead();
    let mut out = String::new();
    for (index, block) in heap.snapshot().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3} {:>8} {:>6.2}% {}",
            index,
            block.state,
            block.display_share(total, overhead),
            block_label(block, total, overhead).unwrap_or_default()
        );
    }
    let stats = heap.stats();
    let _ = write!(
        out,
        "free {} / {} ({:.1}%) in {} blocks",
        stats.external_fragmentation,
        stats.total_capacity,
        stats.free_percentage(),
        stats.free_blocks
    );
    out
}

/// Process table: pid, size, remaining lifetime
pub fn format_process_table(processes: &[ProcessInfo]) -> String {
    let mut out = String::from("PID   SIZE  TIME LEFT\n");
    for process in processes {
        let _ = writeln!(
            out,
            "{:<5} {:<5} {}",
            process.pid, process.size, process.remaining_lifetime
        );
    }
    out
}
