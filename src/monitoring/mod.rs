/*!
 * Monitoring
 * Tracing setup and text rendering for observers
 */

pub mod render;
mod tracer;

pub use render::{format_heap, format_layout, format_process_table};
pub use tracer::{init_tracing, span_step, StepSpan};
