/*!
 * Step Observers
 * Presentation hooks: each receives one report per completed step
 */

use super::report::StepReport;
use crate::monitoring::render::format_layout;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

/// Receives a report after every step
pub trait StepObserver: Send {
    fn on_step(&mut self, report: &StepReport);
}

impl<F> StepObserver for F
where
    F: FnMut(&StepReport) + Send,
{
    fn on_step(&mut self, report: &StepReport) {
        self(report)
    }
}

/// Logs a summary line and the text layout of the heap
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StepObserver for TracingObserver {
    fn on_step(&mut self, report: &StepReport) {
        info!(
            step = report.step,
            strategy = %report.strategy,
            allocations = report.allocations(),
            deferrals = report.deferrals(),
            releases = report.releases(),
            compactions = report.compactions(),
            external_fragmentation = report.stats.external_fragmentation,
            internal_fragmentation = report.internal_fragmentation,
            active = report.processes.len(),
            "{}",
            format_layout(&report.blocks)
        );
    }
}

/// Keeps every report; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    reports: Arc<Mutex<Vec<StepReport>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<StepReport> {
        self.reports.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }
}

impl StepObserver for RecordingObserver {
    fn on_step(&mut self, report: &StepReport) {
        self.reports.lock().push(report.clone());
    }
}

/// Writes one JSON document per step (newline delimited)
pub struct JsonObserver<W> {
    writer: W,
}

impl<W: Write + Send> JsonObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> StepObserver for JsonObserver<W> {
    fn on_step(&mut self, report: &StepReport) {
        let result = serde_json::to_writer(&mut self.writer, report)
            .map_err(std::io::Error::from)
            .and_then(|_| self.writer.write_all(b"\n"))
            .and_then(|_| self.writer.flush());
        if let Err(e) = result {
            warn!(error = %e, step = report.step, "failed to write step report");
        }
    }
}
