/*!
 * Process Table
 * Active processes in creation order, with their id generator
 */

use super::types::{Process, ProcessError, ProcessInfo, ProcessResult};
use crate::core::id::{Pid, PidGenerator};
use crate::core::types::{Lifetime, Size};
use log::info;

/// Ordered collection of active processes
///
/// Insertion order is creation order; the simulation visits processes in
/// this order every step, which gives earlier submissions first access to
/// free space.
#[derive(Debug, Default)]
pub struct ProcessTable {
    ids: PidGenerator,
    processes: Vec<Process>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a process with the next id and append it to the table
    pub fn create(&mut self, size: Size, lifetime: Lifetime) -> ProcessResult<Pid> {
        let process = Process::new(&self.ids, size, lifetime)?;
        let pid = process.id();
        info!(
            "Created PID {} requesting {} units for {} steps",
            pid, size, lifetime
        );
        self.processes.push(process);
        Ok(pid)
    }

    pub fn get(&self, pid: Pid) -> Option<&Process> {
        self.processes.iter().find(|p| p.id() == pid)
    }

    pub fn get_mut(&mut self, pid: Pid) -> Option<&mut Process> {
        self.processes.iter_mut().find(|p| p.id() == pid)
    }

    /// Remove a process, keeping the order of the rest
    pub fn remove(&mut self, pid: Pid) -> ProcessResult<Process> {
        let index = self
            .processes
            .iter()
            .position(|p| p.id() == pid)
            .ok_or(ProcessError::ProcessNotFound(pid))?;
        Ok(self.processes.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Process> {
        self.processes.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Process> {
        self.processes.iter_mut()
    }

    /// Drop every process for which `keep` returns false
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&Process) -> bool,
    {
        self.processes.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Processes still waiting for a block
    pub fn waiting(&self) -> usize {
        self.processes.iter().filter(|p| !p.is_allocated()).count()
    }

    pub fn infos(&self) -> Vec<ProcessInfo> {
        self.processes.iter().map(Process::info).collect()
    }
}
