/*!
 * Simulation Task - Clock-Driven Stepping
 *
 * Background task that advances a `Simulation` once per clock tick and
 * pushes each report to an observer. Control commands (new processes,
 * mode toggles, pause) are applied between steps, never during one.
 */

use super::clock::Clock;
use crate::core::types::{Lifetime, Size, Step};
use crate::memory::AllocationStrategy;
use crate::monitoring::span_step;
use crate::simulation::{Simulation, StepObserver};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Control messages for the simulation task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationCommand {
    /// Create a new process
    Submit { size: Size, lifetime: Lifetime },
    /// Switch placement strategy
    SetStrategy(AllocationStrategy),
    /// Toggle whole-block grants
    SetFragmentation(bool),
    /// Toggle compaction after failed allocations
    SetCompaction(bool),
    /// Change the step interval
    SetInterval(Duration),
    /// Stop stepping (commands are still served)
    Pause,
    /// Resume stepping
    Resume,
    /// Stop the task and hand back the simulation
    Shutdown,
}

/// When the task stops on its own
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    /// Stop after this many completed steps
    pub max_steps: Option<Step>,
    /// Stop once a step leaves no active process
    pub stop_when_idle: bool,
}

/// Handle to the simulation background task
pub struct SimulationTask {
    command_tx: mpsc::UnboundedSender<SimulationCommand>,
    handle: Option<tokio::task::JoinHandle<Simulation>>,
    finished: Option<Simulation>,
}

impl SimulationTask {
    /// Spawn the loop on the current tokio runtime
    pub fn spawn<C, O>(simulation: Simulation, clock: C, observer: O, limits: RunLimits) -> Self
    where
        C: Clock,
        O: StepObserver + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            run_simulation_loop(simulation, clock, observer, command_rx, limits).await
        });

        info!(
            max_steps = ?limits.max_steps,
            stop_when_idle = limits.stop_when_idle,
            "Simulation task spawned"
        );

        Self {
            command_tx,
            handle: Some(handle),
            finished: None,
        }
    }

    /// Send a command; false if the task has already stopped
    pub fn send(&self, command: SimulationCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    pub fn submit(&self, size: Size, lifetime: Lifetime) -> bool {
        self.send(SimulationCommand::Submit { size, lifetime })
    }

    pub fn set_strategy(&self, strategy: AllocationStrategy) -> bool {
        self.send(SimulationCommand::SetStrategy(strategy))
    }

    pub fn set_fragmentation(&self, enabled: bool) -> bool {
        self.send(SimulationCommand::SetFragmentation(enabled))
    }

    pub fn set_compaction(&self, enabled: bool) -> bool {
        self.send(SimulationCommand::SetCompaction(enabled))
    }

    pub fn pause(&self) -> bool {
        self.send(SimulationCommand::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(SimulationCommand::Resume)
    }

    /// Wait for the loop to stop on its own (limits reached or a step failed)
    ///
    /// Cancel-safe: dropping this future leaves the task running.
    pub async fn wait(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            let result = handle.await;
            self.handle = None;
            match result {
                Ok(simulation) => self.finished = Some(simulation),
                Err(e) => warn!("Simulation task ended abnormally: {}", e),
            }
        }
    }

    /// Stop the loop and take back the simulation
    pub async fn shutdown(mut self) -> Option<Simulation> {
        let _ = self.command_tx.send(SimulationCommand::Shutdown);
        self.wait().await;
        info!("Simulation task shutdown complete");
        self.finished.take()
    }
}

impl Drop for SimulationTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(SimulationCommand::Shutdown);
        }
    }
}

/// Core loop: commands first, then at most one step per tick
async fn run_simulation_loop<C, O>(
    mut simulation: Simulation,
    mut clock: C,
    mut observer: O,
    mut command_rx: mpsc::UnboundedReceiver<SimulationCommand>,
    limits: RunLimits,
) -> Simulation
where
    C: Clock,
    O: StepObserver,
{
    let mut active = true;
    info!("Simulation loop started");

    loop {
        tokio::select! {
            biased;

            Some(cmd) = command_rx.recv() => {
                if !apply_command(&mut simulation, &mut clock, &mut active, cmd) {
                    break;
                }
            }

            // Paused: only commands wake the loop
            _ = clock.next_tick(), if active => {
                let span = span_step(simulation.current_step() + 1);
                let report = {
                    let _entered = span.enter();
                    simulation.step()
                };
                match report {
                    Ok(report) => {
                        span.record_counts(report.allocations(), report.releases(), report.compactions());
                        observer.on_step(&report);
                    }
                    Err(e) => {
                        error!(error = %e, step = simulation.current_step(), "Simulation step failed");
                        break;
                    }
                }

                if limits.max_steps.is_some_and(|max| simulation.current_step() >= max) {
                    info!(steps = simulation.current_step(), "Step limit reached");
                    break;
                }
                if limits.stop_when_idle && simulation.is_idle() {
                    info!(steps = simulation.current_step(), "All processes finished");
                    break;
                }
            }

            else => {
                warn!("Command channel closed, stopping simulation loop");
                break;
            }
        }
    }

    simulation
}

/// Apply one command; false means stop
fn apply_command<C: Clock>(
    simulation: &mut Simulation,
    clock: &mut C,
    active: &mut bool,
    cmd: SimulationCommand,
) -> bool {
    match cmd {
        SimulationCommand::Submit { size, lifetime } => {
            if let Err(e) = simulation.submit(size, lifetime) {
                warn!(error = %e, "Rejected process submission");
            }
        }
        SimulationCommand::SetStrategy(strategy) => {
            info!(strategy = %strategy, "Allocation strategy changed");
            simulation.set_strategy(strategy);
        }
        SimulationCommand::SetFragmentation(enabled) => {
            info!(enabled, "Fragmentation mode changed");
            simulation.set_fragmentation(enabled);
        }
        SimulationCommand::SetCompaction(enabled) => {
            info!(enabled, "Compaction changed");
            simulation.set_compaction(enabled);
        }
        SimulationCommand::SetInterval(period) => {
            info!(period_ms = period.as_millis() as u64, "Step interval changed");
            clock.set_period(period);
        }
        SimulationCommand::Pause => {
            info!("Simulation paused");
            *active = false;
        }
        SimulationCommand::Resume => {
            info!("Simulation resumed");
            *active = true;
        }
        SimulationCommand::Shutdown => {
            info!("Simulation task shutting down");
            return false;
        }
    }
    true
}
