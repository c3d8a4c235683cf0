/*!
 * Allocation Simulator - Main Entry Point
 *
 * Headless driver for the heap simulation:
 * - Loads configuration (SIM_CONFIG file or SIM_* variables)
 * - Submits the SIM_WORKLOAD processes
 * - Steps the heap once per interval until SIM_STEPS, idle, or Ctrl+C
 */

use std::error::Error;
use tracing::info;

use alloc_sim::monitoring::{format_heap, format_process_table, init_tracing};
use alloc_sim::simulation::parse_workload;
use alloc_sim::{
    ConfigError, IntervalClock, JsonObserver, RunLimits, Simulation, SimulationConfig,
    SimulationTask, StepObserver, StepReport, TracingObserver,
};

fn load_config() -> Result<SimulationConfig, ConfigError> {
    match std::env::var("SIM_CONFIG") {
        Ok(path) => {
            let document = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                message: e.to_string(),
            })?;
            info!(path = %path, "Loading configuration file");
            SimulationConfig::from_json(&document)?.with_overrides(|key| std::env::var(key).ok())
        }
        Err(_) => SimulationConfig::from_env(),
    }
}

fn run_limits() -> Result<RunLimits, ConfigError> {
    let max_steps = match std::env::var("SIM_STEPS") {
        Ok(raw) => Some(
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::invalid("SIM_STEPS", &raw, "expected a step count"))?,
        ),
        Err(_) => None,
    };
    Ok(RunLimits {
        max_steps,
        stop_when_idle: true,
    })
}

/// SIM_OUTPUT=json streams reports to stdout, anything else logs them
fn select_observer() -> Box<dyn StepObserver> {
    let json = std::env::var("SIM_OUTPUT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        Box::new(JsonObserver::new(std::io::stdout()))
    } else {
        Box::new(TracingObserver)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("Allocation simulator starting...");
    info!("================================================");

    let config = load_config()?;
    let limits = run_limits()?;
    info!(
        blocks = ?config.block_sizes,
        overhead = config.split_overhead,
        interval_ms = config.step_interval_ms,
        strategy = %config.strategy,
        fragmentation = config.fragmentation,
        compaction = config.compaction,
        "Configuration loaded"
    );

    let mut simulation = Simulation::new(config.clone())?;
    if let Ok(raw) = std::env::var("SIM_WORKLOAD") {
        for (size, lifetime) in parse_workload(&raw)? {
            simulation.submit(size, lifetime)?;
        }
    }
    info!("Initial heap:\n{}", format_heap(simulation.heap()));

    let mut observer = select_observer();
    let clock = IntervalClock::new(config.step_interval());
    let mut task = SimulationTask::spawn(
        simulation,
        clock,
        move |report: &StepReport| observer.on_step(report),
        limits,
    );

    info!("Simulation running - press Ctrl+C to exit");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received");
        }
        _ = task.wait() => {}
    }

    if let Some(simulation) = task.shutdown().await {
        info!(
            steps = simulation.current_step(),
            internal_fragmentation = simulation.internal_fragmentation(),
            external_fragmentation = simulation.external_fragmentation(),
            active = simulation.processes().len(),
            "Simulation finished"
        );
        info!("Final heap:\n{}", format_heap(simulation.heap()));
        if !simulation.processes().is_empty() {
            info!(
                "Remaining processes:\n{}",
                format_process_table(&simulation.processes().infos())
            );
        }
    }

    info!("Allocation simulator stopped");
    Ok(())
}
