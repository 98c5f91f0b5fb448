/*!
 * Round-Robin Scheduling Simulator Library
 * Tick-driven CPU scheduling simulation with a dynamic time quantum
 */

pub mod core;
pub mod export;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod simulation;

// Re-exports
pub use crate::core::*;
pub use export::{CsvFileSink, ResultsSink};
pub use monitoring::{init_tracing, Metrics};
pub use process::{parse_process, parse_processes, Process, ProcessState, ProcessSummary};
pub use scheduler::{QuantumMethod, SchedEvent, Scheduler, SchedulerState, TickSnapshot};
pub use simulation::{RunReport, SimulationConfig, SimulationContext, SimulationEvent};
