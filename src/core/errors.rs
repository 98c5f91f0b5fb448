/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::Pid;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process submission errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ParseError {
    #[error("Empty process description")]
    #[diagnostic(
        code(parse::empty),
        help("Enter a process as `<pid> ; <arrival time> ; <burst time>`.")
    )]
    Empty,

    #[error("Expected 3 fields separated by ';', found {found}")]
    #[diagnostic(
        code(parse::field_count),
        help("A process has exactly three fields: `<pid> ; <arrival time> ; <burst time>`.")
    )]
    FieldCount { found: usize },

    #[error("Invalid {field}: '{value}' is not an integer")]
    #[diagnostic(
        code(parse::invalid_number),
        help("pid, arrival time and burst time must all be whole numbers.")
    )]
    InvalidNumber { field: String, value: String },

    #[error("Invalid arrival time {0}: must not be negative")]
    #[diagnostic(
        code(parse::negative_arrival),
        help("Arrival time is a clock value and starts at 0.")
    )]
    NegativeArrival(i64),

    #[error("Invalid burst time {0}: must be positive")]
    #[diagnostic(
        code(parse::non_positive_burst),
        help("A process needs at least one time unit of CPU.")
    )]
    NonPositiveBurst(i64),

    #[error("Invalid {field}: {value} is too large")]
    #[diagnostic(
        code(parse::out_of_range),
        help("Times must fit the simulation clock; use smaller values.")
    )]
    OutOfRange { field: String, value: i64 },

    #[error("Line {line}: {source}")]
    #[diagnostic(code(parse::line))]
    AtLine {
        line: usize,
        #[source]
        source: Box<ParseError>,
    },
}

/// Unified simulator error type with miette diagnostics
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SimulationError {
    #[error("Parse error: {0}")]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid state: {0}")]
    #[diagnostic(
        code(simulation::invalid_state),
        help("Runs must be started and stopped in turn. Stop the active run first.")
    )]
    InvalidState(String),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(simulation::io_error),
        help("Check that the destination directory exists and is writable.")
    )]
    Io(String),

    #[error("Malformed results file: {0}")]
    #[diagnostic(
        code(simulation::export_format),
        help("The file must start with the results header row followed by 7 numeric columns.")
    )]
    Export(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(simulation::configuration_error),
        help("Check the RR_SIM_* environment variables and command line flags.")
    )]
    Configuration(String),

    #[error("No terminated processes to compute metrics from")]
    #[diagnostic(
        code(simulation::no_terminated_processes),
        help("Let the run continue until at least one process completes.")
    )]
    NoTerminatedProcesses,

    #[error("Cannot compute a quantum for an empty ready queue")]
    #[diagnostic(code(simulation::empty_ready_queue))]
    EmptyReadyQueue,

    #[error("Process {0} already submitted")]
    #[diagnostic(
        code(simulation::duplicate_pid),
        help("Process ids must be unique within a simulation.")
    )]
    DuplicatePid(Pid),

    #[error("Process {0} not found")]
    #[diagnostic(
        code(simulation::process_not_found),
        help("Only processes that have not been run yet can be removed.")
    )]
    ProcessNotFound(Pid),

    #[error("Simulation worker panicked")]
    #[diagnostic(
        code(simulation::worker_panicked),
        help("This is a bug. Run with RUST_LOG=debug and report the log.")
    )]
    WorkerPanicked,
}

impl SimulationError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        SimulationError::InvalidState(msg.into())
    }
}

// Implement conversion from std::io::Error
impl From<std::io::Error> for SimulationError {
    fn from(err: std::io::Error) -> Self {
        SimulationError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::FieldCount { found: 2 };
        assert_eq!(
            err.to_string(),
            "Expected 3 fields separated by ';', found 2"
        );

        let err = ParseError::AtLine {
            line: 4,
            source: Box::new(ParseError::NonPositiveBurst(0)),
        };
        assert_eq!(err.to_string(), "Line 4: Invalid burst time 0: must be positive");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing dir");
        let err: SimulationError = io.into();
        assert!(matches!(err, SimulationError::Io(ref msg) if msg.contains("missing dir")));
    }

    #[test]
    fn test_error_serialization() {
        let err = SimulationError::DuplicatePid(3);
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#"{"error_type":"duplicate_pid","details":3}"#);

        let back: SimulationError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, err);
    }

    #[test]
    fn test_parse_error_wraps() {
        let err: SimulationError = ParseError::Empty.into();
        assert_eq!(err, SimulationError::Parse(ParseError::Empty));
    }
}
