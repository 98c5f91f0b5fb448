/*!
 * Process Module
 * Simulated processes and their textual input format
 */

pub mod parser;
pub mod types;

// Re-export for convenience
pub use parser::{parse_process, parse_processes};
pub use types::{Process, ProcessState, ProcessSummary};
