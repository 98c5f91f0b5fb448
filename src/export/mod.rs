/*!
 * Results Export
 * Durable record of terminated processes
 */

pub mod csv;

use crate::core::types::SimResult;
use crate::process::Process;

pub use csv::{read_from, read_results, write_results, write_to, CsvFileSink, CsvWriterSink, ResultRecord};

/// Destination for the terminated set of a run
pub trait ResultsSink {
    /// Export terminated processes in order, returning the number of rows written
    fn export(&mut self, processes: &[Process]) -> SimResult<usize>;
}
