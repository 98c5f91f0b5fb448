/*!
 * CSV Results
 * Flat tabular export of terminated processes and its reader
 */

use super::ResultsSink;
use crate::core::errors::SimulationError;
use crate::core::limits::RESULTS_HEADER;
use crate::core::types::{Pid, SimResult, SimTime};
use crate::process::Process;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const COLUMNS: usize = 7;

/// One exported row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub pid: Pid,
    pub burst_time: SimTime,
    pub arrival_time: SimTime,
    pub admitted_time: SimTime,
    pub terminated_time: SimTime,
    pub waiting_time: SimTime,
    pub turnaround_time: SimTime,
}

impl ResultRecord {
    /// Row for a terminated process; `None` while it is still unfinished
    pub fn from_process(process: &Process) -> Option<Self> {
        Some(Self {
            pid: process.pid,
            burst_time: process.burst_time,
            arrival_time: process.arrival_time,
            admitted_time: process.admitted_time?,
            terminated_time: process.terminated_time?,
            waiting_time: process.waiting_time,
            turnaround_time: process.turnaround_time()?,
        })
    }

    fn write_row<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            self.pid,
            self.burst_time,
            self.arrival_time,
            self.admitted_time,
            self.terminated_time,
            self.waiting_time,
            self.turnaround_time
        )
    }

    fn parse_row(line: &str, line_no: usize) -> SimResult<Self> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != COLUMNS {
            return Err(SimulationError::Export(format!(
                "line {}: expected {} columns, found {}",
                line_no,
                COLUMNS,
                fields.len()
            )));
        }

        let pid = fields[0].parse::<Pid>().map_err(|_| {
            SimulationError::Export(format!("line {}: invalid pid '{}'", line_no, fields[0]))
        })?;
        let time = |idx: usize| -> SimResult<SimTime> {
            match fields[idx].parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Ok(SimTime::from_units_f64(v)),
                _ => Err(SimulationError::Export(format!(
                    "line {}: invalid time '{}'",
                    line_no, fields[idx]
                ))),
            }
        };

        Ok(Self {
            pid,
            burst_time: time(1)?,
            arrival_time: time(2)?,
            admitted_time: time(3)?,
            terminated_time: time(4)?,
            waiting_time: time(5)?,
            turnaround_time: time(6)?,
        })
    }
}

/// Write the header and one row per terminated process, in order
///
/// Unfinished processes are skipped. Returns the number of rows written.
pub fn write_to<W: Write>(out: &mut W, processes: &[Process]) -> SimResult<usize> {
    writeln!(out, "{}", RESULTS_HEADER)?;

    let mut rows = 0;
    for record in processes.iter().filter_map(ResultRecord::from_process) {
        record.write_row(out)?;
        rows += 1;
    }
    out.flush()?;
    Ok(rows)
}

/// Create or truncate `path` and export the terminated processes into it
pub fn write_results(path: impl AsRef<Path>, processes: &[Process]) -> SimResult<usize> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| {
        SimulationError::Io(format!("cannot create {}: {}", path.display(), e))
    })?;

    let rows = write_to(&mut BufWriter::new(file), processes)?;
    info!(path = %path.display(), rows, "Results exported");
    Ok(rows)
}

/// Read an export back into records
pub fn read_from<R: BufRead>(input: R) -> SimResult<Vec<ResultRecord>> {
    let mut lines = input.lines();

    match lines.next().transpose()? {
        Some(header) if header.trim() == RESULTS_HEADER => {}
        Some(header) => {
            return Err(SimulationError::Export(format!(
                "unexpected header '{}'",
                header.trim()
            )))
        }
        None => return Err(SimulationError::Export("empty file".to_string())),
    }

    let mut records = Vec::new();
    for (idx, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        // Header is line 1
        records.push(ResultRecord::parse_row(&line, idx + 2)?);
    }

    debug!(rows = records.len(), "Results parsed");
    Ok(records)
}

pub fn read_results(path: impl AsRef<Path>) -> SimResult<Vec<ResultRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| SimulationError::Io(format!("cannot open {}: {}", path.display(), e)))?;
    read_from(BufReader::new(file))
}

/// Results sink writing a CSV file
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    path: PathBuf,
}

impl CsvFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsSink for CsvFileSink {
    fn export(&mut self, processes: &[Process]) -> SimResult<usize> {
        write_results(&self.path, processes)
    }
}

/// Results sink writing CSV into any writer
#[derive(Debug)]
pub struct CsvWriterSink<W: Write> {
    out: W,
}

impl<W: Write> CsvWriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultsSink for CsvWriterSink<W> {
    fn export(&mut self, processes: &[Process]) -> SimResult<usize> {
        write_to(&mut self.out, processes)
    }
}
