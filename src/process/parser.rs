/*!
 * Process Parser
 * Turns `<pid> ; <arrival time> ; <burst time>` text into processes
 */

use super::types::Process;
use crate::core::errors::ParseError;
use crate::core::types::{Pid, SimTime};

const FIELD_SEPARATOR: char = ';';

/// Parse a single process description
///
/// Whitespace around the separators is ignored. Arrival time must be
/// non-negative and burst time positive; both are whole time units.
pub fn parse_process(text: &str) -> Result<Process, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let fields: Vec<&str> = text.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() != 3 {
        return Err(ParseError::FieldCount {
            found: fields.len(),
        });
    }

    let pid: Pid = fields[0]
        .parse()
        .map_err(|_| invalid_number("pid", fields[0]))?;
    let arrival = parse_integer("arrival time", fields[1])?;
    let burst = parse_integer("burst time", fields[2])?;

    if arrival < 0 {
        return Err(ParseError::NegativeArrival(arrival));
    }
    if burst <= 0 {
        return Err(ParseError::NonPositiveBurst(burst));
    }

    Ok(Process::new(
        pid,
        to_time("arrival time", arrival)?,
        to_time("burst time", burst)?,
    ))
}

/// Parse one process per line
///
/// Blank lines and `#` comments are skipped. The first malformed line aborts
/// parsing and is reported with its 1-based line number.
pub fn parse_processes(text: &str) -> Result<Vec<Process>, ParseError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            parse_process(line).map_err(|e| ParseError::AtLine {
                line: idx + 1,
                source: Box::new(e),
            })
        })
        .collect()
}

fn parse_integer(field: &str, value: &str) -> Result<i64, ParseError> {
    value.parse().map_err(|_| invalid_number(field, value))
}

/// Non-negative whole units to clock time, rejecting values the clock cannot hold
fn to_time(field: &str, units: i64) -> Result<SimTime, ParseError> {
    SimTime::checked_from_units(units as u64).ok_or_else(|| ParseError::OutOfRange {
        field: field.to_string(),
        value: units,
    })
}

fn invalid_number(field: &str, value: &str) -> ParseError {
    ParseError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    }
}
