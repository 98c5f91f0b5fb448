/*!
 * rr-sim - Command Line Entry Point
 *
 * Reads process descriptions, runs them through the round-robin simulator
 * until every process terminates, prints the results and exports them as CSV.
 */

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use miette::{IntoDiagnostic, Result};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tabled::{Table, Tabled};
use tracing::info;

use rr_sim::{
    init_tracing, parse_processes, CsvFileSink, QuantumMethod, RunReport, SimulationConfig,
    SimulationContext, SimulationError,
};

#[derive(Tabled)]
struct ProcessRow {
    #[tabled(rename = "PID")]
    pid: u32,
    #[tabled(rename = "Burst")]
    burst: String,
    #[tabled(rename = "Arrival")]
    arrival: String,
    #[tabled(rename = "Admitted")]
    admitted: String,
    #[tabled(rename = "Terminated")]
    terminated: String,
    #[tabled(rename = "Waiting")]
    waiting: String,
    #[tabled(rename = "Turnaround")]
    turnaround: String,
}

fn cli() -> Command {
    Command::new("rr-sim")
        .version(clap::crate_version!())
        .about("Round-robin CPU scheduling simulator with a dynamic time quantum")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Process lines `<pid> ; <arrival> ; <burst>`, read from stdin when absent"),
        )
        .arg(
            Arg::new("method")
                .short('m')
                .long("method")
                .value_name("METHOD")
                .default_value("arithmetic")
                .value_parser(|s: &str| s.parse::<QuantumMethod>())
                .help("Quantum method: arithmetic, geometric or harmonic"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("CSV export of terminated processes [default: process_meta.csv]"),
        )
        .arg(
            Arg::new("tick-delay-ms")
                .long("tick-delay-ms")
                .value_name("MS")
                .value_parser(value_parser!(u64))
                .help("Wall-clock delay between ticks"),
        )
        .arg(
            Arg::new("max-ticks")
                .long("max-ticks")
                .value_name("TICKS")
                .value_parser(value_parser!(u64))
                .help("Stop the run after this many ticks"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the run report as JSON"),
        )
}

/// Batch preset, then RR_SIM_* variables, then flags
fn build_config(matches: &ArgMatches) -> Result<SimulationConfig> {
    let mut config = SimulationConfig::instant().with_overrides(|key| std::env::var(key).ok())?;

    if let Some(&millis) = matches.get_one::<u64>("tick-delay-ms") {
        config = config.with_tick_delay(Duration::from_millis(millis));
    }
    if let Some(&max_ticks) = matches.get_one::<u64>("max-ticks") {
        config = config.with_max_ticks(max_ticks);
    }
    if let Some(path) = matches.get_one::<PathBuf>("output") {
        config = config.with_results_path(path);
    }
    Ok(config.with_stop_when_drained(true))
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    let text = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            SimulationError::Io(format!("cannot read {}: {}", path.display(), e))
        })?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(SimulationError::from)?;
            text
        }
    };
    Ok(text)
}

fn print_report(report: &RunReport) {
    let rows: Vec<ProcessRow> = report
        .terminated
        .iter()
        .map(|p| {
            let show = |t: Option<rr_sim::SimTime>| t.map(|t| t.to_string()).unwrap_or_default();
            ProcessRow {
                pid: p.pid,
                burst: p.burst_time.to_string(),
                arrival: p.arrival_time.to_string(),
                admitted: show(p.admitted_time),
                terminated: show(p.terminated_time),
                waiting: p.waiting_time.to_string(),
                turnaround: show(p.turnaround_time()),
            }
        })
        .collect();

    println!("Quantum method: {}", report.method);
    println!("{}", Table::new(rows));

    if !report.unfinished.is_empty() {
        println!("Unfinished processes: {}", report.unfinished.len());
    }
    println!(
        "CPU utilization: {:.1}% over {} ticks",
        report.stats.utilization() * 100.0,
        report.stats.ticks
    );
    match &report.metrics {
        Some(metrics) => println!("\n{}", metrics),
        None => println!("\nNo process terminated; no metrics available."),
    }
}

fn main() -> Result<()> {
    init_tracing();

    let matches = cli().get_matches();
    let config = build_config(&matches)?;
    let method = matches
        .get_one::<QuantumMethod>("method")
        .copied()
        .unwrap_or_default();

    let text = read_input(matches.get_one::<PathBuf>("input"))?;
    let processes = parse_processes(&text).map_err(SimulationError::from)?;
    info!(processes = processes.len(), method = %method, "Workload loaded");

    let results_path = config.results_path.clone();
    let mut ctx = SimulationContext::new(config);
    for process in processes {
        ctx.submit(process)?;
    }

    ctx.start_run(method)?;
    let report = ctx.wait()?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        print_report(&report);
    }

    let rows = report.export(&mut CsvFileSink::new(&results_path))?;
    if !matches.get_flag("json") {
        println!("\nWrote {} rows to {}", rows, results_path.display());
    }
    Ok(())
}
