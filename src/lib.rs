pub mod assertion;
pub mod fifo;
pub mod junit;
pub mod prelude;
pub mod scoreboard;
pub mod sim_if;
pub mod testbench;
pub mod utils;

use prettytable::{format, Cell, Row, Table};
use sim_if::{LogicalSim, SimIf};
use testbench::{FifoTb, ScenarioReport, TbConfig};
use thiserror::Error;

pub const DEFAULT_SEED: u64 = 1;

#[derive(Debug, Error)]
pub enum FifoErr {
    #[error("FIFO depth must be at least 1")]
    ZeroDepth,
    #[error("unknown time unit '{0}'")]
    UnknownTimeUnit(String),
    #[error("can't convert time {time} {unit} to sim steps without rounding")]
    InexactTime { time: f64, unit: String },
    #[error("failed to write report: {0}")]
    Report(String),
}

pub type FifoResult<T> = Result<T, FifoErr>;
/// Pass or fail message of one scenario phase.
pub type PhaseResult = Result<String, String>;

/// Runs the scripted scenario with the default FIFO (16 x 8 bit), logging to
/// stdout, and prints the end-of-simulation summary.
pub fn run_scenario(seed: u64) -> FifoResult<ScenarioReport> {
    let config = TbConfig {
        seed,
        ..TbConfig::default()
    };
    let (report, _) = run_scenario_with(config, LogicalSim::new())?;
    Ok(report)
}

pub fn run_scenario_with<S: SimIf>(config: TbConfig, sim: S) -> FifoResult<(ScenarioReport, S)> {
    let mut tb = FifoTb::new(config, sim)?;
    tb.run()?;
    let (report, mut sim) = tb.finish()?;
    end_of_simulation(&mut sim, &report);
    Ok((report, sim))
}

pub fn summary_table(report: &ScenarioReport) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        ["PHASE", "RESULT", "CYCLES", "SIM TIME (ns)", "MISMATCHES", "MESSAGE"]
            .iter()
            .map(|s| Cell::new(s))
            .collect(),
    ));
    for t in report.tests.iter() {
        let msg = match &t.result {
            Some(Ok(msg)) | Some(Err(msg)) => msg.as_str(),
            None => "",
        };
        table.add_row(Row::new(vec![
            Cell::new(&t.name),
            Cell::new(t.result_str()),
            Cell::new(&t.cycles.to_string()),
            Cell::new(&format!("{:.3}", t.sim_time_ns)),
            Cell::new(&t.mismatches.len().to_string()),
            Cell::new(msg),
        ]));
    }
    table
}

fn end_of_simulation(sim: &mut impl SimIf, report: &ScenarioReport) {
    for line in summary_table(report).to_string().lines() {
        sim.log(line);
    }
    for t in report.tests.iter() {
        for m in t.mismatches.iter() {
            sim.log(&format!("MISMATCH {} @ {:.3}ns: {}", t.name, m.time_ns, m.msg));
        }
    }
    sim.log("TOTAL SIMULATION");
    sim.log(&format!("Cycles: {}", report.cycles));
    sim.log(&format!("Simulation time: {} ns", report.sim_time_ns));
    sim.log(&format!("Real time: {:.3} s", report.real_time_secs));
    sim.log(&format!("Simulation speed: {:.3} ns/s", report.sim_speed()));
    sim.log(&format!("Scoreboard: {}", report.scoreboard.result_str()));

    assertion::print_assertion_stats(sim, &report.assertions);

    sim.log(&format!(
        "RESULT: {} (seed={}, mismatches={})",
        match report.passed() {
            true => "PASSED",
            false => "FAILED",
        },
        report.seed,
        report.tests.mismatch_count()
    ));
}
