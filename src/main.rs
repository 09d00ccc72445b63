use std::process::ExitCode;
use syncfifo::{junit, run_scenario, DEFAULT_SEED};

fn main() -> ExitCode {
    let seed = match std::env::args().nth(1) {
        None => DEFAULT_SEED,
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(_) => {
                eprintln!("usage: syncfifo [SEED]  (got '{}')", arg);
                return ExitCode::from(2);
            }
        },
    };

    let report = match run_scenario(seed) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = junit::create_junit_xml(&report.tests, "syncfifo", "results.xml") {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match report.passed() {
        true => ExitCode::SUCCESS,
        false => ExitCode::FAILURE,
    }
}
