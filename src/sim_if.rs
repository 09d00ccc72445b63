use crate::{FifoErr, FifoResult};
use num_format::{Locale, ToFormattedString};

pub trait SimIf {
    fn get_sim_time_steps(&self) -> u64;
    fn get_sim_precision(&self) -> i8;
    fn advance_steps(&mut self, steps: u64);
    fn log(&mut self, s: &str);
    fn get_sim_time(&self, unit: &str) -> FifoResult<f64> {
        // this function does not preserve precision, so don't use carelessly
        let t = self.get_sim_time_steps() as f64;
        let precision = self.get_sim_precision();
        Ok(ldexp10(t, precision - time_scale(unit)?))
    }
    fn get_sim_steps(&self, time: f64, unit: &str) -> FifoResult<u64> {
        let precision = self.get_sim_precision();
        let steps = ldexp10(time, time_scale(unit)? - precision);
        if steps % 1.0 == 0.0 {
            Ok(steps as u64)
        } else {
            Err(FifoErr::InexactTime {
                time,
                unit: unit.to_string(),
            })
        }
    }
}

fn time_scale(unit: &str) -> FifoResult<i8> {
    match unit {
        "fs" => Ok(-15),
        "ps" => Ok(-12),
        "ns" => Ok(-9),
        "us" => Ok(-6),
        "ms" => Ok(-3),
        "sec" => Ok(0),
        _ => Err(FifoErr::UnknownTimeUnit(unit.to_string())),
    }
}

fn ldexp10(frac: f64, exp: i8) -> f64 {
    // Like math.ldexp, but base 10
    if exp >= 0 {
        frac * 10_u64.pow(exp as u32) as f64
    } else {
        let div = 10_u64.pow(-exp as u32) as f64;
        frac / div
    }
}

enum LogSink {
    Stdout,
    Captured(Vec<String>),
}

/// Logical clock standing in for a simulator kernel: time only moves when
/// the testbench ticks it, and never feeds back into the model.
pub struct LogicalSim {
    steps: u64,
    sink: LogSink,
}

impl LogicalSim {
    /// One step is 1 ps.
    pub const PRECISION: i8 = -12;

    pub fn new() -> Self {
        Self {
            steps: 0,
            sink: LogSink::Stdout,
        }
    }

    /// Keeps log lines in memory instead of printing them.
    pub fn captured() -> Self {
        Self {
            steps: 0,
            sink: LogSink::Captured(Vec::new()),
        }
    }

    pub fn lines(&self) -> &[String] {
        match &self.sink {
            LogSink::Captured(lines) => lines.as_slice(),
            LogSink::Stdout => &[],
        }
    }

    fn stamp(&self, msg: &str) -> String {
        let t = ldexp10(self.steps as f64, Self::PRECISION + 9);
        let int = t.floor() as u64;
        let mut frac_str = format!("{:.3}", t % 1.0);
        frac_str.remove(0);
        format!("{}{}ns {}", int.to_formatted_string(&Locale::en), frac_str, msg)
    }
}

impl Default for LogicalSim {
    fn default() -> Self {
        Self::new()
    }
}

impl SimIf for LogicalSim {
    fn get_sim_time_steps(&self) -> u64 {
        self.steps
    }
    fn get_sim_precision(&self) -> i8 {
        Self::PRECISION
    }
    fn advance_steps(&mut self, steps: u64) {
        self.steps += steps;
    }
    fn log(&mut self, msg: &str) {
        let line = self.stamp(msg);
        match &mut self.sink {
            LogSink::Stdout => println!("{}", line),
            LogSink::Captured(lines) => lines.push(line),
        }
    }
}
