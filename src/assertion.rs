use crate::sim_if::SimIf;

/// Named check evaluated on demand, with running statistics.
#[derive(Debug, Clone)]
pub struct Assertion {
    name: String,
    enabled: bool,
    triggered: u32,
    failed: u32,
    passed: u32,
}

impl Assertion {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            triggered: 0,
            failed: 0,
            passed: 0,
        }
    }
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
    /// Records one evaluation. Returns `holds` so callers can branch on it.
    pub fn check(&mut self, holds: bool) -> bool {
        self.triggered += 1;
        if self.enabled {
            if holds {
                self.passed += 1;
            } else {
                self.failed += 1;
            }
        }
        holds
    }
    pub fn triggered(&self) -> u32 {
        self.triggered
    }
    pub fn failed(&self) -> u32 {
        self.failed
    }
    pub fn passed(&self) -> u32 {
        self.passed
    }
    pub fn result_str(&self) -> String {
        format!(
            "Assertion {}: Triggered: {}, Passed: {}, Failed: {}.",
            self.name, self.triggered, self.passed, self.failed
        )
    }
}

/// The assertions a FIFO testbench evaluates every cycle or on overflow and underflow attempts.
#[derive(Debug, Clone)]
pub struct FifoAssertions {
    pub flags_consistent: Assertion,
    pub overflow_invariance: Assertion,
    pub underflow_invariance: Assertion,
}

impl FifoAssertions {
    pub fn new() -> Self {
        Self {
            flags_consistent: Assertion::new("flags_consistent"),
            overflow_invariance: Assertion::new("overflow_invariance"),
            underflow_invariance: Assertion::new("underflow_invariance"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assertion> {
        [
            &self.flags_consistent,
            &self.overflow_invariance,
            &self.underflow_invariance,
        ]
        .into_iter()
    }

    pub fn total_failed(&self) -> u32 {
        self.iter().map(Assertion::failed).sum()
    }
}

impl Default for FifoAssertions {
    fn default() -> Self {
        Self::new()
    }
}

pub fn print_assertion_stats(sim: &mut impl SimIf, assertions: &FifoAssertions) {
    for assertion in assertions.iter() {
        sim.log(assertion.result_str().as_str());
    }
}
