pub use crate::assertion::{print_assertion_stats, Assertion, FifoAssertions};
pub use crate::fifo::{CycleInput, FifoConfig, FifoSync, Registers, Word};
pub use crate::scoreboard::{Compare, Scoreboard};
pub use crate::sim_if::{LogicalSim, SimIf};
pub use crate::test::{FifoTests, Mismatch, Test};
pub use crate::testbench::{FifoTb, ScenarioReport, TbConfig};
pub use crate::utils::Stimulus;
pub use crate::{run_scenario, run_scenario_with, FifoErr, FifoResult, PhaseResult, DEFAULT_SEED};
