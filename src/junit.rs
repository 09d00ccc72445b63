use crate::test::FifoTests;
use crate::{FifoErr, FifoResult};
use junit_report::{Duration, ReportBuilder, TestCaseBuilder, TestSuiteBuilder};
use std::io::Write;

/// Writes one JUnit test case per scenario phase.
pub fn write_junit_xml(tests: &FifoTests, suite: &str, sink: impl Write) -> FifoResult<()> {
    let mut test_cases = Vec::new();

    for t in tests.iter() {
        let tc = match (&t.result, t.passed()) {
            (_, true) => TestCaseBuilder::success(&t.name, Duration::seconds_f64(t.time_secs)),
            (result, false) => {
                let mut msg = match result {
                    Some(Ok(msg)) | Some(Err(msg)) => msg.clone(),
                    None => "no result recorded".to_string(),
                };
                for m in t.mismatches.iter() {
                    msg.push_str(&format!("; {:.3}ns {}", m.time_ns, m.msg));
                }
                TestCaseBuilder::failure(
                    &t.name,
                    Duration::seconds_f64(t.time_secs),
                    "failure",
                    &msg,
                )
            }
        }
        .build();
        test_cases.push(tc);
    }

    let test_suite = TestSuiteBuilder::new(suite)
        .add_testcases(test_cases)
        .build();
    let report = ReportBuilder::new().add_testsuite(test_suite).build();
    report
        .write_xml(sink)
        .map_err(|e| FifoErr::Report(e.to_string()))
}

pub fn create_junit_xml(tests: &FifoTests, suite: &str, path: &str) -> FifoResult<()> {
    let file = std::fs::File::create(path).map_err(|e| FifoErr::Report(e.to_string()))?;
    write_junit_xml(tests, suite, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Test;

    #[test]
    fn one_case_per_phase() {
        let mut tests = FifoTests::new();
        let mut ok = Test::new("write_burst");
        ok.set_result(Ok("wrote 10 words".to_string()));
        let mut bad = Test::new("drain");
        bad.set_result(Ok("drained 16 words".to_string()));
        bad.mismatch(520.0, "ERROR: Expected 3, got 4".to_string());
        tests.push(ok);
        tests.push(bad);

        let mut out = Vec::new();
        write_junit_xml(&tests, "syncfifo", &mut out).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("testsuite"));
        assert!(xml.contains("write_burst"));
        assert!(xml.contains("Expected 3, got 4"));
    }
}
