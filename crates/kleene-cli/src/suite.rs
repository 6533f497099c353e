//! Test files with expected machine output.
//!
//! ```text
//! -- test: test_name
//! -- input: [json values]      (optional, bottom of the stack first)
//! code here
//! -- expect: [json stack]      or   -- error: message fragment
//! ```
//!
//! A test without `expect` or `error` passes when the code runs.

use anyhow::{Context, Result, bail};
use kleene::machine::{self, diagnostics};
use kleene::{Limits, Machine, Value};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Expectation {
    Runs,
    Stack(serde_json::Value),
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub input: Vec<Value>,
    pub code: String,
    pub expectation: Expectation,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn merge(&mut self, other: Summary) {
        self.total += other.total;
        self.passed += other.passed;
        self.failed += other.failed;
    }
}

pub fn parse_test_file(content: &str) -> Result<Vec<TestCase>> {
    let mut cases = Vec::new();
    let mut current: Option<TestCase> = None;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if let Some(name) = line.strip_prefix("-- test:") {
            cases.extend(current.take());
            current = Some(TestCase {
                name: name.trim().to_owned(),
                input: Vec::new(),
                code: String::new(),
                expectation: Expectation::Runs,
            });
            continue;
        }
        let Some(case) = current.as_mut() else {
            continue;
        };
        if let Some(input) = line.strip_prefix("-- input:") {
            case.input = serde_json::from_str(input.trim())
                .with_context(|| format!("line {line_number}: invalid input JSON"))?;
        } else if let Some(expected) = line.strip_prefix("-- expect:") {
            let expected = serde_json::from_str(expected.trim())
                .with_context(|| format!("line {line_number}: invalid expected JSON"))?;
            case.expectation = Expectation::Stack(expected);
            cases.extend(current.take());
        } else if let Some(message) = line.strip_prefix("-- error:") {
            case.expectation = Expectation::Error(message.trim().to_owned());
            cases.extend(current.take());
        } else {
            case.code.push_str(line);
            case.code.push('\n');
        }
    }
    cases.extend(current);
    Ok(cases)
}

pub fn run_test_file(file: &Path, content: &str, limits: Limits) -> Result<Summary> {
    let cases = parse_test_file(content)
        .with_context(|| format!("Malformed test file {}", file.display()))?;
    let mut summary = Summary::default();
    let mut machine = Machine::new(limits);
    for case in &cases {
        eprint!("{}::{} ... ", file.display(), case.name);
        summary.record(run_single_test(&mut machine, file, case));
    }
    Ok(summary)
}

fn run_single_test(machine: &mut Machine, file: &Path, case: &TestCase) -> bool {
    let program = match machine::parse(&case.code) {
        Ok(program) => program,
        Err(errors) => {
            eprintln!("FAILED (parse)");
            eprintln!(
                "{}",
                diagnostics::render(&errors, &file.display().to_string(), &case.code)
            );
            return false;
        }
    };
    let result = machine.run(&program, case.input.iter().cloned());
    match (&case.expectation, result) {
        (Expectation::Runs, Ok(stack)) => {
            eprintln!("ok ({})", stack_json(&stack));
            true
        }
        (Expectation::Stack(expected), Ok(stack)) => {
            let actual = stack_json(&stack);
            if &actual == expected {
                eprintln!("ok");
                true
            } else {
                eprintln!("FAILED");
                eprintln!("    expected: {expected}");
                eprintln!("    actual:   {actual}");
                false
            }
        }
        (Expectation::Error(fragment), Err(error)) => {
            let message = error.to_string();
            if message.contains(fragment.as_str()) {
                eprintln!("ok ({message})");
                true
            } else {
                eprintln!("FAILED");
                eprintln!("    expected error containing: {fragment}");
                eprintln!("    actual error:              {message}");
                false
            }
        }
        (Expectation::Error(fragment), Ok(stack)) => {
            eprintln!("FAILED");
            eprintln!("    expected error containing: {fragment}");
            eprintln!("    actual stack:              {}", stack_json(&stack));
            false
        }
        (_, Err(error)) => {
            eprintln!("FAILED: {error}");
            false
        }
    }
}

fn stack_json(stack: &[Value]) -> serde_json::Value {
    serde_json::to_value(stack)
        .unwrap_or_else(|error| serde_json::Value::String(format!("<unserializable stack: {error}>")))
}

pub fn run_tests(files: &[impl AsRef<Path>], limits: Limits) -> Result<Summary> {
    if files.is_empty() {
        bail!("No test files given");
    }
    let mut summary = Summary::default();
    for file in files {
        let file = file.as_ref();
        match std::fs::read_to_string(file) {
            Ok(content) => summary.merge(run_test_file(file, &content, limits)?),
            Err(error) => {
                eprintln!("Error reading {}: {error}", file.display());
                summary.record(false);
            }
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMOS: [(&str, &str); 3] = [
        ("factorial.kl", include_str!("../../../demos/factorial.kl")),
        ("quine.kl", include_str!("../../../demos/quine.kl")),
        ("limits.kl", include_str!("../../../demos/limits.kl")),
    ];

    #[test]
    fn parses_cases_and_expectations() {
        let content = "\
-- stray comment before any test
-- test: square
-- input: [7]
dup mul
-- expect: [49]
-- test: bad
1 add
-- error: stack underflow
-- test: plain
1
";
        let cases = parse_test_file(content).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases[0].name, "square");
        assert_eq!(cases[0].input, vec![Value::from(7)]);
        assert_eq!(cases[0].code, "dup mul\n");
        assert_eq!(cases[0].expectation, Expectation::Stack(serde_json::json!([49])));
        assert_eq!(cases[1].expectation, Expectation::Error("stack underflow".to_owned()));
        assert_eq!(cases[2].expectation, Expectation::Runs);
    }

    #[test]
    fn invalid_json_is_reported_with_its_line() {
        let error = parse_test_file("-- test: x\n-- expect: [1,\n").unwrap_err();
        assert!(error.to_string().contains("line 2"));
    }

    #[test]
    fn failing_expectation_is_counted() {
        let content = "-- test: wrong\n1 1 add\n-- expect: [3]\n-- test: right\n1 1 add\n-- expect: [2]\n";
        let summary = run_test_file(Path::new("inline.kl"), content, Limits::default()).unwrap();
        assert_eq!(
            summary,
            Summary {
                total: 2,
                passed: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn stack_json_uses_plain_json_values() {
        let stack = [Value::from(120), Value::from(true), Value::from("dup")];
        assert_eq!(stack_json(&stack), serde_json::json!([120, true, "dup"]));
    }

    #[test]
    fn demo_files_pass() {
        for (name, content) in DEMOS {
            let summary = run_test_file(Path::new(name), content, Limits::default()).unwrap();
            assert!(summary.total > 0, "{name} has no tests");
            assert_eq!(summary.failed, 0, "{name} has failures");
        }
    }
}
