use std::fmt::Write as _;
use std::io::Write as _;

use colored::{ColoredString, Colorize};

use super::{ReportFuture, Reporter};
use crate::config::Config;
use crate::testing::{Results, TestResult};

const RULE_WIDTH: usize = 50;

/// Human readable summary: one line per test, the reasons behind every
/// failure, then the suite counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    no_color: bool,
}

impl ConsoleReporter {
    pub fn new(no_color: bool) -> Self {
        Self { no_color }
    }

    pub fn render(&self, results: &Results) -> String {
        let mut out = String::new();

        for result in &results.test_results {
            self.render_test(&mut out, result);
        }
        if !results.test_results.is_empty() {
            out.push('\n');
        }

        let _ = writeln!(out, "{}", "─".repeat(RULE_WIDTH));

        let stats = results.stats();
        let status = if stats.all_passed() {
            self.paint("PASSED", |s| s.green().bold())
        } else {
            self.paint("FAILED", |s| s.red().bold())
        };
        let failed = if stats.tests_failed > 0 {
            self.paint(&stats.tests_failed.to_string(), |s| s.red().bold())
        } else {
            stats.tests_failed.to_string()
        };
        let _ = writeln!(
            out,
            "Test result: {status} | {} executed, {} passed, {failed} failed",
            stats.tests_executed,
            stats.tests_executed.saturating_sub(stats.tests_failed),
        );
        let _ = writeln!(
            out,
            "Validations: {} performed, {} failed",
            stats.validations_performed, stats.validations_failed
        );
        let _ = writeln!(out, "Time: {}ms", results.elapsed().num_milliseconds());

        out
    }

    fn render_test(&self, out: &mut String, result: &TestResult) {
        let badge = if result.passed {
            self.paint("PASS", |s| s.green().bold())
        } else {
            self.paint("FAIL", |s| s.red().bold())
        };
        let _ = writeln!(out, "{badge} {} ({}ms)", result.label(), result.duration_ms);

        if result.passed {
            return;
        }

        for step in &result.test_step_results {
            let step_name = step.name.as_deref().unwrap_or("step");
            if let Some(error) = &step.error {
                let _ = writeln!(out, "    {step_name}: {}", self.paint(error, |s| s.yellow()));
            }
            for validation in step.validation_results.iter().filter(|v| !v.valid) {
                let detail = validation
                    .message
                    .as_deref()
                    .unwrap_or(validation.description.as_str());
                let _ = writeln!(out, "    {step_name}: {}", self.paint(detail, |s| s.red()));
            }
        }
    }

    fn paint(&self, text: &str, style: impl Fn(&str) -> ColoredString) -> String {
        if self.no_color {
            text.to_string()
        } else {
            style(text).to_string()
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report<'a>(&'a self, results: &'a Results, _config: &'a Config) -> ReportFuture<'a> {
        Box::pin(async move {
            let rendered = self.render(results);
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
            Ok(())
        })
    }
}
