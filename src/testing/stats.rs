//! Folding per-test results into suite counters.

use serde::{Deserialize, Serialize};

use super::TestResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub tests_executed: u64,
    pub tests_failed: u64,
    pub validations_performed: u64,
    pub validations_failed: u64,
}

impl Stats {
    /// Walk every test, step and validation. The test level `passed` flag is
    /// counted as given and is independent of the validation counters.
    pub fn aggregate(results: &[TestResult]) -> Self {
        let mut stats = Stats::default();

        for result in results {
            stats.tests_executed += 1;
            if !result.passed {
                stats.tests_failed += 1;
            }

            for step in &result.test_step_results {
                for validation in &step.validation_results {
                    stats.validations_performed += 1;
                    if !validation.valid {
                        stats.validations_failed += 1;
                    }
                }
            }
        }

        stats
    }

    pub fn all_passed(&self) -> bool {
        self.tests_failed == 0
    }
}
