//! The frozen run report handed to reporters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Stats, TestResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Results {
    pub time_started: DateTime<Utc>,
    pub time_ended: DateTime<Utc>,
    pub tests_executed: u64,
    pub tests_failed: u64,
    pub validations_performed: u64,
    pub validations_failed: u64,
    pub test_results: Vec<TestResult>,
}

impl Results {
    /// Freeze the report, capturing the end time now.
    pub fn assemble(time_started: DateTime<Utc>, test_results: Vec<TestResult>, stats: Stats) -> Self {
        Self::assemble_at(time_started, Utc::now(), test_results, stats)
    }

    /// The wall clock can step backwards; the end time never precedes the start.
    pub fn assemble_at(
        time_started: DateTime<Utc>,
        time_ended: DateTime<Utc>,
        test_results: Vec<TestResult>,
        stats: Stats,
    ) -> Self {
        Self {
            time_started,
            time_ended: time_ended.max(time_started),
            tests_executed: stats.tests_executed,
            tests_failed: stats.tests_failed,
            validations_performed: stats.validations_performed,
            validations_failed: stats.validations_failed,
            test_results,
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            tests_executed: self.tests_executed,
            tests_failed: self.tests_failed,
            validations_performed: self.validations_performed,
            validations_failed: self.validations_failed,
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.time_ended - self.time_started
    }

    /// Process exit status: the failed test count, saturated so that a
    /// non-zero count can never wrap around to success.
    pub fn exit_code(&self) -> u8 {
        self.tests_failed.min(u64::from(u8::MAX)) as u8
    }
}
