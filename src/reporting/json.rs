use std::io::Write;

use super::{ReportFuture, Reporter};
use crate::config::Config;
use crate::error::ReportError;
use crate::testing::Results;

/// Writes the full report to stdout as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn render(results: &Results) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(results)?)
    }
}

impl Reporter for JsonReporter {
    fn report<'a>(&'a self, results: &'a Results, _config: &'a Config) -> ReportFuture<'a> {
        Box::pin(async move {
            let rendered = Self::render(results)?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}")?;
            stdout.flush()?;
            Ok(())
        })
    }
}
