//! # Reporting
//!
//! Renders a finished [`Results`] for humans or machines. Reporters are
//! selected by name on the command line and run once, after every test has
//! settled.

pub mod console;
pub mod json;

use std::future::Future;
use std::pin::Pin;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

use crate::cli::ReporterKind;
use crate::config::Config;
use crate::error::ReportError;
use crate::testing::Results;

pub type ReportFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ReportError>> + Send + 'a>>;

pub trait Reporter: Send + Sync {
    fn report<'a>(&'a self, results: &'a Results, config: &'a Config) -> ReportFuture<'a>;
}

/// Accepts the report and discards it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report<'a>(&'a self, _results: &'a Results, _config: &'a Config) -> ReportFuture<'a> {
        Box::pin(async { Ok(()) })
    }
}

pub fn create_reporter(kind: ReporterKind, no_color: bool) -> Box<dyn Reporter> {
    match kind {
        ReporterKind::Console => Box::new(ConsoleReporter::new(no_color)),
        ReporterKind::Json => Box::new(JsonReporter),
        ReporterKind::None => Box::new(NullReporter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Stats;
    use chrono::Utc;

    #[tokio::test]
    async fn null_reporter_succeeds() {
        let results = Results::assemble(Utc::now(), vec![], Stats::default());
        NullReporter.report(&results, &Config::default()).await.unwrap();
    }

    #[tokio::test]
    async fn every_kind_has_a_reporter() {
        let results = Results::assemble(Utc::now(), vec![], Stats::default());
        for kind in [ReporterKind::None, ReporterKind::Json, ReporterKind::Console] {
            create_reporter(kind, true)
                .report(&results, &Config::default())
                .await
                .unwrap();
        }
    }
}
