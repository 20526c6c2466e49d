//! # Command-line options
//!
//! Parses the process arguments once into an immutable [`Options`] value that
//! is handed to the loaders and the run entry point by parameter.

use std::collections::HashSet;
use std::fmt::{self, Display};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const DEFAULT_TEST_FILE: &str = "tests.json";

/// Run a suite of declarative HTTP tests and report the results.
///
/// The process exits with the number of failed tests once the selected
/// reporter has finished.
#[derive(Debug, Clone, Parser)]
#[command(name = "reqsuite")]
#[command(version)]
pub struct Options {
    /// The path to the file containing the tests
    #[arg(short = 't', long = "test-file", value_name = "PATH", default_value = DEFAULT_TEST_FILE)]
    pub test_file: PathBuf,

    /// The path to the config file
    #[arg(short = 'c', long = "config-file", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Which reporter to use for displaying the results
    #[arg(short = 'r', long, value_enum)]
    pub reporter: Option<ReporterKind>,

    /// Inline JSON config, merged over the config file
    #[arg(short = 'k', long = "config-string", value_name = "JSON")]
    pub config_string: Option<String>,

    /// A comma delimited list of tags to use for filtering the tests to run
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Maximum number of tests in flight at once (unbounded by default)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<NonZeroUsize>,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,

    /// Verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Options {
    /// The requested tag set, or `None` when no filtering should happen.
    pub fn tag_set(&self) -> Option<HashSet<String>> {
        self.tags.as_deref().and_then(parse_tags)
    }
}

/// Output format for the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReporterKind {
    Console,
    Json,
    None,
}

impl Display for ReporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReporterKind::Console => "console",
            ReporterKind::Json => "json",
            ReporterKind::None => "none",
        };
        write!(f, "{label}")
    }
}

/// Split a comma delimited tag list. Blank entries are dropped; a list with
/// no remaining entries means "no filter".
pub fn parse_tags(raw: &str) -> Option<HashSet<String>> {
    let tags: HashSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();

    if tags.is_empty() { None } else { Some(tags) }
}
