mod cli;
mod config;
mod engine;
mod environment;
mod error;
mod http;
mod reporting;
mod storage;
mod suite;
mod testing;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Options;
use config::load_config;
use engine::{Coordinator, HttpInvocationBuilder, run_suite};
use reporting::create_reporter;
use suite::load_suite;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let options = Options::parse();

    let filter = if options.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    debug!(?options, "parsed options");

    let suite = load_suite(&options.test_file)?;
    let config = load_config(options.config_file.as_deref(), options.config_string.as_deref())?;
    let tags = options.tag_set();

    let builder = HttpInvocationBuilder::from_config(&config)
        .map_err(anyhow::Error::msg)
        .context("Unable to create HTTP client")?;
    let coordinator = Coordinator::new().with_concurrency(options.concurrency);

    let results = run_suite(&suite, &config, tags.as_ref(), &builder, &coordinator).await?;

    let Some(kind) = options.reporter else {
        info!("no reporter selected; results discarded");
        return Ok(ExitCode::SUCCESS);
    };

    create_reporter(kind, options.no_color)
        .report(&results, &config)
        .await?;

    Ok(ExitCode::from(results.exit_code()))
}
