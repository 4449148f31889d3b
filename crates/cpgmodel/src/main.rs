//! cpgmodel: drive a Joern server over a Java project and stream the
//! normalized class model to stdout
//!
//! Exit code 0 on success, 1 on any fatal error. On failure nothing is framed;
//! the log file holds the details.

mod cli;
mod engine;
mod logging;

use std::backtrace::Backtrace;
use std::io::{self, BufWriter};
use std::panic;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use cpgmodel_java::{emit_classes, Orchestrator, RunContext};
use log::{error, info};
use uuid::Uuid;

use crate::cli::Cli;
use crate::engine::JoernClient;

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = cli::load_config(cli.config.as_deref())?;
    let project_dir = cli::normalize_project_dir(&cli.project_dir, cfg!(windows));
    let project_name = cli
        .project_name
        .clone()
        .unwrap_or_else(|| format!("cpgmodel-{}", Uuid::new_v4()));

    info!(
        "cpgmodel {} analyzing {} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        project_dir,
        cli.host,
        cli.port
    );

    let client = JoernClient::connect(&cli.host, cli.port, &config.retry)
        .context("Joern server unavailable")?;
    let orchestrator = Orchestrator::new(config);
    let mut ctx = RunContext::new(client);

    let result = orchestrator.run(&mut ctx, &project_dir, &project_name);
    info!("Run metrics: {}", serde_json::to_string(&ctx.metrics)?);
    result.with_context(|| format!("Extraction of {project_dir} failed"))?;

    let mut out = BufWriter::new(io::stdout().lock());
    emit_classes(&mut out, &ctx.classes, cli.format)?;
    info!("Wrote {} classes", ctx.classes.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_file) {
        eprintln!("cpgmodel: {e:#}");
        return ExitCode::FAILURE;
    }

    panic::set_hook(Box::new(|info| {
        error!("{}\n{}", info, Backtrace::force_capture());
    }));

    match panic::catch_unwind(|| run(&cli)) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
        Err(_) => ExitCode::FAILURE,
    }
}
