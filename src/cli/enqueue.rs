// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Enqueue command - queue jobs from the command line

use colored::Colorize;
use miette::Result;
use std::path::Path;
use std::sync::Arc;

use super::{connect, load_config};
use crate::executors::NullExecutor;
use crate::pipe::{JobArgs, Pipe, RunOptions, Selection, Selector};
use crate::registry::StageName;
use crate::runner::Runner;
use crate::store::MemoryBackend;
use crate::utils::{print_info, print_success, print_warning};

/// Everything the enqueue command was asked to do
#[derive(Debug, Clone, Default)]
pub struct EnqueueRequest {
    pub jobs: Vec<String>,
    pub stages: Vec<String>,
    pub args: Vec<String>,
    pub resolve: Option<bool>,
    pub allow_duplicates: Vec<String>,
    pub dry_run: bool,
}

impl EnqueueRequest {
    fn selection(&self) -> Selection {
        let jobs = self.jobs.iter().map(|j| Selector::from(j.as_str()));
        let stages = self
            .stages
            .iter()
            .map(|s| Selector::Stage(StageName::new(s.as_str())));
        jobs.chain(stages).collect()
    }

    fn options(&self) -> RunOptions {
        RunOptions {
            resolve: self.resolve,
            allow_duplicates: self
                .allow_duplicates
                .iter()
                .map(|s| StageName::new(s.as_str()))
                .collect(),
        }
    }
}

/// Interpret a command-line argument as JSON, falling back to a plain string
pub fn parse_arg(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}

/// Run the enqueue command
pub async fn run(
    config_path: &Path,
    redis: Option<&str>,
    request: EnqueueRequest,
    verbose: bool,
) -> Result<()> {
    let selection = request.selection();
    if selection.is_empty() {
        return Err(miette::miette!(
            "Nothing to enqueue\n\nName at least one job or pass --stage."
        ));
    }

    let config = load_config(config_path)?;
    let args: JobArgs = request.args.iter().map(|a| parse_arg(a)).collect();
    let options = request.options();

    if request.dry_run {
        let runner = Runner::from_config(
            &config,
            Arc::new(MemoryBackend::new()),
            Arc::new(NullExecutor),
        )?;
        let pipe = runner.plan(selection, &args, &options)?;
        println!("{}", "Dry run - nothing queued".bold());
        print_pipe(&pipe);
        return Ok(());
    }

    let runner = connect(&config, redis).await?;
    let (pipe, report) = runner.run(selection, &args, &options).await?;

    if verbose {
        print_pipe(&pipe);
        println!();
    }

    print_success(&format!("Queued {} job(s)", report.queued));
    if report.skipped > 0 {
        print_warning(&format!(
            "Skipped {} job(s) already pending",
            report.skipped
        ));
    }
    match report.launched {
        Some(stage) => print_info(&format!("Launched stage '{}'", stage)),
        None => print_info("A stage is already in flight; jobs will run when it finishes"),
    }

    Ok(())
}

fn print_pipe(pipe: &Pipe) {
    if pipe.is_empty() {
        println!("  {}", "No configured jobs selected.".dimmed());
        return;
    }

    for (i, stage) in pipe.stages.iter().enumerate() {
        println!("  {}. {}", i + 1, stage.name.as_str().bold());
        for entry in &stage.jobs {
            let args = serde_json::to_string(&entry.args).unwrap_or_default();
            println!("       - {} {}", entry.job, args.dimmed());
        }
    }
}
