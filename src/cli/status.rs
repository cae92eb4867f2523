// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Status command - show the in-flight stage and pending queues

use colored::Colorize;
use miette::Result;
use std::path::Path;

use super::{connect, load_config, OutputFormat};
use crate::store::PipelineStatus;
use crate::utils::print_header;

/// Run the status command
pub async fn run(config_path: &Path, redis: Option<&str>, format: OutputFormat) -> Result<()> {
    let config = load_config(config_path)?;
    let runner = connect(&config, redis).await?;
    let status = runner.store().status().await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&status).map_err(crate::errors::PipesError::from)?;
            println!("{}", json);
        }
        OutputFormat::Text => print_status(&status),
    }

    Ok(())
}

fn print_status(status: &PipelineStatus) {
    print_header("Pipeline Status");

    match (&status.current, status.is_idle()) {
        (_, true) => println!("  State:    {}", "idle".green()),
        (Some(stage), false) => println!(
            "  State:    {} ({} job(s) remaining)",
            stage.as_str().yellow(),
            status.remaining
        ),
        (None, false) => println!("  State:    {} job(s) remaining", status.remaining),
    }
    println!("  Pending:  {}", status.pending_count());
    println!();

    for stage in &status.stages {
        let marker = if !stage.configured {
            " (not configured)".red().to_string()
        } else {
            String::new()
        };
        println!("  {}{}: {}", stage.name.as_str().bold(), marker, stage.pending.len());

        for entry in &stage.pending {
            let args = serde_json::to_string(&entry.args).unwrap_or_default();
            println!("      - {} {}", entry.job, args.dimmed());
        }
    }
}
