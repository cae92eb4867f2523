// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Operator commands - force-next, clear, clear-all and done

use colored::Colorize;
use miette::Result;
use std::io::{self, Write};
use std::path::Path;

use super::{connect, load_config};
use crate::registry::StageName;
use crate::store::DoneOutcome;

/// Abandon the in-flight stage and launch the next one
pub async fn force_next(config_path: &Path, redis: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = connect(&config, redis).await?.store();

    match store.force_next().await? {
        Some(stage) => println!("{} '{}'", "Launched stage".green(), stage),
        None => println!("{}", "No pending stage to launch.".dimmed()),
    }

    Ok(())
}

/// Empty one stage's pending queue
pub async fn clear(config_path: &Path, redis: Option<&str>, stage: String) -> Result<()> {
    let config = load_config(config_path)?;
    let runner = connect(&config, redis).await?;
    let stage = StageName::new(stage);

    if !runner.store().stage_names().contains(&stage) {
        tracing::warn!(stage = %stage, "Clearing a stage that is not configured");
    }

    runner.store().clear(&stage).await?;
    println!("{} '{}'", "Cleared stage".green(), stage);

    Ok(())
}

/// Empty every pending queue and reset the counter
pub async fn clear_all(config_path: &Path, redis: Option<&str>, yes: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let store = connect(&config, redis).await?.store();
    let status = store.status().await?;

    if status.is_idle() && status.pending_count() == 0 {
        println!("{}", "Pipeline is already empty.".dimmed());
        return Ok(());
    }

    if !yes {
        print!(
            "Clear {} pending job(s) and reset {} in flight? [y/N] ",
            status.pending_count(),
            status.remaining
        );
        io::stdout().flush().ok();

        let mut input = String::new();
        io::stdin().read_line(&mut input).ok();

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("{}", "Cancelled.".dimmed());
            return Ok(());
        }
    }

    store.clear_all().await?;
    println!("{}", "Pipeline cleared.".green());

    Ok(())
}

/// Report one finished job, for backends without a completion hook
pub async fn done(config_path: &Path, redis: Option<&str>) -> Result<()> {
    let config = load_config(config_path)?;
    let store = connect(&config, redis).await?.store();

    match store.done().await? {
        DoneOutcome::Waiting(remaining) => {
            println!("{} job(s) still running", remaining)
        }
        DoneOutcome::Advanced(Some(stage)) => {
            println!("{} '{}'", "Stage finished; launched".green(), stage)
        }
        DoneOutcome::Advanced(None) => {
            println!("{}", "Stage finished; pipeline is idle.".green())
        }
        DoneOutcome::Underflow => {
            println!("{}", "Nothing was in flight.".yellow())
        }
    }

    Ok(())
}
