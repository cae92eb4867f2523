// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! pipes - Multi-stage background job pipelines

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipes::cli::{enqueue::EnqueueRequest, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "pipes=debug" } else { "pipes=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    pipes::utils::configure_colors();

    let config = cli.config.as_path();
    let redis = cli.redis.as_deref();

    // Dispatch to command handlers
    match cli.command {
        Commands::Validate => pipes::cli::validate::run(config, cli.verbose).await,
        Commands::Graph { format } => pipes::cli::graph::run(config, format, cli.verbose).await,
        Commands::Enqueue {
            jobs,
            stages,
            args,
            resolve,
            no_resolve,
            allow_duplicates,
            dry_run,
        } => {
            let request = EnqueueRequest {
                jobs,
                stages,
                args,
                resolve: match (resolve, no_resolve) {
                    (true, _) => Some(true),
                    (_, true) => Some(false),
                    _ => None,
                },
                allow_duplicates,
                dry_run,
            };
            pipes::cli::enqueue::run(config, redis, request, cli.verbose).await
        }
        Commands::Status { format } => pipes::cli::status::run(config, redis, format).await,
        Commands::ForceNext => pipes::cli::admin::force_next(config, redis).await,
        Commands::Clear { stage } => pipes::cli::admin::clear(config, redis, stage).await,
        Commands::ClearAll { yes } => pipes::cli::admin::clear_all(config, redis, yes).await,
        Commands::Done => pipes::cli::admin::done(config, redis).await,
    }
}
