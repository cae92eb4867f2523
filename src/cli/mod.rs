// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipes.

pub mod admin;
pub mod enqueue;
pub mod graph;
pub mod status;
pub mod validate;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{normalize_redis_url, PipesConfig, DEFAULT_CONFIG_FILE};
use crate::errors::PipesError;
use crate::executors::ResqueExecutor;
use crate::runner::Runner;
use crate::store::RedisBackend;

/// Multi-stage background job pipelines
#[derive(Parser, Debug)]
#[clap(
    name = "pipes",
    version,
    about = "Run background jobs as ordered stages with dependency resolution",
    long_about = None,
    after_help = "Examples:\n\
        pipes validate                          Check the stage configuration\n\
        pipes graph --format mermaid            Show job dependencies\n\
        pipes enqueue Writers::ContentWriter --arg en-US\n\
        pipes status                            Show the in-flight stage and queues\n\n\
        See 'pipes <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file
    #[clap(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Redis store, overriding the configuration (host:port or redis:// URL)
    #[clap(long, global = true, env = "PIPES_REDIS_URL", value_name = "URL")]
    pub redis: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the stage configuration
    Validate,

    /// Show job dependencies as a graph
    Graph {
        /// Output format
        #[clap(short, long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },

    /// Queue jobs and launch the next stage if the pipeline is idle
    Enqueue {
        /// Jobs to run
        jobs: Vec<String>,

        /// Run every job of a stage
        #[clap(short, long = "stage", value_name = "STAGE")]
        stages: Vec<String>,

        /// Positional job argument; parsed as JSON when possible
        #[clap(short, long = "arg", value_name = "ARG")]
        args: Vec<String>,

        /// Pull in dependents even if the configuration turns resolution off
        #[clap(long, conflicts_with = "no_resolve")]
        resolve: bool,

        /// Queue only the selected jobs
        #[clap(long)]
        no_resolve: bool,

        /// Stages where a job is queued at most once, whatever its arguments
        #[clap(long, value_name = "STAGE")]
        allow_duplicates: Vec<String>,

        /// Show the resulting pipe without touching the store
        #[clap(long)]
        dry_run: bool,
    },

    /// Show the in-flight stage and every pending queue
    Status {
        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Abandon the in-flight stage and launch the next one
    ForceNext,

    /// Empty one stage's pending queue
    Clear {
        /// Stage to clear
        stage: String,
    },

    /// Empty every pending queue and reset the in-flight counter
    ClearAll {
        /// Skip confirmation
        #[clap(short, long)]
        yes: bool,
    },

    /// Report one finished job of the in-flight stage
    Done,
}

/// Output format for status
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

/// Load the configuration file
pub fn load_config(path: &Path) -> miette::Result<PipesConfig> {
    Ok(PipesConfig::from_file(path)?)
}

/// Resolve the store URL, preferring the command line
pub fn store_url(config: &PipesConfig, redis: Option<&str>) -> miette::Result<String> {
    redis
        .map(normalize_redis_url)
        .or_else(|| config.redis_url())
        .ok_or_else(|| {
            PipesError::invalid_config(
                "no Redis store configured",
                Some("Set 'redis' in the configuration, pass --redis or set PIPES_REDIS_URL"),
            )
            .into()
        })
}

/// Connect a runner to the shared store and the Resque queues
pub async fn connect(config: &PipesConfig, redis: Option<&str>) -> miette::Result<Runner> {
    let url = store_url(config, redis)?;
    tracing::debug!(url = %url, prefix = %config.key_prefix(), "Connecting to store");

    let backend = RedisBackend::connect(&url, config.key_prefix()).await?;
    let executor = ResqueExecutor::connect(&url, config.registry()).await?;

    Ok(Runner::from_config(
        config,
        Arc::new(backend),
        Arc::new(executor),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageConfig;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_enqueue() {
        let cli = Cli::parse_from([
            "pipes",
            "enqueue",
            "Writers::ContentWriter",
            "--stage",
            "publishers",
            "--arg",
            "en-US",
            "--no-resolve",
            "--allow-duplicates",
            "publishers",
        ]);

        match cli.command {
            Commands::Enqueue {
                jobs,
                stages,
                args,
                resolve,
                no_resolve,
                allow_duplicates,
                dry_run,
            } => {
                assert_eq!(jobs, vec!["Writers::ContentWriter"]);
                assert_eq!(stages, vec!["publishers"]);
                assert_eq!(args, vec!["en-US"]);
                assert!(!resolve);
                assert!(no_resolve);
                assert_eq!(allow_duplicates, vec!["publishers"]);
                assert!(!dry_run);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_flags_conflict() {
        let result = Cli::try_parse_from(["pipes", "enqueue", "A", "--resolve", "--no-resolve"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_graph_format() {
        let cli = Cli::parse_from(["pipes", "graph", "--format", "mermaid"]);
        assert!(matches!(
            cli.command,
            Commands::Graph {
                format: GraphFormat::Mermaid
            }
        ));
    }

    #[test]
    fn test_store_url_precedence() {
        let mut config = PipesConfig::new(StageConfig::new());
        assert!(store_url(&config, None).is_err());

        config.redis = Some("cache:6379".to_string());
        assert_eq!(store_url(&config, None).unwrap(), "redis://cache:6379");
        assert_eq!(
            store_url(&config, Some("localhost:6380")).unwrap(),
            "redis://localhost:6380"
        );
    }
}
