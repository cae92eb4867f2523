// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! # pipes - Multi-stage background job pipelines
//!
//! `pipes` runs background jobs as an ordered series of stages. Jobs within a
//! stage run concurrently; the next stage starts only once every job of the
//! current one has reported completion.
//!
//! ## Features
//!
//! - **Dependency resolution** - a job pulls in the jobs and stages it declares as dependents
//! - **Shared coordination** - pending queues and the in-flight counter live in Redis
//! - **Deduplication** - re-queuing the same job with the same arguments is a no-op
//! - **Pluggable execution** - Resque-compatible queues or an in-process worker
//!
//! ## Quick Start
//!
//! ```bash
//! # Check the stage configuration
//! pipes validate
//!
//! # Queue a job and everything it pulls in
//! pipes enqueue Writers::ContentWriter --arg en-US
//!
//! # Inspect the pipeline
//! pipes status
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod executors;
pub mod pipe;
pub mod registry;
pub mod resolver;
pub mod runner;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::{PipesConfig, StageConfig};
pub use errors::{PipesError, PipesResult};
pub use executors::{JobExecutor, JobHandler, LocalExecutor, ResqueExecutor, Worker};
pub use pipe::{JobArgs, JobEntry, Pipe, PipeBuilder, RunOptions, Selection, Selector};
pub use registry::{JobId, JobRegistry, StageName};
pub use resolver::DependencyResolver;
pub use runner::Runner;
pub use store::{DoneOutcome, JobOutcome, MemoryBackend, RedisBackend, StageStore, StoreBackend};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
