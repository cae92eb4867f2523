// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Run requests
//!
//! [`Runner`] is the entry point applications call: it owns the resolved
//! configuration and the stage store, builds a pipe for each request and
//! merges it into the shared queues.

use std::sync::Arc;
use tracing::info;

use crate::config::PipesConfig;
use crate::errors::PipesResult;
use crate::executors::JobExecutor;
use crate::pipe::{JobArgs, Pipe, PipeBuilder, RunOptions, Selection};
use crate::registry::JobRegistry;
use crate::resolver::DependencyResolver;
use crate::store::{MergeReport, StageStore, StoreBackend};

/// Builds pipes and feeds them to a stage store
pub struct Runner {
    resolver: DependencyResolver,
    registry: JobRegistry,
    store: Arc<StageStore>,
    resolve_default: bool,
}

impl Runner {
    /// Resolve a configuration and wire it to a backend and executor
    pub fn from_config(
        config: &PipesConfig,
        backend: Arc<dyn StoreBackend>,
        executor: Arc<dyn JobExecutor>,
    ) -> PipesResult<Self> {
        let resolver = DependencyResolver::new(config.stage_config().clone())?;
        let store = StageStore::new(backend, executor, resolver.stage_names());

        Ok(Self {
            registry: config.registry(),
            resolver,
            store: Arc::new(store),
            resolve_default: config.resolve,
        })
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }

    /// Shared handle to the stage store, for workers and admin commands
    pub fn store(&self) -> Arc<StageStore> {
        self.store.clone()
    }

    /// Build the pipe a request would produce without touching the store
    pub fn plan(
        &self,
        selection: impl Into<Selection>,
        args: &JobArgs,
        options: &RunOptions,
    ) -> PipesResult<Pipe> {
        PipeBuilder::new(&self.resolver, &self.registry)
            .with_resolve_default(self.resolve_default)
            .build(selection, args, options)
    }

    /// Queue the selected jobs and launch a stage if the pipeline is idle
    ///
    /// Selector errors surface before any queue is touched.
    pub async fn run(
        &self,
        selection: impl Into<Selection>,
        args: &JobArgs,
        options: &RunOptions,
    ) -> PipesResult<(Pipe, MergeReport)> {
        let pipe = self.plan(selection, args, options)?;
        let report = self.store.add_pipe(&pipe, options).await?;

        info!(
            queued = report.queued,
            skipped = report.skipped,
            launched = ?report.launched.as_ref().map(|s| s.as_str()),
            "Merged run request"
        );

        Ok((pipe, report))
    }
}
