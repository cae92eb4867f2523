// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! In-process execution
//!
//! [`LocalExecutor`] pushes entries onto a tokio channel and [`Worker`] drains
//! it, running one task per job.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, error};

use super::JobExecutor;
use crate::errors::{PipesError, PipesResult};
use crate::pipe::{JobArgs, JobEntry};
use crate::registry::JobId;
use crate::store::{JobOutcome, StageStore};

/// Executor feeding an in-process [`Worker`]
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    tx: UnboundedSender<JobEntry>,
}

impl LocalExecutor {
    /// Create an executor and the receiving end for a worker
    pub fn channel() -> (Self, UnboundedReceiver<JobEntry>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl JobExecutor for LocalExecutor {
    async fn enqueue(&self, entry: &JobEntry) -> PipesResult<()> {
        self.tx.send(entry.clone()).map_err(|_| PipesError::Enqueue {
            job: entry.job.to_string(),
            message: "worker channel closed".to_string(),
        })
    }
}

/// Code that performs one kind of job
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn perform(&self, args: &JobArgs) -> anyhow::Result<()>;
}

/// Runs handlers for jobs coming from a [`LocalExecutor`]
pub struct Worker {
    handlers: HashMap<JobId, Arc<dyn JobHandler>>,
    store: Arc<StageStore>,
}

impl Worker {
    pub fn new(store: Arc<StageStore>) -> Self {
        Self {
            handlers: HashMap::new(),
            store,
        }
    }

    /// Register the handler for a job
    pub fn register(mut self, job: impl Into<JobId>, handler: impl JobHandler + 'static) -> Self {
        self.handlers.insert(job.into(), Arc::new(handler));
        self
    }

    /// Process jobs until the channel closes and every running job has reported
    pub async fn run(self, mut rx: UnboundedReceiver<JobEntry>) {
        let mut running = JoinSet::new();

        loop {
            tokio::select! {
                received = rx.recv() => {
                    let Some(entry) = received else { break };
                    let handler = self.handlers.get(&entry.job).cloned();
                    let store = self.store.clone();
                    running.spawn(async move {
                        let outcome = perform(handler, &entry).await;
                        if let Err(e) = store.complete(&entry.job, &outcome).await {
                            error!(job = %entry.job, error = %e, "Failed to report completion");
                        }
                    });
                }
                // Reap finished tasks
                Some(_) = running.join_next(), if !running.is_empty() => {}
            }
        }

        while running.join_next().await.is_some() {}
    }
}

/// Run a handler in its own task so a panic becomes a failed outcome
async fn perform(handler: Option<Arc<dyn JobHandler>>, entry: &JobEntry) -> JobOutcome {
    let Some(handler) = handler else {
        return JobOutcome::Failed(format!("no handler registered for {}", entry.job));
    };

    debug!(job = %entry.job, "Performing job");
    let args = entry.args.clone();
    let result = tokio::spawn(async move { handler.perform(&args).await }).await;

    match result {
        Ok(Ok(())) => JobOutcome::Succeeded,
        Ok(Err(e)) => JobOutcome::Failed(format!("{e:#}")),
        Err(e) => JobOutcome::Failed(format!("job panicked: {e}")),
    }
}
