// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Stage store
//!
//! Pending jobs are kept per stage in a shared store:
//!
//! ```text
//! pipes:stages:content_writers  [{"job":"Writers::ContentWriter","args":["en-US"]}, ...]
//! pipes:stages:publishers       [{"job":"Publishers::Publisher","args":["en-US"]}]
//! pipes:stage_remaining         2
//! ```
//!
//! Stages launch one at a time. Launching hands every pending job of the
//! earliest non-empty stage to the executor and sets the in-flight counter to
//! the number of jobs. Each completion decrements the counter, and the next
//! stage launches when it reaches zero.

mod memory;
mod redis_store;

pub use memory::MemoryBackend;
pub use redis_store::{RedisBackend, StoreKeys};

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::errors::{PipesError, PipesResult};
use crate::executors::JobExecutor;
use crate::pipe::{JobEntry, Pipe, RunOptions};
use crate::registry::{JobId, StageName};

/// How a pending queue decides an entry is already present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dedup {
    /// Same job with the same arguments
    Exact,
    /// Same job, whatever the arguments
    JobOnly,
}

impl Dedup {
    /// Whether `candidate` duplicates something already `pending`
    pub fn is_duplicate(self, pending: &[JobEntry], candidate: &JobEntry) -> bool {
        match self {
            Self::Exact => pending.contains(candidate),
            Self::JobOnly => pending.iter().any(|e| e.job == candidate.job),
        }
    }
}

/// A stage claimed for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub stage: StageName,
    pub jobs: Vec<JobEntry>,
}

/// Durable primitives the stage store is built on
///
/// Every method is a single atomic step against the shared store.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Append an entry to a stage's pending queue unless it is a duplicate
    async fn push(&self, stage: &StageName, entry: &JobEntry, dedup: Dedup) -> PipesResult<bool>;

    /// If nothing is in flight, claim the first stage in `order` with pending jobs:
    /// set the counter to its job count, mark it current and empty its queue
    async fn launch_next(&self, order: &[StageName]) -> PipesResult<Option<Launch>>;

    /// Set the in-flight counter and current stage directly
    async fn set_in_flight(&self, stage: &StageName, count: usize) -> PipesResult<()>;

    /// Decrement the counter, returning the decremented value.
    /// A negative result is reported as-is but the stored counter is clamped to zero.
    async fn decrement(&self) -> PipesResult<i64>;

    /// Reset the counter to zero and forget the current stage, returning it
    async fn release(&self) -> PipesResult<Option<StageName>>;

    /// Current counter value
    async fn remaining(&self) -> PipesResult<i64>;

    /// Stage most recently launched, while it is in flight
    async fn current_stage(&self) -> PipesResult<Option<StageName>>;

    /// Pending entries of a stage
    async fn pending(&self, stage: &StageName) -> PipesResult<Vec<JobEntry>>;

    /// Stages that currently have a queue in the store, configured or not
    async fn stored_stages(&self) -> PipesResult<Vec<StageName>>;

    /// Empty one stage's pending queue
    async fn clear(&self, stage: &StageName) -> PipesResult<()>;

    /// Empty every stage queue in the store and reset the counter
    async fn clear_all(&self) -> PipesResult<()>;
}

/// Result of a finished job, as reported by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed(String),
}

/// What a completion did to the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DoneOutcome {
    /// The stage finished; carries the stage launched next, if any
    Advanced(Option<StageName>),
    /// Jobs of the current stage are still running
    Waiting(i64),
    /// The counter was already at zero
    Underflow,
}

/// Summary of merging a pipe into the pending queues
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub queued: usize,
    pub skipped: usize,
    pub launched: Option<StageName>,
}

/// Pending entries of one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageStatus {
    pub name: StageName,
    pub configured: bool,
    pub pending: Vec<JobEntry>,
}

/// Point-in-time view of the shared pipeline
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub remaining: i64,
    pub current: Option<StageName>,
    pub stages: Vec<StageStatus>,
}

impl PipelineStatus {
    pub fn is_idle(&self) -> bool {
        self.remaining <= 0
    }

    pub fn pending_count(&self) -> usize {
        self.stages.iter().map(|s| s.pending.len()).sum()
    }
}

/// The stage progression state machine
///
/// Idle while the counter is zero, a stage is in flight otherwise.
pub struct StageStore {
    backend: Arc<dyn StoreBackend>,
    executor: Arc<dyn JobExecutor>,
    stages: Vec<StageName>,
}

impl StageStore {
    /// Create a store over a backend, an executor and the configured stage order
    pub fn new(
        backend: Arc<dyn StoreBackend>,
        executor: Arc<dyn JobExecutor>,
        stages: Vec<StageName>,
    ) -> Self {
        Self {
            backend,
            executor,
            stages,
        }
    }

    /// Configured stages in launch order
    pub fn stage_names(&self) -> &[StageName] {
        &self.stages
    }

    /// Merge a pipe into the pending queues, then try to launch a stage
    pub async fn add_pipe(&self, pipe: &Pipe, options: &RunOptions) -> PipesResult<MergeReport> {
        let mut report = MergeReport::default();

        for stage in &pipe.stages {
            let dedup = if options.allow_duplicates.contains(&stage.name) {
                Dedup::JobOnly
            } else {
                Dedup::Exact
            };

            for entry in &stage.jobs {
                if self.backend.push(&stage.name, entry, dedup).await? {
                    report.queued += 1;
                } else {
                    debug!(stage = %stage.name, job = %entry.job, "Skipping duplicate entry");
                    report.skipped += 1;
                }
            }
        }

        report.launched = self.next_stage().await?;
        Ok(report)
    }

    /// Launch the earliest stage with pending jobs, if nothing is in flight
    ///
    /// A stage whose every job fails to enqueue is finished on the spot and
    /// the stage after it launches. Enqueue failures are still returned.
    pub async fn next_stage(&self) -> PipesResult<Option<StageName>> {
        let mut first_error = None;
        let mut launched = None;

        while let Some(launch) = self.backend.launch_next(&self.stages).await? {
            info!(stage = %launch.stage, jobs = launch.jobs.len(), "Launching stage");
            let drained = self.dispatch(&launch.jobs, &mut first_error).await?;
            if drained {
                warn!(stage = %launch.stage, "No job of the stage reached the executor; moving on");
            }

            launched = Some(launch.stage);
            if !drained {
                break;
            }
        }

        first_error.map_or(Ok(launched), Err)
    }

    /// Mark `jobs` as the in-flight stage and hand them to the executor
    pub async fn run_stage(&self, stage: &StageName, jobs: &[JobEntry]) -> PipesResult<()> {
        self.backend.set_in_flight(stage, jobs.len()).await?;
        info!(stage = %stage, jobs = jobs.len(), "Running stage");

        let mut first_error = None;
        if self.dispatch(jobs, &mut first_error).await? {
            if let Err(e) = self.next_stage().await {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// The only place jobs reach the executor
    ///
    /// A job the executor refuses will never report completion, so it is
    /// counted off here. Returns true when that emptied the in-flight counter.
    async fn dispatch(
        &self,
        jobs: &[JobEntry],
        first_error: &mut Option<PipesError>,
    ) -> PipesResult<bool> {
        let mut drained = false;

        for entry in jobs {
            if let Err(e) = self.executor.enqueue(entry).await {
                error!(job = %entry.job, error = %e, "Failed to enqueue job");
                first_error.get_or_insert(e);
                drained = self.backend.decrement().await? == 0;
            }
        }

        Ok(drained)
    }

    /// Register that one job of the in-flight stage has finished
    pub async fn done(&self) -> PipesResult<DoneOutcome> {
        let remaining = self.backend.decrement().await?;

        if remaining < 0 {
            warn!(
                remaining,
                "In-flight counter went below zero; a job reported completion twice or state was lost"
            );
            return Ok(DoneOutcome::Underflow);
        }

        if remaining > 0 {
            debug!(remaining, "Stage still running");
            return Ok(DoneOutcome::Waiting(remaining));
        }

        Ok(DoneOutcome::Advanced(self.next_stage().await?))
    }

    /// Completion hook for workers, called for both success and failure
    pub async fn complete(&self, job: &JobId, outcome: &JobOutcome) -> PipesResult<DoneOutcome> {
        match outcome {
            JobOutcome::Succeeded => debug!(job = %job, "Job finished"),
            JobOutcome::Failed(reason) => warn!(job = %job, reason = %reason, "Job failed"),
        }

        self.done().await
    }

    /// Empty one stage's pending queue without touching the in-flight stage
    pub async fn clear(&self, stage: &StageName) -> PipesResult<()> {
        self.backend.clear(stage).await
    }

    /// Empty every stage queue in the store and reset the counter
    pub async fn clear_all(&self) -> PipesResult<()> {
        self.backend.clear_all().await
    }

    /// Abandon the in-flight stage and launch the next one
    pub async fn force_next(&self) -> PipesResult<Option<StageName>> {
        if let Some(stage) = self.backend.release().await? {
            warn!(stage = %stage, "Forcing past in-flight stage");
            self.backend.clear(&stage).await?;
        }

        self.next_stage().await
    }

    /// Snapshot of the counter and every pending queue
    pub async fn status(&self) -> PipesResult<PipelineStatus> {
        let mut stages = Vec::new();

        for name in &self.stages {
            stages.push(StageStatus {
                name: name.clone(),
                configured: true,
                pending: self.backend.pending(name).await?,
            });
        }

        for name in self.backend.stored_stages().await? {
            if !self.stages.contains(&name) {
                let pending = self.backend.pending(&name).await?;
                stages.push(StageStatus {
                    name,
                    configured: false,
                    pending,
                });
            }
        }

        Ok(PipelineStatus {
            remaining: self.backend.remaining().await?,
            current: self.backend.current_stage().await?,
            stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executors::LocalExecutor;
    use crate::pipe::PipeStage;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;

    const WRITER: &str = "Writers::ContentWriter";
    const ANOTHER: &str = "Writers::AnotherContentWriter";
    const PUBLISHER: &str = "Publishers::Publisher";

    fn store_with(stages: &[&str]) -> (StageStore, Arc<MemoryBackend>, UnboundedReceiver<JobEntry>) {
        let backend = Arc::new(MemoryBackend::new());
        let (executor, rx) = LocalExecutor::channel();
        let store = StageStore::new(
            backend.clone(),
            Arc::new(executor),
            stages.iter().map(|s| StageName::new(*s)).collect(),
        );
        (store, backend, rx)
    }

    fn store() -> (StageStore, Arc<MemoryBackend>, UnboundedReceiver<JobEntry>) {
        store_with(&["content_writers", "publishers"])
    }

    fn entry(job: &str, arg: &str) -> JobEntry {
        JobEntry::new(job, vec![json!(arg)])
    }

    fn pipe(stages: Vec<(&str, Vec<JobEntry>)>) -> Pipe {
        Pipe {
            stages: stages
                .into_iter()
                .map(|(name, jobs)| PipeStage {
                    name: name.into(),
                    jobs,
                })
                .collect(),
        }
    }

    fn drain(rx: &mut UnboundedReceiver<JobEntry>) -> Vec<JobEntry> {
        let mut out = Vec::new();
        while let Ok(entry) = rx.try_recv() {
            out.push(entry);
        }
        out
    }

    #[tokio::test]
    async fn test_add_pipe_queues_and_launches_first_stage() {
        let (store, backend, mut rx) = store();
        let request = pipe(vec![
            ("content_writers", vec![entry(WRITER, "en-US")]),
            ("publishers", vec![entry(PUBLISHER, "en-US")]),
        ]);

        let report = store.add_pipe(&request, &RunOptions::new()).await.unwrap();

        assert_eq!(report.queued, 2);
        assert_eq!(report.launched, Some("content_writers".into()));
        assert_eq!(drain(&mut rx), vec![entry(WRITER, "en-US")]);
        assert_eq!(backend.remaining().await.unwrap(), 1);
        assert!(backend.pending(&"content_writers".into()).await.unwrap().is_empty());
        assert_eq!(
            backend.pending(&"publishers".into()).await.unwrap(),
            vec![entry(PUBLISHER, "en-US")]
        );
    }

    #[tokio::test]
    async fn test_exact_duplicates_are_skipped() {
        let (store, backend, _rx) = store();
        // Keep the machine busy so entries stay pending
        backend.set_in_flight(&"publishers".into(), 1).await.unwrap();

        let first = pipe(vec![
            ("content_writers", vec![entry(WRITER, "en-US")]),
            ("publishers", vec![entry(PUBLISHER, "en-US")]),
        ]);
        let second = pipe(vec![
            (
                "content_writers",
                vec![entry(WRITER, "en-US"), entry(ANOTHER, "en-US")],
            ),
            ("publishers", vec![entry(PUBLISHER, "en-US")]),
        ]);

        store.add_pipe(&first, &RunOptions::new()).await.unwrap();
        let report = store.add_pipe(&second, &RunOptions::new()).await.unwrap();

        assert_eq!(report.queued, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(
            backend.pending(&"content_writers".into()).await.unwrap(),
            vec![entry(WRITER, "en-US"), entry(ANOTHER, "en-US")]
        );
        assert_eq!(
            backend.pending(&"publishers".into()).await.unwrap(),
            vec![entry(PUBLISHER, "en-US")]
        );
    }

    #[tokio::test]
    async fn test_allow_duplicates_dedups_by_job_in_listed_stages() {
        let (store, backend, _rx) = store();
        backend.set_in_flight(&"publishers".into(), 1).await.unwrap();

        let first = pipe(vec![
            ("content_writers", vec![entry(WRITER, "en-US")]),
            ("publishers", vec![entry(PUBLISHER, "en-US")]),
        ]);
        let second = pipe(vec![
            ("content_writers", vec![entry(WRITER, "fr-FR")]),
            ("publishers", vec![entry(PUBLISHER, "fr-FR")]),
        ]);

        store.add_pipe(&first, &RunOptions::new()).await.unwrap();
        let options = RunOptions::new().allow_duplicates(["content_writers"]);
        store.add_pipe(&second, &options).await.unwrap();

        // Listed stage: same job with other args is still suppressed
        assert_eq!(
            backend.pending(&"content_writers".into()).await.unwrap(),
            vec![entry(WRITER, "en-US")]
        );
        // Unlisted stage: exact-match dedup lets different args through
        assert_eq!(
            backend.pending(&"publishers".into()).await.unwrap(),
            vec![entry(PUBLISHER, "en-US"), entry(PUBLISHER, "fr-FR")]
        );
    }

    #[tokio::test]
    async fn test_next_stage_follows_configured_order() {
        let (store, backend, mut rx) = store_with(&["publishers", "content_writers"]);
        backend
            .push(&"content_writers".into(), &entry(WRITER, "x"), Dedup::Exact)
            .await
            .unwrap();
        backend
            .push(&"publishers".into(), &entry(PUBLISHER, "x"), Dedup::Exact)
            .await
            .unwrap();

        let launched = store.next_stage().await.unwrap();

        assert_eq!(launched, Some("publishers".into()));
        assert_eq!(drain(&mut rx), vec![entry(PUBLISHER, "x")]);
    }

    #[tokio::test]
    async fn test_next_stage_without_pending_jobs() {
        let (store, backend, mut rx) = store();

        assert_eq!(store.next_stage().await.unwrap(), None);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(backend.remaining().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_next_stage_is_noop_while_in_flight() {
        let (store, backend, mut rx) = store();
        backend.set_in_flight(&"content_writers".into(), 2).await.unwrap();
        backend
            .push(&"publishers".into(), &entry(PUBLISHER, "x"), Dedup::Exact)
            .await
            .unwrap();

        assert_eq!(store.next_stage().await.unwrap(), None);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(backend.pending(&"publishers".into()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_stage_sets_counter_and_enqueues() {
        let (store, backend, mut rx) = store();
        let jobs = vec![entry(WRITER, "en-US"), entry(ANOTHER, "en-US")];

        store.run_stage(&"content_writers".into(), &jobs).await.unwrap();

        assert_eq!(backend.remaining().await.unwrap(), 2);
        assert_eq!(drain(&mut rx), jobs);
    }

    #[tokio::test]
    async fn test_fan_in_waits_for_every_job() {
        let (store, backend, mut rx) = store();
        backend
            .push(&"publishers".into(), &entry(PUBLISHER, "x"), Dedup::Exact)
            .await
            .unwrap();
        store
            .run_stage(
                &"content_writers".into(),
                &[entry(WRITER, "x"), entry(ANOTHER, "x")],
            )
            .await
            .unwrap();
        drain(&mut rx);

        assert_eq!(store.done().await.unwrap(), DoneOutcome::Waiting(1));
        assert!(drain(&mut rx).is_empty());

        assert_eq!(
            store.done().await.unwrap(),
            DoneOutcome::Advanced(Some("publishers".into()))
        );
        assert_eq!(drain(&mut rx), vec![entry(PUBLISHER, "x")]);
        assert_eq!(backend.remaining().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_job_still_advances() {
        let (store, _backend, mut rx) = store();
        store
            .run_stage(&"content_writers".into(), &[entry(WRITER, "x")])
            .await
            .unwrap();
        drain(&mut rx);

        let outcome = store
            .complete(&WRITER.into(), &JobOutcome::Failed("boom".into()))
            .await
            .unwrap();

        assert_eq!(outcome, DoneOutcome::Advanced(None));
        assert!(store.status().await.unwrap().is_idle());
    }

    #[tokio::test]
    async fn test_done_underflow_is_absorbed() {
        let (store, backend, _rx) = store();

        assert_eq!(store.done().await.unwrap(), DoneOutcome::Underflow);
        assert_eq!(backend.remaining().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clear_one_stage() {
        let (store, backend, _rx) = store();
        backend
            .push(&"content_writers".into(), &entry(WRITER, "x"), Dedup::Exact)
            .await
            .unwrap();

        store.clear(&"content_writers".into()).await.unwrap();

        assert!(backend.pending(&"content_writers".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_includes_unconfigured_stages() {
        let (store, backend, _rx) = store();
        backend
            .push(&"some_stage_used_for_testing".into(), &entry(WRITER, "x"), Dedup::Exact)
            .await
            .unwrap();
        backend
            .push(&"publishers".into(), &entry(PUBLISHER, "x"), Dedup::Exact)
            .await
            .unwrap();
        backend.set_in_flight(&"content_writers".into(), 3).await.unwrap();

        let before = store.status().await.unwrap();
        assert!(before.stages.iter().any(|s| !s.configured));

        store.clear_all().await.unwrap();

        let status = store.status().await.unwrap();
        assert!(status.is_idle());
        assert_eq!(status.pending_count(), 0);
        assert!(backend.stored_stages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_force_next_skips_blocking_stage() {
        let (store, backend, mut rx) = store();
        let request = pipe(vec![
            ("content_writers", vec![entry(WRITER, "a")]),
            ("publishers", vec![entry(PUBLISHER, "a")]),
        ]);
        store.add_pipe(&request, &RunOptions::new()).await.unwrap();
        drain(&mut rx);

        // New work for the blocked stage arrives while it is in flight
        backend
            .push(&"content_writers".into(), &entry(WRITER, "b"), Dedup::Exact)
            .await
            .unwrap();

        let launched = store.force_next().await.unwrap();

        assert_eq!(launched, Some("publishers".into()));
        assert_eq!(drain(&mut rx), vec![entry(PUBLISHER, "a")]);
        assert!(backend.pending(&"content_writers".into()).await.unwrap().is_empty());
        assert_eq!(backend.remaining().await.unwrap(), 1);
    }

    /// Refuses one job and forwards the rest
    struct Refusing {
        refused: JobId,
        inner: LocalExecutor,
    }

    #[async_trait]
    impl JobExecutor for Refusing {
        async fn enqueue(&self, entry: &JobEntry) -> PipesResult<()> {
            if entry.job == self.refused {
                return Err(PipesError::Enqueue {
                    job: entry.job.to_string(),
                    message: "queue rejected the job".to_string(),
                });
            }
            self.inner.enqueue(entry).await
        }
    }

    #[tokio::test]
    async fn test_unreachable_executor_does_not_stall_pipeline() {
        let (store, backend, rx) = store();
        drop(rx);
        let request = pipe(vec![
            ("content_writers", vec![entry(WRITER, "a")]),
            ("publishers", vec![entry(PUBLISHER, "a")]),
        ]);

        let result = store.add_pipe(&request, &RunOptions::new()).await;

        assert!(matches!(result, Err(PipesError::Enqueue { job, .. }) if job == WRITER));
        // Both stages were attempted and counted off
        assert_eq!(backend.remaining().await.unwrap(), 0);
        assert!(backend.pending(&"content_writers".into()).await.unwrap().is_empty());
        assert!(backend.pending(&"publishers".into()).await.unwrap().is_empty());
        assert!(store.status().await.unwrap().is_idle());
    }

    #[tokio::test]
    async fn test_refused_job_is_counted_off() {
        let backend = Arc::new(MemoryBackend::new());
        let (inner, mut rx) = LocalExecutor::channel();
        let executor = Refusing {
            refused: ANOTHER.into(),
            inner,
        };
        let store = StageStore::new(
            backend.clone(),
            Arc::new(executor),
            vec!["content_writers".into(), "publishers".into()],
        );
        let request = pipe(vec![
            ("content_writers", vec![entry(WRITER, "a"), entry(ANOTHER, "a")]),
            ("publishers", vec![entry(PUBLISHER, "a")]),
        ]);

        let result = store.add_pipe(&request, &RunOptions::new()).await;

        assert!(matches!(result, Err(PipesError::Enqueue { job, .. }) if job == ANOTHER));
        assert_eq!(drain(&mut rx), vec![entry(WRITER, "a")]);
        assert_eq!(backend.remaining().await.unwrap(), 1);

        // The accepted job finishing is enough to move on
        assert_eq!(
            store.done().await.unwrap(),
            DoneOutcome::Advanced(Some("publishers".into()))
        );
        assert_eq!(drain(&mut rx), vec![entry(PUBLISHER, "a")]);
    }

    #[tokio::test]
    async fn test_run_stage_with_refused_jobs_advances() {
        let (store, backend, rx) = store();
        drop(rx);
        backend
            .push(&"publishers".into(), &entry(PUBLISHER, "x"), Dedup::Exact)
            .await
            .unwrap();

        let result = store
            .run_stage(&"content_writers".into(), &[entry(WRITER, "x")])
            .await;

        assert!(result.is_err());
        assert_eq!(backend.remaining().await.unwrap(), 0);
        assert!(backend.pending(&"publishers".into()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_reports_current_stage() {
        let (store, _backend, _rx) = store();
        let request = pipe(vec![
            ("content_writers", vec![entry(WRITER, "a")]),
            ("publishers", vec![entry(PUBLISHER, "a")]),
        ]);
        store.add_pipe(&request, &RunOptions::new()).await.unwrap();

        let status = store.status().await.unwrap();

        assert_eq!(status.remaining, 1);
        assert_eq!(status.current, Some("content_writers".into()));
        assert_eq!(status.pending_count(), 1);
        assert_eq!(status.stages[1].pending, vec![entry(PUBLISHER, "a")]);
    }
}
