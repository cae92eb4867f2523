// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Execution backends
//!
//! The stage store never runs jobs itself. It hands each launched entry to a
//! [`JobExecutor`] and expects the backend to report every finished job back
//! through [`StageStore::complete`](crate::store::StageStore::complete),
//! exactly once, whether the job succeeded or failed.

mod local;
mod resque;

pub use local::{JobHandler, LocalExecutor, Worker};
pub use resque::ResqueExecutor;

use async_trait::async_trait;

use crate::errors::PipesResult;
use crate::pipe::JobEntry;

/// Trait for execution backends
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Hand one job invocation to the backend.
    ///
    /// Fire-and-forget: returning `Ok` means the job was accepted, not that it ran.
    async fn enqueue(&self, entry: &JobEntry) -> PipesResult<()>;
}

/// Accepts every job and drops it; for dry runs
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExecutor;

#[async_trait]
impl JobExecutor for NullExecutor {
    async fn enqueue(&self, entry: &JobEntry) -> PipesResult<()> {
        tracing::debug!(job = %entry.job, "Discarding job");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_executor_accepts_everything() {
        let entry = JobEntry::new("Writers::ContentWriter", vec![]);
        assert!(tokio_test::block_on(NullExecutor.enqueue(&entry)).is_ok());
    }
}
