// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! In-process store backend
//!
//! Keeps queues and the counter behind one mutex, so every primitive is
//! atomic with respect to other tasks in the same process.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::{Dedup, Launch, StoreBackend};
use crate::errors::PipesResult;
use crate::pipe::JobEntry;
use crate::registry::StageName;

#[derive(Debug, Default)]
struct MemoryState {
    queues: BTreeMap<StageName, Vec<JobEntry>>,
    remaining: i64,
    current: Option<StageName>,
}

/// Store backend living in process memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn push(&self, stage: &StageName, entry: &JobEntry, dedup: Dedup) -> PipesResult<bool> {
        let mut state = self.state.lock().await;
        let queue = state.queues.entry(stage.clone()).or_default();

        if dedup.is_duplicate(queue, entry) {
            return Ok(false);
        }

        queue.push(entry.clone());
        Ok(true)
    }

    async fn launch_next(&self, order: &[StageName]) -> PipesResult<Option<Launch>> {
        let mut state = self.state.lock().await;

        if state.remaining > 0 {
            return Ok(None);
        }

        let Some(stage) = order
            .iter()
            .find(|name| state.queues.get(*name).is_some_and(|q| !q.is_empty()))
            .cloned()
        else {
            return Ok(None);
        };

        let jobs = state.queues.remove(&stage).unwrap_or_default();
        state.remaining = i64::try_from(jobs.len()).unwrap_or(i64::MAX);
        state.current = Some(stage.clone());

        Ok(Some(Launch { stage, jobs }))
    }

    async fn set_in_flight(&self, stage: &StageName, count: usize) -> PipesResult<()> {
        let mut state = self.state.lock().await;
        state.remaining = i64::try_from(count).unwrap_or(i64::MAX);
        state.current = Some(stage.clone());
        Ok(())
    }

    async fn decrement(&self) -> PipesResult<i64> {
        let mut state = self.state.lock().await;
        let remaining = state.remaining - 1;

        if remaining <= 0 {
            state.remaining = 0;
            state.current = None;
        } else {
            state.remaining = remaining;
        }

        Ok(remaining)
    }

    async fn release(&self) -> PipesResult<Option<StageName>> {
        let mut state = self.state.lock().await;
        state.remaining = 0;
        Ok(state.current.take())
    }

    async fn remaining(&self) -> PipesResult<i64> {
        Ok(self.state.lock().await.remaining)
    }

    async fn current_stage(&self) -> PipesResult<Option<StageName>> {
        Ok(self.state.lock().await.current.clone())
    }

    async fn pending(&self, stage: &StageName) -> PipesResult<Vec<JobEntry>> {
        let state = self.state.lock().await;
        Ok(state.queues.get(stage).cloned().unwrap_or_default())
    }

    async fn stored_stages(&self) -> PipesResult<Vec<StageName>> {
        let state = self.state.lock().await;
        Ok(state
            .queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn clear(&self, stage: &StageName) -> PipesResult<()> {
        self.state.lock().await.queues.remove(stage);
        Ok(())
    }

    async fn clear_all(&self) -> PipesResult<()> {
        let mut state = self.state.lock().await;
        state.queues.clear();
        state.remaining = 0;
        state.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(job: &str, arg: &str) -> JobEntry {
        JobEntry::new(job, vec![json!(arg)])
    }

    #[tokio::test]
    async fn test_launch_claims_once() {
        let backend = MemoryBackend::new();
        let order = vec![StageName::new("a"), StageName::new("b")];
        backend.push(&"b".into(), &entry("B", "x"), Dedup::Exact).await.unwrap();

        let launch = backend.launch_next(&order).await.unwrap().unwrap();
        assert_eq!(launch.stage, StageName::new("b"));
        assert_eq!(launch.jobs, vec![entry("B", "x")]);

        // Second claimant sees the stage in flight
        backend.push(&"a".into(), &entry("A", "x"), Dedup::Exact).await.unwrap();
        assert!(backend.launch_next(&order).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_launches_claim_one_stage() {
        let backend = std::sync::Arc::new(MemoryBackend::new());
        let order = vec![StageName::new("a"), StageName::new("b")];
        backend.push(&"a".into(), &entry("A", "1"), Dedup::Exact).await.unwrap();
        backend.push(&"b".into(), &entry("B", "1"), Dedup::Exact).await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let backend = backend.clone();
                let order = order.clone();
                tokio::spawn(async move { backend.launch_next(&order).await.unwrap() })
            })
            .collect();

        let mut launched = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                launched += 1;
            }
        }

        assert_eq!(launched, 1);
        assert_eq!(backend.remaining().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_decrement_clamps_at_zero() {
        let backend = MemoryBackend::new();
        backend.set_in_flight(&"a".into(), 1).await.unwrap();

        assert_eq!(backend.decrement().await.unwrap(), 0);
        assert_eq!(backend.decrement().await.unwrap(), -1);
        assert_eq!(backend.remaining().await.unwrap(), 0);
        assert_eq!(backend.current_stage().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_release_returns_current() {
        let backend = MemoryBackend::new();
        backend.set_in_flight(&"a".into(), 4).await.unwrap();

        assert_eq!(backend.release().await.unwrap(), Some("a".into()));
        assert_eq!(backend.remaining().await.unwrap(), 0);
        assert_eq!(backend.release().await.unwrap(), None);
    }
}
