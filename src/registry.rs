// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Job and stage identifiers, and the job registry
//!
//! Jobs are referred to by a canonical name (for example
//! `Writers::ContentWriter`). The registry is populated once at startup from
//! the configuration and is the only way a free-form string becomes a
//! [`JobId`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::errors::{PipesError, PipesResult};

/// Canonical identifier of an executable job
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Name of a configured stage
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageName(String);

impl StageName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A registered job and the execution queue it is sent to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub id: JobId,
    pub queue: String,
}

/// Registry of known jobs, keyed by canonical name
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: HashMap<String, JobSpec>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job, replacing any previous registration under the same name
    pub fn register(&mut self, name: impl Into<String>, queue: impl Into<String>) -> JobId {
        let name = name.into();
        let id = JobId::new(name.clone());
        self.jobs.insert(
            name,
            JobSpec {
                id: id.clone(),
                queue: queue.into(),
            },
        );
        id
    }

    /// Resolve a free-form name to its canonical job identifier
    ///
    /// Leading `::` separators are ignored, so `::Writers::ContentWriter`
    /// and `Writers::ContentWriter` name the same job.
    pub fn lookup(&self, name: &str) -> PipesResult<JobId> {
        self.get(name)
            .map(|spec| spec.id.clone())
            .ok_or_else(|| PipesError::UnknownJob {
                name: name.to_string(),
            })
    }

    /// Get the full spec for a job
    pub fn get(&self, name: &str) -> Option<&JobSpec> {
        self.jobs.get(canonical(name))
    }

    /// Queue a job is executed on, if registered
    pub fn queue_for(&self, job: &JobId) -> Option<&str> {
        self.get(job.as_str()).map(|spec| spec.queue.as_str())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn canonical(name: &str) -> &str {
    name.trim().trim_start_matches("::")
}
