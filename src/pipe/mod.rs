// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Pipes: normalized run requests
//!
//! A run request names jobs and stages in several shapes. The builder turns
//! it into a [`Pipe`], the ordered list of configured stages restricted to the
//! requested jobs (and, when resolution is on, everything they pull in).

mod selector;

pub use selector::{Selection, Selector};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::PipesResult;
use crate::registry::{JobId, JobRegistry, StageName};
use crate::resolver::DependencyResolver;

/// Positional arguments forwarded verbatim to a job
pub type JobArgs = Vec<serde_json::Value>;

/// One job invocation: what to run and with which arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobEntry {
    pub job: JobId,
    #[serde(default)]
    pub args: JobArgs,
}

impl JobEntry {
    pub fn new(job: impl Into<JobId>, args: JobArgs) -> Self {
        Self {
            job: job.into(),
            args,
        }
    }
}

/// Jobs of one stage within a pipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeStage {
    pub name: StageName,
    pub jobs: Vec<JobEntry>,
}

/// A resolved run request, in configured stage order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pipe {
    pub stages: Vec<PipeStage>,
}

impl Pipe {
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Total number of job entries across all stages
    pub fn job_count(&self) -> usize {
        self.stages.iter().map(|s| s.jobs.len()).sum()
    }

    /// Entries for one stage, if the pipe touches it
    pub fn stage(&self, name: &StageName) -> Option<&PipeStage> {
        self.stages.iter().find(|s| &s.name == name)
    }
}

/// Options for a single run request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Overrides the configured resolution default when set
    pub resolve: Option<bool>,

    /// Stages where a job is queued at most once, whatever its arguments
    pub allow_duplicates: Vec<StageName>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(mut self, resolve: bool) -> Self {
        self.resolve = Some(resolve);
        self
    }

    pub fn allow_duplicates<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StageName>,
    {
        self.allow_duplicates = stages.into_iter().map(Into::into).collect();
        self
    }

    /// Whether resolution applies, given the process-wide default
    pub fn should_resolve(&self, default: bool) -> bool {
        self.resolve.unwrap_or(default)
    }
}

/// Builds pipes against a resolver and job registry
pub struct PipeBuilder<'a> {
    resolver: &'a DependencyResolver,
    registry: &'a JobRegistry,
    resolve_default: bool,
}

impl<'a> PipeBuilder<'a> {
    pub fn new(resolver: &'a DependencyResolver, registry: &'a JobRegistry) -> Self {
        Self {
            resolver,
            registry,
            resolve_default: true,
        }
    }

    /// Set the resolution default used when a run does not say
    pub fn with_resolve_default(mut self, resolve: bool) -> Self {
        self.resolve_default = resolve;
        self
    }

    /// Build a pipe for the selected jobs
    ///
    /// Fails on unknown job names and unknown stages before anything is queued.
    pub fn build(
        &self,
        selection: impl Into<Selection>,
        args: &JobArgs,
        options: &RunOptions,
    ) -> PipesResult<Pipe> {
        let mut requested = self.normalize(selection.into())?;

        if options.should_resolve(self.resolve_default) {
            let dependents: Vec<JobId> = requested
                .iter()
                .flat_map(|job| self.resolver.dependents_for(job))
                .collect();
            requested.extend(dependents);
        }

        let stages = self
            .resolver
            .resolved_stages()
            .stages
            .into_iter()
            .filter_map(|stage| {
                let jobs: Vec<JobEntry> = stage
                    .jobs
                    .into_iter()
                    .filter(|resolved| requested.contains(&resolved.job))
                    .map(|resolved| JobEntry::new(resolved.job, args.clone()))
                    .collect();

                (!jobs.is_empty()).then_some(PipeStage {
                    name: stage.name,
                    jobs,
                })
            })
            .collect();

        Ok(Pipe { stages })
    }

    /// Flatten selectors into the set of requested jobs
    fn normalize(&self, selection: Selection) -> PipesResult<HashSet<JobId>> {
        let mut requested = HashSet::new();

        for selector in selection {
            match selector {
                Selector::Job(job) => {
                    requested.insert(job);
                }
                Selector::Stage(stage) => {
                    requested.extend(self.resolver.jobs_in_stage(&stage)?);
                }
                Selector::Name(name) => {
                    requested.insert(self.registry.lookup(&name)?);
                }
            }
        }

        Ok(requested)
    }
}
