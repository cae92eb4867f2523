// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Dependency resolution
//!
//! Normalizes the declarative stage configuration into a graph of direct
//! dependents and computes, for every job, the full set of jobs it pulls in.
//!
//! Resolution happens in two phases. The first materializes the direct graph:
//! stage references are expanded to the jobs of that stage and stage-level
//! dependents are appended to each job's own. The second walks the graph
//! depth-first with memoization, producing each closure in first-discovered
//! order and rejecting cycles.

mod graph;
mod validation;

pub use graph::DependencyGraph;
pub use validation::{ConfigValidator, ValidationResult};

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::config::{Dependent, Dependents, StageConfig};
use crate::errors::{PipesError, PipesResult};
use crate::registry::{JobId, StageName};

/// A job paired with its resolved dependents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedJob {
    pub job: JobId,
    pub dependents: Vec<JobId>,
}

/// A stage whose jobs carry resolved dependents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStage {
    pub name: StageName,
    pub jobs: Vec<ResolvedJob>,
}

/// Stage configuration with every job's dependents closed transitively
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedStageConfig {
    pub stages: Vec<ResolvedStage>,
}

/// Resolver over a static stage configuration
#[derive(Debug, Clone)]
pub struct DependencyResolver {
    config: StageConfig,
    stage_of: HashMap<JobId, StageName>,
    direct: HashMap<JobId, Vec<JobId>>,
    closures: HashMap<JobId, Vec<JobId>>,
}

impl DependencyResolver {
    /// Build a resolver, failing on unknown stage references and cycles
    pub fn new(config: StageConfig) -> PipesResult<Self> {
        let stage_of = index_jobs(&config)?;
        let direct = build_direct_graph(&config)?;

        let mut closures = HashMap::new();
        let mut path = Vec::new();

        // Later stages first: dependents point forward, so their closures are
        // usually memoized before anything that references them.
        for stage in config.stages.iter().rev() {
            for decl in &stage.jobs {
                closure_of(decl.job(), &direct, &mut closures, &mut path)?;
            }
        }

        Ok(Self {
            config,
            stage_of,
            direct,
            closures,
        })
    }

    /// The configuration this resolver was built from
    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Stage names in declared order
    pub fn stage_names(&self) -> Vec<StageName> {
        self.config.stage_names()
    }

    /// Jobs declared in a stage, dependents stripped
    pub fn jobs_in_stage(&self, stage: &StageName) -> PipesResult<Vec<JobId>> {
        self.config
            .get_stage(stage)
            .map(|s| s.job_ids())
            .ok_or_else(|| PipesError::UnknownStage {
                stage: stage.to_string(),
            })
    }

    /// Every job that must accompany `job`, transitively and without duplicates
    ///
    /// Jobs that declare nothing, or are not known at all, have no dependents.
    pub fn dependents_for(&self, job: &JobId) -> Vec<JobId> {
        self.closures.get(job).cloned().unwrap_or_default()
    }

    /// Dependents declared directly on `job` (stage references expanded)
    pub fn direct_dependents(&self, job: &JobId) -> &[JobId] {
        self.direct.get(job).map(Vec::as_slice).unwrap_or_default()
    }

    /// Stage a job is declared in
    pub fn stage_of(&self, job: &JobId) -> Option<&StageName> {
        self.stage_of.get(job)
    }

    /// Every declared job, paired with its resolved dependents
    pub fn resolved_stages(&self) -> ResolvedStageConfig {
        let stages = self
            .config
            .stages
            .iter()
            .map(|stage| ResolvedStage {
                name: stage.name.clone(),
                jobs: stage
                    .jobs
                    .iter()
                    .map(|decl| ResolvedJob {
                        job: decl.job().clone(),
                        dependents: self.dependents_for(decl.job()),
                    })
                    .collect(),
            })
            .collect();

        ResolvedStageConfig { stages }
    }

    /// All jobs with direct edges, declared or merely referenced
    pub(crate) fn edges(&self) -> impl Iterator<Item = (&JobId, &[JobId])> {
        self.direct.iter().map(|(job, deps)| (job, deps.as_slice()))
    }
}

/// Map each declared job to its stage, rejecting duplicate stages and jobs
fn index_jobs(config: &StageConfig) -> PipesResult<HashMap<JobId, StageName>> {
    let mut seen_stages = HashSet::new();
    let mut stage_of: HashMap<JobId, StageName> = HashMap::new();

    for stage in &config.stages {
        if !seen_stages.insert(&stage.name) {
            return Err(PipesError::DuplicateStage {
                stage: stage.name.to_string(),
            });
        }

        for decl in &stage.jobs {
            if let Some(first) = stage_of.get(decl.job()) {
                return Err(PipesError::DuplicateJob {
                    job: decl.job().to_string(),
                    first: first.to_string(),
                    second: stage.name.to_string(),
                });
            }
            stage_of.insert(decl.job().clone(), stage.name.clone());
        }
    }

    Ok(stage_of)
}

/// Phase one: direct dependents of every declared job
fn build_direct_graph(config: &StageConfig) -> PipesResult<HashMap<JobId, Vec<JobId>>> {
    let mut direct = HashMap::new();

    for stage in &config.stages {
        for decl in &stage.jobs {
            let mut deps = Vec::new();
            let own = decl.dependents().into_iter();
            let shared = stage.dependents.as_ref().into_iter();

            for dependents in own.chain(shared) {
                expand_dependents(config, dependents, &mut deps)?;
            }

            direct.insert(decl.job().clone(), deps);
        }
    }

    Ok(direct)
}

/// Expand an annotation into concrete jobs, appending unseen ones to `out`
fn expand_dependents(
    config: &StageConfig,
    dependents: &Dependents,
    out: &mut Vec<JobId>,
) -> PipesResult<()> {
    for dep in dependents.iter() {
        match dep {
            Dependent::Job(job) => push_unique(out, job),
            Dependent::Stage { stage } => {
                let decl = config
                    .get_stage(stage)
                    .ok_or_else(|| PipesError::UnknownStage {
                        stage: stage.to_string(),
                    })?;
                for job in decl.jobs.iter().map(|j| j.job()) {
                    push_unique(out, job);
                }
            }
        }
    }

    Ok(())
}

fn push_unique(out: &mut Vec<JobId>, job: &JobId) {
    if !out.contains(job) {
        out.push(job.clone());
    }
}

/// Phase two: memoized depth-first closure with a cycle guard
fn closure_of(
    job: &JobId,
    direct: &HashMap<JobId, Vec<JobId>>,
    memo: &mut HashMap<JobId, Vec<JobId>>,
    path: &mut Vec<JobId>,
) -> PipesResult<Vec<JobId>> {
    if let Some(done) = memo.get(job) {
        return Ok(done.clone());
    }

    if let Some(start) = path.iter().position(|j| j == job) {
        let mut jobs: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
        jobs.push(job.to_string());
        return Err(PipesError::DependencyCycle { jobs });
    }

    path.push(job.clone());

    let mut resolved = Vec::new();
    let mut seen = HashSet::new();
    for dep in direct.get(job).map(Vec::as_slice).unwrap_or_default() {
        let nested = closure_of(dep, direct, memo, path)?;
        for candidate in std::iter::once(dep).chain(nested.iter()) {
            if candidate != job && seen.insert(candidate.clone()) {
                resolved.push(candidate.clone());
            }
        }
    }

    path.pop();
    memo.insert(job.clone(), resolved.clone());

    Ok(resolved)
}
