// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Stage declarations
//!
//! The declarative shape of the pipeline: ordered stages, each listing jobs,
//! each job optionally annotated with the dependents it pulls in.

use serde::{Deserialize, Serialize};

use crate::registry::{JobId, StageName};

/// Ordered stage declarations, as written in the configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageConfig {
    pub stages: Vec<StageDecl>,
}

impl StageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage without a stage-level dependent
    pub fn stage(mut self, name: impl Into<String>, jobs: Vec<JobDecl>) -> Self {
        self.stages.push(StageDecl {
            name: StageName::new(name),
            dependents: None,
            jobs,
        });
        self
    }

    /// Append a stage whose jobs all pull in `dependents`
    pub fn stage_with_dependents(
        mut self,
        name: impl Into<String>,
        dependents: impl Into<Dependents>,
        jobs: Vec<JobDecl>,
    ) -> Self {
        self.stages.push(StageDecl {
            name: StageName::new(name),
            dependents: Some(dependents.into()),
            jobs,
        });
        self
    }

    /// Get a stage by name
    pub fn get_stage(&self, name: &StageName) -> Option<&StageDecl> {
        self.stages.iter().find(|s| &s.name == name)
    }

    /// Position of a stage in declared order
    pub fn position(&self, name: &StageName) -> Option<usize> {
        self.stages.iter().position(|s| &s.name == name)
    }

    /// All stage names, in declared order
    pub fn stage_names(&self) -> Vec<StageName> {
        self.stages.iter().map(|s| s.name.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// A single stage declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDecl {
    /// Stage name (unique within the configuration)
    pub name: StageName,

    /// Dependents applied to every job in this stage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependents: Option<Dependents>,

    /// Jobs in this stage
    #[serde(default)]
    pub jobs: Vec<JobDecl>,
}

impl StageDecl {
    /// Bare job list, dependents stripped
    pub fn job_ids(&self) -> Vec<JobId> {
        self.jobs.iter().map(|j| j.job().clone()).collect()
    }
}

/// A job declared in a stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobDecl {
    /// Job without dependents
    Bare(JobId),

    /// Job annotated with dependents
    Detailed {
        job: JobId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dependents: Option<Dependents>,
    },
}

impl JobDecl {
    pub fn bare(job: impl Into<String>) -> Self {
        Self::Bare(JobId::new(job))
    }

    pub fn with(job: impl Into<String>, dependents: impl Into<Dependents>) -> Self {
        Self::Detailed {
            job: JobId::new(job),
            dependents: Some(dependents.into()),
        }
    }

    pub fn job(&self) -> &JobId {
        match self {
            Self::Bare(job) | Self::Detailed { job, .. } => job,
        }
    }

    pub fn dependents(&self) -> Option<&Dependents> {
        match self {
            Self::Bare(_) => None,
            Self::Detailed { dependents, .. } => dependents.as_ref(),
        }
    }
}

impl From<&str> for JobDecl {
    fn from(job: &str) -> Self {
        Self::bare(job)
    }
}

/// A single dependent reference: a job, or every job of a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependent {
    Stage { stage: StageName },
    Job(JobId),
}

impl Dependent {
    pub fn job(name: impl Into<String>) -> Self {
        Self::Job(JobId::new(name))
    }

    pub fn stage(name: impl Into<String>) -> Self {
        Self::Stage {
            stage: StageName::new(name),
        }
    }
}

/// Dependents annotation: one reference or a list mixing jobs and stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependents {
    One(Dependent),
    Many(Vec<Dependent>),
}

impl Dependents {
    /// References in declared order
    pub fn iter(&self) -> std::slice::Iter<'_, Dependent> {
        match self {
            Self::One(dep) => std::slice::from_ref(dep).iter(),
            Self::Many(deps) => deps.iter(),
        }
    }
}

impl From<Dependent> for Dependents {
    fn from(dep: Dependent) -> Self {
        Self::One(dep)
    }
}

impl From<Vec<Dependent>> for Dependents {
    fn from(deps: Vec<Dependent>) -> Self {
        Self::Many(deps)
    }
}
