// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Configuration
//!
//! Defines the schema for `.pipes.yaml` files: store connection, key
//! namespace, the resolution default and the stage declarations.

mod stages;

pub use stages::{Dependent, Dependents, JobDecl, StageConfig, StageDecl};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::errors::{PipesError, PipesResult};
use crate::registry::JobRegistry;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".pipes.yaml";

/// Key segment every store key lives under
const KEY_ROOT: &str = "pipes";

/// Configuration loaded from `.pipes.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipesConfig {
    /// Optional namespace prefixed to every store key
    #[serde(default)]
    pub namespace: Option<String>,

    /// Expand requested jobs through their dependents unless a run says otherwise
    #[serde(default = "default_true")]
    pub resolve: bool,

    /// Store location, either `host:port` or a `redis://` URL
    #[serde(default)]
    pub redis: Option<String>,

    /// Per-job overrides
    #[serde(default)]
    pub jobs: BTreeMap<String, JobOptions>,

    /// Stages in launch order
    pub stages: StageConfig,
}

/// Per-job options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobOptions {
    /// Execution queue; defaults to the name of the declaring stage
    #[serde(default)]
    pub queue: Option<String>,
}

fn default_true() -> bool {
    true
}

impl PipesConfig {
    /// Create a configuration around a set of stages
    pub fn new(stages: StageConfig) -> Self {
        Self {
            namespace: None,
            resolve: true,
            redis: None,
            jobs: BTreeMap::new(),
            stages,
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> PipesResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PipesError::ConfigNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                PipesError::FileReadError {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                }
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> PipesResult<Self> {
        serde_yaml::from_str(yaml).map_err(Into::into)
    }

    /// Serialize configuration to YAML
    pub fn to_yaml(&self) -> PipesResult<String> {
        serde_yaml::to_string(self).map_err(Into::into)
    }

    pub fn stage_config(&self) -> &StageConfig {
        &self.stages
    }

    /// Prefix for every key this deployment owns in the shared store
    pub fn key_prefix(&self) -> String {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => format!("{ns}:{KEY_ROOT}"),
            _ => KEY_ROOT.to_string(),
        }
    }

    /// Store URL, accepting the short `host:port` form
    pub fn redis_url(&self) -> Option<String> {
        self.redis.as_deref().map(normalize_redis_url)
    }

    /// Build the job registry from the stage declarations
    pub fn registry(&self) -> JobRegistry {
        let mut registry = JobRegistry::new();

        for stage in &self.stages.stages {
            for decl in &stage.jobs {
                let name = decl.job().as_str();
                let queue = self
                    .jobs
                    .get(name)
                    .and_then(|opts| opts.queue.clone())
                    .unwrap_or_else(|| stage.name.to_string());
                registry.register(name, queue);
            }
        }

        registry
    }
}

/// Turn `host:port` into `redis://host:port`, leaving URLs untouched
pub fn normalize_redis_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.contains("://") {
        raw.to_string()
    } else {
        format!("redis://{raw}")
    }
}
