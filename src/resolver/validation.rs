// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Configuration validation
//!
//! Validates stage declarations before they are used to build pipes.

use std::collections::{HashMap, HashSet};

use super::DependencyResolver;
use crate::config::{Dependent, Dependents, StageConfig, StageDecl};
use crate::errors::PipesError;
use crate::registry::JobId;

/// Stage configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a stage configuration
    pub fn validate(config: &StageConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        if config.is_empty() {
            result.add_error("Configuration has no stages defined");
            return result;
        }

        // Duplicate stage names
        let mut seen_names = HashSet::new();
        for stage in &config.stages {
            if !seen_names.insert(&stage.name) {
                result.add_error(&format!("Duplicate stage name: '{}'", stage.name));
            }
        }

        // Jobs declared in more than one stage
        let mut declared: HashMap<&JobId, usize> = HashMap::new();
        for (position, stage) in config.stages.iter().enumerate() {
            for decl in &stage.jobs {
                if let Some(first) = declared.get(decl.job()) {
                    result.add_error(&format!(
                        "Job '{}' is declared in both '{}' and '{}'",
                        decl.job(),
                        config.stages[*first].name,
                        stage.name
                    ));
                } else {
                    declared.insert(decl.job(), position);
                }
            }
        }

        for (position, stage) in config.stages.iter().enumerate() {
            Self::validate_stage(config, position, stage, &declared, &mut result);
        }

        // Cycles and unknown stage references
        if result.is_valid() {
            match DependencyResolver::new(config.clone()) {
                Ok(_) => {}
                Err(PipesError::DependencyCycle { jobs }) => {
                    result.add_error(&format!("Dependency cycle: {}", jobs.join(" -> ")));
                }
                Err(e) => result.add_error(&format!("Resolution error: {e}")),
            }
        }

        result
    }

    /// Validate a single stage
    fn validate_stage(
        config: &StageConfig,
        position: usize,
        stage: &StageDecl,
        declared: &HashMap<&JobId, usize>,
        result: &mut ValidationResult,
    ) {
        if stage.jobs.is_empty() {
            result.add_warning(&format!("Stage '{}': No jobs declared", stage.name));
        }

        if let Some(dependents) = &stage.dependents {
            Self::validate_dependents(config, position, &stage.name.to_string(), dependents, declared, result);
        }

        for decl in &stage.jobs {
            if let Some(dependents) = decl.dependents() {
                let owner = format!("{}/{}", stage.name, decl.job());
                Self::validate_dependents(config, position, &owner, dependents, declared, result);
            }
        }
    }

    /// Check each dependent reference of one annotation
    fn validate_dependents(
        config: &StageConfig,
        position: usize,
        owner: &str,
        dependents: &Dependents,
        declared: &HashMap<&JobId, usize>,
        result: &mut ValidationResult,
    ) {
        for dep in dependents.iter() {
            match dep {
                Dependent::Stage { stage } => match config.position(stage) {
                    None => result.add_error(&format!(
                        "'{owner}': Depends on unknown stage '{stage}'"
                    )),
                    Some(target) if target < position => result.add_warning(&format!(
                        "'{owner}': Depends on earlier stage '{stage}'. \
                         Dependents should point forward through the pipeline."
                    )),
                    Some(_) => {}
                },
                Dependent::Job(job) => match declared.get(job) {
                    None => result.add_warning(&format!(
                        "'{owner}': Depends on '{job}', which is not declared in any stage \
                         and will never be queued"
                    )),
                    Some(target) if *target < position => result.add_warning(&format!(
                        "'{owner}': Depends on '{job}' from an earlier stage. \
                         Dependents should point forward through the pipeline."
                    )),
                    Some(_) => {}
                },
            }
        }
    }
}

/// Result of configuration validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JobDecl;

    #[test]
    fn test_validate_empty_config() {
        let result = ConfigValidator::validate(&StageConfig::new());
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("no stages"));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let config = StageConfig::new()
            .stage("dup", vec!["A".into()])
            .stage("dup", vec!["B".into()]);

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Duplicate")));
    }

    #[test]
    fn test_validate_job_in_two_stages() {
        let config = StageConfig::new()
            .stage("first", vec!["A".into()])
            .stage("second", vec!["A".into()]);

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.contains("declared in both")));
    }

    #[test]
    fn test_validate_unknown_stage_reference() {
        let config = StageConfig::new().stage("writers", vec![JobDecl::with("A", Dependent::stage("ghosts"))]);

        let result = ConfigValidator::validate(&config);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("unknown stage 'ghosts'")));
    }

    #[test]
    fn test_validate_cycle() {
        let config = StageConfig::new()
            .stage("first", vec![JobDecl::with("A", Dependent::job("B"))])
            .stage("second", vec![JobDecl::with("B", Dependent::job("A"))]);

        let result = ConfigValidator::validate(&config);
        assert!(result.errors.iter().any(|e| e.contains("Dependency cycle")));
        // The back-reference is also flagged
        assert!(result.warnings.iter().any(|w| w.contains("earlier stage")));
    }

    #[test]
    fn test_validate_undeclared_dependent_warns() {
        let config = StageConfig::new().stage("writers", vec![JobDecl::with("A", Dependent::job("Ghost"))]);

        let result = ConfigValidator::validate(&config);
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("never be queued")));
    }

    #[test]
    fn test_validate_clean_config() {
        let config = StageConfig::new()
            .stage("writers", vec![JobDecl::with("A", Dependent::stage("publishers"))])
            .stage("publishers", vec!["B".into()]);

        let result = ConfigValidator::validate(&config);
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }
}
