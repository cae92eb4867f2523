// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Error types
//!
//! Configuration and selector errors are raised synchronously to the caller.
//! Job failures never show up here: they only affect completion bookkeeping.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for pipes operations
pub type PipesResult<T> = Result<T, PipesError>;

/// Main error type for pipes
#[derive(Error, Debug, Diagnostic)]
pub enum PipesError {
    // ─────────────────────────────────────────────────────────────────────────
    // Selector Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Unknown job '{name}'")]
    #[diagnostic(
        code(pipes::unknown_job),
        help("Declare '{name}' in one of the stages of your configuration")
    )]
    UnknownJob { name: String },

    #[error("Unknown stage '{stage}'")]
    #[diagnostic(
        code(pipes::unknown_stage),
        help("Check that '{stage}' is listed under 'stages' in your configuration")
    )]
    UnknownStage { stage: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Stage '{stage}' is declared more than once")]
    #[diagnostic(code(pipes::duplicate_stage))]
    DuplicateStage { stage: String },

    #[error("Job '{job}' is declared in both '{first}' and '{second}'")]
    #[diagnostic(
        code(pipes::duplicate_job),
        help("A job belongs to exactly one stage; queue it from one stage and pull it in elsewhere via dependents")
    )]
    DuplicateJob {
        job: String,
        first: String,
        second: String,
    },

    #[error("Dependency cycle detected: {}", jobs.join(" -> "))]
    #[diagnostic(
        code(pipes::dependency_cycle),
        help("Dependents must point forward through the stages; remove one of these links")
    )]
    DependencyCycle { jobs: Vec<String> },

    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(pipes::invalid_config))]
    InvalidConfig {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(pipes::config_not_found),
        help("Create a .pipes.yaml or pass --config")
    )]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(pipes::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Store / Backend Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Store error: {message}")]
    #[diagnostic(
        code(pipes::store_error),
        help("Check that the shared store is reachable")
    )]
    Store { message: String },

    #[error("Failed to enqueue job '{job}': {message}")]
    #[diagnostic(code(pipes::enqueue_failed))]
    Enqueue { job: String, message: String },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("IO error: {message}")]
    #[diagnostic(code(pipes::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(pipes::yaml_error))]
    Yaml { message: String },

    #[error("JSON parsing error: {message}")]
    #[diagnostic(code(pipes::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for PipesError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for PipesError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for PipesError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl From<redis::RedisError> for PipesError {
    fn from(e: redis::RedisError) -> Self {
        Self::Store { message: e.to_string() }
    }
}

impl PipesError {
    /// Create an invalid configuration error with a hint
    pub fn invalid_config(reason: impl Into<String>, help: Option<&str>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
            help: help.map(str::to_string),
        }
    }
}
