// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Validate command - check the stage configuration

use colored::Colorize;
use miette::Result;
use std::path::Path;

use crate::config::PipesConfig;
use crate::resolver::{ConfigValidator, DependencyResolver};
use crate::utils::{print_error, print_section, print_success, print_warning};

/// Run the validate command
pub async fn run(config_path: &Path, verbose: bool) -> Result<()> {
    println!("{}", "Validating configuration...".bold());
    println!();

    let config = match PipesConfig::from_file(config_path) {
        Ok(c) => c,
        Err(e) => {
            print_error("Failed to load configuration");
            println!();
            return Err(e.into());
        }
    };

    print_success("Configuration file is valid YAML");

    let validation = ConfigValidator::validate(config.stage_config());

    if !validation.errors.is_empty() {
        print_section(&"Errors".red().to_string());
        for error in &validation.errors {
            print_error(error);
        }
    }

    if validation.has_warnings() {
        print_section(&"Warnings".yellow().to_string());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose && validation.is_valid() {
        print_summary(&config)?;
    }

    println!();

    if !validation.is_valid() {
        return Err(miette::miette!("Configuration validation failed"));
    }

    if validation.has_warnings() {
        println!("{}", "Configuration is valid but has warnings.".yellow().bold());
    } else {
        println!("{}", "Configuration is valid!".green().bold());
    }

    Ok(())
}

fn print_summary(config: &PipesConfig) -> Result<()> {
    let resolver = DependencyResolver::new(config.stage_config().clone())?;
    let registry = config.registry();

    print_section("Summary");
    println!("  Key prefix: {}", config.key_prefix());
    println!("  Resolve by default: {}", config.resolve);
    println!("  Stages: {}", resolver.stage_names().len());
    println!("  Jobs: {}", registry.len());

    for stage in resolver.resolved_stages().stages {
        println!("    - {}", stage.name);
        for job in stage.jobs {
            let queue = registry.queue_for(&job.job).unwrap_or("?");
            let deps = if job.dependents.is_empty() {
                String::new()
            } else {
                let names: Vec<&str> = job.dependents.iter().map(|d| d.as_str()).collect();
                format!(" [pulls in: {}]", names.join(", "))
            };
            println!("        {} (queue: {}){}", job.job, queue, deps.dimmed());
        }
    }

    Ok(())
}
