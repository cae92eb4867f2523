// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Graph command - visualize job dependencies

use miette::Result;
use std::path::Path;

use super::{load_config, GraphFormat};
use crate::resolver::{DependencyGraph, DependencyResolver};

/// Run the graph command
pub async fn run(config_path: &Path, format: GraphFormat, verbose: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let resolver = DependencyResolver::new(config.stage_config().clone())?;
    let graph = DependencyGraph::build(&resolver);

    if verbose {
        tracing::info!(
            jobs = graph.job_count(),
            edges = graph.edge_count(),
            "Built dependency graph"
        );
    }

    let output = match format {
        GraphFormat::Text => graph.to_text(&resolver),
        GraphFormat::Dot => graph.to_dot(),
        GraphFormat::Mermaid => graph.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
