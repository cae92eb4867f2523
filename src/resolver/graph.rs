// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Dependency graph of jobs
//!
//! A petgraph view of the direct "pulls in" relation, used for path queries
//! and for rendering the configuration as text, DOT or Mermaid.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

use super::DependencyResolver;
use crate::registry::JobId;

/// Directed graph where an edge `a -> b` means "running `a` pulls in `b`"
pub struct DependencyGraph {
    graph: DiGraph<JobId, ()>,
    index: HashMap<JobId, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from a resolver's direct dependents
    pub fn build(resolver: &DependencyResolver) -> Self {
        let mut builder = Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        };

        // Declared jobs first so node order follows the configuration
        for stage in &resolver.config().stages {
            for decl in &stage.jobs {
                builder.node(decl.job());
            }
        }

        // Sorted so rendering is stable across runs
        let edges: BTreeMap<&JobId, &[JobId]> = resolver.edges().collect();
        for (job, deps) in edges {
            let from = builder.node(job);
            for dep in deps {
                let to = builder.node(dep);
                if !builder.graph.contains_edge(from, to) {
                    builder.graph.add_edge(from, to, ());
                }
            }
        }

        builder
    }

    fn node(&mut self, job: &JobId) -> NodeIndex {
        if let Some(idx) = self.index.get(job) {
            return *idx;
        }
        let idx = self.graph.add_node(job.clone());
        self.index.insert(job.clone(), idx);
        idx
    }

    /// Number of jobs in the graph
    pub fn job_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of direct dependency links
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if running `from` pulls in `to`, directly or transitively
    pub fn has_path(&self, from: &JobId, to: &JobId) -> bool {
        let (Some(a), Some(b)) = (self.index.get(from), self.index.get(to)) else {
            return false;
        };

        petgraph::algo::has_path_connecting(&self.graph, *a, *b, None)
    }

    /// Generate Mermaid diagram of the graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph LR\n");

        for idx in self.graph.node_indices() {
            out.push_str(&format!("    n{}[\"{}\"]\n", idx.index(), self.graph[idx]));
        }

        for edge in self.graph.raw_edges() {
            out.push_str(&format!(
                "    n{} --> n{}\n",
                edge.source().index(),
                edge.target().index()
            ));
        }

        out
    }

    /// Generate DOT diagram of the graph
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipes {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for edge in self.graph.raw_edges() {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\";\n",
                self.graph[edge.source()],
                self.graph[edge.target()]
            ));
        }

        // Isolated jobs
        for idx in self.graph.node_indices() {
            if self.graph.neighbors_undirected(idx).count() == 0 {
                out.push_str(&format!("    \"{}\";\n", self.graph[idx]));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate text listing of stages with resolved dependents
    pub fn to_text(&self, resolver: &DependencyResolver) -> String {
        let mut out = String::new();

        for (i, stage) in resolver.resolved_stages().stages.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, stage.name));

            for job in &stage.jobs {
                out.push_str(&format!("     - {}", job.job));
                if !job.dependents.is_empty() {
                    let deps: Vec<&str> = job.dependents.iter().map(JobId::as_str).collect();
                    out.push_str(&format!(" [pulls in: {}]", deps.join(", ")));
                }
                out.push('\n');
            }
        }

        out
    }
}
