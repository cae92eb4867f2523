// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Job selectors

use crate::registry::{JobId, StageName};

/// One requested item in a run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Selector {
    /// A known job identifier
    Job(JobId),
    /// Every job declared in a stage
    Stage(StageName),
    /// A job name, looked up in the registry
    Name(String),
}

impl From<JobId> for Selector {
    fn from(job: JobId) -> Self {
        Self::Job(job)
    }
}

impl From<StageName> for Selector {
    fn from(stage: StageName) -> Self {
        Self::Stage(stage)
    }
}

impl From<&str> for Selector {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Selector {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// A flat list of selectors; single values and lists convert alike
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<Selector>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for Selection {
    type Item = Selector;
    type IntoIter = std::vec::IntoIter<Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Selector> for Selection {
    fn from(selector: Selector) -> Self {
        Self(vec![selector])
    }
}

impl From<JobId> for Selection {
    fn from(job: JobId) -> Self {
        Self(vec![Selector::Job(job)])
    }
}

impl From<StageName> for Selection {
    fn from(stage: StageName) -> Self {
        Self(vec![Selector::Stage(stage)])
    }
}

impl From<&str> for Selection {
    fn from(name: &str) -> Self {
        Self(vec![Selector::from(name)])
    }
}

impl<T: Into<Selector>> From<Vec<T>> for Selection {
    fn from(items: Vec<T>) -> Self {
        Self(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Selector>> FromIterator<T> for Selection {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
