// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Resque-compatible executor
//!
//! Writes jobs in the format Resque workers read:
//!
//! ```text
//! SADD  resque:queues          publishers
//! RPUSH resque:queue:publishers {"class":"Publishers::Publisher","args":["en-US"]}
//! ```

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use serde::Serialize;

use super::JobExecutor;
use crate::errors::{PipesError, PipesResult};
use crate::pipe::{JobArgs, JobEntry};
use crate::registry::JobRegistry;

/// Default Resque key namespace
pub const DEFAULT_NAMESPACE: &str = "resque";

#[derive(Serialize)]
struct Payload<'a> {
    class: &'a str,
    args: &'a JobArgs,
}

/// Enqueues jobs onto Resque queues in Redis
pub struct ResqueExecutor {
    conn: MultiplexedConnection,
    registry: JobRegistry,
    namespace: String,
}

impl ResqueExecutor {
    /// Connect to Redis; queues come from the registry
    pub async fn connect(url: &str, registry: JobRegistry) -> PipesResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn,
            registry,
            namespace: DEFAULT_NAMESPACE.to_string(),
        })
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    fn queue_key(&self, queue: &str) -> String {
        queue_key(&self.namespace, queue)
    }

    fn queues_key(&self) -> String {
        format!("{}:queues", self.namespace)
    }
}

fn queue_key(namespace: &str, queue: &str) -> String {
    format!("{namespace}:queue:{queue}")
}

fn payload(entry: &JobEntry) -> PipesResult<String> {
    serde_json::to_string(&Payload {
        class: entry.job.as_str(),
        args: &entry.args,
    })
    .map_err(Into::into)
}

#[async_trait]
impl JobExecutor for ResqueExecutor {
    async fn enqueue(&self, entry: &JobEntry) -> PipesResult<()> {
        let queue = self
            .registry
            .queue_for(&entry.job)
            .ok_or_else(|| PipesError::Enqueue {
                job: entry.job.to_string(),
                message: "job is not registered with a queue".to_string(),
            })?;

        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .sadd(self.queues_key(), queue)
            .ignore()
            .rpush(self.queue_key(queue), payload(entry)?)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(|e| PipesError::Enqueue {
                job: entry.job.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(job = %entry.job, queue, "Enqueued job");
        Ok(())
    }
}
