// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipes contributors

//! Redis store backend
//!
//! Queues are Redis lists of JSON entries. Every operation that must check
//! and mutate together runs as a server-side Lua script, so any number of
//! processes can share one pipeline without double-launching a stage.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use super::{Dedup, Launch, StoreBackend};
use crate::errors::PipesResult;
use crate::pipe::JobEntry;
use crate::registry::StageName;

/// Append unless duplicate.
/// KEYS[1] stage list; ARGV[1] entry; ARGV[2] job; ARGV[3] "1" to match on job alone
const PUSH_SCRIPT: &str = r"
local pending = redis.call('LRANGE', KEYS[1], 0, -1)
for _, raw in ipairs(pending) do
  if raw == ARGV[1] then
    return 0
  end
  if ARGV[3] == '1' then
    local ok, entry = pcall(cjson.decode, raw)
    if ok and entry['job'] == ARGV[2] then
      return 0
    end
  end
end
redis.call('RPUSH', KEYS[1], ARGV[1])
return 1
";

/// Launch the first non-empty stage if idle.
/// KEYS[1] counter; KEYS[2] current marker; KEYS[3..] stage lists in order;
/// ARGV[n] stage name of KEYS[n + 2]. Returns {stage, entries...} or {}.
const LAUNCH_SCRIPT: &str = r"
local remaining = tonumber(redis.call('GET', KEYS[1]) or '0')
if remaining > 0 then
  return {}
end
for i = 3, #KEYS do
  local jobs = redis.call('LRANGE', KEYS[i], 0, -1)
  if #jobs > 0 then
    redis.call('DEL', KEYS[i])
    redis.call('SET', KEYS[1], #jobs)
    redis.call('SET', KEYS[2], ARGV[i - 2])
    table.insert(jobs, 1, ARGV[i - 2])
    return jobs
  end
end
return {}
";

/// Decrement, clamping the stored value at zero.
/// KEYS[1] counter; KEYS[2] current marker
const DONE_SCRIPT: &str = r"
local remaining = redis.call('DECR', KEYS[1])
if remaining <= 0 then
  redis.call('SET', KEYS[1], 0)
  redis.call('DEL', KEYS[2])
end
return remaining
";

/// Reset the counter and pop the current marker.
/// KEYS[1] counter; KEYS[2] current marker
const RELEASE_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[2])
redis.call('SET', KEYS[1], 0)
redis.call('DEL', KEYS[2])
return current
";

/// Key layout under a deployment prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreKeys {
    prefix: String,
}

impl StoreKeys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// List holding a stage's pending entries
    pub fn stage(&self, stage: &StageName) -> String {
        format!("{}:stages:{}", self.prefix, stage)
    }

    /// Pattern matching every stage list, configured or not
    pub fn stages_pattern(&self) -> String {
        format!("{}:stages:*", self.prefix)
    }

    /// In-flight job counter
    pub fn remaining(&self) -> String {
        format!("{}:stage_remaining", self.prefix)
    }

    /// Name of the stage in flight
    pub fn current(&self) -> String {
        format!("{}:stage_current", self.prefix)
    }

    /// Stage name encoded in a stage list key
    pub fn stage_from_key(&self, key: &str) -> Option<StageName> {
        key.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix(":stages:"))
            .filter(|name| !name.is_empty())
            .map(StageName::new)
    }
}

/// Store backend shared through Redis
pub struct RedisBackend {
    conn: MultiplexedConnection,
    keys: StoreKeys,
    push: Script,
    launch: Script,
    done: Script,
    release: Script,
}

impl RedisBackend {
    /// Connect to Redis and scope every key under `prefix`
    pub async fn connect(url: &str, prefix: impl Into<String>) -> PipesResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self::with_connection(conn, StoreKeys::new(prefix)))
    }

    /// Wrap an existing connection
    pub fn with_connection(conn: MultiplexedConnection, keys: StoreKeys) -> Self {
        Self {
            conn,
            keys,
            push: Script::new(PUSH_SCRIPT),
            launch: Script::new(LAUNCH_SCRIPT),
            done: Script::new(DONE_SCRIPT),
            release: Script::new(RELEASE_SCRIPT),
        }
    }

    pub fn keys(&self) -> &StoreKeys {
        &self.keys
    }

    async fn scan_stage_keys(&self) -> PipesResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let mut keys = Vec::new();
        {
            let mut iter = conn.scan_match::<_, String>(self.keys.stages_pattern()).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }
        keys.sort();
        keys.dedup();
        Ok(keys)
    }
}

#[async_trait]
impl StoreBackend for RedisBackend {
    async fn push(&self, stage: &StageName, entry: &JobEntry, dedup: Dedup) -> PipesResult<bool> {
        let mut conn = self.conn.clone();
        let raw = serde_json::to_string(entry)?;
        let job_only = if dedup == Dedup::JobOnly { "1" } else { "0" };

        let added: i64 = self
            .push
            .key(self.keys.stage(stage))
            .arg(raw)
            .arg(entry.job.as_str())
            .arg(job_only)
            .invoke_async(&mut conn)
            .await?;

        Ok(added == 1)
    }

    async fn launch_next(&self, order: &[StageName]) -> PipesResult<Option<Launch>> {
        let mut conn = self.conn.clone();
        let mut invocation = self.launch.prepare_invoke();
        invocation.key(self.keys.remaining()).key(self.keys.current());
        for stage in order {
            invocation.key(self.keys.stage(stage)).arg(stage.as_str());
        }

        let reply: Vec<String> = invocation.invoke_async(&mut conn).await?;
        let mut reply = reply.into_iter();
        let Some(stage) = reply.next() else {
            return Ok(None);
        };

        let jobs = reply
            .map(|raw| serde_json::from_str(&raw))
            .collect::<Result<Vec<JobEntry>, _>>()?;

        Ok(Some(Launch {
            stage: StageName::new(stage),
            jobs,
        }))
    }

    async fn set_in_flight(&self, stage: &StageName, count: usize) -> PipesResult<()> {
        let mut conn = self.conn.clone();
        redis::pipe()
            .atomic()
            .set(self.keys.remaining(), count)
            .ignore()
            .set(self.keys.current(), stage.as_str())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn decrement(&self) -> PipesResult<i64> {
        let mut conn = self.conn.clone();
        let remaining: i64 = self
            .done
            .key(self.keys.remaining())
            .key(self.keys.current())
            .invoke_async(&mut conn)
            .await?;
        Ok(remaining)
    }

    async fn release(&self) -> PipesResult<Option<StageName>> {
        let mut conn = self.conn.clone();
        let current: Option<String> = self
            .release
            .key(self.keys.remaining())
            .key(self.keys.current())
            .invoke_async(&mut conn)
            .await?;
        Ok(current.map(StageName::new))
    }

    async fn remaining(&self) -> PipesResult<i64> {
        let mut conn = self.conn.clone();
        let remaining: Option<i64> = conn.get(self.keys.remaining()).await?;
        Ok(remaining.unwrap_or(0))
    }

    async fn current_stage(&self) -> PipesResult<Option<StageName>> {
        let mut conn = self.conn.clone();
        let current: Option<String> = conn.get(self.keys.current()).await?;
        Ok(current.map(StageName::new))
    }

    async fn pending(&self, stage: &StageName) -> PipesResult<Vec<JobEntry>> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.lrange(self.keys.stage(stage), 0, -1).await?;
        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(Into::into))
            .collect()
    }

    async fn stored_stages(&self) -> PipesResult<Vec<StageName>> {
        Ok(self
            .scan_stage_keys()
            .await?
            .iter()
            .filter_map(|key| self.keys.stage_from_key(key))
            .collect())
    }

    async fn clear(&self, stage: &StageName) -> PipesResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.keys.stage(stage)).await?;
        Ok(())
    }

    async fn clear_all(&self) -> PipesResult<()> {
        let stage_keys = self.scan_stage_keys().await?;
        let mut conn = self.conn.clone();

        let mut pipe = redis::pipe();
        pipe.atomic();
        if !stage_keys.is_empty() {
            pipe.del(stage_keys).ignore();
        }
        pipe.set(self.keys.remaining(), 0)
            .ignore()
            .del(self.keys.current())
            .ignore();
        pipe.query_async::<_, ()>(&mut conn).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = StoreKeys::new("blog:pipes");

        assert_eq!(keys.stage(&"publishers".into()), "blog:pipes:stages:publishers");
        assert_eq!(keys.stages_pattern(), "blog:pipes:stages:*");
        assert_eq!(keys.remaining(), "blog:pipes:stage_remaining");
        assert_eq!(keys.current(), "blog:pipes:stage_current");
    }

    #[test]
    fn test_stage_from_key() {
        let keys = StoreKeys::new("pipes");

        assert_eq!(
            keys.stage_from_key("pipes:stages:any_stage_test"),
            Some(StageName::new("any_stage_test"))
        );
        assert_eq!(keys.stage_from_key("pipes:stage_remaining"), None);
        assert_eq!(keys.stage_from_key("other:stages:x"), None);
        assert_eq!(keys.stage_from_key("pipes:stages:"), None);
    }

    #[test]
    fn test_entries_serialize_deterministically() {
        let a = JobEntry::new("Writers::ContentWriter", vec![serde_json::json!({"b": 1, "a": 2})]);
        let b = JobEntry::new("Writers::ContentWriter", vec![serde_json::json!({"a": 2, "b": 1})]);

        let raw = serde_json::to_string(&a).unwrap();
        assert_eq!(raw, serde_json::to_string(&b).unwrap());
        assert!(raw.starts_with(r#"{"job":"Writers::ContentWriter","args":"#));
    }

    #[test]
    fn test_scripts_touch_declared_keys_only() {
        for script in [PUSH_SCRIPT, LAUNCH_SCRIPT, DONE_SCRIPT, RELEASE_SCRIPT] {
            assert!(!script.contains("KEYS *"));
            assert!(script.contains("KEYS[1]"));
        }
    }
}
