//! Process-local session backend.

use super::tracked::SessionBackend;
use dashmap::DashMap;
use portcullis_core::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default idle time after which a session expires.
pub const DEFAULT_MAX_INACTIVE: Duration = Duration::from_secs(30 * 60);

/// Stored session entry.
#[derive(Debug)]
struct SessionEntry {
    values: HashMap<String, Value>,
    last_access: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            last_access: Instant::now(),
        }
    }

    fn is_expired(&self, max_inactive: Duration) -> bool {
        self.last_access.elapsed() > max_inactive
    }

    fn touch(&mut self) {
        self.last_access = Instant::now();
    }
}

/// In-process session backend on a sharded concurrent map.
///
/// Each session lives in one map slot, so a write locks only its shard and
/// concurrent writers to the same session serialize instead of interleaving.
#[derive(Debug)]
pub struct MemoryBackend {
    sessions: DashMap<String, SessionEntry>,
    max_inactive: Duration,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INACTIVE)
    }
}

impl MemoryBackend {
    /// Create a backend whose sessions expire after `max_inactive` idle time.
    pub fn new(max_inactive: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            max_inactive,
        }
    }

    /// Idle time after which a session expires.
    pub fn max_inactive(&self) -> Duration {
        self.max_inactive
    }

    /// Number of stored sessions, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session is stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drops every expired session, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| !entry.is_expired(self.max_inactive));
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            tracing::debug!(removed, "purged expired sessions");
        }
        removed
    }
}

impl SessionBackend for MemoryBackend {
    fn create(&self, session_id: &str) -> anyhow::Result<()> {
        self.sessions
            .insert(session_id.to_string(), SessionEntry::new());
        Ok(())
    }

    fn exists(&self, session_id: &str) -> anyhow::Result<bool> {
        let live = match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                if entry.is_expired(self.max_inactive) {
                    false
                } else {
                    entry.touch();
                    true
                }
            }
            None => return Ok(false),
        };

        if !live {
            self.sessions
                .remove_if(session_id, |_, entry| entry.is_expired(self.max_inactive));
            tracing::debug!(session_id, "session expired");
        }
        Ok(live)
    }

    fn get(&self, session_id: &str, name: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.sessions.get(session_id).and_then(|entry| {
            if entry.is_expired(self.max_inactive) {
                None
            } else {
                entry.values.get(name).cloned()
            }
        }))
    }

    fn set(&self, session_id: &str, name: &str, value: Value) -> anyhow::Result<bool> {
        let Some(mut entry) = self.sessions.get_mut(session_id) else {
            return Ok(false);
        };
        if entry.is_expired(self.max_inactive) {
            drop(entry);
            self.sessions
                .remove_if(session_id, |_, entry| entry.is_expired(self.max_inactive));
            tracing::debug!(session_id, "session expired");
            return Ok(false);
        }

        if value.is_null() {
            entry.values.remove(name);
        } else {
            entry.values.insert(name.to_string(), value);
        }
        entry.touch();
        Ok(true)
    }

    fn destroy(&self, session_id: &str) -> anyhow::Result<bool> {
        Ok(self.sessions.remove(session_id).is_some())
    }
}
