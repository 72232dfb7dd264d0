//! Agent name cache.
//!
//! Agent listings carry friendly names; profile lookups only carry an id. The cache bridges
//! the two: every listing fetch upserts its agents, and profile rendering resolves the display
//! name from whatever was cached, falling back to the id.
//!
//! Two stores are provided:
//! - [`InMemoryNameCache`] for tests and short-lived processes
//! - [`JsonFileNameCache`], which persists the cache as a JSON array so names survive restarts

use crate::agent::AgentRecord;
use crate::{DashboardError, DashboardResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Keyed store of agent records, shared across requests.
pub trait NameCache: Send + Sync {
    /// Insert or replace each record by id.
    ///
    /// May block on file I/O; async callers run it on the blocking pool.
    fn upsert(&self, agents: &[AgentRecord]) -> DashboardResult<()>;

    fn get(&self, id: &str) -> Option<AgentRecord>;

    /// Display name for `id`, or the id itself when nothing is cached.
    fn display_name(&self, id: &str) -> String {
        self.get(id)
            .map(|agent| agent.display_name())
            .unwrap_or_else(|| id.to_string())
    }
}

type Entries = BTreeMap<String, AgentRecord>;

// A poisoned lock still holds a usable map; the cache is advisory.
fn read(lock: &RwLock<Entries>) -> RwLockReadGuard<'_, Entries> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(lock: &RwLock<Entries>) -> RwLockWriteGuard<'_, Entries> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn merge(entries: &mut Entries, agents: &[AgentRecord]) {
    for agent in agents {
        entries.insert(agent.id.clone(), agent.clone());
    }
}

#[derive(Debug, Default)]
pub struct InMemoryNameCache {
    entries: RwLock<Entries>,
}

impl InMemoryNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NameCache for InMemoryNameCache {
    fn upsert(&self, agents: &[AgentRecord]) -> DashboardResult<()> {
        merge(&mut write(&self.entries), agents);
        Ok(())
    }

    fn get(&self, id: &str) -> Option<AgentRecord> {
        read(&self.entries).get(id).cloned()
    }
}

/// Name cache persisted to a JSON file.
///
/// The whole cache is rewritten on every upsert. Files are small (one entry per agent), and a
/// full rewrite keeps the on-disk form a plain JSON array that can be inspected by hand.
#[derive(Debug)]
pub struct JsonFileNameCache {
    path: PathBuf,
    entries: RwLock<Entries>,
}

impl JsonFileNameCache {
    /// Open the cache at `path`.
    ///
    /// A missing file starts an empty cache. An unreadable or corrupt file is logged and also
    /// starts empty; it is replaced on the next upsert.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("ignoring agent name cache {}: {}", path.display(), e);
                Entries::new()
            }
        };
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    fn load(path: &Path) -> DashboardResult<Entries> {
        if !path.exists() {
            return Ok(Entries::new());
        }
        let contents = fs::read_to_string(path).map_err(DashboardError::CacheRead)?;
        let agents: Vec<AgentRecord> =
            serde_json::from_str(&contents).map_err(DashboardError::CacheDeserialization)?;
        let mut entries = Entries::new();
        merge(&mut entries, &agents);
        Ok(entries)
    }

    fn persist(&self, entries: &Entries) -> DashboardResult<()> {
        let agents: Vec<&AgentRecord> = entries.values().collect();
        let json =
            serde_json::to_string_pretty(&agents).map_err(DashboardError::CacheSerialization)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(DashboardError::CacheWrite)?;
        }
        // Write beside the target, then rename, so readers never see a half-written file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(DashboardError::CacheWrite)?;
        fs::rename(&tmp, &self.path).map_err(DashboardError::CacheWrite)
    }
}

impl NameCache for JsonFileNameCache {
    fn upsert(&self, agents: &[AgentRecord]) -> DashboardResult<()> {
        let mut entries = write(&self.entries);
        merge(&mut entries, agents);
        self.persist(&entries)
    }

    fn get(&self, id: &str) -> Option<AgentRecord> {
        read(&self.entries).get(id).cloned()
    }
}
