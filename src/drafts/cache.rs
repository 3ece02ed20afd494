//! Local draft cache: one JSON entry per owner, overwritten on every sweep.
//!
//! The cache is a recovery copy, not a log. Reads that fail are treated as
//! "absent" and writes are best-effort; both log instead of failing the
//! editing session.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::model::{DraftStatus, OwnerId, ProfileDraft, SectionName};

/// Cached copy of one section, kept as raw JSON and re-checked on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedSection {
    pub value: serde_json::Value,
    pub revision: u64,
    pub base: u64,
    pub synced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub owner_id: OwnerId,
    #[serde(default)]
    pub sections: BTreeMap<SectionName, CachedSection>,
    pub revision: u64,
    #[serde(default)]
    pub remote_revision: u64,
    #[serde(default)]
    pub status: DraftStatus,
    pub last_written_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn from_draft(draft: &ProfileDraft, now: DateTime<Utc>) -> Self {
        let sections = draft
            .sections
            .iter()
            .map(|(name, entry)| {
                (
                    *name,
                    CachedSection {
                        value: entry.value.to_json(),
                        revision: entry.revision,
                        base: entry.base,
                        synced: entry.synced,
                    },
                )
            })
            .collect();
        Self {
            owner_id: draft.owner_id,
            sections,
            revision: draft.revision,
            remote_revision: draft.remote_revision,
            status: draft.status,
            last_written_at: now,
        }
    }
}

/// Durable key-value persistence for drafts, keyed by owner.
pub trait LocalCache {
    fn read(&self, owner_id: &OwnerId) -> Option<CacheEntry>;
    fn write(&self, owner_id: &OwnerId, entry: &CacheEntry);
}

/// File-backed cache storing `<dir>/<owner-id>.json`.
pub struct FileDraftCache {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileDraftCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn entry_path(&self, owner_id: &OwnerId) -> PathBuf {
        self.dir.join(format!("{owner_id}.json"))
    }
}

impl LocalCache for FileDraftCache {
    fn read(&self, owner_id: &OwnerId) -> Option<CacheEntry> {
        match read_entry(self.entry_path(owner_id)) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(owner = %owner_id, error = ?err, "ignoring unreadable draft cache entry");
                None
            }
        }
    }

    fn write(&self, owner_id: &OwnerId, entry: &CacheEntry) {
        let _guard = match self.write_lock.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match write_entry(self.entry_path(owner_id), entry) {
            Ok(hash) => debug!(owner = %owner_id, revision = entry.revision, %hash, "draft cache written"),
            Err(err) => {
                warn!(owner = %owner_id, error = ?err, "draft cache write failed")
            }
        }
    }
}

/// In-memory cache for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryDraftCache {
    entries: Mutex<HashMap<OwnerId, CacheEntry>>,
    writes: Mutex<usize>,
}

impl MemoryDraftCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of writes performed so far.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|count| *count).unwrap_or_default()
    }
}

impl LocalCache for MemoryDraftCache {
    fn read(&self, owner_id: &OwnerId) -> Option<CacheEntry> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(owner_id).cloned())
    }

    fn write(&self, owner_id: &OwnerId, entry: &CacheEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(*owner_id, entry.clone());
        }
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
    }
}

/// Loads a cache entry if it exists.
pub fn read_entry<P: AsRef<Path>>(path: P) -> Result<Option<CacheEntry>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read(path).with_context(|| format!("Failed reading draft cache {:?}", path))?;
    let entry = serde_json::from_slice(&data)
        .with_context(|| format!("Failed parsing draft cache {:?}", path))?;
    Ok(Some(entry))
}

/// Writes a cache entry via a temp file and rename, returning the payload hash.
pub fn write_entry<P: AsRef<Path>>(path: P, entry: &CacheEntry) -> Result<String> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed creating draft cache directory {:?}", parent))?;
    }
    let payload = serde_json::to_vec_pretty(entry)
        .with_context(|| format!("Failed serializing draft cache {:?}", path))?;
    let hash = compute_hash(&payload);
    let tmp = path.with_extension("json.tmp");
    let mut file =
        fs::File::create(&tmp).with_context(|| format!("Failed opening draft cache {:?}", tmp))?;
    file.write_all(&payload)?;
    file.sync_all()?;
    fs::rename(&tmp, path).with_context(|| format!("Failed replacing draft cache {:?}", path))?;
    Ok(hash)
}

/// Computes a lowercase hex SHA-256 hash of the provided bytes.
pub fn compute_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    format!("{:x}", digest)
}
