use creatordraft::drafts::{FileDraftCache, InMemoryDraftService};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct IntegrationHarness {
    workspace: TempDir,
    pub remote: InMemoryDraftService,
}

impl IntegrationHarness {
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("failed to create temp workspace");
        Self {
            workspace,
            remote: InMemoryDraftService::new(),
        }
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.workspace.path().join("cache").join("drafts")
    }

    /// A fresh file cache over the same directory, as after a process restart.
    pub fn file_cache(&self) -> FileDraftCache {
        FileDraftCache::new(self.cache_dir())
    }
}

mod config_loading;
mod end_to_end_publish;
mod file_cache_recovery;
mod offline_conflict;
pub mod support;
