//! Session-start reconciliation of the local cache against the remote copy.
//!
//! Resolution is per section:
//! - a section held by only one side is taken from that side;
//! - an unsynced local edit wins when the remote copy of that section was
//!   last written at or before the remote revision the edit was based on,
//!   and is flagged for re-submission;
//! - otherwise the remote copy wins. An unsynced local edit that loses this
//!   way is reported as superseded.
//!
//! A transport failure falls back to the cached draft in full and marks the
//! session unsynced. Reconciliation never writes to the remote service.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use super::cache::{CacheEntry, LocalCache};
use super::error::{ReconcileError, RemoteError};
use super::model::{DraftStatus, OwnerId, ProfileDraft, SectionEntry, SectionName};
use super::remote::{RemoteDraft, RemoteDraftService};
use super::schema::parse_section;

/// What the reconciler decided, for the editing session to surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Sections taken from the local cache that still need a remote submit.
    pub resubmit: Vec<SectionName>,
    /// Unsynced local edits replaced by newer remote edits.
    pub superseded: Vec<SectionName>,
    /// Cached or remote payloads dropped because they no longer match the shape.
    pub dropped: Vec<SectionName>,
    /// True when the remote service could not be reached.
    pub unsynced: bool,
    pub remote_found: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub draft: ProfileDraft,
    pub report: ReconcileReport,
}

/// Outcome of the remote load, as seen by [`merge`].
#[derive(Debug, Clone)]
pub enum RemoteSnapshot {
    Found(RemoteDraft),
    NotFound,
    Unreachable(String),
}

pub struct Reconciler<'a> {
    cache: &'a dyn LocalCache,
    remote: &'a dyn RemoteDraftService,
}

impl<'a> Reconciler<'a> {
    pub fn new(cache: &'a dyn LocalCache, remote: &'a dyn RemoteDraftService) -> Self {
        Self { cache, remote }
    }

    pub fn reconcile(&self, owner_id: &OwnerId) -> Result<Reconciled, ReconcileError> {
        let local = self.cache.read(owner_id);
        let remote = match self.remote.load(owner_id) {
            Ok(draft) => RemoteSnapshot::Found(draft),
            Err(RemoteError::NotFound) => RemoteSnapshot::NotFound,
            Err(RemoteError::Unauthenticated) => return Err(ReconcileError::Unauthenticated),
            Err(err) => {
                warn!(owner = %owner_id, error = %err, "remote draft unavailable; using local cache");
                RemoteSnapshot::Unreachable(err.to_string())
            }
        };
        let reconciled = merge(*owner_id, local, remote);
        info!(
            owner = %owner_id,
            revision = reconciled.draft.revision,
            resubmit = reconciled.report.resubmit.len(),
            superseded = reconciled.report.superseded.len(),
            unsynced = reconciled.report.unsynced,
            "draft reconciled"
        );
        Ok(reconciled)
    }
}

/// Pure merge of a cache entry with a remote snapshot.
pub fn merge(owner_id: OwnerId, local: Option<CacheEntry>, remote: RemoteSnapshot) -> Reconciled {
    let mut report = ReconcileReport::default();
    let local = local.filter(|entry| entry.owner_id == owner_id);
    let local_sections = local
        .as_ref()
        .map(|entry| load_cached_sections(entry, &mut report))
        .unwrap_or_default();
    let local_revision = local.as_ref().map(|entry| entry.revision).unwrap_or(0);
    let local_status = local
        .as_ref()
        .map(|entry| settle_status(entry.status))
        .unwrap_or_default();

    let remote = match remote {
        RemoteSnapshot::Found(draft) => Some(draft),
        RemoteSnapshot::NotFound => Some(RemoteDraft::empty(owner_id)),
        RemoteSnapshot::Unreachable(_) => {
            report.unsynced = true;
            None
        }
    };

    let Some(remote) = remote else {
        report.resubmit = unsynced_names(&local_sections);
        let draft = ProfileDraft {
            owner_id,
            sections: local_sections,
            revision: local_revision,
            remote_revision: local.as_ref().map(|e| e.remote_revision).unwrap_or(0),
            status: local_status,
        };
        return Reconciled { draft, report };
    };

    report.remote_found = remote.revision > 0 || !remote.sections.is_empty();
    let remote_sections = load_remote_sections(&remote, &mut report);
    let mut sections = BTreeMap::new();
    for name in SectionName::ALL {
        let chosen = match (local_sections.get(&name), remote_sections.get(&name)) {
            (None, None) => continue,
            (Some(local), None) => {
                report.resubmit.push(name);
                SectionEntry {
                    synced: false,
                    ..local.clone()
                }
            }
            (None, Some(remote)) => remote.clone(),
            (Some(local), Some(remote)) => {
                if !local.synced && remote.base <= local.base {
                    report.resubmit.push(name);
                    local.clone()
                } else {
                    if !local.synced && local.value != remote.value {
                        warn!(owner = %owner_id, section = %name, "local edit superseded by newer remote edit");
                        report.superseded.push(name);
                    }
                    remote.clone()
                }
            }
        };
        sections.insert(name, chosen);
    }

    let status = if report.resubmit.is_empty() {
        remote.status
    } else {
        DraftStatus::Draft
    };
    debug!(owner = %owner_id, local_revision, remote_revision = remote.revision, "merged draft sections");
    Reconciled {
        draft: ProfileDraft {
            owner_id,
            sections,
            revision: local_revision.max(remote.revision),
            remote_revision: remote.revision,
            status: settle_status(status),
        },
        report,
    }
}

fn settle_status(status: DraftStatus) -> DraftStatus {
    match status {
        DraftStatus::Publishing => DraftStatus::Draft,
        other => other,
    }
}

fn unsynced_names(sections: &BTreeMap<SectionName, SectionEntry>) -> Vec<SectionName> {
    sections
        .iter()
        .filter(|(_, entry)| !entry.synced)
        .map(|(name, _)| *name)
        .collect()
}

fn load_cached_sections(
    entry: &CacheEntry,
    report: &mut ReconcileReport,
) -> BTreeMap<SectionName, SectionEntry> {
    let mut sections = BTreeMap::new();
    for (name, cached) in &entry.sections {
        match parse_section(*name, &cached.value) {
            Ok(value) => {
                sections.insert(
                    *name,
                    SectionEntry {
                        value,
                        revision: cached.revision,
                        base: cached.base,
                        synced: cached.synced,
                    },
                );
            }
            Err(err) => {
                warn!(section = %name, error = %err, "dropping cached section with invalid shape");
                report.dropped.push(*name);
            }
        }
    }
    sections
}

/// Remote sections as synced entries; `base` carries the remote write revision.
fn load_remote_sections(
    remote: &RemoteDraft,
    report: &mut ReconcileReport,
) -> BTreeMap<SectionName, SectionEntry> {
    let mut sections = BTreeMap::new();
    for (name, section) in &remote.sections {
        match parse_section(*name, &section.value) {
            Ok(value) => {
                sections.insert(
                    *name,
                    SectionEntry {
                        value,
                        revision: section.revision,
                        base: section.revision,
                        synced: true,
                    },
                );
            }
            Err(err) => {
                warn!(section = %name, error = %err, "dropping remote section with invalid shape");
                report.dropped.push(*name);
            }
        }
    }
    sections
}
