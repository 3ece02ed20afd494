//! Remote draft service capability.
//!
//! The authoritative copy lives behind an authenticated API. This module only
//! fixes the contract; transports implement [`RemoteDraftService`] and carry
//! their own credentials and timeouts. [`InMemoryDraftService`] is a loopback
//! implementation used by tests and local tooling.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::RemoteError;
use super::model::{DraftStatus, OwnerId, SectionName};

/// Remote copy of one section with the remote revision that last wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSection {
    pub value: Value,
    pub revision: u64,
}

/// Remote copy of a draft as returned by `load`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDraft {
    pub owner_id: OwnerId,
    pub revision: u64,
    pub status: DraftStatus,
    #[serde(default)]
    pub sections: BTreeMap<SectionName, RemoteSection>,
}

impl RemoteDraft {
    pub fn empty(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            revision: 0,
            status: DraftStatus::Draft,
            sections: BTreeMap::new(),
        }
    }
}

/// Successful remote write, carrying the remote revision after the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub revision: u64,
}

pub trait RemoteDraftService {
    fn load(&self, owner_id: &OwnerId) -> Result<RemoteDraft, RemoteError>;

    /// Stores one section. Fails with `Conflict` when the remote copy of that
    /// section was written after `expected_revision`.
    fn save_section(
        &self,
        owner_id: &OwnerId,
        section: SectionName,
        value: &Value,
        expected_revision: u64,
    ) -> Result<Ack, RemoteError>;

    /// Marks the remote draft published. Fails with `Conflict` when the remote
    /// revision is ahead of `expected_revision`.
    fn publish(&self, owner_id: &OwnerId, expected_revision: u64) -> Result<Ack, RemoteError>;
}

/// Operation recorded by [`InMemoryDraftService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Load(OwnerId),
    SaveSection {
        owner_id: OwnerId,
        section: SectionName,
        expected_revision: u64,
    },
    Publish {
        owner_id: OwnerId,
        expected_revision: u64,
    },
}

/// Failure mode injected into [`InMemoryDraftService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Online,
    Offline,
    TimingOut,
    Unauthenticated,
    /// Loads succeed; saves and publishes are rejected with a 401.
    WritesUnauthenticated,
}

#[derive(Default)]
pub struct InMemoryDraftService {
    drafts: Mutex<HashMap<OwnerId, RemoteDraft>>,
    calls: Mutex<Vec<RemoteCall>>,
    availability: Mutex<Availability>,
}

impl InMemoryDraftService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_availability(&self, availability: Availability) {
        if let Ok(mut current) = self.availability.lock() {
            *current = availability;
        }
    }

    /// Replaces the stored remote draft, simulating another device's writes.
    pub fn seed(&self, draft: RemoteDraft) {
        if let Ok(mut drafts) = self.drafts.lock() {
            drafts.insert(draft.owner_id, draft);
        }
    }

    pub fn snapshot(&self, owner_id: &OwnerId) -> Option<RemoteDraft> {
        self.drafts
            .lock()
            .ok()
            .and_then(|drafts| drafts.get(owner_id).cloned())
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn save_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RemoteCall::SaveSection { .. }))
            .count()
    }

    pub fn publish_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RemoteCall::Publish { .. }))
            .count()
    }

    fn record(&self, call: RemoteCall) -> Result<(), RemoteError> {
        let is_write = !matches!(call, RemoteCall::Load(_));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        let availability = self
            .availability
            .lock()
            .map(|current| *current)
            .unwrap_or_default();
        match availability {
            Availability::Online => Ok(()),
            Availability::Offline => Err(RemoteError::Transport("connection refused".into())),
            Availability::TimingOut => Err(RemoteError::Timeout),
            Availability::Unauthenticated => Err(RemoteError::Unauthenticated),
            Availability::WritesUnauthenticated if is_write => Err(RemoteError::Unauthenticated),
            Availability::WritesUnauthenticated => Ok(()),
        }
    }

    fn with_drafts<T>(
        &self,
        f: impl FnOnce(&mut HashMap<OwnerId, RemoteDraft>) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut drafts = self
            .drafts
            .lock()
            .map_err(|_| RemoteError::Transport("remote store poisoned".into()))?;
        f(&mut drafts)
    }
}

impl RemoteDraftService for InMemoryDraftService {
    fn load(&self, owner_id: &OwnerId) -> Result<RemoteDraft, RemoteError> {
        self.record(RemoteCall::Load(*owner_id))?;
        self.with_drafts(|drafts| drafts.get(owner_id).cloned().ok_or(RemoteError::NotFound))
    }

    fn save_section(
        &self,
        owner_id: &OwnerId,
        section: SectionName,
        value: &Value,
        expected_revision: u64,
    ) -> Result<Ack, RemoteError> {
        self.record(RemoteCall::SaveSection {
            owner_id: *owner_id,
            section,
            expected_revision,
        })?;
        self.with_drafts(|drafts| {
            let draft = drafts
                .entry(*owner_id)
                .or_insert_with(|| RemoteDraft::empty(*owner_id));
            if let Some(existing) = draft.sections.get(&section) {
                if existing.revision > expected_revision {
                    return Err(RemoteError::Conflict {
                        current: draft.revision,
                    });
                }
            }
            draft.revision += 1;
            draft.status = DraftStatus::Draft;
            draft.sections.insert(
                section,
                RemoteSection {
                    value: value.clone(),
                    revision: draft.revision,
                },
            );
            Ok(Ack {
                revision: draft.revision,
            })
        })
    }

    fn publish(&self, owner_id: &OwnerId, expected_revision: u64) -> Result<Ack, RemoteError> {
        self.record(RemoteCall::Publish {
            owner_id: *owner_id,
            expected_revision,
        })?;
        self.with_drafts(|drafts| {
            let draft = drafts.get_mut(owner_id).ok_or(RemoteError::NotFound)?;
            if draft.revision > expected_revision {
                return Err(RemoteError::Conflict {
                    current: draft.revision,
                });
            }
            draft.status = DraftStatus::Published;
            Ok(Ack {
                revision: draft.revision,
            })
        })
    }
}
