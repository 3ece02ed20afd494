//! In-process draft store for one editing session.
//!
//! Every successful section write bumps the revision by exactly one, marks
//! the section dirty, and schedules a debounced cache sweep. Failed writes
//! leave the store untouched.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::error::{EditError, TransitionError};
use super::model::{DraftStatus, OwnerId, ProfileDraft, SectionEntry, SectionName, SectionValue};
use super::persist::SweepSchedule;
use super::schema::parse_section;

#[derive(Debug)]
pub struct DraftStore {
    id: Uuid,
    draft: ProfileDraft,
    sweep: SweepSchedule,
    in_flight: BTreeSet<SectionName>,
}

impl DraftStore {
    /// Fresh draft for an owner who has never started onboarding.
    pub fn new(owner_id: OwnerId) -> Self {
        Self::from_draft(ProfileDraft::empty(owner_id))
    }

    pub fn from_draft(draft: ProfileDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            draft,
            sweep: SweepSchedule::default(),
            in_flight: BTreeSet::new(),
        }
    }

    pub fn with_sweep(mut self, sweep: SweepSchedule) -> Self {
        self.sweep = sweep;
        self
    }

    /// Identity of this store instance; a replaced store gets a new one.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> OwnerId {
        self.draft.owner_id
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn revision(&self) -> u64 {
        self.draft.revision
    }

    pub fn status(&self) -> DraftStatus {
        self.draft.status
    }

    pub fn get_section(&self, name: SectionName) -> Option<&SectionValue> {
        self.draft.section(name)
    }

    pub fn entry(&self, name: SectionName) -> Option<&SectionEntry> {
        self.draft.sections.get(&name)
    }

    pub fn dirty_sections(&self) -> Vec<SectionName> {
        self.draft.dirty_sections()
    }

    pub fn set_section(&mut self, name: SectionName, raw: &Value) -> Result<ProfileDraft, EditError> {
        self.set_section_at(name, raw, Utc::now())
    }

    /// Parses and stores a section; the clock drives the debounced sweep.
    pub fn set_section_at(
        &mut self,
        name: SectionName,
        raw: &Value,
        now: DateTime<Utc>,
    ) -> Result<ProfileDraft, EditError> {
        if self.draft.status != DraftStatus::Draft {
            return Err(EditError::Locked {
                status: self.draft.status,
            });
        }
        let value = parse_section(name, raw)?;
        let revision = self.draft.revision + 1;
        let base = self
            .draft
            .sections
            .get(&name)
            .map(|entry| entry.base)
            .unwrap_or(self.draft.remote_revision);
        self.draft.sections.insert(
            name,
            SectionEntry {
                value,
                revision,
                base,
                synced: false,
            },
        );
        self.draft.revision = revision;
        self.sweep.touch(now);
        debug!(owner = %self.draft.owner_id, section = %name, revision, "section stored");
        Ok(self.draft.clone())
    }

    /// True when a debounced cache sweep is due at `now`; clears the schedule.
    pub fn take_due_sweep(&mut self, now: DateTime<Utc>) -> bool {
        self.sweep.take_due(now)
    }

    pub fn take_pending_sweep(&mut self) -> bool {
        self.sweep.take_pending()
    }

    pub fn sweep_pending(&self) -> bool {
        self.sweep.is_pending()
    }

    pub(crate) fn claim_submit(&mut self, name: SectionName) -> bool {
        self.in_flight.insert(name)
    }

    pub(crate) fn release_submit(&mut self, name: SectionName) {
        self.in_flight.remove(&name);
    }

    pub fn is_in_flight(&self, name: SectionName) -> bool {
        self.in_flight.contains(&name)
    }

    /// Applies a remote acknowledgement for a section submitted at `written_at`.
    ///
    /// Returns false when the section was edited again while the submit was
    /// outstanding; it then stays dirty but is rebased on the acked revision.
    pub(crate) fn mark_synced(
        &mut self,
        name: SectionName,
        written_at: u64,
        expected: u64,
        acked: u64,
    ) -> bool {
        if acked == self.draft.remote_revision + 1 {
            self.draft.remote_revision = acked;
        }
        let Some(entry) = self.draft.sections.get_mut(&name) else {
            return false;
        };
        if entry.base == expected {
            entry.base = acked;
        }
        if entry.revision == written_at {
            entry.synced = true;
        }
        self.sweep.touch(Utc::now());
        entry.synced
    }

    pub fn begin_publishing(&mut self) -> Result<(), TransitionError> {
        self.transition(DraftStatus::Draft, DraftStatus::Publishing)
    }

    pub fn mark_published(&mut self) -> Result<(), TransitionError> {
        self.transition(DraftStatus::Publishing, DraftStatus::Published)
    }

    /// Rolls a failed publish back to `draft`.
    pub fn revert_to_draft(&mut self) -> Result<(), TransitionError> {
        self.transition(DraftStatus::Publishing, DraftStatus::Draft)
    }

    /// Unpublish/edit action: reopens a published profile for editing.
    pub fn reopen_for_edit(&mut self) -> Result<(), TransitionError> {
        self.transition(DraftStatus::Published, DraftStatus::Draft)
    }

    fn transition(&mut self, from: DraftStatus, to: DraftStatus) -> Result<(), TransitionError> {
        if self.draft.status != from {
            return Err(TransitionError {
                from: self.draft.status,
                to,
            });
        }
        self.draft.status = to;
        debug!(owner = %self.draft.owner_id, %from, %to, "draft status changed");
        Ok(())
    }
}
