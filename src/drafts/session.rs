//! Editing session: owns the live draft store for one creator and wires it to
//! the cache, the remote service, the navigator, and the publication gate.
//!
//! Sessions are single-writer. Remote submits go through [`SubmitTicket`]s so
//! a result that arrives after the store was replaced (by a reconciliation)
//! is discarded instead of being applied to the wrong draft.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::DraftConfig;

use super::cache::{CacheEntry, LocalCache};
use super::completion::{compute, CompletionReport};
use super::error::{
    EditError, NavigationError, PublishError, ReconcileError, RemoteError, SubmitError,
    TransitionError,
};
use super::model::{OwnerId, ProfileDraft, SectionName, SectionValue};
use super::navigator::{Step, StepNavigator};
use super::persist::SweepSchedule;
use super::publish::PublicationGate;
use super::reconcile::{ReconcileReport, Reconciler};
use super::remote::{Ack, RemoteDraftService};
use super::store::DraftStore;

/// A section submit that has been handed to the remote service.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitTicket {
    pub store_id: Uuid,
    pub section: SectionName,
    pub value: Value,
    /// Draft revision of the submitted value.
    pub written_at: u64,
    pub expected_revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The remote acknowledged the value still held by the store.
    Synced(Ack),
    /// Acknowledged, but the section was edited again meanwhile.
    StillDirty(Ack),
    /// The store that issued the ticket is gone; nothing was applied.
    Discarded,
}

pub struct EditingSession<'a> {
    owner_id: OwnerId,
    config: DraftConfig,
    cache: &'a dyn LocalCache,
    remote: &'a dyn RemoteDraftService,
    store: DraftStore,
    navigator: StepNavigator,
    pending_resubmit: BTreeSet<SectionName>,
    report: ReconcileReport,
}

impl<'a> EditingSession<'a> {
    /// Starts a session: reconciles cache and remote into a live store.
    pub fn start(
        owner_id: OwnerId,
        config: DraftConfig,
        cache: &'a dyn LocalCache,
        remote: &'a dyn RemoteDraftService,
    ) -> Result<Self, ReconcileError> {
        let reconciled = Reconciler::new(cache, remote).reconcile(&owner_id)?;
        let mut session = Self {
            owner_id,
            store: DraftStore::from_draft(reconciled.draft)
                .with_sweep(SweepSchedule::new(config.debounce())),
            pending_resubmit: reconciled.report.resubmit.iter().copied().collect(),
            report: reconciled.report,
            config,
            cache,
            remote,
            navigator: StepNavigator::new(),
        };
        session.flush_local();
        info!(
            owner = %owner_id,
            revision = session.store.revision(),
            pending = session.pending_resubmit.len(),
            "editing session started"
        );
        if session.config.sync.resubmit_on_start && !session.report.unsynced {
            let failures = session
                .flush_pending()
                .map_err(|_| ReconcileError::Unauthenticated)?;
            if !failures.is_empty() {
                warn!(owner = %owner_id, failed = failures.len(), "re-submission on start incomplete");
            }
        }
        Ok(session)
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn draft(&self) -> &ProfileDraft {
        self.store.draft()
    }

    pub fn report(&self) -> &ReconcileReport {
        &self.report
    }

    /// True while local edits exist that the remote has not confirmed, so the
    /// UI can warn before the user navigates away.
    pub fn is_unsynced(&self) -> bool {
        self.report.unsynced || !self.store.dirty_sections().is_empty()
    }

    pub fn pending_resubmit(&self) -> Vec<SectionName> {
        self.pending_resubmit.iter().copied().collect()
    }

    pub fn set_section(&mut self, name: SectionName, raw: &Value) -> Result<ProfileDraft, EditError> {
        self.set_section_at(name, raw, Utc::now())
    }

    pub fn set_section_at(
        &mut self,
        name: SectionName,
        raw: &Value,
        now: DateTime<Utc>,
    ) -> Result<ProfileDraft, EditError> {
        self.store.set_section_at(name, raw, now)
    }

    pub fn get_section(&self, name: SectionName) -> Option<&SectionValue> {
        self.store.get_section(name)
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    /// Writes the cache if the debounce window has elapsed; returns whether it did.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        if self.store.take_due_sweep(now) {
            self.write_cache(now);
            true
        } else {
            false
        }
    }

    /// Writes the cache immediately, cancelling any scheduled sweep.
    pub fn flush_local(&mut self) {
        self.store.take_pending_sweep();
        self.write_cache(Utc::now());
    }

    fn write_cache(&self, now: DateTime<Utc>) {
        self.cache
            .write(&self.owner_id, &CacheEntry::from_draft(self.store.draft(), now));
    }

    /// Claims a section for submission. Only one submit per section may be
    /// outstanding at a time.
    pub fn begin_submit(&mut self, section: SectionName) -> Result<SubmitTicket, SubmitError> {
        let entry = self
            .store
            .entry(section)
            .cloned()
            .ok_or(SubmitError::Missing(section))?;
        if !self.store.claim_submit(section) {
            return Err(SubmitError::InFlight(section));
        }
        Ok(SubmitTicket {
            store_id: self.store.id(),
            section,
            value: entry.value.to_json(),
            written_at: entry.revision,
            expected_revision: entry.base,
        })
    }

    /// Applies the outcome of a submit started with [`Self::begin_submit`].
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<Ack, RemoteError>,
    ) -> Result<SubmitOutcome, SubmitError> {
        if ticket.store_id != self.store.id() {
            debug!(owner = %self.owner_id, section = %ticket.section, "discarding submit result for replaced store");
            return Ok(SubmitOutcome::Discarded);
        }
        self.store.release_submit(ticket.section);
        match result {
            Ok(ack) => {
                let synced = self.store.mark_synced(
                    ticket.section,
                    ticket.written_at,
                    ticket.expected_revision,
                    ack.revision,
                );
                debug!(owner = %self.owner_id, section = %ticket.section, remote_revision = ack.revision, synced, "section submitted");
                if synced {
                    self.pending_resubmit.remove(&ticket.section);
                    if self.store.dirty_sections().is_empty() {
                        self.report.unsynced = false;
                    }
                    Ok(SubmitOutcome::Synced(ack))
                } else {
                    Ok(SubmitOutcome::StillDirty(ack))
                }
            }
            Err(err) => {
                warn!(owner = %self.owner_id, section = %ticket.section, error = %err, "section submit failed");
                self.pending_resubmit.insert(ticket.section);
                Err(SubmitError::from_remote(ticket.section, err))
            }
        }
    }

    /// Submits one section to the remote service and waits for the result.
    pub fn submit_section(&mut self, section: SectionName) -> Result<SubmitOutcome, SubmitError> {
        let ticket = self.begin_submit(section)?;
        let result = self.remote.save_section(
            &self.owner_id,
            ticket.section,
            &ticket.value,
            ticket.expected_revision,
        );
        self.complete_submit(ticket, result)
    }

    /// Submits every dirty section and returns the retryable failures.
    ///
    /// Stops at the first 401: the remaining sections stay dirty and
    /// `SubmitError::Unauthenticated` is returned for re-authentication.
    pub fn flush_pending(&mut self) -> Result<Vec<SubmitError>, SubmitError> {
        let mut failures = Vec::new();
        for section in self.store.dirty_sections() {
            match self.submit_section(section) {
                Ok(_) => {}
                Err(SubmitError::Unauthenticated) => {
                    warn!(owner = %self.owner_id, %section, "re-authentication required; pending submits halted");
                    return Err(SubmitError::Unauthenticated);
                }
                Err(err) => failures.push(err),
            }
        }
        Ok(failures)
    }

    /// Re-runs reconciliation, replacing the live store.
    pub fn resync(&mut self) -> Result<&ReconcileReport, ReconcileError> {
        self.flush_local();
        let reconciled = Reconciler::new(self.cache, self.remote).reconcile(&self.owner_id)?;
        self.replace_store(
            DraftStore::from_draft(reconciled.draft),
            reconciled.report,
        );
        Ok(&self.report)
    }

    fn replace_store(&mut self, store: DraftStore, report: ReconcileReport) {
        self.store = store.with_sweep(SweepSchedule::new(self.config.debounce()));
        self.pending_resubmit = report.resubmit.iter().copied().collect();
        self.report = report;
        self.flush_local();
    }

    pub fn completion(&self) -> CompletionReport {
        compute(self.store.draft())
    }

    pub fn position(&self) -> Step {
        self.navigator.position()
    }

    pub fn can_advance(&self) -> bool {
        self.navigator.can_advance(&self.store)
    }

    pub fn next(&mut self) -> Result<Step, NavigationError> {
        self.navigator.next(&self.store)
    }

    pub fn previous(&mut self) -> Step {
        self.navigator.previous()
    }

    pub fn go_to(&mut self, target: Step) -> Result<Step, NavigationError> {
        self.navigator.go_to(target, &self.store)
    }

    /// Submits outstanding sections, then runs the publication gate.
    pub fn publish(&mut self) -> Result<ProfileDraft, PublishError> {
        let completion = compute(self.store.draft());
        if !completion.publishable {
            return Err(PublishError::Incomplete(completion.missing));
        }
        for section in self.store.dirty_sections() {
            let submitted = self.store.draft().remote_revision;
            match self.submit_section(section) {
                Ok(_) => {}
                Err(err @ SubmitError::Conflict { .. }) => {
                    if let Err(resync_err) = self.resync().map(|_| ()) {
                        warn!(owner = %self.owner_id, error = %resync_err, "resync after submit conflict failed");
                    }
                    return Err(PublishError::from_submit(err, submitted));
                }
                Err(err) => return Err(PublishError::from_submit(err, submitted)),
            }
        }
        let gate = PublicationGate::new(self.cache, self.remote);
        match gate.try_publish(&mut self.store) {
            Ok(draft) => {
                self.store.take_pending_sweep();
                Ok(draft)
            }
            Err(recovery) => {
                if let Some((store, report)) = recovery.store {
                    self.replace_store(store, report);
                }
                Err(recovery.error)
            }
        }
    }

    /// Unpublish/edit: moves a published profile back to draft.
    pub fn reopen_for_edit(&mut self) -> Result<(), TransitionError> {
        self.store.reopen_for_edit()?;
        self.flush_local();
        Ok(())
    }
}
