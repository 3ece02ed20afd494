//! Publication gate: `draft -> publishing -> published`, or back to `draft`.
//!
//! Nothing reaches the remote service unless the draft is complete and every
//! section has been acknowledged. A failed publish leaves the draft exactly
//! as it was, apart from the transient `publishing` status.

use chrono::Utc;
use tracing::{info, warn};

use super::cache::{CacheEntry, LocalCache};
use super::completion::compute;
use super::error::{PublishError, RemoteError};
use super::model::{DraftStatus, ProfileDraft};
use super::reconcile::{ReconcileReport, Reconciler};
use super::remote::RemoteDraftService;
use super::store::DraftStore;

pub struct PublicationGate<'a> {
    cache: &'a dyn LocalCache,
    remote: &'a dyn RemoteDraftService,
}

/// Result of a publish attempt that lost a revision race.
#[derive(Debug)]
pub struct ConflictRecovery {
    pub error: PublishError,
    /// Freshly reconciled store, when reconciliation itself succeeded.
    pub store: Option<(DraftStore, ReconcileReport)>,
}

impl<'a> PublicationGate<'a> {
    pub fn new(cache: &'a dyn LocalCache, remote: &'a dyn RemoteDraftService) -> Self {
        Self { cache, remote }
    }

    /// Publishes the draft held by `store`.
    ///
    /// On a revision conflict the store is replaced by a freshly reconciled
    /// one before `PublishError::Conflict` is returned.
    pub fn publish(&self, store: &mut DraftStore) -> Result<ProfileDraft, PublishError> {
        match self.try_publish(store) {
            Ok(draft) => Ok(draft),
            Err(recovery) => {
                if let Some((reconciled, _)) = recovery.store {
                    *store = reconciled;
                }
                Err(recovery.error)
            }
        }
    }

    /// Like [`PublicationGate::publish`] but hands any reconciled store back to
    /// the caller instead of swapping it in.
    pub fn try_publish(&self, store: &mut DraftStore) -> Result<ProfileDraft, ConflictRecovery> {
        let fail = |error| ConflictRecovery { error, store: None };
        if store.status() != DraftStatus::Draft {
            return Err(fail(PublishError::InvalidStatus(store.status())));
        }
        let completion = compute(store.draft());
        if !completion.publishable {
            return Err(fail(PublishError::Incomplete(completion.missing)));
        }
        let dirty = store.dirty_sections();
        if !dirty.is_empty() {
            return Err(fail(PublishError::Unsynced(dirty)));
        }

        let owner_id = store.owner_id();
        let submitted = store.draft().remote_revision;
        store
            .begin_publishing()
            .map_err(|_| fail(PublishError::InvalidStatus(store.status())))?;
        info!(owner = %owner_id, submitted, "publishing profile");

        match self.remote.publish(&owner_id, submitted) {
            Ok(_) => {
                store
                    .mark_published()
                    .map_err(|_| fail(PublishError::InvalidStatus(store.status())))?;
                self.persist(store);
                info!(owner = %owner_id, "profile published");
                Ok(store.draft().clone())
            }
            Err(err) => {
                self.rollback(store);
                match err {
                    RemoteError::Conflict { current } => {
                        warn!(owner = %owner_id, submitted, current, "publish conflict; reconciling");
                        self.persist(store);
                        let reconciled = match Reconciler::new(self.cache, self.remote)
                            .reconcile(&owner_id)
                        {
                            Ok(reconciled) => Some((
                                DraftStore::from_draft(reconciled.draft),
                                reconciled.report,
                            )),
                            Err(err) => {
                                warn!(owner = %owner_id, error = %err, "reconciliation after publish conflict failed");
                                None
                            }
                        };
                        Err(ConflictRecovery {
                            error: PublishError::Conflict { submitted, current },
                            store: reconciled,
                        })
                    }
                    RemoteError::NotFound => Err(ConflictRecovery {
                        error: PublishError::Conflict {
                            submitted,
                            current: 0,
                        },
                        store: None,
                    }),
                    RemoteError::Unauthenticated => Err(fail(PublishError::Unauthenticated)),
                    other => {
                        warn!(owner = %owner_id, error = %other, "publish failed");
                        Err(fail(PublishError::Transient(other.to_string())))
                    }
                }
            }
        }
    }

    fn rollback(&self, store: &mut DraftStore) {
        if let Err(err) = store.revert_to_draft() {
            warn!(error = %err, "publish rollback skipped");
        }
    }

    fn persist(&self, store: &DraftStore) {
        self.cache.write(
            &store.owner_id(),
            &CacheEntry::from_draft(store.draft(), Utc::now()),
        );
    }
}
