use anyhow::Result;
use chrono::Utc;
use creatordraft::drafts::cache::{CacheEntry, CachedSection};
use creatordraft::drafts::remote::{Availability, RemoteDraft, RemoteSection};
use creatordraft::drafts::{
    DraftStatus, EditingSession, LocalCache, MemoryDraftCache, OwnerId, PublishError,
    RemoteDraftService, SectionName,
};
use creatordraft::DraftConfig;
use serde_json::json;

use crate::support::payloads::{pricing_with_basic_price, valid};
use crate::IntegrationHarness;

fn no_resubmit() -> DraftConfig {
    let mut cfg = DraftConfig::default();
    cfg.sync.resubmit_on_start = false;
    cfg
}

/// Local revision 3 with pricing edited offline; remote at revision 5 with
/// pricing untouched since the local base.
fn seed_diverged(harness: &IntegrationHarness, cache: &MemoryDraftCache, owner: OwnerId) {
    let mut sections = std::collections::BTreeMap::new();
    sections.insert(
        SectionName::Overview,
        CachedSection {
            value: valid(SectionName::Overview),
            revision: 1,
            base: 1,
            synced: true,
        },
    );
    sections.insert(
        SectionName::Pricing,
        CachedSection {
            value: pricing_with_basic_price(300),
            revision: 3,
            base: 2,
            synced: false,
        },
    );
    cache.write(
        &owner,
        &CacheEntry {
            owner_id: owner,
            sections,
            revision: 3,
            remote_revision: 2,
            status: DraftStatus::Draft,
            last_written_at: Utc::now(),
        },
    );

    let mut remote = RemoteDraft::empty(owner);
    remote.revision = 5;
    let mut overview = valid(SectionName::Overview);
    overview["title"] = json!("Fitness and mobility content for apparel");
    for (section, value, revision) in [
        (SectionName::Overview, overview, 4),
        (SectionName::Pricing, pricing_with_basic_price(250), 2),
        (SectionName::Social, valid(SectionName::Social), 5),
    ] {
        remote
            .sections
            .insert(section, RemoteSection { value, revision });
    }
    harness.remote.seed(remote);
}

#[test]
fn offline_pricing_edit_is_kept_and_resubmitted() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let owner = OwnerId::new();
    seed_diverged(&harness, &cache, owner);

    let mut session = EditingSession::start(owner, no_resubmit(), &cache, &harness.remote)?;
    assert_eq!(session.report().resubmit, vec![SectionName::Pricing]);
    assert_eq!(session.revision(), 5);
    assert_eq!(
        session.get_section(SectionName::Pricing).unwrap().to_json(),
        pricing_with_basic_price(300)
    );
    assert_eq!(
        session.get_section(SectionName::Overview).unwrap().to_json()["title"],
        "Fitness and mobility content for apparel"
    );
    assert!(session.get_section(SectionName::Social).is_some());
    assert!(session.is_unsynced());

    assert!(session.flush_pending().unwrap().is_empty());
    let remote = harness.remote.snapshot(&owner).unwrap();
    assert_eq!(
        remote.sections[&SectionName::Pricing].value,
        pricing_with_basic_price(300)
    );
    assert_eq!(session.draft().remote_revision, 6);
    assert!(!session.is_unsynced());
    Ok(())
}

#[test]
fn start_resubmits_flagged_sections_by_default() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let owner = OwnerId::new();
    seed_diverged(&harness, &cache, owner);

    let session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
    assert!(session.pending_resubmit().is_empty());
    assert!(session.draft().dirty_sections().is_empty());
    Ok(())
}

#[test]
fn publish_after_concurrent_edit_requires_reconciliation() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let owner = OwnerId::new();
    let mut session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
    for section in SectionName::ALL {
        session.set_section(section, &valid(section))?;
    }
    assert!(session.flush_pending().unwrap().is_empty());
    assert_eq!(session.draft().remote_revision, 6);

    // A second device rewrites the bio after our last sync.
    let mut personal = valid(SectionName::Personal);
    personal["bio"] = json!("Former sprinter, now coaching.");
    harness
        .remote
        .save_section(&owner, SectionName::Personal, &personal, 6)?;

    let err = session.publish().unwrap_err();
    assert_eq!(
        err,
        PublishError::Conflict {
            submitted: 6,
            current: 7
        }
    );
    assert_eq!(session.draft().status, DraftStatus::Draft);
    assert_eq!(
        session.get_section(SectionName::Personal).unwrap().to_json(),
        personal
    );

    // After reconciliation the retry goes through.
    let published = session.publish()?;
    assert_eq!(published.status, DraftStatus::Published);
    Ok(())
}

#[test]
fn transient_publish_failure_can_be_retried() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let owner = OwnerId::new();
    let mut session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
    for section in SectionName::ALL {
        session.set_section(section, &valid(section))?;
    }
    assert!(session.flush_pending().unwrap().is_empty());
    let before = session.draft().clone();

    harness.remote.set_availability(Availability::TimingOut);
    let err = session.publish().unwrap_err();
    assert!(matches!(err, PublishError::Transient(_)));
    assert_eq!(session.draft(), &before);

    harness.remote.set_availability(Availability::Online);
    assert_eq!(session.publish()?.status, DraftStatus::Published);
    Ok(())
}

#[test]
fn unauthenticated_start_is_surfaced() {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    harness.remote.set_availability(Availability::Unauthenticated);
    let result = EditingSession::start(OwnerId::new(), DraftConfig::default(), &cache, &harness.remote);
    assert!(result.is_err());
    assert_eq!(harness.remote.calls().len(), 1);
}

#[test]
fn unauthenticated_resubmit_on_start_is_not_retried() {
    let harness = IntegrationHarness::new();
    let owner = OwnerId::new();
    {
        let cache = harness.file_cache();
        let mut session = EditingSession::start(owner, no_resubmit(), &cache, &harness.remote)
            .unwrap();
        for section in SectionName::ALL {
            session.set_section(section, &valid(section)).unwrap();
        }
        session.flush_local();
    }

    harness
        .remote
        .set_availability(Availability::WritesUnauthenticated);
    let cache = harness.file_cache();
    let result = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote);
    assert_eq!(
        result.err(),
        Some(creatordraft::drafts::ReconcileError::Unauthenticated)
    );
    assert_eq!(harness.remote.save_calls(), 1);
    let cached = cache.read(&owner).unwrap();
    assert_eq!(cached.sections.len(), SectionName::ALL.len());
    assert!(cached.sections.values().all(|section| !section.synced));
}
