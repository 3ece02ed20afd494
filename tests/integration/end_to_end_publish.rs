use anyhow::Result;
use creatordraft::drafts::remote::RemoteCall;
use creatordraft::drafts::{
    DraftStatus, EditingSession, LocalCache, MemoryDraftCache, OwnerId, PublishError, SectionName,
    Step,
};
use creatordraft::DraftConfig;

use crate::support::payloads::{pricing_with_basic_price, valid};
use crate::IntegrationHarness;

#[test]
fn empty_draft_to_published_profile() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let owner = OwnerId::new();
    let mut session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
    assert_eq!(session.revision(), 0);
    assert_eq!(session.draft().status, DraftStatus::Draft);

    session.set_section(SectionName::Overview, &valid(SectionName::Overview))?;
    let report = session.completion();
    assert_eq!(report.percent, 17);
    assert!(!report.publishable);
    assert_eq!(report.missing, SectionName::ALL[1..].to_vec());

    for section in &SectionName::ALL[1..] {
        session.set_section(*section, &valid(*section))?;
    }
    assert_eq!(session.revision(), 6);
    let report = session.completion();
    assert_eq!(report.percent, 100);
    assert!(report.publishable);

    let published = session.publish()?;
    assert_eq!(published.status, DraftStatus::Published);
    assert!(!session.is_unsynced());

    let remote = harness.remote.snapshot(&owner).expect("remote draft exists");
    assert_eq!(remote.status, DraftStatus::Published);
    assert_eq!(remote.sections.len(), 6);
    assert_eq!(harness.remote.publish_calls(), 1);
    assert_eq!(
        cache.read(&owner).expect("cached draft").status,
        DraftStatus::Published
    );
    Ok(())
}

#[test]
fn zero_price_blocks_publish_without_network() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let owner = OwnerId::new();
    let mut session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
    for section in SectionName::ALL {
        session.set_section(section, &valid(section))?;
    }
    // Shape-valid (a non-negative integer) but not a sellable price.
    session.set_section(SectionName::Pricing, &pricing_with_basic_price(0))?;

    let report = session.completion();
    assert_eq!(report.missing, vec![SectionName::Pricing]);
    assert!(!report.publishable);

    let calls_before = harness.remote.calls().len();
    let err = session.publish().unwrap_err();
    assert_eq!(err, PublishError::Incomplete(vec![SectionName::Pricing]));
    assert_eq!(harness.remote.calls().len(), calls_before);
    assert_eq!(session.draft().status, DraftStatus::Draft);
    Ok(())
}

#[test]
fn negative_price_is_rejected_at_the_boundary() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let mut session =
        EditingSession::start(OwnerId::new(), DraftConfig::default(), &cache, &harness.remote)?;
    session.set_section(SectionName::Pricing, &valid(SectionName::Pricing))?;
    let before = session.draft().clone();

    let err = session
        .set_section(SectionName::Pricing, &pricing_with_basic_price(-20))
        .unwrap_err();
    assert!(err.to_string().contains("basic.price"));
    assert_eq!(session.draft(), &before);
    Ok(())
}

#[test]
fn wizard_walks_forward_only_over_valid_sections() -> Result<()> {
    let harness = IntegrationHarness::new();
    let cache = MemoryDraftCache::new();
    let mut session =
        EditingSession::start(OwnerId::new(), DraftConfig::default(), &cache, &harness.remote)?;

    assert!(!session.can_advance());
    session.set_section(SectionName::Overview, &valid(SectionName::Overview))?;
    assert_eq!(session.next()?, Step::Section(SectionName::Pricing));

    session.set_section(SectionName::Pricing, &pricing_with_basic_price(0))?;
    assert!(session.next().is_err());
    // Going back to fix an earlier section is always allowed.
    assert_eq!(session.previous(), Step::Section(SectionName::Overview));
    session.set_section(SectionName::Overview, &valid(SectionName::Overview))?;
    assert_eq!(session.next()?, Step::Section(SectionName::Pricing));

    session.set_section(SectionName::Pricing, &valid(SectionName::Pricing))?;
    for section in &SectionName::ALL[2..] {
        session.set_section(*section, &valid(*section))?;
    }
    assert_eq!(session.go_to(Step::Review)?, Step::Review);

    let saves = harness
        .remote
        .calls()
        .iter()
        .filter(|call| matches!(call, RemoteCall::SaveSection { .. }))
        .count();
    assert_eq!(saves, 0, "navigation must not submit sections");
    Ok(())
}
