use anyhow::Result;
use chrono::{Duration, Utc};
use creatordraft::drafts::remote::Availability;
use creatordraft::drafts::{EditingSession, OwnerId, SectionName};
use creatordraft::DraftConfig;

use crate::support::payloads::valid;
use crate::IntegrationHarness;

#[test]
fn offline_edits_survive_a_restart() -> Result<()> {
    let harness = IntegrationHarness::new();
    let owner = OwnerId::new();
    harness.remote.set_availability(Availability::Offline);

    {
        let cache = harness.file_cache();
        let mut session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
        assert!(session.report().unsynced);
        let now = Utc::now();
        session.set_section_at(SectionName::Overview, &valid(SectionName::Overview), now)?;
        session.set_section_at(SectionName::Social, &valid(SectionName::Social), now)?;
        assert!(session.submit_section(SectionName::Overview).is_err());
        assert!(session.tick(now + Duration::seconds(1)));
    }
    assert!(harness.file_cache().entry_path(&owner).exists());

    // Back online in a new process.
    harness.remote.set_availability(Availability::Online);
    let cache = harness.file_cache();
    let session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
    assert_eq!(session.revision(), 2);
    assert!(session.get_section(SectionName::Overview).is_some());
    assert!(session.get_section(SectionName::Social).is_some());
    assert!(!session.is_unsynced(), "flagged sections are resubmitted on start");

    let remote = harness.remote.snapshot(&owner).expect("remote draft created");
    assert_eq!(remote.sections.len(), 2);
    assert_eq!(session.completion().percent, 33);
    Ok(())
}

#[test]
fn reconciling_twice_yields_the_same_draft() -> Result<()> {
    let harness = IntegrationHarness::new();
    let owner = OwnerId::new();
    let cache = harness.file_cache();
    {
        let mut session = EditingSession::start(owner, DraftConfig::default(), &cache, &harness.remote)?;
        for section in [SectionName::Overview, SectionName::Gallery] {
            session.set_section(section, &valid(section))?;
        }
        session.submit_section(SectionName::Overview)?;
        session.flush_local();
    }

    let mut config = DraftConfig::default();
    config.sync.resubmit_on_start = false;
    let mut session = EditingSession::start(owner, config, &cache, &harness.remote)?;
    let first = session.draft().clone();
    session.resync()?;
    assert_eq!(session.draft(), &first);
    assert_eq!(session.pending_resubmit(), vec![SectionName::Gallery]);
    Ok(())
}
