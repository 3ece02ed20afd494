use anyhow::{Context, Result};
use creatordraft::config;
use creatordraft::drafts::cache::read_entry;
use creatordraft::drafts::completion::{compute, SectionState};
use creatordraft::drafts::reconcile::{merge, RemoteSnapshot};
use creatordraft::drafts::{FileDraftCache, OwnerId};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let owner_arg = env::args()
        .nth(1)
        .context("Usage: cargo run --bin draft_status -- <owner-id>")?;
    let owner_id: OwnerId = owner_arg
        .parse()
        .with_context(|| format!("'{owner_arg}' is not a valid owner id"))?;

    let cfg = config::load_or_default()?;
    let cache = FileDraftCache::new(cfg.cache_dir()?);
    let path = cache.entry_path(&owner_id);
    let entry = read_entry(&path)?
        .with_context(|| format!("No cached draft for {owner_id} at {}", path.display()))?;
    let written = entry.last_written_at;

    // Offline view: the cached draft as a session would see it without the remote.
    let merged = merge(owner_id, Some(entry), RemoteSnapshot::Unreachable("offline".into()));
    let draft = &merged.draft;
    let completion = compute(draft);

    println!("Draft {owner_id}");
    println!("  status:          {}", draft.status);
    println!("  revision:        {}", draft.revision);
    println!("  remote revision: {}", draft.remote_revision);
    println!("  last written:    {}", written.to_rfc3339());
    println!("  fingerprint:     {}", draft.fingerprint());
    println!("  completion:      {}%", completion.percent);
    for progress in &completion.sections {
        let state = match &progress.state {
            SectionState::Complete => "complete".to_string(),
            SectionState::Missing => "missing".to_string(),
            SectionState::Invalid(violations) => format!("{} issue(s)", violations.len()),
        };
        let dirty = draft
            .sections
            .get(&progress.section)
            .map(|entry| !entry.synced)
            .unwrap_or(false);
        println!(
            "  - {:<16} {}{}",
            progress.section.as_str(),
            state,
            if dirty { " (not yet submitted)" } else { "" }
        );
    }
    if !merged.report.dropped.is_empty() {
        println!("  dropped malformed sections: {:?}", merged.report.dropped);
    }
    println!(
        "  publishable:     {}",
        if completion.publishable { "yes" } else { "no" }
    );
    Ok(())
}
