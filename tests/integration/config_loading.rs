use anyhow::Result;
use creatordraft::config::{self, HOME_ENV_VAR};
use std::env;
use std::fs;

use crate::IntegrationHarness;

#[test]
fn config_round_trips_through_workspace_home() -> Result<()> {
    let harness = IntegrationHarness::new();
    env::set_var(HOME_ENV_VAR, harness.workspace_path());

    // No file yet: defaults.
    let cfg = config::load_or_default()?;
    assert_eq!(cfg.cache.debounce_ms, 750);
    assert_eq!(cfg.cache_dir()?, harness.cache_dir());

    let mut cfg = cfg;
    cfg.cache.debounce_ms = 200;
    cfg.sync.resubmit_on_start = false;
    config::save(&cfg)?;
    assert!(config::config_file_path()?.starts_with(harness.workspace_path()));

    let loaded = config::load_or_default()?;
    assert_eq!(loaded.cache.debounce_ms, 200);
    assert!(!loaded.sync.resubmit_on_start);

    fs::write(config::config_file_path()?, "[cache]\ndebounce_ms = \"soon\"\n")?;
    let err = config::load_or_default().unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse config file"));
    Ok(())
}
