use crate::output::print_json;
use anyhow::Context;
use homeward_core::{config::Config, gate::StageGate, store::ProfileStore};
use std::path::Path;

pub fn run(root: &Path, user: &str, target: u32, force: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let store = ProfileStore::new(root);
    let gate = StageGate::new(&config.roadmap);

    let record = gate
        .advance_stage(&store, user, target, force)
        .with_context(|| format!("failed to advance '{user}' to stage {target}"))?;

    if json {
        print_json(&serde_json::json!({
            "user": user,
            "current_stage": record.current_stage,
            "forced": force,
        }))?;
        return Ok(());
    }

    println!("Advanced '{user}' to stage {}.", record.current_stage);
    Ok(())
}
