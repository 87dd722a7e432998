use crate::output::print_json;
use anyhow::{bail, Context};
use homeward_core::{config::Config, gate::StageGate, store::ProfileStore};
use std::path::Path;

pub fn run(root: &Path, user: &str, yes: bool, json: bool) -> anyhow::Result<()> {
    if !yes {
        bail!("reset is irreversible; re-run with --yes to confirm");
    }

    let config = Config::load_or_default(root).context("failed to load config")?;
    let store = ProfileStore::new(root);
    let gate = StageGate::new(&config.roadmap);

    let record = gate
        .reset_progress(&store, user)
        .with_context(|| format!("failed to reset progress for '{user}'"))?;

    if json {
        print_json(&serde_json::json!({
            "user": user,
            "current_stage": record.current_stage,
            "reset": true,
        }))?;
        return Ok(());
    }

    println!("Reset '{user}' back to stage 0.");
    Ok(())
}
