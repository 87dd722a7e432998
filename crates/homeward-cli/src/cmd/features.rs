use crate::output::{print_json, print_table};
use anyhow::Context;
use homeward_core::{config::Config, gate::StageGate, store::ProfileStore, types::FeatureKey};
use std::path::Path;

pub fn run(root: &Path, user: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let store = ProfileStore::new(root);
    let gate = StageGate::new(&config.roadmap);

    let record = store
        .read(user)
        .with_context(|| format!("failed to read progress for '{user}'"))?;

    if json {
        let features: Vec<serde_json::Value> = FeatureKey::all()
            .iter()
            .map(|&f| {
                serde_json::json!({
                    "feature": f,
                    "required_stage": f.required_stage(),
                    "unlocked": gate.is_feature_unlocked(&record, f),
                })
            })
            .collect();
        print_json(&serde_json::json!({ "user": user, "features": features }))?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = FeatureKey::all()
        .iter()
        .map(|&f| {
            vec![
                f.to_string(),
                format!("stage {}", f.required_stage()),
                if gate.is_feature_unlocked(&record, f) {
                    "unlocked".to_string()
                } else {
                    "locked".to_string()
                },
            ]
        })
        .collect();
    print_table(&["FEATURE", "REQUIRES", "STATE"], rows);
    Ok(())
}
