use crate::output::print_json;
use anyhow::Context;
use homeward_core::{config::Config, gate::StageGate, store::ProfileStore};
use std::path::Path;

pub fn run(root: &Path, user: &str, stage: u32, task: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let store = ProfileStore::new(root);
    let gate = StageGate::new(&config.roadmap);

    let record = gate
        .verify_task(&store, user, stage, task)
        .with_context(|| format!("failed to verify task '{task}' for '{user}'"))?;

    let verified = record.is_stage_verified(stage);

    if json {
        print_json(&serde_json::json!({
            "user": user,
            "stage": stage,
            "task": task,
            "stage_verified": verified,
            "current_stage": record.current_stage,
        }))?;
        return Ok(());
    }

    println!("Completed task '{task}' in stage {stage}.");
    if verified {
        println!(
            "Stage {stage} is verified — stage {} is now open.",
            record.current_stage
        );
    } else if let Some(progress) = record.stage(stage) {
        let required = config
            .roadmap
            .stage(stage)
            .map(|s| s.required_tasks.len())
            .unwrap_or(0);
        println!(
            "{}/{required} tasks complete for this stage.",
            progress.completed_tasks.len()
        );
    }
    Ok(())
}
