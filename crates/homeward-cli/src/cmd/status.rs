use crate::output::{print_json, print_table};
use anyhow::Context;
use homeward_core::{config::Config, gate::StageGate, store::ProfileStore};
use std::path::Path;

pub fn run(root: &Path, user: &str, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    let store = ProfileStore::new(root);
    let gate = StageGate::new(&config.roadmap);

    let record = store
        .read(user)
        .with_context(|| format!("failed to read progress for '{user}'"))?;

    if json {
        let stages: Vec<serde_json::Value> = config
            .roadmap
            .stages
            .iter()
            .map(|stage| {
                let done = record
                    .stage(stage.id)
                    .map(|p| p.completed_tasks.len())
                    .unwrap_or(0);
                serde_json::json!({
                    "stage": stage.id,
                    "name": stage.name,
                    "status": gate.stage_status(&record, stage.id),
                    "tasks_completed": done,
                    "tasks_required": stage.required_tasks.len(),
                })
            })
            .collect();
        print_json(&serde_json::json!({
            "user": user,
            "current_stage": record.current_stage,
            "stages": stages,
        }))?;
        return Ok(());
    }

    println!("User:    {user}");
    println!("Ceiling: stage {}", record.current_stage);
    println!();

    let rows: Vec<Vec<String>> = config
        .roadmap
        .stages
        .iter()
        .map(|stage| {
            let done = record
                .stage(stage.id)
                .map(|p| p.completed_tasks.len())
                .unwrap_or(0);
            vec![
                stage.id.to_string(),
                stage.name.clone(),
                gate.stage_status(&record, stage.id).to_string(),
                format!("{done}/{}", stage.required_tasks.len()),
            ]
        })
        .collect();
    print_table(&["STAGE", "NAME", "STATUS", "TASKS"], rows);
    Ok(())
}
