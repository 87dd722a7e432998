use crate::output::{print_json, print_table};
use anyhow::Context;
use homeward_core::config::Config;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;

    if json {
        print_json(&config.roadmap)?;
        return Ok(());
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for stage in &config.roadmap.stages {
        for (i, task) in stage.required_tasks.iter().enumerate() {
            let (id, name) = if i == 0 {
                (stage.id.to_string(), stage.name.clone())
            } else {
                (String::new(), String::new())
            };
            rows.push(vec![id, name, task.id.clone(), task.label.clone()]);
        }
    }
    print_table(&["STAGE", "NAME", "TASK", "LABEL"], rows);
    Ok(())
}
