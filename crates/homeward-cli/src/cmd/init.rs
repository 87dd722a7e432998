use anyhow::Context;
use homeward_core::{config::Config, io, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing homeward in: {}", root.display());

    for dir in [paths::HOMEWARD_DIR, paths::USERS_DIR] {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let project_name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string());
        let config = Config::new(&project_name);
        config.save(root).context("failed to write config.yaml")?;
        println!("  created: .homeward/config.yaml");
    } else {
        println!("  exists:  .homeward/config.yaml");
    }

    println!("\nHomeward initialized.");
    println!("Next: homeward status <user>");
    Ok(())
}
