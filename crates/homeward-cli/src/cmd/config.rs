use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use homeward_core::config::Config;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the active configuration
    Show,
    /// Validate the configuration and roadmap invariants
    Validate,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load_or_default(root).context("failed to load config")?;
    if json {
        print_json(&config)?;
    } else {
        print!("{}", serde_yaml::to_string(&config)?);
    }
    Ok(())
}

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    // load() already re-validates the roadmap; load_or_default covers the
    // no-file case so a bare tree still validates.
    let config = Config::load_or_default(root).context("config is invalid")?;
    config.roadmap.validate().context("roadmap is invalid")?;

    if json {
        print_json(&serde_json::json!({
            "valid": true,
            "stages": config.roadmap.len(),
        }))?;
    } else {
        println!("Config is valid ({} stages).", config.roadmap.len());
    }
    Ok(())
}
