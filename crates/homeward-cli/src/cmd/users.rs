use crate::output::print_json;
use anyhow::Context;
use homeward_core::store::ProfileStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = ProfileStore::new(root);
    let users = store.list().context("failed to list users")?;

    if json {
        print_json(&users)?;
        return Ok(());
    }

    if users.is_empty() {
        println!("No users yet.");
        return Ok(());
    }
    for user in users {
        println!("{user}");
    }
    Ok(())
}
