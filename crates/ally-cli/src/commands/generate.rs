//! `ally generate --user <id>` - write a user's external tools document.

use ally_codegen::{Generator, GeneratorOptions, write_document};
use std::path::Path;

pub async fn run(config_path: Option<&Path>, user_id: i64, output: Option<&Path>) -> anyhow::Result<()> {
    let (config, store) = super::open(config_path).await?;

    let user = store.get_user(user_id).await?;
    let set = store.enabled_set(user_id).await?;
    let document = Generator::new(GeneratorOptions::from(&config.mcp)).generate_set(&set);

    let path = output.unwrap_or(config.generator.output_path.as_path());
    write_document(path, &document)?;

    println!(
        "✔ Wrote {} tools and {} groups for '{}' to {}",
        set.tools.len(),
        set.groups.len(),
        user.name,
        path.display()
    );
    Ok(())
}
