use crate::cli::StatusArgs;
use crate::store::Store;
use anyhow::Result;

/// Handle status command - show content statistics
pub fn handle(cmd: &StatusArgs, store: &Store) -> Result<()> {
    let stats = store.stats()?;

    if cmd.format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Relevanssi Content Status");
    println!("{}", "=".repeat(50));
    println!("\nPosts: {}", stats.post_count);
    println!("Published: {}", stats.published_count);
    println!("Terms: {}", stats.term_count);
    println!("Taxonomies: {}", stats.taxonomy_count);

    Ok(())
}
