use crate::cli::ImportArgs;
use crate::store::import::ImportData;
use crate::store::Store;
use anyhow::Result;

/// Handle import command - load content into the store
pub fn handle(cmd: &ImportArgs, store: &Store) -> Result<()> {
    let data = ImportData::from_path(&cmd.file)?;
    let summary = store.import(&data)?;

    println!(
        "Imported {} posts, {} terms, {} taxonomies from {}",
        summary.posts,
        summary.terms,
        summary.taxonomies,
        cmd.file.display()
    );

    Ok(())
}
