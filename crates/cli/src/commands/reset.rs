use std::path::Path;

use anyhow::Result;
use ragchat_storage::VectorStore;

use crate::vector_db_path;

/// Opening the store applies the reset-on-init policy.
pub(crate) fn run(data_dir: &Path) -> Result<()> {
    let path = vector_db_path(data_dir);
    let store = VectorStore::open(&path)?;
    let remaining = store.collection_names()?.len();
    println!("Vector store at {} reset ({remaining} collections remain)", path.display());
    Ok(())
}
