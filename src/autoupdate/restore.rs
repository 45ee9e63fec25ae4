use crate::error::Result;
use crate::models::DependencyFile;
use crate::utils::PathValidator;
use std::fs;
use std::path::Path;

/// Write each snapshot's content to `base_dir/path`, overwriting existing files.
///
/// Stops at the first invalid path or failed write. Files written before the
/// failure are left in place.
pub fn restore_dep_files(base_dir: impl AsRef<Path>, files: &[DependencyFile]) -> Result<()> {
    let base_dir = base_dir.as_ref();

    for file in files {
        let target = PathValidator::resolve_dependency_path(&file.path, base_dir)?;
        fs::write(&target, &file.content)?;
        tracing::debug!(path = %file.path, bytes = file.content.len(), "restored dependency file");
    }

    Ok(())
}
