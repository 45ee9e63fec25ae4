use crate::error::{AutoUpdateError, Result};
use std::path::{Component, Path, PathBuf};

/// Provides safe path validation helpers to avoid traversal and host intrusion.
pub struct PathValidator;

impl PathValidator {
    /// Validates and canonicalises an incoming project path.
    pub fn validate_project_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();

        let canonical = path.canonicalize().map_err(|e| {
            AutoUpdateError::ProjectValidation(format!("Invalid path '{}': {e}", path.display()))
        })?;

        if !canonical.is_dir() {
            return Err(AutoUpdateError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                canonical.display()
            )));
        }

        const FORBIDDEN: &[&str] = &["/etc", "/sys", "/proc", "/dev", "/boot"];

        for forbidden in FORBIDDEN {
            let forbidden_path = Path::new(forbidden);

            if path.starts_with(forbidden_path) || canonical.starts_with(forbidden_path) {
                return Err(AutoUpdateError::ProjectValidation(format!(
                    "Access to system directory '{}' is not allowed",
                    forbidden
                )));
            }
        }

        Ok(canonical)
    }

    /// Resolves a dependency file path against the project directory.
    ///
    /// The path must be non-empty, relative, free of `..` components, and its
    /// parent directory must already exist inside `base_dir`.
    pub fn resolve_dependency_path(file_path: &str, base_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let base_dir = base_dir.as_ref();

        if file_path.trim().is_empty() {
            return Err(AutoUpdateError::InvalidPath("path is empty".to_string()));
        }

        let relative = Path::new(file_path);
        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(AutoUpdateError::InvalidPath(format!(
                        "'{}' must be a relative path inside the project",
                        file_path
                    )));
                }
            }
        }

        let joined = base_dir.join(relative);
        let file_name = joined.file_name().ok_or_else(|| {
            AutoUpdateError::InvalidPath(format!("'{}' does not name a file", file_path))
        })?;
        let parent = joined.parent().unwrap_or(base_dir);

        let canonical_parent = parent.canonicalize().map_err(|e| {
            AutoUpdateError::InvalidPath(format!("parent directory of '{}': {e}", file_path))
        })?;
        let canonical_base = base_dir.canonicalize().map_err(|e| {
            AutoUpdateError::InvalidPath(format!(
                "invalid base directory '{}': {e}",
                base_dir.display()
            ))
        })?;

        if !canonical_parent.starts_with(&canonical_base) {
            return Err(AutoUpdateError::InvalidPath(format!(
                "'{}' is outside the project directory",
                file_path
            )));
        }

        Ok(canonical_parent.join(file_name))
    }
}
