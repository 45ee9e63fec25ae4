use crate::autoupdate::registry::{EcosystemPlugin, FilePair};
use crate::autoupdate::update_set::{RequirementUpdate, VersionUpdate};
use crate::error::{AutoUpdateError, Result};
use crate::models::DependencyFile;
use crate::utils::PathValidator;
use crate::utils::patch::apply_patch;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const ECOSYSTEM: &str = "Rubygem";
const LOCKFILE: &str = "Gemfile.lock";

/// Bundler-backed plugin for Ruby projects.
///
/// Requirement patches are applied to the files in the project directory.
/// Version updates run `bundle update --conservative` and report the lockfile.
pub struct RubygemPlugin {
    project_dir: PathBuf,
    bundler: String,
    bundler_args: Vec<String>,
}

impl RubygemPlugin {
    pub fn new<P: AsRef<Path>>(project_dir: P) -> Self {
        Self {
            project_dir: project_dir.as_ref().to_path_buf(),
            bundler: "bundle".to_string(),
            bundler_args: Vec::new(),
        }
    }

    /// Override the bundler program and the arguments placed before
    /// `update --conservative <gems...>`.
    pub fn with_bundler(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.bundler = program.into();
        self.bundler_args = args;
        self
    }

    fn read_snapshot(&self, path: &str) -> Result<DependencyFile> {
        PathValidator::resolve_dependency_path(path, &self.project_dir)?;
        DependencyFile::read(&self.project_dir, path)
    }

    fn write_snapshot(&self, file: &DependencyFile) -> Result<()> {
        let target = PathValidator::resolve_dependency_path(&file.path, &self.project_dir)?;
        fs::write(target, &file.content)?;
        Ok(())
    }

    fn patch_file(current: &DependencyFile, patch: &str) -> Result<DependencyFile> {
        let text = current.content_str().ok_or_else(|| AutoUpdateError::Patch {
            path: current.path.clone(),
            reason: "file is not valid UTF-8".to_string(),
        })?;

        let patched = apply_patch(text, patch).map_err(|e| AutoUpdateError::Patch {
            path: current.path.clone(),
            reason: e.to_string(),
        })?;

        Ok(DependencyFile::new(current.path.clone(), patched))
    }

    fn run_bundler(&self, gems: &[&str]) -> Result<Output> {
        let mut args: Vec<&str> = self.bundler_args.iter().map(String::as_str).collect();
        args.extend(["update", "--conservative"]);
        args.extend(gems);

        tracing::info!(command = %format!("{} {}", self.bundler, args.join(" ")), "running bundler");

        Command::new(&self.bundler)
            .current_dir(&self.project_dir)
            .args(&args)
            .output()
            .map_err(|e| {
                AutoUpdateError::CommandExecution(format!(
                    "Failed to execute '{}': {e}",
                    self.bundler
                ))
            })
    }

    fn ensure_success(output: &Output, command: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        Err(AutoUpdateError::CommandExecution(format!(
            "{} failed with exit code {}: {}",
            command,
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim()
        )))
    }
}

impl EcosystemPlugin for RubygemPlugin {
    fn name(&self) -> &str {
        ECOSYSTEM
    }

    fn apply_requirements(&self, updates: &[RequirementUpdate]) -> Result<Vec<FilePair>> {
        // (first original, latest content) per path; later patches on the
        // same file apply to the previous result
        let mut files: Vec<(DependencyFile, DependencyFile)> = Vec::new();
        let mut pairs = Vec::with_capacity(updates.len());

        for update in updates {
            let path = update.file.path.as_str();
            let original = match files.iter().find(|(first, _)| first.path == path) {
                Some((_, latest)) => latest.clone(),
                None => {
                    let on_disk = self.read_snapshot(path)?;
                    if !update.file.sha.is_empty() && update.file.sha != on_disk.sha {
                        return Err(AutoUpdateError::ChecksumMismatch {
                            path: path.to_string(),
                            expected: update.file.sha.clone(),
                            actual: on_disk.sha,
                        });
                    }
                    on_disk
                }
            };

            tracing::info!(%path, "patching");
            let updated = Self::patch_file(&original, &update.patch)?;

            match files.iter_mut().find(|(first, _)| first.path == path) {
                Some((_, latest)) => *latest = updated.clone(),
                None => files.push((original.clone(), updated.clone())),
            }
            pairs.push(FilePair::new(original, updated));
        }

        // nothing touches the disk until every patch has applied
        for (index, (_, latest)) in files.iter().enumerate() {
            if let Err(err) = self.write_snapshot(latest) {
                for (first, _) in &files[..index] {
                    if let Err(restore_err) = self.write_snapshot(first) {
                        tracing::error!(path = %first.path, error = %restore_err, "failed to restore file");
                    }
                }
                return Err(err);
            }
        }

        Ok(pairs)
    }

    fn supports_version_updates(&self) -> bool {
        true
    }

    fn apply_versions(&self, updates: &[VersionUpdate]) -> Result<Vec<FilePair>> {
        let mut gems: Vec<&str> = Vec::new();
        for update in updates {
            let name = update.package.name.as_str();
            if !gems.contains(&name) {
                gems.push(name);
            }
            tracing::debug!(
                gem = name,
                from = %update.old_version,
                to = %update.target_version,
                "version update"
            );
        }

        let original = self.read_snapshot(LOCKFILE)?;
        let output = self.run_bundler(&gems)?;
        if let Err(err) = Self::ensure_success(&output, "bundle update") {
            tracing::warn!(path = LOCKFILE, "bundle update failed, restoring lockfile");
            self.write_snapshot(&original)?;
            return Err(err);
        }

        let updated = self.read_snapshot(LOCKFILE)?;
        Ok(vec![FilePair::new(original, updated)])
    }
}
