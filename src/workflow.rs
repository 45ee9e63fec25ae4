use crate::autoupdate::{
    AppliedUpdates, FeedClient, Registry, UpdateEngine, UpdateFeed, UpdateSet, restore_dep_files,
};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{AutoUpdateError, Result};
use crate::models::DependencyFile;
use crate::report::{self, ApplyReport};
use crate::utils::PathValidator;
use crate::utils::pattern::PathFilter;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// Options for the apply workflow
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Restore the original files once the report is printed
    pub dry_run: bool,
    /// Print JSON instead of the colored report
    pub raw: bool,
    /// Shell command run after applying; originals are restored if it fails
    pub test_command: Option<String>,
}

/// Fetch an update set and print it without applying anything
pub fn execute_fetch<P: AsRef<Path>>(
    project_path: P,
    config_path: Option<&Path>,
    update_set_id: &str,
    raw: bool,
) -> Result<()> {
    let project_path = PathValidator::validate_project_path(project_path)?;
    let config = load_config(&project_path, config_path)?;
    let raw = raw || config.raw_format;

    let update_set = fetch_with_progress(&config, update_set_id, raw)?;

    if raw {
        println!("{}", report::render_raw(&update_set)?);
    } else {
        report::print_update_set(&update_set);
    }
    Ok(())
}

/// Execute the apply workflow
pub fn execute_apply<P: AsRef<Path>>(
    project_path: P,
    config_path: Option<&Path>,
    update_set_id: &str,
    mut options: ApplyOptions,
) -> Result<()> {
    // Step 1: Validate project and load configuration
    let project_path = PathValidator::validate_project_path(project_path)?;
    let config = load_config(&project_path, config_path)?;
    options.raw = options.raw || config.raw_format;

    step(&options, "1. Loading configuration...");
    let filter = PathFilter::new(&config.ignored_paths)?;
    done(&options, "✓ Configuration loaded");

    // Step 2: Fetch the update set
    step(&options, "2. Fetching update set...");
    let update_set = fetch_with_progress(&config, update_set_id, options.raw)?;
    let update_set = update_set.without_ignored(&filter);
    done(
        &options,
        &format!("✓ Update set #{} retrieved", update_set.id),
    );

    // Step 3: Apply it to the project
    step(&options, "3. Applying updates...");
    let registry = Registry::with_builtin_plugins(&project_path)?;
    tracing::debug!(
        ecosystems = ?registry.ecosystems().collect::<Vec<_>>(),
        "registered ecosystems"
    );
    let report = apply_to_project(&project_path, &update_set, &registry, &options)?;

    if options.raw {
        println!("{}", report::render_raw(&report)?);
    } else {
        report::print_apply_report(&report);
        if options.dry_run {
            println!("\n{}", "Dry run: original files restored".yellow());
        }
        println!(
            "\n{}",
            "✨ Update process completed successfully!".green().bold()
        );
    }

    Ok(())
}

/// Run the engine against `project_dir`, then the optional test command.
///
/// Original snapshots are written back when a plugin fails partway, when the
/// test command fails, or when running in dry-run mode.
fn apply_to_project(
    project_dir: &Path,
    update_set: &UpdateSet,
    registry: &Registry,
    options: &ApplyOptions,
) -> Result<ApplyReport> {
    let mut applied = AppliedUpdates::default();
    if let Err(err) = UpdateEngine::new(registry).apply_update_set(update_set, &mut applied) {
        if !applied.is_empty() {
            tracing::warn!(error = %err, files = applied.len(), "update failed, restoring original files");
            if let Err(restore_err) = restore_dep_files(project_dir, &first_originals(&applied)) {
                tracing::error!(error = %restore_err, "failed to restore original files");
            }
        }
        return Err(err);
    }
    let report = ApplyReport::new(update_set.id, &applied);

    if let Some(command) = options.test_command.as_deref() {
        step(options, "4. Running test suite...");
        if let Err(err) = run_test_command(project_dir, command) {
            tracing::warn!(error = %err, "test suite failed, restoring original files");
            restore_dep_files(project_dir, &first_originals(&applied))?;
            return Err(err);
        }
        done(options, "✓ Test suite passed");
    }

    if options.dry_run {
        restore_dep_files(project_dir, &first_originals(&applied))?;
    }

    Ok(report)
}

/// Content of each touched path before any plugin ran.
///
/// Chained patches report the intermediate state as a later original, so only
/// the first snapshot per path is kept.
fn first_originals(applied: &AppliedUpdates) -> Vec<DependencyFile> {
    let mut seen = HashSet::new();
    applied
        .original_files
        .iter()
        .filter(|file| seen.insert(file.path.as_str()))
        .cloned()
        .collect()
}

fn run_test_command(project_dir: &Path, command: &str) -> Result<()> {
    tracing::info!(%command, "running test command");

    let status = Command::new("sh")
        .current_dir(project_dir)
        .args(["-c", command])
        .status()
        .map_err(|e| {
            AutoUpdateError::CommandExecution(format!("Failed to execute '{command}': {e}"))
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(AutoUpdateError::TestSuiteFailed(format!(
            "'{}' exited with code {}",
            command,
            status.code().unwrap_or(-1)
        )))
    }
}

fn load_config(project_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    let path: PathBuf = match config_path {
        Some(path) => path.to_path_buf(),
        None => project_path.join(DEFAULT_CONFIG_FILE),
    };
    Config::load(path)
}

fn fetch_with_progress(config: &Config, update_set_id: &str, quiet: bool) -> Result<UpdateSet> {
    let client = FeedClient::new(config)?;

    let spinner = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Requesting update set {}", update_set_id));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client.fetch_update_set(update_set_id);
    spinner.finish_and_clear();
    result
}

fn step(options: &ApplyOptions, message: &str) {
    if !options.raw {
        println!("\n{}", message.yellow());
    }
}

fn done(options: &ApplyOptions, message: &str) {
    if !options.raw {
        println!("{}", message.green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autoupdate::plugins::RubygemPlugin;
    use crate::autoupdate::update_set::{RequirementUpdate, VersionUpdate};
    use crate::models::Package;
    use std::fs;
    use tempfile::tempdir;

    const PATCH: &str = "--- Gemfile\n+++ Gemfile\n@@ -1 +1 @@\n-gem \"rails\", \"3.0.0\"\n+gem \"rails\", '~> 4.0.3'\n";

    fn project() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Gemfile"), "gem \"rails\", \"3.0.0\"\n").unwrap();
        dir
    }

    fn update_set() -> UpdateSet {
        let mut set = UpdateSet {
            id: 1,
            ..Default::default()
        };
        set.requirement_updates.insert(
            "Rubygem".to_string(),
            vec![RequirementUpdate {
                file: DependencyFile {
                    path: "Gemfile".to_string(),
                    ..Default::default()
                },
                patch: PATCH.to_string(),
            }],
        );
        set
    }

    fn quiet(options: ApplyOptions) -> ApplyOptions {
        ApplyOptions {
            raw: true,
            ..options
        }
    }

    #[test]
    fn applies_update_set_to_project() {
        let dir = project();
        let registry = Registry::with_builtin_plugins(dir.path()).unwrap();

        let report =
            apply_to_project(dir.path(), &update_set(), &registry, &quiet(Default::default()))
                .unwrap();

        assert_eq!(report.changed_files(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("Gemfile")).unwrap(),
            "gem \"rails\", '~> 4.0.3'\n"
        );
    }

    #[test]
    fn dry_run_restores_original_files() {
        let dir = project();
        let registry = Registry::with_builtin_plugins(dir.path()).unwrap();
        let options = quiet(ApplyOptions {
            dry_run: true,
            ..Default::default()
        });

        let report = apply_to_project(dir.path(), &update_set(), &registry, &options).unwrap();

        assert_eq!(report.files.len(), 1);
        assert_eq!(
            fs::read_to_string(dir.path().join("Gemfile")).unwrap(),
            "gem \"rails\", \"3.0.0\"\n"
        );
    }

    fn gemfile_update(patch: &str) -> RequirementUpdate {
        RequirementUpdate {
            file: DependencyFile {
                path: "Gemfile".to_string(),
                ..Default::default()
            },
            patch: patch.to_string(),
        }
    }

    #[test]
    fn dry_run_restores_file_patched_twice() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Gemfile"), "gem \"a\"\n").unwrap();
        let registry = Registry::with_builtin_plugins(dir.path()).unwrap();
        let mut set = UpdateSet::default();
        set.requirement_updates.insert(
            "Rubygem".to_string(),
            vec![
                gemfile_update("@@ -1 +1 @@\n-gem \"a\"\n+gem \"a\", '2'\n"),
                gemfile_update("@@ -1 +1 @@\n-gem \"a\", '2'\n+gem \"a\", '3'\n"),
            ],
        );
        let options = quiet(ApplyOptions {
            dry_run: true,
            ..Default::default()
        });

        let report = apply_to_project(dir.path(), &set, &registry, &options).unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("Gemfile")).unwrap(),
            "gem \"a\"\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_version_update_restores_patched_files() {
        let dir = project();
        fs::write(dir.path().join("Gemfile.lock"), "GEM\n").unwrap();
        let mut registry = Registry::new();
        registry
            .register(Box::new(RubygemPlugin::new(dir.path()).with_bundler(
                "sh",
                vec!["-c".to_string(), "exit 1".to_string()],
            )))
            .unwrap();
        let mut set = update_set();
        set.version_updates.insert(
            "Rubygem".to_string(),
            vec![VersionUpdate {
                package: Package::new("rails", "rails", "Rubygem"),
                old_version: "3.0.0".to_string(),
                target_version: "4.0.3".to_string(),
            }],
        );

        let err = apply_to_project(dir.path(), &set, &registry, &quiet(Default::default()))
            .unwrap_err();

        assert!(matches!(err, AutoUpdateError::CommandExecution(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("Gemfile")).unwrap(),
            "gem \"rails\", \"3.0.0\"\n"
        );
        assert_eq!(fs::read_to_string(dir.path().join("Gemfile.lock")).unwrap(), "GEM\n");
    }

    #[test]
    fn first_originals_keeps_earliest_snapshot_per_path() {
        let applied = AppliedUpdates {
            original_files: vec![
                DependencyFile::new("Gemfile", "one"),
                DependencyFile::new("Gemfile.lock", "lock"),
                DependencyFile::new("Gemfile", "two"),
            ],
            updated_files: vec![
                DependencyFile::new("Gemfile", "two"),
                DependencyFile::new("Gemfile.lock", "lock2"),
                DependencyFile::new("Gemfile", "three"),
            ],
        };

        let originals = first_originals(&applied);

        assert_eq!(
            originals,
            vec![
                DependencyFile::new("Gemfile", "one"),
                DependencyFile::new("Gemfile.lock", "lock"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn failing_test_command_restores_original_files() {
        let dir = project();
        let registry = Registry::with_builtin_plugins(dir.path()).unwrap();
        let options = quiet(ApplyOptions {
            test_command: Some("grep -q '4.0.3' Gemfile && exit 1".to_string()),
            ..Default::default()
        });

        let err = apply_to_project(dir.path(), &update_set(), &registry, &options).unwrap_err();

        assert!(matches!(err, AutoUpdateError::TestSuiteFailed(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("Gemfile")).unwrap(),
            "gem \"rails\", \"3.0.0\"\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn passing_test_command_keeps_updates() {
        let dir = project();
        let registry = Registry::with_builtin_plugins(dir.path()).unwrap();
        let options = quiet(ApplyOptions {
            test_command: Some("grep -q '4.0.3' Gemfile".to_string()),
            ..Default::default()
        });

        apply_to_project(dir.path(), &update_set(), &registry, &options).unwrap();

        assert!(
            fs::read_to_string(dir.path().join("Gemfile"))
                .unwrap()
                .contains("4.0.3")
        );
    }

    #[test]
    fn unknown_ecosystem_leaves_project_untouched() {
        let dir = project();
        let registry = Registry::with_builtin_plugins(dir.path()).unwrap();
        let mut set = update_set();
        let updates = set.requirement_updates.remove("Rubygem").unwrap();
        set.requirement_updates.insert("Pypi".to_string(), updates);

        let err = apply_to_project(dir.path(), &set, &registry, &quiet(Default::default()))
            .unwrap_err();

        assert!(matches!(err, AutoUpdateError::UnknownEcosystem(_)));
        assert_eq!(
            fs::read_to_string(dir.path().join("Gemfile")).unwrap(),
            "gem \"rails\", \"3.0.0\"\n"
        );
    }

    #[test]
    fn loads_config_from_project_by_default() {
        let dir = project();
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "project_slug: app\n").unwrap();

        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.project_slug, "app");

        let other = dir.path().join("other.yml");
        fs::write(&other, "project_slug: other\n").unwrap();
        assert_eq!(load_config(dir.path(), Some(other.as_path())).unwrap().project_slug, "other");
    }
}
