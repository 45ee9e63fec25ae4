use crate::autoupdate::{AppliedUpdates, UpdateSet};
use crate::error::Result;
use crate::models::dependency_file::short_sha;
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub original_sha: String,
    pub updated_sha: String,
    pub changed: bool,
}

/// Machine-readable summary of an applied update set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub id: u64,
    pub files: Vec<FileChange>,
}

impl ApplyReport {
    pub fn new(update_set_id: u64, applied: &AppliedUpdates) -> Self {
        let files = applied
            .pairs()
            .map(|(original, updated)| FileChange {
                path: original.path.clone(),
                original_sha: original.sha.clone(),
                updated_sha: updated.sha.clone(),
                changed: !original.same_content(updated) || original.sha != updated.sha,
            })
            .collect();

        Self {
            id: update_set_id,
            files,
        }
    }

    pub fn changed_files(&self) -> usize {
        self.files.iter().filter(|f| f.changed).count()
    }
}

pub fn render_raw<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn print_apply_report(report: &ApplyReport) {
    if report.files.is_empty() {
        println!("\n{}", "No dependency files were touched".yellow());
        return;
    }

    println!("\n{}", "📦 Updated Files:".cyan().bold());
    println!(
        "{}",
        format!(
            "Update set #{}: {} file(s) touched, {} changed",
            report.id,
            report.files.len(),
            report.changed_files()
        )
        .yellow()
    );

    for file in &report.files {
        if file.changed {
            println!(
                "  • {} {} → {}",
                file.path.white().bold(),
                short_sha(&file.original_sha).red(),
                short_sha(&file.updated_sha).green().bold()
            );
        } else {
            println!(
                "  • {} {} {}",
                file.path.white().bold(),
                short_sha(&file.original_sha).dimmed(),
                "(unchanged)".dimmed()
            );
        }
    }
}

pub fn print_update_set(set: &UpdateSet) {
    println!("\n{}", format!("Update set #{}", set.id).cyan().bold());

    if set.is_empty() {
        println!("{}", "✨ Nothing to update".green().bold());
        return;
    }

    if !set.requirement_updates.is_empty() {
        println!("\n{}:", "Requirement updates".cyan().bold());
        for (ecosystem, updates) in &set.requirement_updates {
            for update in updates {
                println!(
                    "  • {} {}",
                    update.file.path.white().bold(),
                    format!("[{}]", ecosystem).dimmed()
                );
            }
        }
    }

    if !set.version_updates.is_empty() {
        println!("\n{}:", "Version updates".cyan().bold());
        for (ecosystem, updates) in &set.version_updates {
            for update in updates {
                println!(
                    "  • {} {} → {} {}",
                    update.package.name.white().bold(),
                    update.old_version.red(),
                    update.target_version.green().bold(),
                    format!("[{}]", ecosystem).dimmed()
                );
            }
        }
    }
}
