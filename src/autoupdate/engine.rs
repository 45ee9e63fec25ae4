use crate::autoupdate::registry::{FilePair, Registry};
use crate::autoupdate::update_set::UpdateSet;
use crate::error::{AutoUpdateError, Result};
use crate::models::DependencyFile;

/// Files touched while applying an update set.
///
/// `original_files[i]` and `updated_files[i]` always describe the same path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedUpdates {
    pub original_files: Vec<DependencyFile>,
    pub updated_files: Vec<DependencyFile>,
}

impl AppliedUpdates {
    pub fn len(&self) -> usize {
        self.original_files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original_files.is_empty()
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&DependencyFile, &DependencyFile)> {
        self.original_files.iter().zip(self.updated_files.iter())
    }

    fn extend(&mut self, pairs: Vec<FilePair>) -> Result<()> {
        for pair in pairs {
            if pair.original.path != pair.updated.path {
                return Err(AutoUpdateError::MismatchedFilePair {
                    original: pair.original.path,
                    updated: pair.updated.path,
                });
            }
            self.original_files.push(pair.original);
            self.updated_files.push(pair.updated);
        }
        Ok(())
    }
}

/// Dispatches an update set to the registered ecosystem plugins.
pub struct UpdateEngine<'a> {
    registry: &'a Registry,
}

impl<'a> UpdateEngine<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Apply every requirement update, then every version update, appending
    /// the reported snapshots to `applied`.
    ///
    /// Ecosystems are resolved up front: an unknown ecosystem fails the call
    /// before any plugin runs. Plugin errors abort the remaining work, and the
    /// pairs gathered before the failure stay in `applied` so the caller can
    /// restore those files.
    pub fn apply_update_set(&self, set: &UpdateSet, applied: &mut AppliedUpdates) -> Result<()> {
        self.check_ecosystems(set)?;

        for (ecosystem, updates) in &set.requirement_updates {
            if updates.is_empty() {
                continue;
            }
            let plugin = self.registry.get(ecosystem)?;
            tracing::debug!(%ecosystem, count = updates.len(), "applying requirement updates");
            let pairs = plugin.apply_requirements(updates)?;
            let returned = pairs.len();
            applied.extend(pairs)?;
            if returned != updates.len() {
                return Err(AutoUpdateError::UnexpectedFileCount {
                    ecosystem: ecosystem.clone(),
                    expected: updates.len(),
                    returned,
                });
            }
        }

        for (ecosystem, updates) in &set.version_updates {
            if updates.is_empty() {
                continue;
            }
            let plugin = self.registry.get(ecosystem)?;
            tracing::debug!(%ecosystem, count = updates.len(), "applying version updates");
            applied.extend(plugin.apply_versions(updates)?)?;
        }

        tracing::info!(update_set = set.id, files = applied.len(), "update set applied");
        Ok(())
    }

    fn check_ecosystems(&self, set: &UpdateSet) -> Result<()> {
        for ecosystem in set.requirement_updates.keys() {
            self.registry.get(ecosystem)?;
        }

        for (ecosystem, updates) in &set.version_updates {
            let plugin = self.registry.get(ecosystem)?;
            if !updates.is_empty() && !plugin.supports_version_updates() {
                return Err(AutoUpdateError::VersionUpdatesDeclined(ecosystem.clone()));
            }
        }

        Ok(())
    }
}
