use crate::autoupdate::plugins::RubygemPlugin;
use crate::autoupdate::update_set::{RequirementUpdate, VersionUpdate};
use crate::error::{AutoUpdateError, Result};
use crate::models::DependencyFile;
use std::collections::BTreeMap;
use std::path::Path;

/// Original and updated snapshots of the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    pub original: DependencyFile,
    pub updated: DependencyFile,
}

impl FilePair {
    pub fn new(original: DependencyFile, updated: DependencyFile) -> Self {
        Self { original, updated }
    }
}

/// Applies updates for one package ecosystem.
///
/// Plugins return one [`FilePair`] per file they touched, in the order they
/// touched them. Requirement updates produce exactly one pair per update.
pub trait EcosystemPlugin {
    /// Ecosystem name used as the registry key (e.g. "Rubygem").
    fn name(&self) -> &str;

    fn apply_requirements(&self, updates: &[RequirementUpdate]) -> Result<Vec<FilePair>>;

    fn supports_version_updates(&self) -> bool {
        false
    }

    fn apply_versions(&self, _updates: &[VersionUpdate]) -> Result<Vec<FilePair>> {
        Err(AutoUpdateError::VersionUpdatesDeclined(self.name().to_string()))
    }
}

/// Ecosystem plugins keyed by name. Built once at startup, then only read.
#[derive(Default)]
pub struct Registry {
    plugins: BTreeMap<String, Box<dyn EcosystemPlugin>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in plugin, operating on `project_dir`.
    pub fn with_builtin_plugins(project_dir: impl AsRef<Path>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(RubygemPlugin::new(project_dir.as_ref())))?;
        Ok(registry)
    }

    pub fn register(&mut self, plugin: Box<dyn EcosystemPlugin>) -> Result<&mut Self> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(AutoUpdateError::DuplicateEcosystem(name));
        }

        tracing::debug!(ecosystem = %name, "registered ecosystem plugin");
        self.plugins.insert(name, plugin);
        Ok(self)
    }

    pub fn get(&self, ecosystem: &str) -> Result<&dyn EcosystemPlugin> {
        self.plugins
            .get(ecosystem)
            .map(|plugin| plugin.as_ref())
            .ok_or_else(|| AutoUpdateError::UnknownEcosystem(ecosystem.to_string()))
    }

    pub fn ecosystems(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }
}
