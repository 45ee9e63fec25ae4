use crate::models::{DependencyFile, Package};
use crate::utils::pattern::PathFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A patch-based change to one manifest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementUpdate {
    /// The file to patch and the checksum it is expected to have.
    pub file: DependencyFile,
    /// Unified diff to apply to the file.
    pub patch: String,
}

/// A resolved version change for a single package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionUpdate {
    pub package: Package,
    pub old_version: String,
    pub target_version: String,
}

/// The batch of proposed dependency changes returned by the update feed.
///
/// Both maps are keyed by ecosystem name. Updates within an ecosystem keep
/// the order in which the feed returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSet {
    pub id: u64,
    #[serde(default)]
    pub requirement_updates: BTreeMap<String, Vec<RequirementUpdate>>,
    #[serde(default)]
    pub version_updates: BTreeMap<String, Vec<VersionUpdate>>,
}

impl UpdateSet {
    pub fn is_empty(&self) -> bool {
        self.requirement_updates.values().all(Vec::is_empty)
            && self.version_updates.values().all(Vec::is_empty)
    }

    /// Every ecosystem referenced by the set, sorted and deduplicated.
    pub fn ecosystems(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .requirement_updates
            .keys()
            .chain(self.version_updates.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    /// Copy of the set without requirement updates on ignored paths.
    ///
    /// Ecosystems left without requirement updates are dropped.
    pub fn without_ignored(&self, filter: &PathFilter) -> UpdateSet {
        if filter.is_empty() {
            return self.clone();
        }

        let requirement_updates = self
            .requirement_updates
            .iter()
            .filter_map(|(ecosystem, updates)| {
                let kept: Vec<RequirementUpdate> = updates
                    .iter()
                    .filter(|ru| {
                        let ignored = filter.is_ignored(&ru.file.path);
                        if ignored {
                            tracing::info!(path = %ru.file.path, %ecosystem, "skipping ignored path");
                        }
                        !ignored
                    })
                    .cloned()
                    .collect();
                (!kept.is_empty()).then(|| (ecosystem.clone(), kept))
            })
            .collect();

        UpdateSet {
            id: self.id,
            requirement_updates,
            version_updates: self.version_updates.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(path: &str) -> RequirementUpdate {
        RequirementUpdate {
            file: DependencyFile {
                path: path.to_string(),
                ..Default::default()
            },
            patch: String::new(),
        }
    }

    fn sample_set() -> UpdateSet {
        let mut set = UpdateSet {
            id: 7,
            ..Default::default()
        };
        set.requirement_updates.insert(
            "Rubygem".to_string(),
            vec![requirement("Gemfile"), requirement("vendor/engine/Gemfile")],
        );
        set.requirement_updates
            .insert("Npm".to_string(), vec![requirement("vendor/package.json")]);
        set.version_updates.insert(
            "Rubygem".to_string(),
            vec![VersionUpdate {
                package: Package::new("rails", "rails", "Rubygem"),
                old_version: "4.0.0".to_string(),
                target_version: "4.0.3".to_string(),
            }],
        );
        set
    }

    #[test]
    fn lists_referenced_ecosystems_once() {
        assert_eq!(sample_set().ecosystems(), vec!["Npm", "Rubygem"]);
    }

    #[test]
    fn drops_ignored_requirement_updates() {
        let filter = PathFilter::new(&["vendor".to_string()]).unwrap();
        let filtered = sample_set().without_ignored(&filter);

        assert_eq!(filtered.id, 7);
        assert!(!filtered.requirement_updates.contains_key("Npm"));
        assert_eq!(
            filtered.requirement_updates["Rubygem"],
            vec![requirement("Gemfile")]
        );
        assert_eq!(filtered.version_updates, sample_set().version_updates);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let set = sample_set();
        assert_eq!(set.without_ignored(&PathFilter::default()), set);
    }

    #[test]
    fn empty_lists_count_as_empty_set() {
        let mut set = UpdateSet::default();
        assert!(set.is_empty());
        set.version_updates.insert("Rubygem".to_string(), Vec::new());
        assert!(set.is_empty());
        assert!(!sample_set().is_empty());
    }
}
