use serde::{Deserialize, Serialize};

/// A dependency as identified by the update feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    pub slug: String,
    /// Ecosystem the package belongs to (e.g. "Rubygem").
    #[serde(rename = "type")]
    pub kind: String,
}

impl Package {
    pub fn new(name: impl Into<String>, slug: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            kind: kind.into(),
        }
    }
}
