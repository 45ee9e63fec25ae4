use crate::error::Result;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs;
use std::path::Path;

/// Snapshot of a dependency manifest or lockfile at a point in time.
///
/// `path` identifies the file relative to the project directory, `sha` is the
/// git blob checksum of `content` when the snapshot was taken. Snapshots are
/// never mutated in place: an updated file is a new `DependencyFile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyFile {
    pub path: String,
    #[serde(default)]
    pub sha: String,
    /// Not part of the feed wire format.
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl DependencyFile {
    /// Build a snapshot from in-memory content, computing its checksum.
    pub fn new(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        Self {
            path: path.into(),
            sha: git_blob_sha(&content),
            content,
        }
    }

    /// Read `path` (relative to `base_dir`) from disk into a snapshot.
    pub fn read(base_dir: impl AsRef<Path>, path: &str) -> Result<Self> {
        let content = fs::read(base_dir.as_ref().join(path))?;
        Ok(Self::new(path, content))
    }

    pub fn content_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }

    /// True when both snapshots carry the same bytes.
    pub fn same_content(&self, other: &DependencyFile) -> bool {
        self.content == other.content
    }
}

impl fmt::Display for DependencyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sha.is_empty() {
            f.write_str(&self.path)
        } else {
            write!(f, "{} ({})", self.path, short_sha(&self.sha))
        }
    }
}

/// Checksum git assigns to a blob with the given content.
pub fn git_blob_sha(content: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content);
    hex::encode(hasher.finalize())
}

pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn computes_git_blob_checksums() {
        assert_eq!(git_blob_sha(b""), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
        assert_eq!(
            git_blob_sha(b"hello\n"),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn new_snapshot_carries_checksum() {
        let file = DependencyFile::new("Gemfile", "hello\n");
        assert_eq!(file.path, "Gemfile");
        assert_eq!(file.sha, "ce013625030ba8dba906f756967f9e9ca394464a");
        assert_eq!(file.content_str(), Some("hello\n"));
    }

    #[test]
    fn reads_snapshot_relative_to_base() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("Gemfile"), "hello\n").unwrap();

        let file = DependencyFile::read(dir.path(), "Gemfile").unwrap();
        assert_eq!(file, DependencyFile::new("Gemfile", "hello\n"));
    }

    #[test]
    fn decodes_without_content() {
        let file: DependencyFile =
            serde_json::from_str(r#"{"path":"Gemfile","sha":"abc"}"#).unwrap();
        assert_eq!(file.path, "Gemfile");
        assert_eq!(file.sha, "abc");
        assert!(file.content.is_empty());
    }

    #[test]
    fn display_uses_short_sha() {
        let file = DependencyFile::new("Gemfile", "hello\n");
        assert_eq!(file.to_string(), "Gemfile (ce01362)");
    }
}
