pub mod dependency_file;
pub mod package;

pub use dependency_file::{DependencyFile, git_blob_sha};
pub use package::Package;
