// Update application: feed retrieval, plugin dispatch and file restoration.
//
// - UpdateSet: the batch of changes returned by the feed
// - FeedClient: retrieves update sets over HTTP
// - Registry: ecosystem name -> plugin
// - UpdateEngine: runs every plugin and pairs original/updated snapshots
// - restore_dep_files: writes snapshots back to the project
pub mod engine;
pub mod feed;
pub mod plugins;
pub mod registry;
pub mod restore;
pub mod update_set;

pub use engine::{AppliedUpdates, UpdateEngine};
pub use feed::{FeedClient, UpdateFeed};
pub use registry::Registry;
pub use restore::restore_dep_files;
pub use update_set::UpdateSet;
