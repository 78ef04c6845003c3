use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recording directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// In-progress and unsaved recordings.
    pub temp_dir: PathBuf,
    /// Saved recordings.
    pub saved_dir: PathBuf,
}
