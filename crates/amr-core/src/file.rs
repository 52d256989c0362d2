//! Remote listing entries and rename candidates.

use serde::{Deserialize, Serialize};

use crate::folder::Folder;

/// One entry of a remote directory listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteEntry {
    /// Entry name without any path.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Size in bytes.
    pub size: u64,
    /// Last modification timestamp as reported by the provider.
    pub modified: String,
}

/// A candidate remote file: its name and the folder holding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileMeta {
    name: String,
    folder: Folder,
}

impl FileMeta {
    /// Describe `name` inside `folder`.
    #[must_use]
    pub fn new(name: impl Into<String>, folder: Folder) -> Self {
        Self {
            name: name.into(),
            folder,
        }
    }

    /// Full filename.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Folder holding the file.
    #[must_use]
    pub const fn folder(&self) -> &Folder {
        &self.folder
    }

    /// Filename without its final suffix.
    #[must_use]
    pub fn prefix_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map_or(self.name.as_str(), |(prefix, _)| prefix)
    }

    /// Final suffix including the dot, or an empty string.
    #[must_use]
    pub fn extension(&self) -> &str {
        self.name.rfind('.').map_or("", |index| &self.name[index..])
    }

    /// Remote path of the file.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.folder.join(&self.name)
    }
}
