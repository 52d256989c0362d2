//! Remote directory paths.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Remote path separator.
pub const SEPARATOR: char = '/';

/// A normalised remote directory path.
///
/// The stored path always starts and ends with `/`; the root is `/`.
/// Empty segments are collapsed, so `"a//b"` and `"/a/b/"` are the same folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Folder {
    path: String,
}

impl Folder {
    /// Normalise `raw` into a folder path.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let joined = raw
            .trim()
            .split(SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let path = if joined.is_empty() {
            String::from("/")
        } else {
            format!("/{joined}/")
        };
        Self { path }
    }

    /// The root folder.
    #[must_use]
    pub fn root() -> Self {
        Self {
            path: String::from("/"),
        }
    }

    /// Full path including the leading and trailing separator.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    /// Whether this is the root folder.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Leaf directory name; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path
            .trim_end_matches(SEPARATOR)
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or_default()
    }

    /// Enclosing folder, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let trimmed = self.path.trim_end_matches(SEPARATOR);
        let parent = trimmed
            .rsplit_once(SEPARATOR)
            .map_or("", |(head, _)| head);
        Some(Self::new(parent))
    }

    /// Path of an entry directly inside this folder.
    #[must_use]
    pub fn join(&self, name: &str) -> String {
        format!("{}{name}", self.path)
    }

    /// Sub-folder directly inside this folder.
    #[must_use]
    pub fn child(&self, name: &str) -> Self {
        Self::new(&self.join(name))
    }
}

impl Default for Folder {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for Folder {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.path)
    }
}

impl From<&str> for Folder {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serialize for Folder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.path)
    }
}

impl<'de> Deserialize<'de> for Folder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}
