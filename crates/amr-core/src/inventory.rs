//! Classification of remote listings into rename candidates.

use std::cmp::Ordering;

use regex::Regex;

use crate::error::{CoreError, CoreResult};
use crate::file::{FileMeta, RemoteEntry};
use crate::folder::Folder;

/// Selects filenames matching a classification pattern, in natural order.
///
/// Patterns are anchored at the start of the name; a trailing `$` is up to the
/// pattern itself.
#[derive(Debug, Clone)]
pub struct InventoryFilter {
    pattern: String,
    regex: Regex,
}

impl InventoryFilter {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPattern`] when the pattern does not compile.
    pub fn new(pattern: &str) -> CoreResult<Self> {
        let regex =
            Regex::new(&format!("^(?:{pattern})")).map_err(|source| CoreError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Pattern text as configured.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether `name` belongs to this classification.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// Matching names in natural order.
    #[must_use]
    pub fn select<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut selected: Vec<String> = names
            .into_iter()
            .filter(|name| self.is_match(name))
            .map(str::to_string)
            .collect();
        natural_sort(&mut selected);
        selected
    }

    /// Matching non-directory entries of `folder`, in natural order.
    #[must_use]
    pub fn select_files(&self, entries: &[RemoteEntry], folder: &Folder) -> Vec<FileMeta> {
        self.select(
            entries
                .iter()
                .filter(|entry| !entry.is_dir)
                .map(|entry| entry.name.as_str()),
        )
        .into_iter()
        .map(|name| FileMeta::new(name, folder.clone()))
        .collect()
    }
}

/// Sort so numeric runs compare by value (`ep2` before `ep10`).
pub fn natural_sort(names: &mut [String]) {
    names.sort_by(|left, right| natural_cmp(left, right));
}

fn natural_cmp(left: &str, right: &str) -> Ordering {
    natord::compare(left, right).then_with(|| left.cmp(right))
}
