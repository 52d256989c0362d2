//! Per-category tallies of rename outcomes.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::reconcile::RenameTask;
use crate::response::ApiResponse;

const MISSING_RESPONSE: &str = "no response recorded";

/// Kind of entry a rename touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameCategory {
    /// Video files.
    Video,
    /// Subtitle files.
    Subtitle,
    /// The media folder itself.
    Folder,
}

impl RenameCategory {
    /// Every category in report order.
    pub const ALL: [Self; 3] = [Self::Video, Self::Subtitle, Self::Folder];

    /// Lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Subtitle => "subtitle",
            Self::Folder => "folder",
        }
    }
}

impl Display for RenameCategory {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Success and failure counts for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryTally {
    /// Category counted.
    pub category: RenameCategory,
    /// Renames the remote accepted.
    pub success: usize,
    /// Renames that failed.
    pub failure: usize,
}

impl CategoryTally {
    const fn empty(category: RenameCategory) -> Self {
        Self {
            category,
            success: 0,
            failure: 0,
        }
    }

    /// Number of renames attempted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.success + self.failure
    }
}

/// A rename the remote did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRename {
    /// Category of the entry.
    pub category: RenameCategory,
    /// Name before the attempt.
    pub original_name: String,
    /// Name that was requested.
    pub target_name: String,
    /// Failure reported for the attempt.
    pub error: String,
}

/// Folder rename slot; disabled folder renames count toward nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum FolderOutcome {
    /// Folder renaming was disabled or impossible.
    NotRequested,
    /// Folder rename attempt and its response.
    Attempted {
        /// Rename intent for the folder.
        task: RenameTask,
        /// Remote outcome.
        response: ApiResponse,
    },
}

/// Aggregated outcome of a rename run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameSummary {
    tallies: [CategoryTally; 3],
    failures: Vec<FailedRename>,
}

impl RenameSummary {
    /// Fold positional task/response slices into counts.
    ///
    /// A task without a matching response counts as a failure, so each tally
    /// always sums to its slice length.
    #[must_use]
    pub fn aggregate(
        videos: (&[RenameTask], &[ApiResponse]),
        subtitles: (&[RenameTask], &[ApiResponse]),
        folder: &FolderOutcome,
    ) -> Self {
        let mut summary = Self {
            tallies: RenameCategory::ALL.map(CategoryTally::empty),
            failures: Vec::new(),
        };
        summary.record(RenameCategory::Video, videos.0, videos.1);
        summary.record(RenameCategory::Subtitle, subtitles.0, subtitles.1);
        if let FolderOutcome::Attempted { task, response } = folder {
            summary.record(
                RenameCategory::Folder,
                std::slice::from_ref(task),
                std::slice::from_ref(response),
            );
        }
        summary
    }

    fn record(&mut self, category: RenameCategory, tasks: &[RenameTask], responses: &[ApiResponse]) {
        let slot = Self::slot(category);
        for (index, task) in tasks.iter().enumerate() {
            let error = match responses.get(index) {
                Some(response) if response.is_success() => None,
                Some(response) => Some(response.error().to_string()),
                None => Some(MISSING_RESPONSE.to_string()),
            };
            match error {
                None => self.tallies[slot].success += 1,
                Some(error) => {
                    self.tallies[slot].failure += 1;
                    self.failures.push(FailedRename {
                        category,
                        original_name: task.original_name().to_string(),
                        target_name: task.target_name().to_string(),
                        error,
                    });
                }
            }
        }
    }

    const fn slot(category: RenameCategory) -> usize {
        match category {
            RenameCategory::Video => 0,
            RenameCategory::Subtitle => 1,
            RenameCategory::Folder => 2,
        }
    }

    /// Tally for `category`.
    #[must_use]
    pub const fn tally(&self, category: RenameCategory) -> &CategoryTally {
        &self.tallies[Self::slot(category)]
    }

    /// Every tally in report order.
    #[must_use]
    pub const fn tallies(&self) -> &[CategoryTally] {
        &self.tallies
    }

    /// Failed renames in category order.
    #[must_use]
    pub fn failures(&self) -> &[FailedRename] {
        &self.failures
    }

    /// Whether every attempted rename succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
