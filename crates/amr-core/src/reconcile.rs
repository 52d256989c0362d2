//! Pairing of canonical titles with remote files.
//!
//! Files whose name without extension already equals a title are treated as
//! renamed and never requeued. Every other file is consumed in natural order by
//! the selected title positions that are still open.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::file::FileMeta;
use crate::folder::Folder;
use crate::media::MediaMeta;
use crate::range::RangeSelector;

/// One rename intent: a canonical title paired with a remote entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenameTask {
    media: MediaMeta,
    file: FileMeta,
    target_name: String,
}

impl RenameTask {
    fn for_file(media: MediaMeta, file: FileMeta) -> Self {
        let target_name = format!("{}{}", media.fullname(), file.extension());
        Self {
            media,
            file,
            target_name,
        }
    }

    /// Rename intent for `folder` itself. `None` for the root, which has no name.
    ///
    /// Folders keep no extension: the whole leaf name is replaced.
    #[must_use]
    pub fn for_folder(media: MediaMeta, folder: &Folder) -> Option<Self> {
        let parent = folder.parent()?;
        let target_name = media.fullname().to_string();
        Some(Self {
            media,
            file: FileMeta::new(folder.name(), parent),
            target_name,
        })
    }

    /// Canonical title of this task.
    #[must_use]
    pub const fn media(&self) -> &MediaMeta {
        &self.media
    }

    /// Remote entry being renamed.
    #[must_use]
    pub const fn file(&self) -> &FileMeta {
        &self.file
    }

    /// Current remote name.
    #[must_use]
    pub fn original_name(&self) -> &str {
        self.file.name()
    }

    /// Name the entry is renamed to.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Remote path of the entry before renaming.
    #[must_use]
    pub fn full_path(&self) -> String {
        self.file.full_path()
    }

    /// Whether the rename would leave the name unchanged.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.original_name() == self.target_name
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Rename intents ordered by title position.
    pub tasks: Vec<RenameTask>,
    /// Files found already carrying a canonical title.
    pub already_renamed: usize,
    /// Files left without a title.
    pub untouched_files: usize,
}

/// Pairs ordered titles with naturally ordered file candidates.
#[derive(Debug, Clone)]
pub struct Reconciler {
    range: RangeSelector,
    exclude_renamed: bool,
}

impl Reconciler {
    /// Reconciler restricted to `range`. With `exclude_renamed` unset, files that
    /// already carry their title are emitted as no-op tasks.
    #[must_use]
    pub const fn new(range: RangeSelector, exclude_renamed: bool) -> Self {
        Self {
            range,
            exclude_renamed,
        }
    }

    /// Pair `titles` with `files`. Never fails; insufficient input yields fewer tasks.
    #[must_use]
    pub fn reconcile(&self, titles: &[MediaMeta], files: &[FileMeta]) -> Reconciliation {
        // Selected positions claim already-renamed files before unselected
        // positions carrying the same title.
        let mut claim_order: Vec<usize> = (0..titles.len()).collect();
        claim_order.sort_by_key(|index| (!self.range.contains(index + 1), *index));
        let mut open_titles: HashMap<&str, VecDeque<usize>> = HashMap::new();
        for index in claim_order {
            open_titles
                .entry(titles[index].fullname())
                .or_default()
                .push_back(index);
        }

        let mut renamed: Vec<Option<&FileMeta>> = vec![None; titles.len()];
        let mut pending: VecDeque<&FileMeta> = VecDeque::new();
        for file in files {
            match open_titles
                .get_mut(file.prefix_name())
                .and_then(VecDeque::pop_front)
            {
                Some(position) => renamed[position] = Some(file),
                None => pending.push_back(file),
            }
        }
        let already_renamed = renamed.iter().flatten().count();

        let mut tasks = Vec::new();
        for (index, title) in titles.iter().enumerate() {
            if !self.range.contains(index + 1) {
                continue;
            }
            match renamed[index] {
                Some(file) if !self.exclude_renamed => {
                    tasks.push(RenameTask::for_file(title.clone(), file.clone()));
                }
                Some(_) => {}
                None => {
                    if let Some(file) = pending.pop_front() {
                        tasks.push(RenameTask::for_file(title.clone(), file.clone()));
                    }
                }
            }
        }

        tracing::debug!(
            titles = titles.len(),
            files = files.len(),
            tasks = tasks.len(),
            already_renamed,
            "reconciled titles against files"
        );

        Reconciliation {
            tasks,
            already_renamed,
            untouched_files: pending.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaVariables, MovieVariables};
    use crate::template::Template;

    fn titles(names: &[&str]) -> Vec<MediaMeta> {
        let template = Template::parse("{name}").expect("template");
        names
            .iter()
            .map(|name| {
                MediaMeta::new(
                    &template,
                    MediaVariables::Movie(MovieVariables {
                        name: (*name).to_string(),
                        ..MovieVariables::default()
                    }),
                )
                .expect("title")
            })
            .collect()
    }

    fn files(names: &[&str]) -> Vec<FileMeta> {
        names
            .iter()
            .map(|name| FileMeta::new(*name, Folder::new("/tv/Show")))
            .collect()
    }

    fn pairs(result: &Reconciliation) -> Vec<(String, String)> {
        result
            .tasks
            .iter()
            .map(|task| {
                (
                    task.original_name().to_string(),
                    task.target_name().to_string(),
                )
            })
            .collect()
    }

    fn pair(original: &str, target: &str) -> (String, String) {
        (original.to_string(), target.to_string())
    }

    #[test]
    fn pairs_titles_with_files_in_order() {
        let reconciler = Reconciler::new(RangeSelector::all(), true);
        let result = reconciler.reconcile(
            &titles(&["Show-S01E01.Pilot", "Show-S01E02.Return"]),
            &files(&["a.mkv", "b.mkv"]),
        );
        assert_eq!(
            pairs(&result),
            vec![
                pair("a.mkv", "Show-S01E01.Pilot.mkv"),
                pair("b.mkv", "Show-S01E02.Return.mkv"),
            ]
        );
        assert_eq!(result.tasks[0].full_path(), "/tv/Show/a.mkv");
    }

    #[test]
    fn already_renamed_files_are_excluded_or_confirmed() {
        let title_list = titles(&["Show-S01E01.Pilot"]);
        let file_list = files(&["Show-S01E01.Pilot.mkv"]);

        let excluded = Reconciler::new(RangeSelector::all(), true).reconcile(&title_list, &file_list);
        assert!(excluded.tasks.is_empty());
        assert_eq!(excluded.already_renamed, 1);

        let included =
            Reconciler::new(RangeSelector::all(), false).reconcile(&title_list, &file_list);
        assert_eq!(
            pairs(&included),
            vec![pair("Show-S01E01.Pilot.mkv", "Show-S01E01.Pilot.mkv")]
        );
        assert!(included.tasks[0].is_noop());
    }

    #[test]
    fn already_renamed_titles_are_skipped_by_pending_files() {
        let result = Reconciler::new(RangeSelector::all(), true).reconcile(
            &titles(&["E1", "E2", "E3"]),
            &files(&["E2.mkv", "x.mkv", "y.mkv"]),
        );
        assert_eq!(
            pairs(&result),
            vec![pair("x.mkv", "E1.mkv"), pair("y.mkv", "E3.mkv")]
        );
    }

    #[test]
    fn range_limits_eligible_positions() -> crate::CoreResult<()> {
        let result = Reconciler::new(RangeSelector::parse("3-")?, true).reconcile(
            &titles(&["E1", "E2", "E3", "E4", "E5"]),
            &files(&["a.mkv", "b.mkv", "c.mkv", "d.mkv", "e.mkv"]),
        );
        assert_eq!(
            pairs(&result),
            vec![
                pair("a.mkv", "E3.mkv"),
                pair("b.mkv", "E4.mkv"),
                pair("c.mkv", "E5.mkv"),
            ]
        );
        assert_eq!(result.untouched_files, 2);
        Ok(())
    }

    #[test]
    fn surplus_titles_and_files_are_left_alone() {
        let reconciler = Reconciler::new(RangeSelector::all(), true);
        let more_titles = reconciler.reconcile(&titles(&["E1", "E2", "E3"]), &files(&["a.mkv"]));
        assert_eq!(pairs(&more_titles), vec![pair("a.mkv", "E1.mkv")]);

        let more_files = reconciler.reconcile(&titles(&["E1"]), &files(&["a.mkv", "b.mkv"]));
        assert_eq!(pairs(&more_files), vec![pair("a.mkv", "E1.mkv")]);
        assert_eq!(more_files.untouched_files, 1);
    }

    #[test]
    fn duplicate_prefixes_keep_the_first_file() {
        let result = Reconciler::new(RangeSelector::all(), false).reconcile(
            &titles(&["E1", "E2"]),
            &files(&["E1.ass", "E1.mkv"]),
        );
        assert_eq!(
            pairs(&result),
            vec![pair("E1.ass", "E1.ass"), pair("E1.mkv", "E2.mkv")]
        );
    }

    #[test]
    fn repeated_titles_prefer_selected_positions() -> crate::CoreResult<()> {
        let reconciler = Reconciler::new(RangeSelector::parse("2-")?, true);
        let title_list = titles(&["E", "E"]);
        let first = reconciler.reconcile(&title_list, &files(&["x.mkv", "y.mkv"]));
        assert_eq!(pairs(&first), vec![pair("x.mkv", "E.mkv")]);

        let second = reconciler.reconcile(&title_list, &files(&["E.mkv", "y.mkv"]));
        assert!(second.tasks.is_empty());
        Ok(())
    }

    #[test]
    fn folder_tasks_rename_the_leaf() {
        let title = titles(&["Show (2020)"]).remove(0);
        let task = RenameTask::for_folder(title.clone(), &Folder::new("/tv/show.2020"))
            .expect("folder task");
        assert_eq!(task.original_name(), "show.2020");
        assert_eq!(task.target_name(), "Show (2020)");
        assert_eq!(task.full_path(), "/tv/show.2020");
        assert!(RenameTask::for_folder(title, &Folder::root()).is_none());
    }
}
