use std::collections::BTreeSet;

use amr_core::{
    FileMeta, Folder, MediaMeta, MediaVariables, MovieVariables, RangeSelector, Reconciler,
    Template, natural_sort,
};
use proptest::prelude::*;

fn titles(names: &[String]) -> Vec<MediaMeta> {
    let template = Template::parse("{name}").expect("template");
    names
        .iter()
        .map(|name| {
            MediaMeta::new(
                &template,
                MediaVariables::Movie(MovieVariables {
                    name: name.clone(),
                    ..MovieVariables::default()
                }),
            )
            .expect("title")
        })
        .collect()
}

fn files(names: &BTreeSet<String>) -> Vec<FileMeta> {
    let mut sorted: Vec<String> = names.iter().map(|name| format!("{name}.mkv")).collect();
    natural_sort(&mut sorted);
    sorted
        .into_iter()
        .map(|name| FileMeta::new(name, Folder::new("/media")))
        .collect()
}

fn selector() -> impl Strategy<Value = RangeSelector> {
    prop_oneof![
        Just(RangeSelector::all()),
        (1_usize..6).prop_map(|start| RangeSelector::parse(&format!("{start}-")).expect("range")),
        (1_usize..4, 0_usize..4).prop_map(|(start, len)| {
            RangeSelector::parse(&format!("{start}-{}", start + len)).expect("range")
        }),
    ]
}

proptest! {
    #[test]
    fn task_count_is_bounded(
        title_names in prop::collection::vec("[a-c]{1,2}", 0..8),
        file_names in prop::collection::btree_set("[a-c]{1,2}", 0..8),
        range in selector(),
        exclude_renamed in any::<bool>(),
    ) {
        let title_list = titles(&title_names);
        let file_list = files(&file_names);
        let in_range = (1..=title_list.len()).filter(|index| range.contains(*index)).count();

        let result = Reconciler::new(range, exclude_renamed).reconcile(&title_list, &file_list);
        prop_assert!(result.tasks.len() <= in_range.min(file_list.len()));
    }

    #[test]
    fn new_pairings_follow_title_order(
        title_names in prop::collection::vec("[d-f]{1,2}", 0..8),
        file_names in prop::collection::btree_set("[a-c]{1,2}", 0..8),
        range in selector(),
    ) {
        let file_list = files(&file_names);
        let result = Reconciler::new(range, true).reconcile(&titles(&title_names), &file_list);

        let queue_positions: Vec<usize> = result
            .tasks
            .iter()
            .map(|task| {
                file_list
                    .iter()
                    .position(|file| file == task.file())
                    .expect("task file comes from the input")
            })
            .collect();
        prop_assert!(queue_positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn applying_tasks_is_idempotent(
        title_names in prop::collection::vec("[a-c]{1,2}", 0..8),
        file_names in prop::collection::btree_set("[a-c]{1,2}", 0..8),
        range in selector(),
    ) {
        let title_list = titles(&title_names);
        let file_list = files(&file_names);
        let reconciler = Reconciler::new(range, true);
        let first = reconciler.reconcile(&title_list, &file_list);

        let mut applied: Vec<String> = file_list
            .iter()
            .map(|file| {
                first
                    .tasks
                    .iter()
                    .find(|task| task.file() == file)
                    .map_or_else(|| file.name().to_string(), |task| task.target_name().to_string())
            })
            .collect();
        natural_sort(&mut applied);
        let renamed: Vec<FileMeta> = applied
            .into_iter()
            .map(|name| FileMeta::new(name, Folder::new("/media")))
            .collect();

        let second = reconciler.reconcile(&title_list, &renamed);
        prop_assert!(second.tasks.is_empty());
    }
}
