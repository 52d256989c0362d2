//! Output renderers and formatting helpers for CLI commands.

use std::sync::Arc;

use amr_api::{MovieInfo, MovieSearchItem, SeasonInfo, SeasonSummary, TvInfo, TvSearchItem};
use amr_config::Settings;
use amr_core::{Folder, Reconciliation, RenameSummary, RenameTask};
use amr_tasks::{OutputHandler, TaskRecord};
use anyhow::anyhow;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn print_json(value: &impl Serialize) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn tv_search_labels(results: &[TvSearchItem]) -> Vec<String> {
    results
        .iter()
        .map(|item| {
            format!(
                "{} ({}) [tmdb {}]",
                item.name,
                year_or_unknown(&item.first_air_date),
                item.id
            )
        })
        .collect()
}

pub(crate) fn movie_search_labels(results: &[MovieSearchItem]) -> Vec<String> {
    results
        .iter()
        .map(|item| {
            format!(
                "{} ({}) [tmdb {}]",
                item.title,
                year_or_unknown(&item.release_date),
                item.id
            )
        })
        .collect()
}

pub(crate) fn season_labels(seasons: &[SeasonSummary]) -> Vec<String> {
    seasons
        .iter()
        .map(|season| {
            format!(
                "S{:02} {} ({} episodes, {})",
                season.season_number,
                season.name,
                season.episode_count,
                year_or_unknown(&season.air_date)
            )
        })
        .collect()
}

pub(crate) fn render_tv_overview(
    show: &TvInfo,
    season: &SeasonInfo,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let titles: Vec<_> = season
                .episodes
                .iter()
                .map(|episode| (episode.episode_number, episode.name.as_str()))
                .collect();
            print_json(&serde_json::json!({
                "id": show.id,
                "name": show.name,
                "original_name": show.original_name,
                "first_air_date": show.first_air_date,
                "season": season.season_number,
                "episodes": titles,
            }))?;
        }
        OutputFormat::Table => {
            println!("{} ({})", show.name, year_or_unknown(&show.first_air_date));
            if show.original_name != show.name {
                println!("original: {}", show.original_name);
            }
            println!("season: {}", season.season_number);
            println!("{:>4} {:<10} TITLE", "EP", "AIR DATE");
            for episode in &season.episodes {
                println!(
                    "{:>4} {:<10} {}",
                    episode.episode_number,
                    if episode.air_date.is_empty() {
                        "-"
                    } else {
                        episode.air_date.as_str()
                    },
                    episode.name
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn render_movie_overview(movie: &MovieInfo, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "id": movie.id,
            "title": movie.title,
            "original_title": movie.original_title,
            "release_date": movie.release_date,
            "rating": movie.vote_average,
        })),
        OutputFormat::Table => {
            println!("{} ({})", movie.title, year_or_unknown(&movie.release_date));
            if movie.original_title != movie.title {
                println!("original: {}", movie.original_title);
            }
            println!("rating: {:.1}", movie.vote_average);
            if !movie.overview.is_empty() {
                println!("{}", movie.overview);
            }
            Ok(())
        }
    }
}

/// Planned renames, printed before asking for confirmation.
pub(crate) fn render_preview(
    folder: &Folder,
    videos: &Reconciliation,
    subtitles: &Reconciliation,
    folder_task: Option<&RenameTask>,
) {
    println!("folder: {folder}");
    for (label, plan) in [("video", videos), ("subtitle", subtitles)] {
        println!(
            "{label}: {} to rename, {} already renamed, {} left untouched",
            plan.tasks.len(),
            plan.already_renamed,
            plan.untouched_files
        );
        for task in &plan.tasks {
            println!("  {}  ->  {}", task.original_name(), task.target_name());
        }
    }
    if let Some(task) = folder_task {
        println!("folder rename:");
        println!("  {}  ->  {}", task.original_name(), task.target_name());
    }
}

/// Progress line for each finished rename.
pub(crate) fn rename_progress() -> OutputHandler {
    Arc::new(|record: &TaskRecord| {
        let argument = |key: &str| {
            record
                .arguments
                .iter()
                .find(|(name, _)| name == key)
                .map_or("", |(_, value)| value.as_str())
        };
        if record.response.is_success() {
            println!("  ok      {} -> {}", argument("path"), argument("name"));
        } else {
            println!(
                "  failed  {} -> {} ({})",
                argument("path"),
                argument("name"),
                record.response.error()
            );
        }
    })
}

pub(crate) fn render_summary(summary: &RenameSummary, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Table => {
            println!("{:<10} {:>7} {:>7}", "CATEGORY", "SUCCESS", "FAILURE");
            for tally in summary.tallies() {
                println!(
                    "{:<10} {:>7} {:>7}",
                    tally.category.as_str(),
                    tally.success,
                    tally.failure
                );
            }
            if !summary.is_clean() {
                println!("failed renames:");
                for failure in summary.failures() {
                    println!(
                        "  [{}] {} -> {}: {}",
                        failure.category.as_str(),
                        failure.original_name,
                        failure.target_name,
                        failure.error
                    );
                }
            }
            Ok(())
        }
    }
}

pub(crate) fn render_settings(settings: &Settings, format: OutputFormat) -> CliResult<()> {
    let masked = settings.masked();
    match format {
        OutputFormat::Json => print_json(&masked),
        OutputFormat::Table => {
            println!("alist.url: {}", masked.alist.url);
            println!("alist.guest_mode: {}", masked.alist.guest_mode);
            println!("alist.user: {}", masked.alist.user);
            println!("alist.password: {}", masked.alist.password);
            println!("alist.totp: {}", masked.alist.totp);
            println!("tmdb.api_url: {}", masked.tmdb.api_url);
            println!("tmdb.api_key: {}", masked.tmdb.api_key);
            println!("tmdb.language: {}", masked.tmdb.language);
            let amr = &masked.amr;
            println!("amr.exclude_renamed: {}", amr.exclude_renamed);
            println!("amr.rename_by_async: {}", amr.rename_by_async);
            println!("amr.media_folder_rename: {}", amr.media_folder_rename);
            println!("amr.movie_name_format: {}", amr.movie_name_format);
            println!("amr.movie_folder_name_format: {}", amr.movie_folder_name_format);
            println!("amr.tv_name_format: {}", amr.tv_name_format);
            println!("amr.tv_folder_name_format: {}", amr.tv_folder_name_format);
            println!("amr.video_regex_pattern: {}", amr.video_regex_pattern);
            println!("amr.subtitle_regex_pattern: {}", amr.subtitle_regex_pattern);
            println!("amr.in_flight_limit: {}", amr.in_flight_limit);
            println!("amr.timeout_secs: {}", amr.timeout_secs);
            Ok(())
        }
    }
}

#[must_use]
pub(crate) fn year_or_unknown(date: &str) -> &str {
    date.get(..4).unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_show_year_and_id() {
        let items = vec![
            TvSearchItem {
                id: 70523,
                name: "Dark".to_string(),
                first_air_date: "2017-12-01".to_string(),
                ..TvSearchItem::default()
            },
            TvSearchItem {
                id: 1,
                name: "Untitled".to_string(),
                ..TvSearchItem::default()
            },
        ];
        let labels = tv_search_labels(&items);
        assert_eq!(labels[0], "Dark (2017) [tmdb 70523]");
        assert_eq!(labels[1], "Untitled (unknown) [tmdb 1]");
    }

    #[test]
    fn season_labels_pad_numbers() {
        let seasons = vec![SeasonSummary {
            season_number: 3,
            name: "Season 3".to_string(),
            air_date: "2020-06-27".to_string(),
            episode_count: 8,
        }];
        assert_eq!(season_labels(&seasons)[0], "S03 Season 3 (8 episodes, 2020)");
    }
}
