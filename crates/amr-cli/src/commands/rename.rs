use amr_api::{
    MovieInfo, MovieSearchItem, SearchResults, SeasonInfo, TvInfo, TvSearchItem, current_code,
    list_entries, payload,
};
use amr_core::{
    ApiResponse, CoreError, Folder, FolderOutcome, InventoryFilter, MediaMeta, MediaVariables,
    RangeSelector, Reconciler, RemoteEntry, RenameSummary, RenameTask, Template,
};
use amr_tasks::{ApiTask, TaskManager};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::cli::{MovieArgs, TvArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{
    movie_search_labels, render_movie_overview, render_preview, render_summary,
    render_tv_overview, rename_progress, season_labels, tv_search_labels,
};
use crate::prompt::{choose, require_confirmation};

pub(crate) async fn handle_tv(ctx: &mut AppContext, args: TvArgs) -> CliResult<()> {
    let tv_id = if args.id {
        parse_id(&args.keyword)?
    } else {
        let responses = run_required(ctx, vec![ctx.tmdb.search_tv(&args.keyword)]).await?;
        let hits: SearchResults<TvSearchItem> = decode(&responses[0], "tmdb.search_tv")?;
        let preset = args.pick.or_else(|| ctx.assume_yes.then_some(1));
        let index = choose("Select a series", &tv_search_labels(&hits.results), preset)?;
        hits.results[index].id
    };

    let Some(dir) = args.dir.as_deref() else {
        let responses = run_required(ctx, vec![ctx.tmdb.tv_info(tv_id)]).await?;
        let show: TvInfo = decode(&responses[0], "tmdb.tv_info")?;
        let season_number = choose_season(ctx, &show, args.season)?;
        let responses = run_required(ctx, vec![ctx.tmdb.season_info(tv_id, season_number)]).await?;
        let season: SeasonInfo = decode(&responses[0], "tmdb.season_info")?;
        return render_tv_overview(&show, &season, ctx.output);
    };

    let folder = Folder::new(dir);
    let password = args.password.clone().unwrap_or_default();
    login(ctx).await?;

    let responses = run_required(
        ctx,
        vec![ctx.tmdb.tv_info(tv_id), refresh_parent(ctx, &folder, &password)],
    )
    .await?;
    let show: TvInfo = decode(&responses[0], "tmdb.tv_info")?;
    let season_number = choose_season(ctx, &show, args.season)?;

    let responses = run_required(
        ctx,
        vec![
            ctx.tmdb.season_info(tv_id, season_number),
            ctx.alist.list(&folder, &password, true),
        ],
    )
    .await?;
    let season: SeasonInfo = decode(&responses[0], "tmdb.season_info")?;
    let entries = list_entries(&responses[1]).map_err(CliError::failure)?;

    let amr = &ctx.settings.amr;
    let episode_template = parse_template(&amr.tv_name_format, "amr.tv_name_format")?;
    let folder_template = parse_template(&amr.tv_folder_name_format, "amr.tv_folder_name_format")?;
    let show_variables = show.variables(&season);
    let titles = season
        .episodes
        .iter()
        .map(|episode| {
            MediaMeta::new(
                &episode_template,
                MediaVariables::Tv {
                    show: show_variables.clone(),
                    episode: Some(episode.variables()),
                },
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(format_error)?;
    let folder_title = MediaMeta::new(
        &folder_template,
        MediaVariables::Tv {
            show: show_variables,
            episode: None,
        },
    )
    .map_err(format_error)?;
    info!(
        tv_id,
        season = season_number,
        titles = titles.len(),
        "series titles rendered"
    );

    apply_renames(
        ctx,
        RenameRequest {
            folder,
            password,
            entries,
            titles,
            folder_title,
            range: args.number,
        },
    )
    .await
}

pub(crate) async fn handle_movie(ctx: &mut AppContext, args: MovieArgs) -> CliResult<()> {
    let movie_id = if args.id {
        parse_id(&args.keyword)?
    } else {
        let responses = run_required(ctx, vec![ctx.tmdb.search_movie(&args.keyword)]).await?;
        let hits: SearchResults<MovieSearchItem> = decode(&responses[0], "tmdb.search_movie")?;
        let preset = args.pick.or_else(|| ctx.assume_yes.then_some(1));
        let index = choose("Select a movie", &movie_search_labels(&hits.results), preset)?;
        hits.results[index].id
    };

    let Some(dir) = args.dir.as_deref() else {
        let responses = run_required(ctx, vec![ctx.tmdb.movie_info(movie_id)]).await?;
        let movie: MovieInfo = decode(&responses[0], "tmdb.movie_info")?;
        return render_movie_overview(&movie, ctx.output);
    };

    let folder = Folder::new(dir);
    let password = args.password.clone().unwrap_or_default();
    login(ctx).await?;

    let responses = run_required(
        ctx,
        vec![
            ctx.tmdb.movie_info(movie_id),
            refresh_parent(ctx, &folder, &password),
        ],
    )
    .await?;
    let movie: MovieInfo = decode(&responses[0], "tmdb.movie_info")?;

    let responses = run_required(ctx, vec![ctx.alist.list(&folder, &password, true)]).await?;
    let entries = list_entries(&responses[0]).map_err(CliError::failure)?;

    let amr = &ctx.settings.amr;
    let file_template = parse_template(&amr.movie_name_format, "amr.movie_name_format")?;
    let folder_template =
        parse_template(&amr.movie_folder_name_format, "amr.movie_folder_name_format")?;
    let variables = movie.variables();
    let title =
        MediaMeta::new(&file_template, MediaVariables::Movie(variables.clone())).map_err(format_error)?;
    let folder_title =
        MediaMeta::new(&folder_template, MediaVariables::Movie(variables)).map_err(format_error)?;

    apply_renames(
        ctx,
        RenameRequest {
            folder,
            password,
            entries,
            titles: vec![title],
            folder_title,
            range: RangeSelector::all(),
        },
    )
    .await
}

struct RenameRequest {
    folder: Folder,
    password: String,
    entries: Vec<RemoteEntry>,
    titles: Vec<MediaMeta>,
    folder_title: MediaMeta,
    range: RangeSelector,
}

async fn apply_renames(ctx: &AppContext, request: RenameRequest) -> CliResult<()> {
    let amr = &ctx.settings.amr;
    let videos = inventory_filter(&amr.video_regex_pattern, "amr.video_regex_pattern")?
        .select_files(&request.entries, &request.folder);
    let subtitles = inventory_filter(&amr.subtitle_regex_pattern, "amr.subtitle_regex_pattern")?
        .select_files(&request.entries, &request.folder);

    let reconciler = Reconciler::new(request.range, amr.exclude_renamed);
    let video_plan = reconciler.reconcile(&request.titles, &videos);
    let subtitle_plan = reconciler.reconcile(&request.titles, &subtitles);
    let folder_task = if amr.media_folder_rename {
        RenameTask::for_folder(request.folder_title, &request.folder).filter(|task| !task.is_noop())
    } else {
        None
    };

    if ctx.prints_progress() {
        render_preview(
            &request.folder,
            &video_plan,
            &subtitle_plan,
            folder_task.as_ref(),
        );
    }
    if video_plan.tasks.is_empty() && subtitle_plan.tasks.is_empty() && folder_task.is_none() {
        if ctx.prints_progress() {
            println!("Nothing to rename.");
        }
        return Ok(());
    }
    require_confirmation(ctx.assume_yes, "Apply these renames?")?;

    let progress = ctx.prints_progress().then(rename_progress);
    let rename = |task: &RenameTask| {
        let api_task = ctx.alist.rename_task(task);
        match &progress {
            Some(handler) => api_task.with_output(handler.clone()),
            None => api_task,
        }
    };

    let mut manager = TaskManager::new(ctx.execution.clone());
    manager.add_tasks(
        video_plan
            .tasks
            .iter()
            .chain(&subtitle_plan.tasks)
            .map(&rename),
    );
    let responses = manager.run_tasks(ctx.concurrent()).await.into_responses();
    let (video_responses, subtitle_responses) =
        responses.split_at(video_plan.tasks.len().min(responses.len()));

    let folder_outcome = match folder_task {
        Some(task) => {
            manager.add_task(rename(&task));
            let response = manager
                .run_tasks(false)
                .await
                .into_responses()
                .into_iter()
                .next()
                .unwrap_or_else(|| ApiResponse::transport_failure("no response recorded"));
            FolderOutcome::Attempted { task, response }
        }
        None => FolderOutcome::NotRequested,
    };

    refresh_after_rename(ctx, &request.folder, &request.password, &folder_outcome).await;
    let summary = RenameSummary::aggregate(
        (video_plan.tasks.as_slice(), video_responses),
        (subtitle_plan.tasks.as_slice(), subtitle_responses),
        &folder_outcome,
    );
    info!(
        clean = summary.is_clean(),
        tasks = ctx.execution.log().len(),
        "rename run finished"
    );
    render_summary(&summary, ctx.output)
}

/// Refresh the parent and the (possibly renamed) folder listings.
async fn refresh_after_rename(
    ctx: &AppContext,
    folder: &Folder,
    password: &str,
    outcome: &FolderOutcome,
) {
    let current_folder = match outcome {
        FolderOutcome::Attempted { task, response } if response.is_success() => folder
            .parent()
            .map_or_else(|| folder.clone(), |parent| parent.child(task.target_name())),
        _ => folder.clone(),
    };
    let mut manager = TaskManager::new(ctx.execution.clone());
    manager.add_task(refresh_parent(ctx, folder, password));
    manager.add_task(ctx.alist.list(&current_folder, password, true).raise_error(false));
    let refreshed = manager.run_tasks(false).await;
    debug!(refreshed = refreshed.len(), folder = %current_folder, "listings refreshed");
}

async fn login(ctx: &mut AppContext) -> CliResult<()> {
    let alist = &ctx.settings.alist;
    if alist.guest_mode {
        info!("guest mode, skipping login");
        return Ok(());
    }
    let otp_code = current_code(&alist.totp)
        .map_err(|err| CliError::validation(format!("alist.totp: {err}")))?;
    let task = ctx.alist.login(&alist.user, &alist.password, &otp_code);
    let responses = run_required(ctx, vec![task]).await?;
    ctx.alist
        .authenticate(&responses[0])
        .map_err(CliError::failure)
}

/// Run a batch whose required tasks must all succeed.
async fn run_required(ctx: &AppContext, tasks: Vec<ApiTask>) -> CliResult<Vec<ApiResponse>> {
    let mut manager = TaskManager::new(ctx.execution.clone());
    manager.add_tasks(tasks);
    manager
        .run_tasks(ctx.concurrent())
        .await
        .into_result()
        .map_err(CliError::Remote)
}

/// Refresh the parent listing so the provider notices recent changes. Parents
/// may be unreadable, so failures are tolerated.
fn refresh_parent(ctx: &AppContext, folder: &Folder, password: &str) -> ApiTask {
    let parent = folder.parent().unwrap_or_else(Folder::root);
    ctx.alist.list(&parent, password, true).raise_error(false)
}

fn choose_season(ctx: &AppContext, show: &TvInfo, requested: Option<u32>) -> CliResult<u32> {
    if let Some(number) = requested {
        let known = show.seasons.is_empty()
            || show
                .seasons
                .iter()
                .any(|season| season.season_number == number);
        return if known {
            Ok(number)
        } else {
            Err(CliError::validation(format!(
                "{} has no season {number}",
                show.name
            )))
        };
    }
    if show.seasons.is_empty() {
        return Err(CliError::validation(format!("{} has no seasons", show.name)));
    }
    let preset = ctx.assume_yes.then(|| {
        show.seasons
            .iter()
            .position(|season| season.season_number > 0)
            .map_or(1, |index| index + 1)
    });
    let index = choose("Select a season", &season_labels(&show.seasons), preset)?;
    Ok(show.seasons[index].season_number)
}

fn parse_id(keyword: &str) -> CliResult<u64> {
    keyword
        .trim()
        .parse()
        .map_err(|_| CliError::validation(format!("'{keyword}' is not a TMDB id")))
}

fn decode<T: DeserializeOwned>(response: &ApiResponse, function: &'static str) -> CliResult<T> {
    payload(response, function).map_err(CliError::failure)
}

fn parse_template(template: &str, field: &str) -> CliResult<Template> {
    Template::parse(template).map_err(|err| CliError::validation(format!("{field}: {err}")))
}

fn inventory_filter(pattern: &str, field: &str) -> CliResult<InventoryFilter> {
    InventoryFilter::new(pattern).map_err(|err| CliError::validation(format!("{field}: {err}")))
}

fn format_error(err: CoreError) -> CliError {
    CliError::validation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use amr_config::Settings;
    use anyhow::{Result, anyhow};
    use httpmock::prelude::*;
    use httpmock::{Mock, MockServer};
    use serde_json::{Value, json};

    use crate::cli::OutputFormat;

    fn settings_for(server: &MockServer) -> Settings {
        let mut settings = Settings::default();
        settings.alist.url = server.base_url();
        settings.alist.user = "admin".to_string();
        settings.alist.password = "secret".to_string();
        settings.tmdb.api_url = server.base_url();
        settings.tmdb.api_key = "k".to_string();
        settings.tmdb.language = "en-US".to_string();
        settings
    }

    fn context_for(settings: Settings) -> Result<AppContext> {
        AppContext::from_settings(settings, true, OutputFormat::Json)
            .map_err(|err| anyhow!(err.display_message()))
    }

    fn alist_ok(data: &Value) -> Value {
        json!({"code": 200, "message": "success", "data": data})
    }

    fn listing(names: &[&str]) -> Value {
        let content: Vec<Value> = names
            .iter()
            .map(|name| json!({"name": name, "is_dir": false, "size": 1}))
            .collect();
        alist_ok(&json!({"content": content, "total": names.len()}))
    }

    fn list_body(path: &str) -> Value {
        json!({"path": path, "password": "", "page": 1, "per_page": 0, "refresh": true})
    }

    fn mock_login(server: &MockServer) -> Mock<'_> {
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login");
            then.status(200).json_body(alist_ok(&json!({"token": "tok"})));
        })
    }

    fn mock_list<'a>(server: &'a MockServer, path: &str, body: Value) -> Mock<'a> {
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/fs/list")
                .json_body(list_body(path));
            then.status(200).json_body(body);
        })
    }

    fn mock_rename<'a>(server: &'a MockServer, name: &str, path: &str) -> Mock<'a> {
        server.mock(|when, then| {
            when.method(POST)
                .path("/api/fs/rename")
                .header("authorization", "tok")
                .json_body(json!({"name": name, "path": path}));
            then.status(200).json_body(alist_ok(&Value::Null));
        })
    }

    fn mock_dark(server: &MockServer) -> (Mock<'_>, Mock<'_>) {
        let info = server.mock(|when, then| {
            when.method(GET).path("/tv/70523").query_param("api_key", "k");
            then.status(200).json_body(json!({
                "id": 70523,
                "name": "Dark",
                "original_name": "Dark",
                "first_air_date": "2017-12-01",
                "original_language": "de",
                "origin_country": ["DE"],
                "vote_average": 8.4,
                "seasons": [
                    {"season_number": 1, "name": "Season 1", "air_date": "2017-12-01", "episode_count": 2}
                ]
            }));
        });
        let season = server.mock(|when, then| {
            when.method(GET).path("/tv/70523/season/1");
            then.status(200).json_body(json!({
                "season_number": 1,
                "air_date": "2017-12-01",
                "episodes": [
                    {"episode_number": 1, "name": "Secrets", "air_date": "2017-12-01", "vote_average": 7.9},
                    {"episode_number": 2, "name": "Lies", "air_date": "2017-12-08", "vote_average": 7.8}
                ]
            }));
        });
        (info, season)
    }

    fn tv_args(dir: Option<&str>) -> TvArgs {
        TvArgs {
            keyword: "70523".to_string(),
            id: true,
            dir: dir.map(str::to_string),
            password: None,
            number: RangeSelector::all(),
            season: Some(1),
            pick: None,
        }
    }

    #[tokio::test]
    async fn series_files_subtitles_and_folder_are_renamed() -> Result<()> {
        let server = MockServer::start_async().await;
        let login = mock_login(&server);
        let (info, season) = mock_dark(&server);
        let parent = mock_list(&server, "/tv/", listing(&[]));
        let folder = mock_list(&server, "/tv/Dark/", listing(&["ep2.mkv", "ep1.mkv", "ep1.ass", "notes.txt"]));
        let renamed_folder = mock_list(&server, "/tv/Dark (2017)/", listing(&[]));
        let first = mock_rename(&server, "Dark-S01E01.Secrets.mkv", "/tv/Dark/ep1.mkv");
        let second = mock_rename(&server, "Dark-S01E02.Lies.mkv", "/tv/Dark/ep2.mkv");
        let subtitle = mock_rename(&server, "Dark-S01E01.Secrets.ass", "/tv/Dark/ep1.ass");
        let folder_rename = mock_rename(&server, "Dark (2017)", "/tv/Dark");

        let mut ctx = context_for(settings_for(&server))?;
        handle_tv(&mut ctx, tv_args(Some("tv/Dark")))
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        login.assert();
        info.assert();
        season.assert();
        parent.assert_calls(2);
        folder.assert();
        renamed_folder.assert();
        first.assert();
        second.assert();
        subtitle.assert();
        folder_rename.assert();
        Ok(())
    }

    #[tokio::test]
    async fn episode_ranges_limit_the_batch() -> Result<()> {
        let server = MockServer::start_async().await;
        let _ = mock_login(&server);
        let _ = mock_dark(&server);
        let _ = mock_list(&server, "/", listing(&[]));
        let _ = mock_list(&server, "/Dark/", listing(&["a.mkv"]));
        let second = mock_rename(&server, "Dark-S01E02.Lies.mkv", "/Dark/a.mkv");
        let mut settings = settings_for(&server);
        settings.amr.media_folder_rename = false;

        let mut ctx = context_for(settings)?;
        let mut args = tv_args(Some("/Dark"));
        args.number = RangeSelector::parse("2-")?;
        handle_tv(&mut ctx, args)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        second.assert();
        Ok(())
    }

    #[tokio::test]
    async fn unreadable_folders_stop_before_renaming() -> Result<()> {
        let server = MockServer::start_async().await;
        let _ = mock_login(&server);
        let _ = mock_dark(&server);
        let _ = mock_list(&server, "/tv/", listing(&[]));
        let _ = mock_list(
            &server,
            "/tv/Dark/",
            json!({"code": 500, "message": "object not found", "data": null}),
        );
        let rename = server.mock(|when, then| {
            when.method(POST).path("/api/fs/rename");
            then.status(200).json_body(alist_ok(&Value::Null));
        });

        let mut ctx = context_for(settings_for(&server))?;
        let result = handle_tv(&mut ctx, tv_args(Some("/tv/Dark"))).await;

        match result {
            Err(CliError::Remote(err)) => assert!(err.to_string().contains("object not found")),
            Err(other) => return Err(anyhow!("unexpected error: {}", other.display_message())),
            Ok(()) => return Err(anyhow!("expected the run to stop")),
        }
        rename.assert_calls(0);
        Ok(())
    }

    #[tokio::test]
    async fn info_mode_never_logs_in() -> Result<()> {
        let server = MockServer::start_async().await;
        let login = mock_login(&server);
        let (info, season) = mock_dark(&server);

        let mut ctx = context_for(settings_for(&server))?;
        handle_tv(&mut ctx, tv_args(None))
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        info.assert();
        season.assert();
        login.assert_calls(0);
        Ok(())
    }

    #[tokio::test]
    async fn guest_movie_run_skips_renamed_files() -> Result<()> {
        let server = MockServer::start_async().await;
        let login = mock_login(&server);
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/search/movie")
                .query_param("query", "Heat");
            then.status(200).json_body(json!({
                "page": 1,
                "results": [{"id": 949, "title": "Heat", "original_title": "Heat", "release_date": "1995-12-15"}],
                "total_results": 1
            }));
        });
        let info = server.mock(|when, then| {
            when.method(GET).path("/movie/949");
            then.status(200).json_body(json!({
                "id": 949,
                "title": "Heat",
                "original_title": "Heat",
                "release_date": "1995-12-15",
                "original_language": "en",
                "origin_country": ["US"],
                "vote_average": 7.9
            }));
        });
        let _ = mock_list(&server, "/movies/", listing(&[]));
        let _ = mock_list(&server, "/movies/heat/", listing(&["Heat (1995).mkv", "heat.srt"]));
        let _ = mock_list(&server, "/movies/Heat (1995)/", listing(&[]));
        let subtitle = server.mock(|when, then| {
            when.method(POST)
                .path("/api/fs/rename")
                .json_body(json!({"name": "Heat (1995).srt", "path": "/movies/heat/heat.srt"}));
            then.status(200).json_body(alist_ok(&Value::Null));
        });
        let folder_rename = server.mock(|when, then| {
            when.method(POST)
                .path("/api/fs/rename")
                .json_body(json!({"name": "Heat (1995)", "path": "/movies/heat"}));
            then.status(200).json_body(alist_ok(&Value::Null));
        });

        let mut settings = settings_for(&server);
        settings.alist.guest_mode = true;
        let mut ctx = context_for(settings)?;
        let args = MovieArgs {
            keyword: "Heat".to_string(),
            id: false,
            dir: Some("/movies/heat/".to_string()),
            password: None,
            pick: None,
        };
        handle_movie(&mut ctx, args)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        login.assert_calls(0);
        search.assert();
        info.assert();
        subtitle.assert();
        folder_rename.assert();
        Ok(())
    }

    #[test]
    fn ids_must_be_numeric() {
        assert_eq!(parse_id(" 42 ").ok(), Some(42));
        assert!(matches!(parse_id("Dark"), Err(CliError::Validation(_))));
    }
}
