//! TMDB metadata provider: search and detail lookups.

use amr_core::{ApiResponse, EpisodeVariables, MovieVariables, TvVariables};
use amr_tasks::ApiTask;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiResult, normalise_base_url};
use crate::wire::null_as_default;

/// Default TMDB v3 endpoint.
pub const DEFAULT_API_URL: &str = "https://api.themoviedb.org/3";

const NO_RESULTS: &str = "no results matched the keyword";

/// Builds TMDB requests as unsent tasks. Every lookup is required for the
/// run to continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmdbClient {
    api_url: String,
    api_key: String,
    language: String,
}

impl TmdbClient {
    /// Client for the API at `api_url`, answering in `language`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`](crate::ApiError::InvalidBaseUrl)
    /// unless `api_url` is an http(s) URL.
    pub fn new(api_url: &str, api_key: &str, language: &str) -> ApiResult<Self> {
        Ok(Self {
            api_url: normalise_base_url(api_url)?,
            api_key: api_key.to_string(),
            language: language.to_string(),
        })
    }

    /// Response language.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Series details.
    #[must_use]
    pub fn tv_info(&self, tv_id: u64) -> ApiTask {
        self.get("tmdb.tv_info", &format!("/tv/{tv_id}"), None)
            .argument("tv_id", tv_id)
    }

    /// One season of a series, with its episodes.
    #[must_use]
    pub fn season_info(&self, tv_id: u64, season_number: u32) -> ApiTask {
        self.get(
            "tmdb.season_info",
            &format!("/tv/{tv_id}/season/{season_number}"),
            None,
        )
        .argument("tv_id", tv_id)
        .argument("season_number", season_number)
    }

    /// Film details.
    #[must_use]
    pub fn movie_info(&self, movie_id: u64) -> ApiTask {
        self.get("tmdb.movie_info", &format!("/movie/{movie_id}"), None)
            .argument("movie_id", movie_id)
    }

    /// Series matching `keyword`.
    #[must_use]
    pub fn search_tv(&self, keyword: &str) -> ApiTask {
        self.get("tmdb.search_tv", "/search/tv", Some(keyword))
            .argument("keyword", keyword)
    }

    /// Films matching `keyword`.
    #[must_use]
    pub fn search_movie(&self, keyword: &str) -> ApiTask {
        self.get("tmdb.search_movie", "/search/movie", Some(keyword))
            .argument("keyword", keyword)
    }

    fn get(&self, function: &'static str, path: &str, query: Option<&str>) -> ApiTask {
        let url = format!("{}{path}", self.api_url);
        let mut params = vec![
            ("api_key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];
        if let Some(query) = query {
            params.push(("query", query.to_string()));
        }
        ApiTask::new(
            function,
            move |client| client.get(&url).query(&params),
            parse_tmdb,
        )
        .secret_argument("api_key", &self.api_key)
        .argument("language", &self.language)
        .raise_error(true)
    }
}

/// Map a TMDB reply onto an [`ApiResponse`].
///
/// Any status other than 200 is a failure carrying the provider's
/// `status_message`. A 200 reply whose `results` array is empty is a failure
/// too.
#[must_use]
pub fn parse_tmdb(status: StatusCode, body: &[u8]) -> ApiResponse {
    let code = i64::from(status.as_u16());
    let Ok(data) = serde_json::from_slice::<Value>(body) else {
        return ApiResponse::failure(
            code,
            format!("tmdb returned an unreadable reply (HTTP {status})"),
            Value::Null,
        );
    };
    if status != StatusCode::OK {
        let message = data
            .get("status_message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return ApiResponse::failure(code, message, data);
    }
    let no_results = data
        .get("results")
        .and_then(Value::as_array)
        .is_some_and(Vec::is_empty);
    if no_results {
        ApiResponse::failure(code, NO_RESULTS, data)
    } else {
        ApiResponse::success(code, data)
    }
}

/// Series details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TvInfo {
    /// TMDB identifier.
    pub id: u64,
    /// Localised name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Name in the original language.
    #[serde(deserialize_with = "null_as_default")]
    pub original_name: String,
    /// First air date (`YYYY-MM-DD`).
    #[serde(deserialize_with = "null_as_default")]
    pub first_air_date: String,
    /// Original language code.
    #[serde(deserialize_with = "null_as_default")]
    pub original_language: String,
    /// Origin country codes.
    #[serde(deserialize_with = "null_as_default")]
    pub origin_country: Vec<String>,
    /// Average vote.
    #[serde(deserialize_with = "null_as_default")]
    pub vote_average: f64,
    /// Synopsis.
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
    /// Seasons, specials included.
    #[serde(deserialize_with = "null_as_default")]
    pub seasons: Vec<SeasonSummary>,
}

impl TvInfo {
    /// Template variables for this series at `season`.
    #[must_use]
    pub fn variables(&self, season: &SeasonInfo) -> TvVariables {
        TvVariables {
            name: self.name.clone(),
            original_name: self.original_name.clone(),
            year: year_of(&self.first_air_date),
            first_air_date: self.first_air_date.clone(),
            language: self.original_language.clone(),
            region: self.origin_country.first().cloned().unwrap_or_default(),
            rating: self.vote_average,
            season: season.season_number,
            season_year: year_of(&season.air_date),
            tmdb_id: self.id,
        }
    }
}

/// Season entry of a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeasonSummary {
    /// Season number; `0` holds specials.
    #[serde(deserialize_with = "null_as_default")]
    pub season_number: u32,
    /// Season name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// First air date of the season.
    #[serde(deserialize_with = "null_as_default")]
    pub air_date: String,
    /// Number of episodes.
    #[serde(deserialize_with = "null_as_default")]
    pub episode_count: u32,
}

/// Season details with its episodes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeasonInfo {
    /// Season number.
    #[serde(deserialize_with = "null_as_default")]
    pub season_number: u32,
    /// Season name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// First air date of the season.
    #[serde(deserialize_with = "null_as_default")]
    pub air_date: String,
    /// Episodes in broadcast order.
    #[serde(deserialize_with = "null_as_default")]
    pub episodes: Vec<EpisodeInfo>,
}

/// One episode.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EpisodeInfo {
    /// Episode number within the season.
    #[serde(deserialize_with = "null_as_default")]
    pub episode_number: u32,
    /// Episode title.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Air date.
    #[serde(deserialize_with = "null_as_default")]
    pub air_date: String,
    /// Average vote.
    #[serde(deserialize_with = "null_as_default")]
    pub vote_average: f64,
}

impl EpisodeInfo {
    /// Template variables for this episode.
    #[must_use]
    pub fn variables(&self) -> EpisodeVariables {
        EpisodeVariables {
            episode: self.episode_number,
            air_date: self.air_date.clone(),
            episode_rating: self.vote_average,
            title: self.name.clone(),
        }
    }
}

/// Film details.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MovieInfo {
    /// TMDB identifier.
    pub id: u64,
    /// Localised title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Title in the original language.
    #[serde(deserialize_with = "null_as_default")]
    pub original_title: String,
    /// Release date (`YYYY-MM-DD`).
    #[serde(deserialize_with = "null_as_default")]
    pub release_date: String,
    /// Original language code.
    #[serde(deserialize_with = "null_as_default")]
    pub original_language: String,
    /// Origin country codes.
    #[serde(deserialize_with = "null_as_default")]
    pub origin_country: Vec<String>,
    /// Average vote.
    #[serde(deserialize_with = "null_as_default")]
    pub vote_average: f64,
    /// Synopsis.
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
}

impl MovieInfo {
    /// Template variables for this film.
    #[must_use]
    pub fn variables(&self) -> MovieVariables {
        MovieVariables {
            name: self.title.clone(),
            original_name: self.original_title.clone(),
            year: year_of(&self.release_date),
            release_date: self.release_date.clone(),
            language: self.original_language.clone(),
            region: self.origin_country.first().cloned().unwrap_or_default(),
            rating: self.vote_average,
            tmdb_id: self.id,
        }
    }
}

/// A page of search results.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResults<T> {
    /// Page number, starting at 1.
    #[serde(default)]
    pub page: u32,
    /// Matches on this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Matches across all pages.
    #[serde(default)]
    pub total_results: u64,
}

/// Series search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TvSearchItem {
    /// TMDB identifier.
    pub id: u64,
    /// Localised name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Name in the original language.
    #[serde(deserialize_with = "null_as_default")]
    pub original_name: String,
    /// First air date.
    #[serde(deserialize_with = "null_as_default")]
    pub first_air_date: String,
    /// Synopsis.
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
}

/// Film search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MovieSearchItem {
    /// TMDB identifier.
    pub id: u64,
    /// Localised title.
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    /// Title in the original language.
    #[serde(deserialize_with = "null_as_default")]
    pub original_title: String,
    /// Release date.
    #[serde(deserialize_with = "null_as_default")]
    pub release_date: String,
    /// Synopsis.
    #[serde(deserialize_with = "null_as_default")]
    pub overview: String,
}

fn year_of(date: &str) -> String {
    date.get(..4).unwrap_or_default().to_string()
}
