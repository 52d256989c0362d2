//! Canonical media identities rendered from metadata.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::sanitize::sanitize_name;
use crate::template::{FormatVariables, Template};

/// Fields available to movie templates.
pub const MOVIE_FIELDS: &[&str] = &[
    "name",
    "original_name",
    "year",
    "release_date",
    "language",
    "region",
    "rating",
    "tmdb_id",
];

/// Fields available to series and series-folder templates.
pub const TV_FIELDS: &[&str] = &[
    "name",
    "original_name",
    "year",
    "first_air_date",
    "language",
    "region",
    "rating",
    "season",
    "season_year",
    "tmdb_id",
];

/// Fields only available to per-episode templates.
pub const EPISODE_FIELDS: &[&str] = &["episode", "air_date", "episode_rating", "title"];

/// Kind of media a title belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A single film.
    Movie,
    /// An episodic series.
    Tv,
}

impl MediaKind {
    /// Lowercase label used in logs and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Variables describing a film.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieVariables {
    /// Localised title.
    pub name: String,
    /// Title in the original language.
    pub original_name: String,
    /// Release year as text, empty when unknown.
    pub year: String,
    /// Full release date (`YYYY-MM-DD`).
    pub release_date: String,
    /// Original language code.
    pub language: String,
    /// Primary origin country code.
    pub region: String,
    /// Average vote.
    pub rating: f64,
    /// Metadata provider identifier.
    pub tmdb_id: u64,
}

/// Variables describing a series at a given season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TvVariables {
    /// Localised series name.
    pub name: String,
    /// Series name in the original language.
    pub original_name: String,
    /// First-air year as text, empty when unknown.
    pub year: String,
    /// Full first-air date.
    pub first_air_date: String,
    /// Original language code.
    pub language: String,
    /// Primary origin country code.
    pub region: String,
    /// Average vote for the series.
    pub rating: f64,
    /// Season number.
    pub season: u32,
    /// Year the season started airing, empty when unknown.
    pub season_year: String,
    /// Metadata provider identifier.
    pub tmdb_id: u64,
}

/// Variables describing one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeVariables {
    /// Episode number within its season.
    pub episode: u32,
    /// Air date of the episode.
    pub air_date: String,
    /// Average vote for the episode.
    pub episode_rating: f64,
    /// Episode title.
    pub title: String,
}

/// Variable bag for one canonical title, tagged by media kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaVariables {
    /// Film variables.
    Movie(MovieVariables),
    /// Series variables, with episode variables for per-episode titles.
    Tv {
        /// Series-level variables.
        show: TvVariables,
        /// Episode-level variables; `None` for series-folder titles.
        episode: Option<EpisodeVariables>,
    },
}

impl MediaVariables {
    /// Media kind these variables describe.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        match self {
            Self::Movie(_) => MediaKind::Movie,
            Self::Tv { .. } => MediaKind::Tv,
        }
    }

    /// Flatten into template variables. Only the set matching the kind is exposed.
    #[must_use]
    pub fn to_format_variables(&self) -> FormatVariables {
        match self {
            Self::Movie(movie) => FormatVariables::new()
                .with("name", movie.name.as_str())
                .with("original_name", movie.original_name.as_str())
                .with("year", movie.year.as_str())
                .with("release_date", movie.release_date.as_str())
                .with("language", movie.language.as_str())
                .with("region", movie.region.as_str())
                .with("rating", movie.rating)
                .with("tmdb_id", id_value(movie.tmdb_id)),
            Self::Tv { show, episode } => {
                let mut variables = FormatVariables::new()
                    .with("name", show.name.as_str())
                    .with("original_name", show.original_name.as_str())
                    .with("year", show.year.as_str())
                    .with("first_air_date", show.first_air_date.as_str())
                    .with("language", show.language.as_str())
                    .with("region", show.region.as_str())
                    .with("rating", show.rating)
                    .with("season", show.season)
                    .with("season_year", show.season_year.as_str())
                    .with("tmdb_id", id_value(show.tmdb_id));
                if let Some(episode) = episode {
                    variables.insert("episode", episode.episode);
                    variables.insert("air_date", episode.air_date.as_str());
                    variables.insert("episode_rating", episode.episode_rating);
                    variables.insert("title", episode.title.as_str());
                }
                variables
            }
        }
    }
}

fn id_value(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

/// One canonical target identity and its rendered, sanitised name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaMeta {
    template: String,
    variables: MediaVariables,
    fullname: String,
}

impl MediaMeta {
    /// Render `template` against `variables` and sanitise the result.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::MissingField`] when the template references a
    /// field the variables do not carry, such as `{episode}` on a series folder.
    pub fn new(template: &Template, variables: MediaVariables) -> CoreResult<Self> {
        let rendered = template.render(&variables.to_format_variables())?;
        Ok(Self {
            template: template.as_str().to_string(),
            variables,
            fullname: sanitize_name(&rendered),
        })
    }

    /// Media kind of this title.
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.variables.kind()
    }

    /// Template text the name was rendered from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Variables the name was rendered from.
    #[must_use]
    pub const fn variables(&self) -> &MediaVariables {
        &self.variables
    }

    /// Rendered and sanitised canonical name, without extension.
    #[must_use]
    pub fn fullname(&self) -> &str {
        &self.fullname
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    fn show() -> TvVariables {
        TvVariables {
            name: "Show: Origins".to_string(),
            year: "2020".to_string(),
            season: 2,
            tmdb_id: 42,
            ..TvVariables::default()
        }
    }

    #[test]
    fn renders_and_sanitises_episode_titles() -> CoreResult<()> {
        let template = Template::parse("{name}-S{season:0>2}E{episode:0>2}.{title}")?;
        let meta = MediaMeta::new(
            &template,
            MediaVariables::Tv {
                show: show(),
                episode: Some(EpisodeVariables {
                    episode: 3,
                    title: "Who?".to_string(),
                    ..EpisodeVariables::default()
                }),
            },
        )?;
        assert_eq!(meta.fullname(), "Show_ Origins-S02E03.Who_");
        assert_eq!(meta.kind(), MediaKind::Tv);
        Ok(())
    }

    #[test]
    fn folder_titles_cannot_reach_episode_fields() -> CoreResult<()> {
        let template = Template::parse("{name} E{episode}")?;
        let result = MediaMeta::new(
            &template,
            MediaVariables::Tv {
                show: show(),
                episode: None,
            },
        );
        assert!(matches!(result, Err(CoreError::MissingField { key, .. }) if key == "episode"));
        Ok(())
    }

    #[test]
    fn movie_variables_do_not_expose_series_fields() -> CoreResult<()> {
        let template = Template::parse("{name} S{season}")?;
        let result = MediaMeta::new(
            &template,
            MediaVariables::Movie(MovieVariables {
                name: "Film".to_string(),
                ..MovieVariables::default()
            }),
        );
        assert!(matches!(result, Err(CoreError::MissingField { key, .. }) if key == "season"));
        Ok(())
    }

    #[test]
    fn rendering_is_deterministic() -> CoreResult<()> {
        let template = Template::parse("{name} ({year}) [{tmdb_id}]")?;
        let variables = MediaVariables::Tv {
            show: show(),
            episode: None,
        };
        let first = MediaMeta::new(&template, variables.clone())?;
        let second = MediaMeta::new(&template, variables)?;
        assert_eq!(first.fullname(), second.fullname());
        assert_eq!(first.fullname(), "Show_ Origins (2020) [42]");
        Ok(())
    }

    #[test]
    fn field_lists_match_exposed_variables() {
        let movie = MediaVariables::Movie(MovieVariables::default()).to_format_variables();
        assert_eq!(movie.keys().count(), MOVIE_FIELDS.len());
        assert!(MOVIE_FIELDS.iter().all(|field| movie.get(field).is_some()));

        let episode = MediaVariables::Tv {
            show: TvVariables::default(),
            episode: Some(EpisodeVariables::default()),
        }
        .to_format_variables();
        assert_eq!(episode.keys().count(), TV_FIELDS.len() + EPISODE_FIELDS.len());
        assert!(
            TV_FIELDS
                .iter()
                .chain(EPISODE_FIELDS)
                .all(|field| episode.get(field).is_some())
        );
    }
}
