// TMDB catalog provider
// API Documentation: https://developer.themoviedb.org/reference/intro/getting-started

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{MediaType, Suggestion};

const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// TMDB API client, authenticated with a v4 read access token
pub struct TmdbClient {
    client: Client,
    read_token: String,
}

#[derive(Debug, Deserialize)]
struct MultiSearchResults {
    results: Vec<MultiSearchResult>,
}

/// One entry of a /search/multi response. Movies carry `title` and
/// `release_date`, TV shows `name` and `first_air_date`; people are
/// filtered out entirely.
#[derive(Debug, Deserialize)]
struct MultiSearchResult {
    id: i64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    overview: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SeasonDetails {
    name: String,
    season_number: i64,
    air_date: Option<String>,
    episodes: Option<Vec<EpisodeStub>>,
}

#[derive(Debug, Deserialize)]
struct EpisodeStub {
    #[allow(dead_code)]
    episode_number: i64,
}

/// Season metadata reduced to what progress tracking needs.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SeasonSummary {
    pub name: String,
    pub season_number: i64,
    pub episode_count: i64,
    pub air_date: Option<String>,
}

impl TmdbClient {
    pub fn new(read_token: String) -> Self {
        Self {
            client: Client::new(),
            read_token,
        }
    }

    /// Search movies and TV shows, normalized to suggestions.
    pub async fn search(&self, query: &str) -> Result<Vec<Suggestion>> {
        let url = format!(
            "{}/search/multi?query={}&language=es-ES&include_adult=true",
            TMDB_API_BASE,
            urlencoding::encode(query)
        );

        let response: MultiSearchResults = self
            .client
            .get(&url)
            .bearer_auth(&self.read_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to search TMDB")?
            .error_for_status()
            .context("TMDB search returned an error status")?
            .json()
            .await
            .context("Failed to parse TMDB search response")?;

        Ok(response
            .results
            .into_iter()
            .filter_map(suggestion_from)
            .collect())
    }

    /// Fetch a season of a show. `Ok(None)` when TMDB does not know it.
    pub async fn season(&self, show_id: i64, season_number: i64) -> Result<Option<SeasonSummary>> {
        let url = format!("{}/tv/{}/season/{}", TMDB_API_BASE, show_id, season_number);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.read_token)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to fetch TMDB season details")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let details: SeasonDetails = response
            .error_for_status()
            .context("TMDB season lookup returned an error status")?
            .json()
            .await
            .context("Failed to parse TMDB season response")?;

        Ok(Some(SeasonSummary {
            name: details.name,
            season_number: details.season_number,
            episode_count: details.episodes.map(|e| e.len() as i64).unwrap_or(0),
            air_date: details.air_date,
        }))
    }
}

fn suggestion_from(result: MultiSearchResult) -> Option<Suggestion> {
    let media_type = match result.media_type.as_deref() {
        Some("movie") => MediaType::Movie,
        Some("tv") => MediaType::Series,
        _ => return None,
    };

    let title = result.title.or(result.name)?;
    let year = result
        .release_date
        .or(result.first_air_date)
        .and_then(|d| d.get(0..4).map(str::to_string))
        .filter(|y| !y.is_empty());

    Some(Suggestion {
        external_id: result.id,
        title,
        poster: result
            .poster_path
            .map(|p| format!("{}{}", TMDB_IMAGE_BASE, p)),
        year,
        media_type,
        // TMDB votes are 0-10; the tracker rates 0-5
        rating: result.vote_average.map(|v| (v / 2.0).round()).unwrap_or(0.0),
        artist: None,
        overview: result.overview,
    })
}
