// iTunes Search API client - music album search and track lookup
// API Documentation: https://developer.apple.com/library/archive/documentation/AudioVideo/Conceptual/iTuneSearchAPI/
// No API key required

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::models::{MediaType, Suggestion, Track};

const ITUNES_API_BASE: &str = "https://itunes.apple.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ItunesClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ItunesResults {
    results: Vec<ItunesEntry>,
}

/// An iTunes result row. Album searches and song lookups share one
/// response shape; `wrapper_type` tells them apart.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItunesEntry {
    wrapper_type: Option<String>,
    collection_id: Option<i64>,
    collection_name: Option<String>,
    artist_name: Option<String>,
    artwork_url100: Option<String>,
    release_date: Option<String>,
    primary_genre_name: Option<String>,
    track_count: Option<i64>,
    track_name: Option<String>,
    track_time_millis: Option<i64>,
}

impl ItunesClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Search albums (albums rather than songs, so results carry artwork).
    pub async fn search_albums(&self, query: &str) -> Result<Vec<Suggestion>> {
        let url = format!(
            "{}/search?term={}&media=music&entity=album&limit=10",
            ITUNES_API_BASE,
            urlencoding::encode(query)
        );

        let response: ItunesResults = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to search iTunes")?
            .error_for_status()
            .context("iTunes search returned an error status")?
            .json()
            .await
            .context("Failed to parse iTunes search response")?;

        Ok(response
            .results
            .into_iter()
            .filter_map(album_suggestion)
            .collect())
    }

    /// Song list of an album. The lookup returns the album itself as the
    /// first row; only `wrapperType == "track"` rows are songs.
    pub async fn album_tracks(&self, collection_id: i64) -> Result<Vec<Track>> {
        let url = format!(
            "{}/lookup?id={}&entity=song",
            ITUNES_API_BASE, collection_id
        );

        let response: ItunesResults = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to look up iTunes album")?
            .error_for_status()
            .context("iTunes lookup returned an error status")?
            .json()
            .await
            .context("Failed to parse iTunes lookup response")?;

        Ok(response
            .results
            .into_iter()
            .filter(|entry| entry.wrapper_type.as_deref() == Some("track"))
            .filter_map(|entry| {
                Some(Track {
                    title: entry.track_name?,
                    duration: Some(format_duration(entry.track_time_millis)),
                    lyrics: None,
                    translation: None,
                    completed: false,
                })
            })
            .collect())
    }
}

fn album_suggestion(entry: ItunesEntry) -> Option<Suggestion> {
    let external_id = entry.collection_id?;
    let title = entry.collection_name?;

    let overview = match (entry.primary_genre_name, entry.track_count) {
        (Some(genre), Some(count)) => Some(format!("{} - {} tracks", genre, count)),
        (Some(genre), None) => Some(genre),
        _ => None,
    };

    Some(Suggestion {
        external_id,
        title,
        // iTunes serves a small thumbnail; the same path at 600x600 works
        poster: entry
            .artwork_url100
            .map(|u| u.replace("100x100bb", "600x600bb")),
        year: entry
            .release_date
            .and_then(|d| d.get(0..4).map(str::to_string)),
        media_type: MediaType::Music,
        rating: 0.0,
        artist: entry.artist_name,
        overview,
    })
}

/// Track length in mm:ss, "0:00" when iTunes reports none.
fn format_duration(millis: Option<i64>) -> String {
    match millis {
        Some(ms) if ms > 0 => {
            let secs = (ms + 500) / 1000;
            format!("{}:{:02}", secs / 60, secs % 60)
        }
        _ => "0:00".to_string(),
    }
}
