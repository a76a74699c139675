// lyrics.ovh client - free lyrics lookup, no API key

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const LYRICS_API_BASE: &str = "https://api.lyrics.ovh/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct LyricsClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct LyricsResponse {
    lyrics: Option<String>,
}

impl LyricsClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Look up lyrics for a song. Unknown songs are a plain miss, not an
    /// error - the provider 404s for most of its catalog.
    pub async fn fetch(&self, artist: &str, title: &str) -> Result<Option<String>> {
        let url = format!(
            "{}/{}/{}",
            LYRICS_API_BASE,
            urlencoding::encode(artist),
            urlencoding::encode(title)
        );

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to reach lyrics provider")?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let body: LyricsResponse = response
            .json()
            .await
            .context("Failed to parse lyrics response")?;

        Ok(body.lyrics.filter(|lyrics| !lyrics.is_empty()))
    }
}
