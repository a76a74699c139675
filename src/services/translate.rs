// MyMemory translation client - free anonymous tier
// API Documentation: https://mymemory.translated.net/doc/spec.php

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const TRANSLATE_API: &str = "https://api.mymemory.translated.net/get";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TranslateClient {
    client: Client,
    langpair: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    translated_text: Option<String>,
}

impl TranslateClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            langpair: "en|es".to_string(),
        }
    }

    /// Translate a block of text line by line - the provider handles short
    /// phrases best and the query travels in a GET parameter. Blank lines
    /// are preserved, and a line that fails to translate passes through
    /// unchanged.
    pub async fn translate(&self, text: &str) -> String {
        let mut translated = Vec::new();

        for line in text.lines() {
            if line.trim().is_empty() {
                translated.push(String::new());
                continue;
            }

            match self.translate_line(line).await {
                Ok(result) => translated.push(result),
                Err(e) => {
                    tracing::debug!("Keeping untranslated line: {e:#}");
                    translated.push(line.to_string());
                }
            }
        }

        translated.join("\n")
    }

    async fn translate_line(&self, line: &str) -> Result<String> {
        let url = format!(
            "{}?q={}&langpair={}",
            TRANSLATE_API,
            urlencoding::encode(line),
            urlencoding::encode(&self.langpair)
        );

        let body: TranslateResponse = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .context("Failed to reach translation provider")?
            .error_for_status()
            .context("Translation provider returned an error status")?
            .json()
            .await
            .context("Failed to parse translation response")?;

        body.response_data
            .and_then(|data| data.translated_text)
            .filter(|text| !text.is_empty())
            .context("Translation response was empty")
    }
}
