use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::{require_user, ApiError};
use crate::models::{MediaType, Suggestion};
use crate::services::tmdb::SeasonSummary;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search))
        .route("/season/:show_id/:season_number", get(season))
        .route("/album/:album_id", get(album_tracks))
        .route("/lyrics", get(lyrics))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    query: Option<String>,
    #[serde(rename = "type")]
    media_type: Option<String>,
}

/// Search the external catalogs. Provider failures degrade to an empty
/// list - suggestions are enrichment, not core data.
async fn search(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    require_user(&state, &headers).await?;

    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("query is required".to_string()))?;

    let media_type = match params.media_type.as_deref() {
        None => None,
        Some(raw) => Some(
            MediaType::parse(raw)
                .ok_or_else(|| ApiError::Validation(format!("unknown media type '{raw}'")))?,
        ),
    };

    let result = match media_type {
        Some(MediaType::Music) => state.itunes.search_albums(query).await,
        _ => match &state.tmdb {
            Some(tmdb) => tmdb.search(query).await,
            None => {
                tracing::debug!("TMDB search skipped: no read token configured");
                Ok(Vec::new())
            }
        },
    };

    let suggestions = result.unwrap_or_else(|e| {
        tracing::warn!("Catalog search failed: {e:#}");
        Vec::new()
    });

    Ok(Json(suggestions))
}

async fn season(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((show_id, season_number)): Path<(i64, i64)>,
) -> Result<Json<SeasonSummary>, ApiError> {
    require_user(&state, &headers).await?;

    let not_found = || ApiError::NotFound("season not found".to_string());

    let tmdb = state.tmdb.as_ref().ok_or_else(not_found)?;

    let summary = tmdb
        .season(show_id, season_number)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Season lookup failed: {e:#}");
            None
        })
        .ok_or_else(not_found)?;

    Ok(Json(summary))
}

async fn album_tracks(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(album_id): Path<i64>,
) -> Result<Json<Vec<crate::models::Track>>, ApiError> {
    require_user(&state, &headers).await?;

    let tracks = state
        .itunes
        .album_tracks(album_id)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Album lookup failed: {e:#}");
            Vec::new()
        });

    Ok(Json(tracks))
}

#[derive(Debug, Deserialize)]
struct LyricsParams {
    artist: Option<String>,
    title: Option<String>,
}

async fn lyrics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<LyricsParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_user(&state, &headers).await?;

    let (artist, title) = match (params.artist.as_deref(), params.title.as_deref()) {
        (Some(artist), Some(title)) if !artist.is_empty() && !title.is_empty() => (artist, title),
        _ => {
            return Err(ApiError::Validation(
                "artist and title are required".to_string(),
            ))
        }
    };

    let lyrics = state
        .lyrics
        .fetch(artist, title)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Lyrics lookup failed: {e:#}");
            None
        });

    Ok(Json(json!({ "lyrics": lyrics.unwrap_or_default() })))
}
