use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Item, ItemKind, MediaType, Progress, Track, WatchStatus};

#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("{0}")]
    Validation(String),
    #[error("item not found")]
    NotFound,
    #[error("corrupt item row: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Payload for creating an item. The media type arrives as a "type" tag
/// alongside the type-specific fields.
#[derive(Debug, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default)]
    pub status: Option<WatchStatus>,
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

/// Partial update. The item's type is fixed at creation; fields foreign to
/// that type are rejected rather than silently dropped.
#[derive(Debug, Default, Deserialize)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub status: Option<WatchStatus>,
    pub progress: Option<Progress>,
    pub rating: Option<f64>,
    pub season: Option<i64>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub tracks: Option<Vec<Track>>,
}

// === Pure rules ===

pub fn validate_progress(progress: &Progress) -> Result<(), ItemError> {
    if progress.total <= 0 {
        return Err(ItemError::Validation(
            "progress.total must be at least 1".to_string(),
        ));
    }
    if progress.current < 0 {
        return Err(ItemError::Validation(
            "progress.current cannot be negative".to_string(),
        ));
    }
    if progress.current > progress.total {
        return Err(ItemError::Validation(
            "progress.current cannot exceed progress.total".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_rating(rating: f64) -> Result<(), ItemError> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(ItemError::Validation(
            "rating must be between 0 and 5".to_string(),
        ));
    }
    if (rating * 2.0).fract() != 0.0 {
        return Err(ItemError::Validation(
            "rating must be in steps of 0.5".to_string(),
        ));
    }
    Ok(())
}

fn validate_season(season: i64) -> Result<(), ItemError> {
    if season < 1 {
        return Err(ItemError::Validation(
            "season must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Map progress and the caller's requested status to the stored status.
///
/// Full progress always wins; an explicit `dropped` survives partial
/// progress (manual archive); otherwise status follows the counters, so a
/// claimed `completed` with unfinished progress is downgraded.
pub fn derive_status(progress: Progress, requested: WatchStatus) -> WatchStatus {
    if progress.current == progress.total && progress.total > 0 {
        WatchStatus::Completed
    } else if requested == WatchStatus::Dropped {
        WatchStatus::Dropped
    } else if progress.current > 0 {
        WatchStatus::Watching
    } else {
        WatchStatus::Pending
    }
}

/// Progress of a music item. The track list is the source of truth:
/// total is the track count (1 when empty), current the completed count.
pub fn music_progress(tracks: &[Track]) -> Progress {
    Progress {
        current: tracks.iter().filter(|t| t.completed).count() as i64,
        total: tracks.len().max(1) as i64,
    }
}

/// Whether an item should be presented as dropped due to inactivity.
/// Only pending/watching items are reclassified; the stored record is
/// never mutated.
pub fn is_inactive(
    status: WatchStatus,
    updated_at: &str,
    now: DateTime<Utc>,
    threshold_days: i64,
) -> bool {
    if !matches!(status, WatchStatus::Pending | WatchStatus::Watching) {
        return false;
    }
    match DateTime::parse_from_rfc3339(updated_at) {
        Ok(ts) => now.signed_duration_since(ts.with_timezone(&Utc)) > Duration::days(threshold_days),
        Err(_) => false,
    }
}

// === Persistence rows ===

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: String,
    owner_id: String,
    item_type: String,
    title: String,
    status: String,
    progress_current: i64,
    progress_total: i64,
    rating: f64,
    season: Option<i64>,
    artist: Option<String>,
    album: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(Debug, sqlx::FromRow)]
struct TrackRow {
    item_id: String,
    title: String,
    duration: Option<String>,
    lyrics: Option<String>,
    translation: Option<String>,
    completed: bool,
}

impl TrackRow {
    fn into_track(self) -> Track {
        Track {
            title: self.title,
            duration: self.duration,
            lyrics: self.lyrics,
            translation: self.translation,
            completed: self.completed,
        }
    }
}

impl ItemRow {
    fn into_item(self, tracks: Vec<Track>) -> Result<Item, ItemError> {
        let media_type = MediaType::parse(&self.item_type)
            .ok_or_else(|| ItemError::Corrupt(format!("unknown item_type '{}'", self.item_type)))?;
        let status = WatchStatus::parse(&self.status)
            .ok_or_else(|| ItemError::Corrupt(format!("unknown status '{}'", self.status)))?;

        let kind = match media_type {
            MediaType::Movie => ItemKind::Movie,
            MediaType::Series => ItemKind::Series {
                season: self.season.unwrap_or(1),
            },
            MediaType::Anime => ItemKind::Anime {
                season: self.season.unwrap_or(1),
            },
            MediaType::Music => ItemKind::Music {
                artist: self.artist,
                album: self.album,
                tracks,
            },
        };

        Ok(Item {
            id: self.id,
            title: self.title,
            status,
            progress: Progress {
                current: self.progress_current,
                total: self.progress_total,
            },
            rating: self.rating,
            kind,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn kind_columns(kind: &ItemKind) -> (Option<i64>, Option<String>, Option<String>) {
    match kind {
        ItemKind::Movie => (None, None, None),
        ItemKind::Series { season } | ItemKind::Anime { season } => (Some(*season), None, None),
        ItemKind::Music { artist, album, .. } => (None, artist.clone(), album.clone()),
    }
}

async fn insert_tracks(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    item_id: &str,
    tracks: &[Track],
) -> Result<(), sqlx::Error> {
    for (position, track) in tracks.iter().enumerate() {
        sqlx::query(
            "INSERT INTO tracks (item_id, position, title, duration, lyrics, translation, completed) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item_id)
        .bind(position as i64)
        .bind(&track.title)
        .bind(&track.duration)
        .bind(&track.lyrics)
        .bind(&track.translation)
        .bind(track.completed)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn fetch_tracks(pool: &SqlitePool, item_id: &str) -> Result<Vec<Track>, sqlx::Error> {
    let rows: Vec<TrackRow> =
        sqlx::query_as("SELECT * FROM tracks WHERE item_id = ? ORDER BY position")
            .bind(item_id)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(TrackRow::into_track).collect())
}

// === CRUD, scoped per owner ===

pub async fn create_item(
    pool: &SqlitePool,
    owner_id: &str,
    payload: NewItem,
) -> Result<Item, ItemError> {
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(ItemError::Validation("title is required".to_string()));
    }

    let rating = payload.rating.unwrap_or(0.0);
    validate_rating(rating)?;

    let kind = payload.kind;
    if let ItemKind::Series { season } | ItemKind::Anime { season } = &kind {
        validate_season(*season)?;
    }

    let progress = match &kind {
        ItemKind::Music { tracks, .. } => music_progress(tracks),
        _ => payload.progress.unwrap_or_default(),
    };
    validate_progress(&progress)?;

    let status = derive_status(progress, payload.status.unwrap_or(WatchStatus::Pending));

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let (season, artist, album) = kind_columns(&kind);

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO items (id, owner_id, item_type, title, status, progress_current, \
         progress_total, rating, season, artist, album, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(owner_id)
    .bind(kind.media_type().as_str())
    .bind(&title)
    .bind(status.as_str())
    .bind(progress.current)
    .bind(progress.total)
    .bind(rating)
    .bind(season)
    .bind(&artist)
    .bind(&album)
    .bind(&now)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    if let ItemKind::Music { tracks, .. } = &kind {
        insert_tracks(&mut tx, &id, tracks).await?;
    }

    tx.commit().await?;

    Ok(Item {
        id,
        title,
        status,
        progress,
        rating,
        kind,
        owner_id: owner_id.to_string(),
        created_at: now.clone(),
        updated_at: now,
    })
}

/// All items owned by the caller, newest first, with the inactivity
/// reclassification applied to the returned view only.
pub async fn list_items(
    pool: &SqlitePool,
    owner_id: &str,
    inactivity_days: i64,
) -> Result<Vec<Item>, ItemError> {
    let rows: Vec<ItemRow> =
        sqlx::query_as("SELECT * FROM items WHERE owner_id = ? ORDER BY created_at DESC")
            .bind(owner_id)
            .fetch_all(pool)
            .await?;

    let track_rows: Vec<TrackRow> = sqlx::query_as(
        "SELECT t.* FROM tracks t JOIN items i ON i.id = t.item_id \
         WHERE i.owner_id = ? ORDER BY t.item_id, t.position",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await?;

    let mut tracks_by_item: HashMap<String, Vec<Track>> = HashMap::new();
    for row in track_rows {
        tracks_by_item
            .entry(row.item_id.clone())
            .or_default()
            .push(row.into_track());
    }

    let now = Utc::now();
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let tracks = tracks_by_item.remove(&row.id).unwrap_or_default();
        let mut item = row.into_item(tracks)?;
        if is_inactive(item.status, &item.updated_at, now, inactivity_days) {
            item.status = WatchStatus::Dropped;
        }
        items.push(item);
    }

    Ok(items)
}

async fn get_item(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<Item, ItemError> {
    let row: ItemRow = sqlx::query_as("SELECT * FROM items WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ItemError::NotFound)?;

    let tracks = if row.item_type == MediaType::Music.as_str() {
        fetch_tracks(pool, id).await?
    } else {
        Vec::new()
    };

    row.into_item(tracks)
}

fn reject_foreign_fields(kind: &ItemKind, patch: &ItemPatch) -> Result<(), ItemError> {
    let media = kind.media_type();
    let seasonal = matches!(media, MediaType::Series | MediaType::Anime);

    let foreign = [
        ("season", patch.season.is_some() && !seasonal),
        ("artist", patch.artist.is_some() && media != MediaType::Music),
        ("album", patch.album.is_some() && media != MediaType::Music),
        ("tracks", patch.tracks.is_some() && media != MediaType::Music),
    ];

    for (field, rejected) in foreign {
        if rejected {
            return Err(ItemError::Validation(format!(
                "{} does not apply to {} items",
                field,
                media.as_str()
            )));
        }
    }
    Ok(())
}

/// Merge a patch into an owned item, re-deriving progress and status.
/// Returns `NotFound` when the id does not exist or belongs to another
/// owner, leaking nothing about which of the two it was.
pub async fn update_item(
    pool: &SqlitePool,
    owner_id: &str,
    id: &str,
    patch: ItemPatch,
) -> Result<Item, ItemError> {
    let mut item = get_item(pool, owner_id, id).await?;

    reject_foreign_fields(&item.kind, &patch)?;

    if let Some(title) = &patch.title {
        let title = title.trim();
        if title.is_empty() {
            return Err(ItemError::Validation("title is required".to_string()));
        }
        item.title = title.to_string();
    }

    if let Some(rating) = patch.rating {
        validate_rating(rating)?;
        item.rating = rating;
    }

    match &mut item.kind {
        ItemKind::Movie => {}
        ItemKind::Series { season } | ItemKind::Anime { season } => {
            if let Some(patched) = patch.season {
                validate_season(patched)?;
                *season = patched;
            }
        }
        ItemKind::Music {
            artist,
            album,
            tracks,
        } => {
            if patch.artist.is_some() {
                *artist = patch.artist.clone();
            }
            if patch.album.is_some() {
                *album = patch.album.clone();
            }
            if let Some(patched) = patch.tracks {
                *tracks = patched;
            }
        }
    }

    // Music progress always comes from the track list; client-sent
    // counters are ignored for music items.
    let progress = match &item.kind {
        ItemKind::Music { tracks, .. } => music_progress(tracks),
        _ => patch.progress.unwrap_or(item.progress),
    };
    validate_progress(&progress)?;

    let requested = patch.status.unwrap_or(item.status);
    item.progress = progress;
    item.status = derive_status(progress, requested);
    item.updated_at = Utc::now().to_rfc3339();

    let (season, artist, album) = kind_columns(&item.kind);

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE items SET title = ?, status = ?, progress_current = ?, progress_total = ?, \
         rating = ?, season = ?, artist = ?, album = ?, updated_at = ? \
         WHERE id = ? AND owner_id = ?",
    )
    .bind(&item.title)
    .bind(item.status.as_str())
    .bind(item.progress.current)
    .bind(item.progress.total)
    .bind(item.rating)
    .bind(season)
    .bind(&artist)
    .bind(&album)
    .bind(&item.updated_at)
    .bind(id)
    .bind(owner_id)
    .execute(&mut *tx)
    .await?;

    if let ItemKind::Music { tracks, .. } = &item.kind {
        sqlx::query("DELETE FROM tracks WHERE item_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_tracks(&mut tx, id, tracks).await?;
    }

    tx.commit().await?;

    Ok(item)
}

/// Delete an owned item. Missing or not-owned ids report `NotFound`.
pub async fn delete_item(pool: &SqlitePool, owner_id: &str, id: &str) -> Result<(), ItemError> {
    let result = sqlx::query("DELETE FROM items WHERE id = ? AND owner_id = ?")
        .bind(id)
        .bind(owner_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ItemError::NotFound);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    fn progress(current: i64, total: i64) -> Progress {
        Progress { current, total }
    }

    fn track(title: &str, completed: bool) -> Track {
        Track {
            title: title.to_string(),
            duration: None,
            lyrics: None,
            translation: None,
            completed,
        }
    }

    #[test]
    fn test_derive_status_follows_progress() {
        for total in 1..=4 {
            for current in 0..=total {
                for requested in [
                    WatchStatus::Pending,
                    WatchStatus::Watching,
                    WatchStatus::Completed,
                ] {
                    let derived = derive_status(progress(current, total), requested);
                    let expected = if current == total {
                        WatchStatus::Completed
                    } else if current > 0 {
                        WatchStatus::Watching
                    } else {
                        WatchStatus::Pending
                    };
                    assert_eq!(derived, expected, "current={current} total={total}");
                }
            }
        }
    }

    #[test]
    fn test_derive_status_explicit_drop_survives() {
        assert_eq!(
            derive_status(progress(2, 10), WatchStatus::Dropped),
            WatchStatus::Dropped
        );
        assert_eq!(
            derive_status(progress(0, 10), WatchStatus::Dropped),
            WatchStatus::Dropped
        );
        // but full progress still wins
        assert_eq!(
            derive_status(progress(10, 10), WatchStatus::Dropped),
            WatchStatus::Completed
        );
    }

    #[test]
    fn test_derive_status_downgrades_false_completion() {
        assert_eq!(
            derive_status(progress(3, 10), WatchStatus::Completed),
            WatchStatus::Watching
        );
        assert_eq!(
            derive_status(progress(0, 10), WatchStatus::Completed),
            WatchStatus::Pending
        );
    }

    #[test]
    fn test_validate_progress_rejections() {
        assert!(validate_progress(&progress(0, 0)).is_err());
        assert!(validate_progress(&progress(0, -3)).is_err());
        assert!(validate_progress(&progress(-1, 5)).is_err());
        assert!(validate_progress(&progress(6, 5)).is_err());
        assert!(validate_progress(&progress(0, 1)).is_ok());
        assert!(validate_progress(&progress(5, 5)).is_ok());
    }

    #[test]
    fn test_validate_rating_half_steps() {
        assert!(validate_rating(0.0).is_ok());
        assert!(validate_rating(3.5).is_ok());
        assert!(validate_rating(5.0).is_ok());
        assert!(validate_rating(5.5).is_err());
        assert!(validate_rating(-0.5).is_err());
        assert!(validate_rating(4.3).is_err());
    }

    #[test]
    fn test_music_progress_from_tracks() {
        let tracks = vec![track("a", true), track("b", true), track("c", false)];
        assert_eq!(music_progress(&tracks), progress(2, 3));
        assert_eq!(music_progress(&[]), progress(0, 1));
    }

    #[test]
    fn test_is_inactive() {
        let now = Utc::now();
        let stale = (now - Duration::days(31)).to_rfc3339();
        let fresh = (now - Duration::days(10)).to_rfc3339();

        assert!(is_inactive(WatchStatus::Watching, &stale, now, 30));
        assert!(is_inactive(WatchStatus::Pending, &stale, now, 30));
        assert!(!is_inactive(WatchStatus::Watching, &fresh, now, 30));
        assert!(!is_inactive(WatchStatus::Completed, &stale, now, 30));
        assert!(!is_inactive(WatchStatus::Dropped, &stale, now, 30));
        assert!(!is_inactive(WatchStatus::Watching, "not-a-date", now, 30));
    }

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::migrate(&pool).await.unwrap();
        pool
    }

    async fn seed_user(pool: &SqlitePool, id: &str) {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at) \
             VALUES (?, ?, ?, 'x', ?)",
        )
        .bind(id)
        .bind(id)
        .bind(format!("{id}@example.com"))
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await
        .unwrap();
    }

    fn new_movie(title: &str, current: i64, total: i64) -> NewItem {
        NewItem {
            title: title.to_string(),
            status: None,
            progress: Some(progress(current, total)),
            rating: None,
            kind: ItemKind::Movie,
        }
    }

    #[tokio::test]
    async fn test_create_then_complete_movie() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;

        let item = create_item(&pool, "u1", new_movie("Dune", 0, 1)).await.unwrap();
        assert_eq!(item.status, WatchStatus::Pending);

        let updated = update_item(
            &pool,
            "u1",
            &item.id,
            ItemPatch {
                progress: Some(progress(1, 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, WatchStatus::Completed);
    }

    #[tokio::test]
    async fn test_music_progress_is_derived_not_trusted() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;

        let item = create_item(
            &pool,
            "u1",
            NewItem {
                title: "In Rainbows".to_string(),
                status: None,
                // Contradictory counters supplied by the client; the
                // track list wins.
                progress: Some(progress(9, 9)),
                rating: None,
                kind: ItemKind::Music {
                    artist: Some("Radiohead".to_string()),
                    album: Some("In Rainbows".to_string()),
                    tracks: vec![track("15 Step", true), track("Bodysnatchers", false)],
                },
            },
        )
        .await
        .unwrap();
        assert_eq!(item.progress, progress(1, 2));
        assert_eq!(item.status, WatchStatus::Watching);

        let updated = update_item(
            &pool,
            "u1",
            &item.id,
            ItemPatch {
                tracks: Some(vec![track("15 Step", true), track("Bodysnatchers", true)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.progress, progress(2, 2));
        assert_eq!(updated.status, WatchStatus::Completed);
    }

    #[tokio::test]
    async fn test_list_is_owner_scoped_and_newest_first() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;
        seed_user(&pool, "u2").await;

        let first = create_item(&pool, "u1", new_movie("First", 0, 1)).await.unwrap();
        // created_at ordering is lexicographic on RFC 3339 text; force
        // distinct timestamps instead of racing the clock
        sqlx::query("UPDATE items SET created_at = '2025-01-01T00:00:00+00:00' WHERE id = ?")
            .bind(&first.id)
            .execute(&pool)
            .await
            .unwrap();
        create_item(&pool, "u1", new_movie("Second", 0, 1)).await.unwrap();
        create_item(&pool, "u2", new_movie("Other owner", 0, 1)).await.unwrap();

        let items = list_items(&pool, "u1", 30).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Second");
        assert_eq!(items[1].title, "First");
    }

    #[tokio::test]
    async fn test_list_projects_inactive_items_as_dropped() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;

        let item = create_item(&pool, "u1", new_movie("Stalled", 1, 5)).await.unwrap();
        let stale = (Utc::now() - Duration::days(45)).to_rfc3339();
        sqlx::query("UPDATE items SET updated_at = ? WHERE id = ?")
            .bind(&stale)
            .bind(&item.id)
            .execute(&pool)
            .await
            .unwrap();

        let items = list_items(&pool, "u1", 30).await.unwrap();
        assert_eq!(items[0].status, WatchStatus::Dropped);

        // the stored record is untouched
        let row: (String,) = sqlx::query_as("SELECT status FROM items WHERE id = ?")
            .bind(&item.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, "watching");
    }

    #[tokio::test]
    async fn test_update_foreign_owner_is_not_found() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;
        seed_user(&pool, "u2").await;

        let item = create_item(&pool, "u1", new_movie("Mine", 0, 1)).await.unwrap();

        let err = update_item(
            &pool,
            "u2",
            &item.id,
            ItemPatch {
                title: Some("Stolen".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ItemError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;

        let err = delete_item(&pool, "u1", "no-such-id").await.unwrap_err();
        assert!(matches!(err, ItemError::NotFound));

        let item = create_item(&pool, "u1", new_movie("Gone", 0, 1)).await.unwrap();
        delete_item(&pool, "u1", &item.id).await.unwrap();
        assert!(list_items(&pool, "u1", 30).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patch_rejects_type_foreign_fields() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;

        let item = create_item(&pool, "u1", new_movie("Heat", 0, 1)).await.unwrap();

        let err = update_item(
            &pool,
            "u1",
            &item.id,
            ItemPatch {
                season: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ItemError::Validation(_)));

        let err = update_item(
            &pool,
            "u1",
            &item.id,
            ItemPatch {
                tracks: Some(vec![track("oops", false)]),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ItemError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_progress() {
        let pool = test_pool().await;
        seed_user(&pool, "u1").await;

        for (current, total) in [(0, 0), (-1, 5), (6, 5)] {
            let err = create_item(&pool, "u1", new_movie("Bad", current, total))
                .await
                .unwrap_err();
            assert!(matches!(err, ItemError::Validation(_)));
        }
    }
}
