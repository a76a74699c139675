use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
}

/// Media type of a tracked item. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Series,
    Anime,
    Music,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Series => "series",
            MediaType::Anime => "anime",
            MediaType::Music => "music",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(MediaType::Movie),
            "series" => Some(MediaType::Series),
            "anime" => Some(MediaType::Anime),
            "music" => Some(MediaType::Music),
            _ => None,
        }
    }
}

/// Lifecycle stage of an item, derived primarily from progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Pending,
    Watching,
    Completed,
    Dropped,
}

impl WatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Pending => "pending",
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::Dropped => "dropped",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(WatchStatus::Pending),
            "watching" => Some(WatchStatus::Watching),
            "completed" => Some(WatchStatus::Completed),
            "dropped" => Some(WatchStatus::Dropped),
            _ => None,
        }
    }
}

/// Consumption counters: episodes watched, tracks completed, etc.
/// Invariant (enforced at the service layer): 0 <= current <= total, total >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub current: i64,
    #[serde(default = "default_progress_total")]
    pub total: i64,
}

fn default_progress_total() -> i64 {
    1
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            current: 0,
            total: 1,
        }
    }
}

/// A single track of a music album item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub lyrics: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Type-specific fields of an item. One variant per media type, each
/// carrying only the fields meaningful for that type; serialized inline
/// into the item under a "type" tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    Movie,
    Series {
        #[serde(default = "default_season")]
        season: i64,
    },
    Anime {
        #[serde(default = "default_season")]
        season: i64,
    },
    Music {
        #[serde(default)]
        artist: Option<String>,
        #[serde(default)]
        album: Option<String>,
        #[serde(default)]
        tracks: Vec<Track>,
    },
}

fn default_season() -> i64 {
    1
}

impl ItemKind {
    pub fn media_type(&self) -> MediaType {
        match self {
            ItemKind::Movie => MediaType::Movie,
            ItemKind::Series { .. } => MediaType::Series,
            ItemKind::Anime { .. } => MediaType::Anime,
            ItemKind::Music { .. } => MediaType::Music,
        }
    }
}

/// A tracked media unit, scoped to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub status: WatchStatus,
    pub progress: Progress,
    pub rating: f64,
    #[serde(flatten)]
    pub kind: ItemKind,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Normalized catalog search result, shared by all providers.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub external_id: i64,
    pub title: String,
    pub poster: Option<String>,
    pub year: Option<String>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub rating: f64,
    pub artist: Option<String>,
    pub overview: Option<String>,
}
