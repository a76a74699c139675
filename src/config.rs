// Configuration module for torii
// Handles XDG-compliant directory paths and TOML configuration file

use serde::Deserialize;
use std::path::PathBuf;

const APP_NAME: &str = "torii";
const CONFIG_FILENAME: &str = "config.toml";

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Server configuration
    pub server: ServerConfig,

    /// Directory paths (overrides XDG defaults)
    pub paths: PathsConfig,

    /// Catalog provider configuration
    pub catalog: CatalogConfig,

    /// Tracker behavior knobs
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server port (default: 5000)
    pub port: u16,

    /// Bind address (default: 0.0.0.0)
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_address: "0.0.0.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Override data directory (database location)
    pub data_dir: Option<PathBuf>,

    /// Override config directory
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// TMDB v4 read access token (optional, enables movie/TV search)
    pub tmdb_read_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Days without an update before pending/watching items are shown as
    /// dropped (default: 30)
    pub inactivity_days: i64,

    /// Days a login session stays valid (default: 30)
    pub session_ttl_days: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            inactivity_days: 30,
            session_ttl_days: 30,
        }
    }
}

/// Application paths following XDG Base Directory Specification on Unix
/// On other platforms, falls back to platform-specific locations
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for configuration files (config.toml)
    /// XDG: $XDG_CONFIG_HOME/torii or ~/.config/torii
    pub config_dir: PathBuf,

    /// Directory for persistent data (database)
    /// XDG: $XDG_DATA_HOME/torii or ~/.local/share/torii
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Create application paths using XDG directories (or fallbacks)
    ///
    /// Priority order:
    /// 1. Environment variables (TORII_CONFIG_DIR, TORII_DATA_DIR)
    /// 2. Config file overrides
    /// 3. XDG/platform directories
    /// 4. Current directory fallback
    pub fn new(config_overrides: &PathsConfig) -> Self {
        Self {
            config_dir: Self::resolve_config_dir(&config_overrides.config_dir),
            data_dir: Self::resolve_dir(
                "TORII_DATA_DIR",
                &config_overrides.data_dir,
                dirs::data_dir(),
            ),
        }
    }

    fn resolve_config_dir(config_override: &Option<PathBuf>) -> PathBuf {
        Self::resolve_dir("TORII_CONFIG_DIR", config_override, dirs::config_dir())
    }

    fn resolve_dir(
        env_var: &str,
        config_override: &Option<PathBuf>,
        platform_dir: Option<PathBuf>,
    ) -> PathBuf {
        if let Ok(path) = std::env::var(env_var) {
            return PathBuf::from(path);
        }

        if let Some(path) = config_override {
            return path.clone();
        }

        if let Some(dir) = platform_dir {
            return dir.join(APP_NAME);
        }

        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Get the database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("torii.db")
    }

    /// Get the database URL for SQLite
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database_path().display())
    }

    /// Get the config file path
    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILENAME)
    }

    /// Ensure all directories exist
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.config_dir).await?;
        tokio::fs::create_dir_all(&self.data_dir).await?;
        Ok(())
    }

    /// Log the configured paths
    pub fn log_paths(&self) {
        tracing::info!("Configuration directory: {}", self.config_dir.display());
        tracing::info!("Data directory: {}", self.data_dir.display());
        tracing::debug!("Database path: {}", self.database_path().display());
    }
}

/// Application configuration - combines TOML file with environment overrides
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application paths
    pub paths: AppPaths,

    /// Server port
    pub port: u16,

    /// Bind address
    pub bind_address: String,

    /// TMDB v4 read access token (optional)
    pub tmdb_read_token: Option<String>,

    /// Inactivity threshold for the dropped-at-read-time projection
    pub inactivity_days: i64,

    /// Login session lifetime
    pub session_ttl_days: i64,
}

impl AppConfig {
    /// Load configuration from TOML file and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. TOML config file
    /// 3. Default values
    pub fn load() -> Self {
        let config_dir = Self::find_config_dir();
        let config_file = Self::load_config_file(&config_dir);
        Self::build(config_file)
    }

    /// Find the config directory (for locating config.toml)
    fn find_config_dir() -> PathBuf {
        if let Ok(path) = std::env::var("TORII_CONFIG_DIR") {
            return PathBuf::from(path);
        }

        if let Some(dir) = dirs::config_dir() {
            return dir.join(APP_NAME);
        }

        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Load and parse the TOML config file
    fn load_config_file(config_dir: &std::path::Path) -> ConfigFile {
        let config_path = config_dir.join(CONFIG_FILENAME);

        if !config_path.exists() {
            tracing::debug!(
                "No config file found at {}, using defaults",
                config_path.display()
            );
            return ConfigFile::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse config file {}: {}. Using defaults.",
                        config_path.display(),
                        e
                    );
                    ConfigFile::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {}. Using defaults.",
                    config_path.display(),
                    e
                );
                ConfigFile::default()
            }
        }
    }

    /// Build configuration from config file with environment overrides
    fn build(config_file: ConfigFile) -> Self {
        let paths = AppPaths::new(&config_file.paths);

        // Port: env > config > default
        let port = Self::env_port().unwrap_or(config_file.server.port);

        // Bind address: env > config > default
        let bind_address = std::env::var("TORII_BIND_ADDRESS")
            .unwrap_or_else(|_| config_file.server.bind_address.clone());

        // TMDB read token: env > config
        let tmdb_read_token = std::env::var("TMDB_READ_TOKEN")
            .ok()
            .or(config_file.catalog.tmdb_read_token);

        Self {
            paths,
            port,
            bind_address,
            tmdb_read_token,
            inactivity_days: config_file.tracker.inactivity_days,
            session_ttl_days: config_file.tracker.session_ttl_days,
        }
    }

    fn env_port() -> Option<u16> {
        std::env::var("TORII_PORT").ok().and_then(|p| p.parse().ok())
    }

    /// Get the database URL, with override from DATABASE_URL env var
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| self.paths.database_url())
    }

    /// Log configuration status
    pub fn log_config(&self) {
        self.paths.log_paths();
        tracing::info!("Server listening on {}:{}", self.bind_address, self.port);

        if self.tmdb_read_token.is_some() {
            tracing::info!("Catalog providers: TMDB + iTunes");
        } else {
            tracing::info!("Catalog providers: iTunes only");
            tracing::info!(
                "Hint: Add tmdb_read_token to config.toml or set TMDB_READ_TOKEN env var"
            );
        }

        tracing::debug!(
            "Inactivity threshold: {} days, session TTL: {} days",
            self.inactivity_days,
            self.session_ttl_days
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file() {
        let config = ConfigFile::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert!(config.catalog.tmdb_read_token.is_none());
        assert_eq!(config.tracker.inactivity_days, 30);
        assert_eq!(config.tracker.session_ttl_days, 30);
    }

    #[test]
    fn test_database_url_format() {
        let paths = AppPaths {
            config_dir: PathBuf::from("/tmp/torii"),
            data_dir: PathBuf::from("/tmp/torii"),
        };
        let url = paths.database_url();
        assert!(url.starts_with("sqlite:"));
        assert!(url.ends_with("torii.db?mode=rwc"));
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[server]
port = 9000
bind_address = "127.0.0.1"

[catalog]
tmdb_read_token = "test_token"

[paths]
data_dir = "/custom/data"

[tracker]
inactivity_days = 14
"#;
        let config: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(
            config.catalog.tmdb_read_token,
            Some("test_token".to_string())
        );
        assert_eq!(config.paths.data_dir, Some(PathBuf::from("/custom/data")));
        assert_eq!(config.tracker.inactivity_days, 14);
        assert_eq!(config.tracker.session_ttl_days, 30);
    }

    #[test]
    fn test_partial_config_toml() {
        // Partial configs work (only specify what you need)
        let toml_str = r#"
[tracker]
session_ttl_days = 7
"#;
        let config: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 5000); // default
        assert_eq!(config.tracker.session_ttl_days, 7); // from file
    }
}
