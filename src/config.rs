use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub ticketmaster: TicketmasterConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/lmn.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether the ingestion triggers (`/artist`, `/venue`, `/show`) require
    /// the API key of an admin user.
    pub require_operator_auth: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
            require_operator_auth: true,
        }
    }
}

/// Settings for the Ticketmaster Discovery API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketmasterConfig {
    pub base_url: String,

    /// Inline credential. When unset the key is read from `api_key_env`
    /// on every request, so it can be rotated without a restart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    pub api_key_env: String,

    /// Value of the `classificationName` query parameter.
    pub classification: String,

    /// Designated market area used to scope the events query.
    pub dma_id: String,

    /// Two-letter state code used to scope the venues query.
    pub state_code: String,

    /// Request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,

    /// Thumbnail stored for venues without a 3:1 image.
    pub default_thumbnail: String,
}

impl Default for TicketmasterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://app.ticketmaster.com/discovery/v2/".to_string(),
            api_key: None,
            api_key_env: "TICKETMASTER_KEY".to_string(),
            classification: "music".to_string(),
            dma_id: "336".to_string(),
            state_code: "MN".to_string(),
            request_timeout_seconds: 30,
            default_thumbnail: "images/venue-default.png".to_string(),
        }
    }
}

impl TicketmasterConfig {
    /// Resolves the API key at call time.
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("lmn").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".lmn").join("config.toml"));
        }

        paths
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = PathBuf::from("config.toml");
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        let tm = &self.ticketmaster;

        if tm.base_url.trim().is_empty() {
            anyhow::bail!("Ticketmaster base URL cannot be empty");
        }

        if tm.request_timeout_seconds == 0 {
            anyhow::bail!("Ticketmaster request timeout must be > 0");
        }

        if tm.state_code.len() != 2 || !tm.state_code.chars().all(|c| c.is_ascii_alphabetic()) {
            anyhow::bail!(
                "Ticketmaster state code must be a two-letter code, got '{}'",
                tm.state_code
            );
        }

        Ok(())
    }
}
