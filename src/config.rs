use std::{env, fs, path::Path, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const CONFIG_FILE: &str = "config.json";
pub const LOCAL_DB_DIR: &str = "db";
pub const LOCAL_DB_FILE: &str = "popular_movies.db";
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/";
pub const DEFAULT_PROBE_ADDR: &str = "8.8.8.8:53";

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub tmdb_api_key: Option<String>,
    pub api_base_url: String,
    pub image_base_url: String,
    pub db_path: Option<String>,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub probe_addr: String,
    pub probe_timeout_ms: u64,
    pub cascade_unfavorite: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tmdb_api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE_URL.to_string(),
            db_path: None,
            connect_timeout_secs: 5,
            read_timeout_secs: 10,
            probe_addr: DEFAULT_PROBE_ADDR.to_string(),
            probe_timeout_ms: 1500,
            cascade_unfavorite: true,
        }
    }
}

impl AppConfig {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(local_db_path)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(alias = "api_key")]
    tmdb_api_key: Option<String>,
    api_base_url: Option<String>,
    image_base_url: Option<String>,
    db_path: Option<String>,
    connect_timeout_secs: Option<u64>,
    read_timeout_secs: Option<u64>,
    probe_addr: Option<String>,
    probe_timeout_ms: Option<u64>,
    cascade_unfavorite: Option<bool>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RawConfig {
    fn merge_into(self, cfg: &mut AppConfig) {
        if let Some(key) = non_empty(self.tmdb_api_key) {
            cfg.tmdb_api_key = Some(key);
        }
        if let Some(url) = non_empty(self.api_base_url) {
            cfg.api_base_url = url;
        }
        if let Some(url) = non_empty(self.image_base_url) {
            cfg.image_base_url = url;
        }
        if let Some(path) = non_empty(self.db_path) {
            cfg.db_path = Some(path);
        }
        if let Some(secs) = self.connect_timeout_secs {
            cfg.connect_timeout_secs = secs.max(1);
        }
        if let Some(secs) = self.read_timeout_secs {
            cfg.read_timeout_secs = secs.max(1);
        }
        if let Some(addr) = non_empty(self.probe_addr) {
            cfg.probe_addr = addr;
        }
        if let Some(ms) = self.probe_timeout_ms {
            cfg.probe_timeout_ms = ms.max(1);
        }
        if let Some(cascade) = self.cascade_unfavorite {
            cfg.cascade_unfavorite = cascade;
        }
    }
}

/// `config.json` from the working directory, then `TMDB_API_KEY`.
pub fn load_config() -> AppConfig {
    let mut cfg = load_config_from(Path::new(CONFIG_FILE));
    if let Some(key) = non_empty(env::var(API_KEY_ENV).ok()) {
        cfg.tmdb_api_key = Some(key);
    }
    cfg
}

pub fn load_config_from(cfg_path: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();

    match fs::read_to_string(cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                parsed.merge_into(&mut cfg);
                info!("Loaded config from {}", cfg_path.display());
            }
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Using defaults.",
                    cfg_path.display(),
                    err
                );
            }
        },
        Err(_) => {
            info!("No {} found; using defaults", cfg_path.display());
        }
    }

    cfg
}

pub fn local_db_path() -> PathBuf {
    PathBuf::from(LOCAL_DB_DIR).join(LOCAL_DB_FILE)
}
