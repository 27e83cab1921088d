use std::env;
use std::path::PathBuf;

use crate::fallback::DEFAULT_H2H_LAST;
use crate::persist::default_history_path;
use crate::state::SourceMode;
use crate::stats_fetch::DEFAULT_API_BASE_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceMode,
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub history_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub h2h_last: u8,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let source = match env::var("BET_DATA_SOURCE")
            .unwrap_or_else(|_| "static".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "live" | "api" | "remote" => SourceMode::LiveStats,
            _ => SourceMode::StaticCatalog,
        };
        let api_base_url = env_string("BET_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_key = env_string("BET_API_KEY");
        let history_path = env_string("BET_HISTORY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_history_path);
        let catalog_path = env_string("BET_CATALOG_PATH").map(PathBuf::from);
        let h2h_last = env::var("BET_H2H_LAST")
            .ok()
            .and_then(|v| v.trim().parse::<u8>().ok())
            .unwrap_or(DEFAULT_H2H_LAST)
            .clamp(1, 50);

        Self {
            source,
            api_base_url,
            api_key,
            history_path,
            catalog_path,
            h2h_last,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
