use std::path::PathBuf;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const APP_DIR: &str = "salon-desk";

/// Runtime configuration, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the salon REST API, without trailing slash
    pub api_url: String,
    /// Directory holding the session database
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// - `SALON_API_URL`: backend base URL (default `http://localhost:8000`)
    /// - `SALON_DATA_DIR`: session database directory
    ///   (default `~/.local/share/salon-desk` on Linux)
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("SALON_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let data_dir = lookup("SALON_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Config { api_url, data_dir }
    }

    /// Path of the session database file
    pub fn session_db_path(&self) -> PathBuf {
        self.data_dir.join("salon_desk.db")
    }
}

fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push(APP_DIR);
    path
}
