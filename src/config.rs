use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LEADERBOARD_URL: &str =
    "https://api.neatqueue.com/api/v1/leaderboard/459532023690821643/1444664225275580518";
pub const DEFAULT_MATCHES_URL: &str =
    "https://api.neatqueue.com/api/v1/history/459532023690821643?page=1&page_size=20&limit=10&order=desc";

const APP_DIR: &str = "ranked_board";
const CACHE_FILE: &str = "leaderboard_cache.json";
const LOG_FILE: &str = "ranked_board.log";

const DEFAULT_REFRESH_SECS: u64 = 300;
const MIN_REFRESH_SECS: u64 = 30;

/// Cached data stays usable as a fallback for this many refresh intervals.
const STALENESS_FACTOR: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub leaderboard_url: String,
    pub matches_url: String,
    /// Shared by the leaderboard and the match feed.
    pub refresh_interval: Duration,
    pub cache_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let refresh_secs = non_empty("BOARD_REFRESH_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(MIN_REFRESH_SECS);

        let cache_dir = non_empty("BOARD_CACHE_DIR")
            .map(PathBuf::from)
            .or_else(|| default_cache_dir(&lookup));

        Self {
            leaderboard_url: non_empty("BOARD_LEADERBOARD_URL")
                .unwrap_or_else(|| DEFAULT_LEADERBOARD_URL.to_string()),
            matches_url: non_empty("BOARD_MATCHES_URL")
                .unwrap_or_else(|| DEFAULT_MATCHES_URL.to_string()),
            refresh_interval: Duration::from_secs(refresh_secs),
            cache_dir,
            log_filter: non_empty("BOARD_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn staleness_window(&self) -> Duration {
        self.refresh_interval * STALENESS_FACTOR
    }

    pub fn cache_file(&self) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(CACHE_FILE))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(LOG_FILE))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

fn default_cache_dir(lookup: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Some(base) = lookup("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = lookup("HOME")?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_five_minute_refresh() {
        let config = config_from(&[]);
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.staleness_window(), Duration::from_secs(600));
        assert_eq!(config.leaderboard_url, DEFAULT_LEADERBOARD_URL);
        assert_eq!(config.cache_dir, None);
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let config = config_from(&[("BOARD_REFRESH_SECS", "5")]);
        assert_eq!(config.refresh_interval, Duration::from_secs(MIN_REFRESH_SECS));
        let config = config_from(&[("BOARD_REFRESH_SECS", "nope")]);
        assert_eq!(config.refresh_interval, Duration::from_secs(DEFAULT_REFRESH_SECS));
    }

    #[test]
    fn cache_dir_prefers_override_then_xdg_then_home() {
        let config = config_from(&[("BOARD_CACHE_DIR", "/tmp/board"), ("HOME", "/home/a")]);
        assert_eq!(
            config.cache_file(),
            Some(PathBuf::from("/tmp/board/leaderboard_cache.json"))
        );

        let config = config_from(&[("XDG_CACHE_HOME", "/xdg"), ("HOME", "/home/a")]);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/xdg/ranked_board")));

        let config = config_from(&[("HOME", "/home/a")]);
        assert_eq!(
            config.log_file(),
            Some(PathBuf::from("/home/a/.cache/ranked_board/ranked_board.log"))
        );
    }
}
