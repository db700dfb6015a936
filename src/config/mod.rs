use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
    time::Duration,
};

use directories::BaseDirs;

use crate::language::Language;
use crate::tui::app::Theme;

pub const DEFAULT_PISTON_API_URL: &str = "https://emkc.org/api/v2/piston";

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(default_config_path())
    }

    /// Read `config_path` as an rc file, then overlay the environment.
    pub fn load_from(config_path: PathBuf) -> Self {
        let mut map = default_map();

        // Read .codelabrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                let reader = BufReader::new(file);
                for line in reader.lines().map_while(Result::ok) {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    if let Some((k, v)) = line.split_once('=') {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    /// Built-in defaults only; ignores the rc file and the environment.
    pub fn defaults() -> Self {
        Self { inner: default_map(), config_path: default_config_path() }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.inner.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(|v| v.trim().parse::<u64>().ok())
    }

    pub fn piston_api_url(&self) -> String {
        self.get("PISTON_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PISTON_API_URL.to_string())
    }

    /// `None` means no timeout at all, which is the default.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.get_u64("REQUEST_TIMEOUT")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn default_language(&self) -> Language {
        self.get("DEFAULT_LANGUAGE")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Language::Javascript)
    }

    pub fn default_theme(&self) -> Theme {
        self.get("DEFAULT_THEME")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.get_u64("NOTIFICATION_TIMEOUT_MS").unwrap_or(3000))
    }

    pub fn narrow_width(&self) -> u16 {
        self.get("NARROW_WIDTH")
            .and_then(|v| v.trim().parse::<u16>().ok())
            .unwrap_or(100)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.get("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn discard_stale_results(&self) -> bool {
        self.get_bool("DISCARD_STALE_RESULTS")
    }

    pub fn log_file(&self) -> PathBuf {
        self.get("LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_cache_dir().join("codelab.log"))
    }

    pub fn log_filter(&self) -> String {
        self.get("CODELAB_LOG").unwrap_or_else(|| "info".into())
    }

    /// Filter for headless runs, quieter unless `CODELAB_LOG` is set.
    pub fn stderr_log_filter(&self) -> String {
        self.get("CODELAB_LOG").unwrap_or_else(|| "warn".into())
    }
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or CODELAB_* for forward-compat
    const KEYS: &[&str] = &[
        "PISTON_API_URL",
        "REQUEST_TIMEOUT",
        "DEFAULT_LANGUAGE",
        "DEFAULT_THEME",
        "NOTIFICATION_TIMEOUT_MS",
        "NARROW_WIDTH",
        "DOWNLOAD_DIR",
        "DISCARD_STALE_RESULTS",
        "LOG_FILE",
    ];

    KEYS.contains(&k) || k.starts_with("CODELAB_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("codelab").join(".codelabrc")
}

fn default_cache_dir() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.cache_dir().to_path_buf())
        .unwrap_or_else(env::temp_dir)
        .join("codelab")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    // Strings
    m.insert("PISTON_API_URL".into(), DEFAULT_PISTON_API_URL.into());
    m.insert("DEFAULT_LANGUAGE".into(), "javascript".into());
    m.insert("DEFAULT_THEME".into(), "vs-dark".into());
    m.insert("DOWNLOAD_DIR".into(), ".".into());

    // Numbers
    m.insert("NOTIFICATION_TIMEOUT_MS".into(), "3000".into());
    m.insert("NARROW_WIDTH".into(), "100".into());

    // Bools as strings
    m.insert("DISCARD_STALE_RESULTS".into(), "true".into());

    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::defaults();
        assert_eq!(cfg.piston_api_url(), DEFAULT_PISTON_API_URL);
        assert_eq!(cfg.request_timeout(), None);
        assert_eq!(cfg.default_language(), Language::Javascript);
        assert_eq!(cfg.notification_timeout(), Duration::from_secs(3));
        assert!(cfg.discard_stale_results());
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::defaults()
            .with("REQUEST_TIMEOUT", "15")
            .with("DEFAULT_LANGUAGE", "python")
            .with("DISCARD_STALE_RESULTS", "false")
            .with("PISTON_API_URL", "  ");
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(cfg.default_language(), Language::Python);
        assert!(!cfg.discard_stale_results());
        assert_eq!(cfg.piston_api_url(), DEFAULT_PISTON_API_URL);
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let cfg = Config::defaults().with("REQUEST_TIMEOUT", "0");
        assert_eq!(cfg.request_timeout(), None);
    }

    #[test]
    fn test_env_overrides_rc_file() {
        let dir = tempfile::tempdir().unwrap();
        let rc = dir.path().join(".codelabrc");
        fs::write(
            &rc,
            "# comment\nCODELAB_RC_ONLY=from-rc\nCODELAB_RC_AND_ENV=from-rc\nCODELAB_LOG=debug\n",
        )
        .unwrap();
        env::set_var("CODELAB_RC_AND_ENV", "from-env");

        let cfg = Config::load_from(rc.clone());
        env::remove_var("CODELAB_RC_AND_ENV");

        assert_eq!(cfg.config_path, rc);
        assert_eq!(cfg.get("CODELAB_RC_ONLY").as_deref(), Some("from-rc"));
        assert_eq!(cfg.get("CODELAB_RC_AND_ENV").as_deref(), Some("from-env"));
    }

    #[test]
    fn test_missing_rc_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(dir.path().join("absent"));
        assert_eq!(cfg.get("NARROW_WIDTH").as_deref(), Some("100"));
    }

    #[test]
    fn test_stderr_log_filter() {
        assert_eq!(Config::defaults().stderr_log_filter(), "warn");
        assert_eq!(Config::defaults().log_filter(), "info");
        let cfg = Config::defaults().with("CODELAB_LOG", "debug");
        assert_eq!(cfg.stderr_log_filter(), "debug");
    }

    #[test]
    fn test_config_keys() {
        assert!(is_config_key("PISTON_API_URL"));
        assert!(is_config_key("CODELAB_ANYTHING"));
        assert!(!is_config_key("HOME"));
    }
}
