use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that overrides the cache directory
pub const CACHE_PATH_ENV: &str = "NGINX_CACHE_PATH";

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "NGINX_CACHE_HELPER_HOME";

/// Cache directory used when nothing else is configured
pub const DEFAULT_CACHE_PATH: &str = "/var/run/nginx-cache/";

/// Longest a purge notice may wait to be displayed, in seconds
pub const MAX_NOTICE_TTL_SECS: u64 = 24 * 60 * 60;

/// Longest a lock may be held before it counts as abandoned, in seconds
pub const MAX_LOCK_STALE_SECS: u64 = 7 * 24 * 60 * 60;

/// Global purger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// NGINX cache directory to empty on purge
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Redirect target for manual purges without a referer
    #[serde(default = "default_landing")]
    pub default_landing: String,

    /// How long a purge notice waits to be displayed, in seconds
    #[serde(default = "default_notice_ttl_secs")]
    pub notice_ttl_secs: u64,

    /// Serialize purges of the same cache directory with a lock file
    #[serde(default = "default_lock_purges")]
    pub lock_purges: bool,

    /// Age after which an abandoned lock file is reclaimed, in seconds
    #[serde(default = "default_lock_stale_secs")]
    pub lock_stale_secs: u64,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}
fn default_landing() -> String {
    "/wp-admin/".to_string()
}
fn default_notice_ttl_secs() -> u64 {
    60
}
fn default_lock_purges() -> bool {
    true
}
fn default_lock_stale_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            default_landing: default_landing(),
            notice_ttl_secs: default_notice_ttl_secs(),
            lock_purges: default_lock_purges(),
            lock_stale_secs: default_lock_stale_secs(),
        }
    }
}

/// Pick the cache directory: a non-empty environment value wins over the
/// configured one.
pub fn resolve_cache_path(env_value: Option<&str>, configured: PathBuf) -> PathBuf {
    match env_value.map(str::trim) {
        Some(v) if !v.is_empty() => PathBuf::from(v),
        _ => configured,
    }
}

impl Config {
    /// Get the data directory ($NGINX_CACHE_HELPER_HOME or ~/.nginx-cache-helper)
    pub fn data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".nginx-cache-helper")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        Self::data_dir().join("config.toml")
    }

    /// Get the logs directory
    pub fn logs_dir() -> PathBuf {
        Self::data_dir().join("logs")
    }

    /// Get the directory holding pending operator notices
    pub fn notices_dir() -> PathBuf {
        Self::data_dir().join("notices")
    }

    /// Get the directory holding purge lock files
    pub fn locks_dir() -> PathBuf {
        Self::data_dir().join("locks")
    }

    /// Load config from file (or defaults), then apply NGINX_CACHE_PATH
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        let env_value = std::env::var(CACHE_PATH_ENV).ok();
        config.cache_path = resolve_cache_path(env_value.as_deref(), config.cache_path);
        Ok(config)
    }

    /// Load only the config file, without environment overrides
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("Invalid config: {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let dir = Self::data_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config dir: {}", dir.display()))?;
        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Initialize all data directories
    pub fn init_dirs() -> Result<()> {
        let dirs = [
            Self::data_dir(),
            Self::logs_dir(),
            Self::notices_dir(),
            Self::locks_dir(),
        ];
        for dir in &dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(())
    }

    /// Set a single key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "cache_path" => self.cache_path = PathBuf::from(value),
            "default_landing" => self.default_landing = value.to_string(),
            "notice_ttl_secs" => {
                self.notice_ttl_secs = parse_bounded(key, value, MAX_NOTICE_TTL_SECS)?
            }
            "lock_purges" => self.lock_purges = value.parse()?,
            "lock_stale_secs" => {
                self.lock_stale_secs = parse_bounded(key, value, MAX_LOCK_STALE_SECS)?
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Reject durations the notice and lock clocks cannot represent
    pub fn validate(&self) -> Result<()> {
        check_bound("notice_ttl_secs", self.notice_ttl_secs, MAX_NOTICE_TTL_SECS)?;
        check_bound("lock_stale_secs", self.lock_stale_secs, MAX_LOCK_STALE_SECS)?;
        Ok(())
    }
}

fn parse_bounded(key: &str, value: &str, max: u64) -> Result<u64> {
    let parsed: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds", key))?;
    check_bound(key, parsed, max)?;
    Ok(parsed)
}

fn check_bound(key: &str, value: u64, max: u64) -> Result<()> {
    if value > max {
        anyhow::bail!("{} must be at most {} seconds, got {}", key, max, value);
    }
    Ok(())
}
