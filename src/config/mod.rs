// src/config/mod.rs
// Engine configuration loaded from .env and environment variables

use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Delay between config load and the first selection
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    // ── Remote API
    pub api_base: String,
    pub request_timeout: u64,

    // ── Rotation
    pub initial_delay_ms: u64,

    // ── Session storage
    pub storage_dir: PathBuf,
    pub session_id: String,

    // ── Logging
    pub log_level: String,
}

/// Strip an inline `# comment` and surrounding whitespace, then parse
fn parse_clean<T: FromStr>(raw: &str) -> Option<T> {
    let clean_val = raw.split('#').next().unwrap_or("").trim();
    clean_val.parse::<T>().ok()
}

fn env_var_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(val) => match parse_clean(&val) {
            Some(parsed) => parsed,
            None => {
                eprintln!("Config: {} = '{}' (parse failed, using default)", key, val);
                default
            }
        },
        Err(_) => default,
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        // Missing .env is normal outside development
        let _ = dotenvy::dotenv();

        let default_storage = std::env::temp_dir().join("widgetic");

        Self {
            api_base: env_var_or("WIDGETIC_API_BASE", "http://127.0.0.1:5000".to_string()),
            request_timeout: env_var_or("WIDGETIC_REQUEST_TIMEOUT", 30),
            initial_delay_ms: env_var_or("WIDGETIC_INITIAL_DELAY_MS", DEFAULT_INITIAL_DELAY_MS),
            storage_dir: env_var_or("WIDGETIC_STORAGE_DIR", default_storage),
            session_id: env_var_or("WIDGETIC_SESSION", uuid::Uuid::new_v4().to_string()),
            log_level: env_var_or("WIDGETIC_LOG_LEVEL", "info".to_string()),
        }
    }

    /// Delay before the first widget is selected
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

// Global config instance - loaded once at startup
pub static CONFIG: Lazy<EngineConfig> = Lazy::new(EngineConfig::from_env);
