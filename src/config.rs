use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::api_connection::endpoints::GEMINI_BASE_URL;
use crate::geolocation::DEFAULT_LOCATE_TIMEOUT;

pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "GEMINI_BASE_URL";
pub const PREFS_PATH_ENV_VAR: &str = "MEAL_STRATEGIST_PREFS";
pub const LOCATE_TIMEOUT_ENV_VAR: &str = "MEAL_STRATEGIST_LOCATE_TIMEOUT_MS";

const APP_DIR: &str = "meal-strategist";
const PREFS_FILE: &str = "preferences.json";

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Name of the variable holding the API key; the key itself is read per request.
    pub api_key_env_var: String,
    pub base_url: String,
    pub preferences_path: PathBuf,
    pub locate_timeout: Duration,
}

impl PlannerConfig {
    /// Reads `.env` and the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = lookup(BASE_URL_ENV_VAR)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| GEMINI_BASE_URL.to_string());

        let preferences_path = lookup(PREFS_PATH_ENV_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_preferences_path);

        let locate_timeout = lookup(LOCATE_TIMEOUT_ENV_VAR)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_LOCATE_TIMEOUT);

        Self {
            api_key_env_var: API_KEY_ENV_VAR.to_string(),
            base_url,
            preferences_path,
            locate_timeout,
        }
    }
}

pub fn default_preferences_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(PREFS_FILE)
}
