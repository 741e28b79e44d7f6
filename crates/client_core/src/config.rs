use std::{collections::HashMap, fs, path::PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const SETTINGS_FILE_NAME: &str = "summaize.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub session_path: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            session_path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("summaize").join("session.json")
}

/// Defaults, then `summaize.toml` in the working directory, then environment overrides.
pub fn load_settings() -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE_NAME) {
        apply_file_overrides(&mut settings, &raw);
    }

    if let Ok(v) = std::env::var("SUMMAIZE_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Ok(v) = std::env::var("SUMMAIZE_SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("APP__SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    settings
}

fn apply_file_overrides(settings: &mut ClientSettings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE_NAME, "ignoring unparsable settings file");
        return;
    };
    if let Some(v) = file_cfg.get("api_base_url") {
        settings.api_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("session_path") {
        settings.session_path = PathBuf::from(v);
    }
}

/// Validates the base URL and strips trailing slashes so endpoint paths can be appended.
pub fn normalize_base_url(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_API_BASE_URL.to_string());
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| ClientError::validation(format!("invalid API base URL '{trimmed}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::validation(format!(
            "API base URL must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
