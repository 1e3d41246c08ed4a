use std::collections::HashMap;

use anyhow::Context;
use url::Url;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000/api".into(),
            request_timeout_seconds: 30,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = std::fs::read_to_string("console.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("request_timeout_seconds") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.request_timeout_seconds = parsed;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("CONSOLE_API_URL") {
        settings.api_base_url = v;
    }
    if let Ok(v) = std::env::var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Ok(v) = std::env::var("APP__REQUEST_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_seconds = parsed;
        }
    }

    settings
}

/// Normalizes and validates the configured base URL so request paths can
/// be appended directly.
pub fn prepare_api_base_url(raw_api_base_url: &str) -> anyhow::Result<String> {
    let api_base_url = normalize_api_base_url(raw_api_base_url);
    Url::parse(&api_base_url)
        .with_context(|| format!("invalid api base url '{api_base_url}'"))?;
    Ok(api_base_url)
}

fn normalize_api_base_url(raw_api_base_url: &str) -> String {
    let raw_api_base_url = raw_api_base_url.trim();

    if raw_api_base_url.is_empty() {
        return Settings::default().api_base_url;
    }

    let trimmed = raw_api_base_url.trim_end_matches('/');
    if trimmed.contains("://") {
        return trimmed.to_string();
    }

    format!("http://{trimmed}")
}
