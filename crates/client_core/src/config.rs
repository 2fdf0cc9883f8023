use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;

use crate::{adapter::BackendShape, retry::RetryPolicy};

pub const DEFAULT_SETTINGS_FILE: &str = "movies.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub backend_shape: BackendShape,
    pub retry_period_ms: u64,
    pub retry_max_attempts: Option<u32>,
    pub request_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "https://fetch-movies-7525c-default-rtdb.firebaseio.com".into(),
            backend_shape: BackendShape::Firebase,
            retry_period_ms: 5000,
            retry_max_attempts: None,
            request_timeout_ms: 10_000,
        }
    }
}

impl Settings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            period: Duration::from_millis(self.retry_period_ms),
            max_attempts: self.retry_max_attempts,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    base_url: Option<String>,
    backend_shape: Option<String>,
    retry_period_ms: Option<u64>,
    retry_max_attempts: Option<u32>,
    request_timeout_ms: Option<u64>,
}

/// Defaults, then `movies.toml` in the working directory, then the process
/// environment.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_SETTINGS_FILE), |key| {
        std::env::var(key).ok()
    })
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), "ignoring unreadable settings file: {err}"),
        }
    }

    if let Some(v) = env("MOVIES_BASE_URL") {
        settings.base_url = v;
    }
    if let Some(v) = env("APP__BASE_URL") {
        settings.base_url = v;
    }

    if let Some(v) = env("APP__BACKEND_SHAPE") {
        match v.parse() {
            Ok(shape) => settings.backend_shape = shape,
            Err(err) => warn!("ignoring APP__BACKEND_SHAPE: {err}"),
        }
    }

    if let Some(v) = env("APP__RETRY_PERIOD_MS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.retry_period_ms = parsed,
            _ => warn!(value = %v, "ignoring APP__RETRY_PERIOD_MS"),
        }
    }

    if let Some(v) = env("APP__RETRY_MAX_ATTEMPTS") {
        match v.parse::<u32>() {
            Ok(0) => settings.retry_max_attempts = None,
            Ok(parsed) => settings.retry_max_attempts = Some(parsed),
            Err(_) => warn!(value = %v, "ignoring APP__RETRY_MAX_ATTEMPTS"),
        }
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_MS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => settings.request_timeout_ms = parsed,
            _ => warn!(value = %v, "ignoring APP__REQUEST_TIMEOUT_MS"),
        }
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.base_url {
        settings.base_url = v;
    }
    if let Some(v) = file_cfg.backend_shape {
        match v.parse() {
            Ok(shape) => settings.backend_shape = shape,
            Err(err) => warn!("ignoring backend_shape from settings file: {err}"),
        }
    }
    if let Some(v) = file_cfg.retry_period_ms.filter(|v| *v > 0) {
        settings.retry_period_ms = v;
    }
    if let Some(v) = file_cfg.retry_max_attempts {
        // 0 means unbounded
        settings.retry_max_attempts = (v > 0).then_some(v);
    }
    if let Some(v) = file_cfg.request_timeout_ms.filter(|v| *v > 0) {
        settings.request_timeout_ms = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
