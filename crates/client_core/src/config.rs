use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://haquenichbackend.vercel.app";
pub const DEFAULT_CHAT_HISTORY_WINDOW: usize = 10;
pub const SETTINGS_FILE: &str = "ebike.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    /// Number of trailing messages sent as `conversationHistory`.
    pub chat_history_window: usize,
    pub phone_required: bool,
    /// `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            chat_history_window: DEFAULT_CHAT_HISTORY_WINDOW,
            phone_required: false,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    chat_history_window: Option<usize>,
    phone_required: Option<bool>,
    request_timeout_secs: Option<u64>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => settings.apply_file(file_cfg),
            Err(err) => warn!(path = %path.display(), error = %err, "ignoring unreadable settings file"),
        }
    }

    settings.apply_env(env);
    settings
}

impl Settings {
    fn apply_file(&mut self, file_cfg: FileSettings) {
        if let Some(v) = file_cfg.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file_cfg.chat_history_window {
            self.chat_history_window = v;
        }
        if let Some(v) = file_cfg.phone_required {
            self.phone_required = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs {
            self.request_timeout_secs = Some(v);
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("EBIKE_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = env("APP__API_BASE_URL") {
            self.api_base_url = v;
        }

        if let Some(v) = env("APP__CHAT_HISTORY_WINDOW") {
            if let Ok(parsed) = v.parse::<usize>() {
                self.chat_history_window = parsed;
            }
        }

        if let Some(v) = env("APP__PHONE_REQUIRED") {
            if let Ok(parsed) = v.parse::<bool>() {
                self.phone_required = parsed;
            }
        }

        if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = Some(parsed);
            }
        }
    }

    /// Checks the settings can drive a client. A zero history window would
    /// send the chat endpoint no context at all, not even the new message.
    pub fn validate(&self) -> anyhow::Result<Url> {
        if self.chat_history_window == 0 {
            anyhow::bail!("chat_history_window must be at least 1");
        }
        let url = Url::parse(self.api_base_url.trim())
            .with_context(|| format!("invalid api base url '{}'", self.api_base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api base url must be http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
