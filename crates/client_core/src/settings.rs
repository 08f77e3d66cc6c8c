use std::{fs, path::PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::endpoint::{resolve_endpoint, trimmed};

pub const DEFAULT_SETTINGS_FILE: &str = "invite.toml";
pub const DEFAULT_MISSING_BACKEND_MARKER: &str = "Cannot POST /api/rsvp";

/// Everything the submission pipeline reads from its environment, captured
/// once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: Option<String>,
    pub rsvp_endpoint: Option<String>,
    pub post_enabled: Option<bool>,
    pub production: bool,
    /// Body text a local development server answers with when the RSVP
    /// route is not mounted.
    pub missing_backend_marker: String,
    pub draft_path: PathBuf,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            rsvp_endpoint: None,
            post_enabled: None,
            production: false,
            missing_backend_marker: DEFAULT_MISSING_BACKEND_MARKER.into(),
            draft_path: PathBuf::from("./data/invite.json"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    rsvp_endpoint: Option<String>,
    post_enabled: Option<toml::Value>,
    environment: Option<String>,
    missing_backend_marker: Option<String>,
    draft_path: Option<PathBuf>,
}

impl ClientSettings {
    /// The configured base, trimmed; `None` when blank.
    pub fn api_base(&self) -> Option<&str> {
        trimmed(self.api_base_url.as_deref())
    }

    /// Explicit override first, otherwise only when there is somewhere real
    /// to send to.
    pub fn network_enabled(&self) -> bool {
        self.post_enabled
            .unwrap_or(self.api_base().is_some() || self.production)
    }

    pub fn rsvp_url(&self) -> String {
        resolve_endpoint(
            self.rsvp_endpoint.as_deref(),
            self.api_base_url.as_deref(),
            self.production,
        )
    }
}

pub fn load_settings(path: &str) -> anyhow::Result<ClientSettings> {
    let file = match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(err).with_context(|| format!("failed to read settings '{path}'")),
    };
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("invalid settings in '{path}'"))
}

/// Defaults, then the TOML file, then the environment.
pub fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    if let Some(raw) = file {
        let file_cfg: FileSettings = toml::from_str(raw)?;
        if file_cfg.api_base_url.is_some() {
            settings.api_base_url = file_cfg.api_base_url;
        }
        if file_cfg.rsvp_endpoint.is_some() {
            settings.rsvp_endpoint = file_cfg.rsvp_endpoint;
        }
        if let Some(v) = file_cfg.post_enabled {
            settings.post_enabled = match v {
                toml::Value::Boolean(flag) => Some(flag),
                toml::Value::Integer(n) => parse_bool(&n.to_string()),
                toml::Value::String(s) => parse_bool(&s),
                _ => None,
            };
        }
        if let Some(v) = file_cfg.environment {
            settings.production = is_production(&v);
        }
        if let Some(v) = file_cfg.missing_backend_marker {
            settings.missing_backend_marker = v;
        }
        if let Some(v) = file_cfg.draft_path {
            settings.draft_path = v;
        }
    }

    if let Some(v) = env("RSVP_API_BASE_URL") {
        settings.api_base_url = Some(v);
    }
    if let Some(v) = env("RSVP_ENDPOINT") {
        settings.rsvp_endpoint = Some(v);
    }
    if let Some(v) = env("RSVP_POST_ENABLED") {
        settings.post_enabled = parse_bool(&v);
    }
    if let Some(v) = env("APP_ENV") {
        settings.production = is_production(&v);
    }
    if let Some(v) = env("RSVP_MISSING_BACKEND_MARKER") {
        settings.missing_backend_marker = v;
    }
    if let Some(v) = env("RSVP_DRAFT_PATH") {
        settings.draft_path = PathBuf::from(v);
    }

    Ok(settings)
}

/// `None` for anything that is not a recognised spelling.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn is_production(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("production")
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
