use std::{collections::HashMap, fs};

use anyhow::Context;
use shared::protocol::RSVP_ROUTE;
use url::Url;

pub const DEFAULT_TARGET_BASE_URL: &str = "https://vestuviubackend-production.up.railway.app";

#[derive(Debug)]
pub struct Settings {
    pub bind_addr: String,
    pub target_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
            target_base_url: DEFAULT_TARGET_BASE_URL.into(),
        }
    }
}

impl Settings {
    /// Backend URL that RSVPs are relayed to.
    pub fn target_url(&self) -> anyhow::Result<String> {
        let base = normalize_base_url(&self.target_base_url);
        let base = if base.is_empty() {
            DEFAULT_TARGET_BASE_URL.to_string()
        } else {
            base
        };
        Url::parse(&base).with_context(|| format!("invalid proxy target base url '{base}'"))?;
        Ok(join_url(&base, RSVP_ROUTE))
    }
}

pub const SETTINGS_FILE: &str = "proxy.toml";

pub fn load_settings() -> anyhow::Result<Settings> {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from_sources(file.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("failed to load {SETTINGS_FILE}"))
}

pub fn settings_from_sources(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg: HashMap<String, String> =
            toml::from_str(raw).context("malformed proxy settings")?;
        if let Some(v) = file_cfg.get("bind_addr") {
            settings.bind_addr = v.clone();
        }
        if let Some(v) = file_cfg.get("target_base_url") {
            settings.target_base_url = v.clone();
        }
    }

    if let Some(v) = env("RSVP_PROXY_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }
    if let Some(v) = env("RSVP_PROXY_TARGET_BASE_URL").filter(|v| !v.trim().is_empty()) {
        settings.target_base_url = v;
    }

    Ok(settings)
}

/// Trimmed, `https://` added when no http(s) scheme is present, trailing
/// slashes removed. Empty input stays empty.
pub fn normalize_base_url(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    let lower = raw.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = normalize_base_url(base);
    let path = path.trim();
    if base.is_empty() {
        return path.to_string();
    }
    let lower = path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
