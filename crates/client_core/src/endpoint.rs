//! Where an RSVP is sent.
//!
//! Pure string handling: nothing here touches the network.

use shared::protocol::RSVP_ROUTE;

pub const DEFAULT_PRODUCTION_BASE_URL: &str = "https://vestuviubackend-production.up.railway.app";

/// Absolute URL for the RSVP submission, or a same-origin path when no base
/// applies.
pub fn resolve_endpoint(
    override_path: Option<&str>,
    override_base: Option<&str>,
    production: bool,
) -> String {
    let path = normalize_endpoint(override_path).unwrap_or_else(|| RSVP_ROUTE.to_string());
    api_url(&path, override_base, production)
}

/// Normalizes an operator-supplied endpoint. `None` when it is blank or
/// looks like a host without a scheme.
pub fn normalize_endpoint(value: Option<&str>) -> Option<String> {
    let raw = trimmed(value)?;
    if has_scheme(raw) || raw.starts_with('/') {
        return Some(raw.to_string());
    }
    if looks_like_bare_host(raw) {
        tracing::warn!("rsvp: endpoint override looks like a host without scheme, using default path");
        return None;
    }
    Some(format!("/{raw}"))
}

pub fn api_url(path: &str, base: Option<&str>, production: bool) -> String {
    let raw = path.trim();
    if has_scheme(raw) {
        return raw.to_string();
    }

    let base = match trimmed(base).map(|b| b.trim_end_matches('/')) {
        Some(base) if !base.is_empty() => base,
        _ if production => DEFAULT_PRODUCTION_BASE_URL,
        _ => "",
    };
    if raw.starts_with('/') {
        format!("{base}{raw}")
    } else {
        format!("{base}/{raw}")
    }
}

/// True for values such as `example.com/api/rsvp`: a dotted hostname ending
/// in an alphabetic suffix, followed by `/` or nothing, with no scheme.
pub fn looks_like_bare_host(value: &str) -> bool {
    let raw = value.trim();
    if raw.starts_with('/') || has_scheme(raw) {
        return false;
    }

    let host = raw.split('/').next().unwrap_or_default();
    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }
    match host.rsplit_once('.') {
        Some((name, suffix)) => {
            !name.is_empty() && suffix.len() >= 2 && suffix.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

/// `scheme://` prefix, scheme per RFC 3986.
pub fn has_scheme(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

pub(crate) fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "tests/endpoint_tests.rs"]
mod tests;
