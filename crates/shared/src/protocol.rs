use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    domain::{RsvpDraft, WeddingInfo, MAX_GUESTS, MIN_GUESTS},
    error::RsvpValidationError,
};

pub const RSVP_ROUTE: &str = "/api/rsvp";
pub const SUBMISSION_SOURCE: &str = "web";
pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeddingSummary {
    pub groom: String,
    pub bride: String,
    #[serde(rename = "dateISO")]
    pub date_iso: String,
}

impl From<&WeddingInfo> for WeddingSummary {
    fn from(value: &WeddingInfo) -> Self {
        Self {
            groom: value.groom.to_string(),
            bride: value.bride.to_string(),
            date_iso: value.date_iso.to_string(),
        }
    }
}

/// A validated, trimmed RSVP as it travels on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpEntry {
    pub name: String,
    pub attending: String,
    pub guests: i64,
    pub diet: String,
    pub note: String,
}

impl TryFrom<&RsvpDraft> for RsvpEntry {
    type Error = RsvpValidationError;

    fn try_from(draft: &RsvpDraft) -> Result<Self, Self::Error> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(RsvpValidationError::MissingName);
        }
        if !(MIN_GUESTS..=MAX_GUESTS).contains(&draft.guests) {
            return Err(RsvpValidationError::InvalidGuests);
        }
        let attending = draft.attending.trim();
        if attending.is_empty() {
            return Err(RsvpValidationError::MissingAttending);
        }

        Ok(Self {
            name: name.to_string(),
            attending: attending.to_string(),
            guests: draft.guests,
            diet: draft.diet.trim().to_string(),
            note: draft.note.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpPayload {
    pub wedding: WeddingSummary,
    pub rsvp: RsvpEntry,
    #[serde(rename = "submittedAtISO")]
    pub submitted_at_iso: String,
    pub source: String,
}

impl RsvpPayload {
    pub fn new(wedding: &WeddingInfo, rsvp: RsvpEntry, submitted_at: DateTime<Utc>) -> Self {
        Self {
            wedding: wedding.into(),
            rsvp,
            submitted_at_iso: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: SUBMISSION_SOURCE.to_string(),
        }
    }
}

/// Acknowledgement returned by the backend and by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpAck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RsvpAck {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// A response body read according to its declared content type.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// `None` when a declared JSON body does not parse.
    pub fn from_bytes(content_type: &str, bytes: &[u8]) -> Option<Self> {
        if is_json_content_type(content_type) {
            serde_json::from_slice(bytes).ok().map(ResponseBody::Json)
        } else {
            Some(ResponseBody::Text(String::from_utf8_lossy(bytes).into_owned()))
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    /// First usable value among `fields` of a JSON object body, else the
    /// body itself when it is non-empty text.
    pub fn message(&self, fields: &[&str]) -> Option<String> {
        match self {
            ResponseBody::Json(Value::String(text)) | ResponseBody::Text(text) => {
                (!text.is_empty()).then(|| text.clone())
            }
            ResponseBody::Json(value) => fields
                .iter()
                .find_map(|field| value.get(field).and_then(describe_field)),
        }
    }

    pub fn looks_like_html(&self) -> bool {
        self.as_text()
            .is_some_and(|text| text.to_ascii_lowercase().contains("<html"))
    }
}

fn describe_field(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains(JSON_CONTENT_TYPE)
}
