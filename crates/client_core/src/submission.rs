use std::sync::Arc;

use chrono::Utc;
use futures::future::AbortHandle;
use shared::{
    domain::{RsvpDraft, WeddingInfo},
    protocol::{RsvpEntry, RsvpPayload},
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    http::{RequestError, RsvpTransport},
    settings::ClientSettings,
};

pub const MSG_SENDING: &str = "Sending…";
pub const MSG_SENT: &str = "Thank you! Your RSVP has been sent.";
pub const MSG_LOCAL_ONLY: &str =
    "Preview mode: nothing was sent, your answer is saved on this device.";
pub const MSG_BACKEND_NOT_CONNECTED: &str =
    "The backend is not connected yet (POST /api/rsvp). Your answer is saved on this device.";
pub const MSG_SERVER_ERROR: &str = "Server error. Please try again.";
pub const MSG_SEND_FAILED: &str = "Failed to send. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting {
        message: String,
    },
    Success {
        message: String,
    },
    Error {
        message: String,
    },
}

impl SubmissionStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Idle => "",
            Self::Submitting { message } | Self::Success { message } | Self::Error { message } => {
                message
            }
        }
    }

    /// Success or error.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }
}

struct InFlight {
    attempt: u64,
    abort: AbortHandle,
}

#[derive(Default)]
struct ControllerState {
    status: SubmissionStatus,
    in_flight: Option<InFlight>,
    attempts: u64,
}

/// Runs "submit RSVP" operations. Only the most recent attempt may report a
/// status; starting a new one aborts the previous.
pub struct SubmissionController {
    settings: Arc<ClientSettings>,
    wedding: WeddingInfo,
    transport: Arc<dyn RsvpTransport>,
    state: Mutex<ControllerState>,
}

impl SubmissionController {
    pub fn new(
        settings: Arc<ClientSettings>,
        wedding: WeddingInfo,
        transport: Arc<dyn RsvpTransport>,
    ) -> Self {
        Self {
            settings,
            wedding,
            transport,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub async fn status(&self) -> SubmissionStatus {
        self.state.lock().await.status.clone()
    }

    pub async fn is_in_flight(&self) -> bool {
        self.state.lock().await.in_flight.is_some()
    }

    /// Returns true when the guest may move past the RSVP step. A superseded
    /// or cancelled attempt returns false and leaves the status alone.
    pub async fn submit(&self, draft: &RsvpDraft) -> bool {
        let entry = match RsvpEntry::try_from(draft) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(%err, "rsvp: draft rejected");
                self.state.lock().await.status = SubmissionStatus::error(err.to_string());
                return false;
            }
        };

        if !self.settings.network_enabled() {
            info!("rsvp: network submission disabled, keeping answer on device");
            self.state.lock().await.status = SubmissionStatus::success(MSG_LOCAL_ONLY);
            return true;
        }

        let (abort, cancel) = AbortHandle::new_pair();
        let attempt = {
            let mut state = self.state.lock().await;
            if let Some(previous) = state.in_flight.take() {
                info!(attempt = previous.attempt, "rsvp: superseding in-flight submission");
                previous.abort.abort();
            }
            state.attempts += 1;
            let attempt = state.attempts;
            state.in_flight = Some(InFlight { attempt, abort });
            state.status = SubmissionStatus::Submitting {
                message: MSG_SENDING.to_string(),
            };
            attempt
        };

        let payload = RsvpPayload::new(&self.wedding, entry, Utc::now());
        let url = self.settings.rsvp_url();
        info!(attempt, %url, guests = payload.rsvp.guests, "rsvp: submitting");
        let result = self.transport.post_json(&url, &payload, cancel).await;

        let mut state = self.state.lock().await;
        if state.in_flight.as_ref().map(|f| f.attempt) != Some(attempt) {
            debug!(attempt, "rsvp: attempt no longer current, dropping outcome");
            return false;
        }
        state.in_flight = None;

        match result {
            Ok(_) => {
                info!(attempt, "rsvp: submitted");
                state.status = SubmissionStatus::success(MSG_SENT);
                true
            }
            Err(RequestError::Cancelled) => false,
            Err(err) => {
                let status = classify_failure(&err, &self.settings);
                let ok = matches!(status, SubmissionStatus::Success { .. });
                warn!(attempt, %err, soft_success = ok, "rsvp: submission failed");
                state.status = status;
                ok
            }
        }
    }

    /// Aborts the in-flight attempt, if any, and returns to idle.
    pub async fn cancel(&self) -> bool {
        let mut state = self.state.lock().await;
        let Some(in_flight) = state.in_flight.take() else {
            return false;
        };
        info!(attempt = in_flight.attempt, "rsvp: submission cancelled");
        in_flight.abort.abort();
        state.status = SubmissionStatus::Idle;
        true
    }

    /// A settled message goes stale once the draft changes.
    pub async fn reset_if_settled(&self) {
        let mut state = self.state.lock().await;
        if state.status.is_settled() {
            state.status = SubmissionStatus::Idle;
        }
    }
}

/// Turns a failed request into what the guest sees.
pub fn classify_failure(err: &RequestError, settings: &ClientSettings) -> SubmissionStatus {
    if is_missing_local_backend(err, settings) {
        return SubmissionStatus::success(MSG_BACKEND_NOT_CONNECTED);
    }
    match err {
        RequestError::Api(failure) if failure.body.as_ref().is_some_and(|b| b.looks_like_html()) => {
            SubmissionStatus::error(MSG_SERVER_ERROR)
        }
        RequestError::Api(failure) if !failure.message.trim().is_empty() => {
            SubmissionStatus::error(failure.message.clone())
        }
        _ => SubmissionStatus::error(MSG_SEND_FAILED),
    }
}

/// Development convenience: a dev server without the RSVP route answers 404
/// with its own text. Treated as a soft success only in a non-production
/// build with no API base configured.
pub fn is_missing_local_backend(err: &RequestError, settings: &ClientSettings) -> bool {
    let RequestError::Api(failure) = err else {
        return false;
    };
    !settings.production
        && settings.api_base().is_none()
        && !settings.missing_backend_marker.is_empty()
        && failure.status == 404
        && failure
            .text_body()
            .is_some_and(|text| text.contains(&settings.missing_backend_marker))
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
