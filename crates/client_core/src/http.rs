use async_trait::async_trait;
use futures::future::{AbortRegistration, Abortable};
use reqwest::{header::CONTENT_TYPE, Client};
use shared::protocol::{ResponseBody, RsvpPayload};
use thiserror::Error;

/// A non-2xx answer from the server.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ApiFailure {
    pub status: u16,
    pub body: Option<ResponseBody>,
    pub content_type: String,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: u16, body: Option<ResponseBody>, content_type: impl Into<String>) -> Self {
        let message = body
            .as_ref()
            .and_then(|body| body.message(&["error", "message"]))
            .unwrap_or_else(|| format!("HTTP {status}"));
        Self {
            status,
            body,
            content_type: content_type.into(),
            message,
        }
    }

    pub fn text_body(&self) -> Option<&str> {
        self.body.as_ref().and_then(ResponseBody::as_text)
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Api(#[from] ApiFailure),
    #[error("request failed: {0}")]
    Transport(String),
    /// The caller aborted the request; never shown to the guest.
    #[error("request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        RequestError::Transport(value.to_string())
    }
}

/// Sends one RSVP payload. The registration is the cancellation token: once
/// its handle is aborted the call must settle with [`RequestError::Cancelled`].
#[async_trait]
pub trait RsvpTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        payload: &RsvpPayload,
        cancel: AbortRegistration,
    ) -> Result<Option<ResponseBody>, RequestError>;
}

#[derive(Clone, Default)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl RsvpTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &RsvpPayload,
        cancel: AbortRegistration,
    ) -> Result<Option<ResponseBody>, RequestError> {
        let request = async {
            let response = self.http.post(url).json(payload).send().await?;
            let status = response.status();
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = match response.bytes().await {
                Ok(bytes) => ResponseBody::from_bytes(&content_type, &bytes),
                Err(_) => None,
            };
            Ok::<_, reqwest::Error>((status, content_type, body))
        };

        // Dropping the aborted future tears down the connection.
        let (status, content_type, body) = Abortable::new(request, cancel)
            .await
            .map_err(|_| RequestError::Cancelled)??;

        if !status.is_success() {
            return Err(ApiFailure::new(status.as_u16(), body, content_type).into());
        }
        Ok(body)
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
