use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use futures::future::{AbortRegistration, Abortable};
use serde_json::json;
use shared::{
    domain::RsvpDraft,
    protocol::{ResponseBody, RsvpPayload},
};
use tokio::sync::{oneshot, Notify};

use crate::{
    http::{ApiFailure, RequestError, RsvpTransport},
    settings::ClientSettings,
};

pub(crate) struct Scripted {
    reply: Result<Option<ResponseBody>, RequestError>,
    gate: Option<oneshot::Receiver<()>>,
    honor_cancel: bool,
}

impl Scripted {
    pub(crate) fn ok() -> Self {
        Self::reply(Ok(Some(ResponseBody::Json(json!({ "ok": true })))))
    }

    pub(crate) fn api(status: u16, body: ResponseBody, content_type: &str) -> Self {
        Self::reply(Err(ApiFailure::new(status, Some(body), content_type).into()))
    }

    pub(crate) fn reply(reply: Result<Option<ResponseBody>, RequestError>) -> Self {
        Self {
            reply,
            gate: None,
            honor_cancel: true,
        }
    }

    /// Holds the reply until the returned sender fires or is dropped.
    pub(crate) fn gated(mut self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.gate = Some(rx);
        (self, tx)
    }

    pub(crate) fn ignoring_cancel(mut self) -> Self {
        self.honor_cancel = false;
        self
    }
}

#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    urls: Mutex<Vec<String>>,
    calls: AtomicUsize,
    pub(crate) started: Notify,
}

impl ScriptedTransport {
    pub(crate) fn new(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("urls").clone()
    }
}

#[async_trait]
impl RsvpTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        _payload: &RsvpPayload,
        cancel: AbortRegistration,
    ) -> Result<Option<ResponseBody>, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().expect("urls").push(url.to_string());
        let Scripted {
            reply,
            gate,
            honor_cancel,
        } = self
            .script
            .lock()
            .expect("script")
            .pop_front()
            .expect("unexpected request");
        self.started.notify_one();

        let pending = async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            reply
        };
        if honor_cancel {
            Abortable::new(pending, cancel)
                .await
                .unwrap_or(Err(RequestError::Cancelled))
        } else {
            pending.await
        }
    }
}

pub(crate) fn settings_with(edit: impl FnOnce(&mut ClientSettings)) -> Arc<ClientSettings> {
    let mut settings = ClientSettings::default();
    edit(&mut settings);
    Arc::new(settings)
}

pub(crate) fn valid_draft() -> RsvpDraft {
    RsvpDraft {
        name: "Jonas Jonaitis".into(),
        attending: "taip".into(),
        guests: 2,
        ..RsvpDraft::default()
    }
}
