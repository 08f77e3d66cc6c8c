use super::*;

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde_json::json;
use shared::domain::WEDDING;
use tokio::net::TcpListener;

use crate::{
    draft_store::MemoryDraftStore,
    http::HttpTransport,
    settings::ClientSettings,
    submission::{MSG_BACKEND_NOT_CONNECTED, MSG_LOCAL_ONLY, MSG_SENT, MSG_SERVER_ERROR},
    test_support::{settings_with, valid_draft, Scripted, ScriptedTransport},
};

async fn spawn_backend(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn http_wizard(settings: Arc<ClientSettings>) -> Wizard {
    let controller = SubmissionController::new(settings, WEDDING, Arc::new(HttpTransport::new()));
    Wizard::new(controller, Arc::new(MemoryDraftStore::with_draft(valid_draft())))
}

fn scripted_wizard(settings: Arc<ClientSettings>, transport: Arc<ScriptedTransport>) -> Wizard {
    let controller = SubmissionController::new(settings, WEDDING, transport);
    Wizard::new(controller, Arc::new(MemoryDraftStore::with_draft(valid_draft())))
}

async fn open_at_rsvp(wizard: &Wizard) {
    wizard.open().await;
    assert_eq!(wizard.go(2).await, Transition::Moved { from: 0, to: 2 });
    assert_eq!(wizard.state().await.step(), Step::Rsvp);
}

#[tokio::test]
async fn navigation_requires_opening_first() {
    let wizard = scripted_wizard(Arc::new(ClientSettings::default()), ScriptedTransport::new([]));
    assert_eq!(wizard.go(1).await, Transition::NotOpened);
    assert_eq!(wizard.submit_and_continue().await, Transition::NotOpened);
    assert!(!wizard.state().await.opened);

    wizard.open().await;
    let state = wizard.state().await;
    assert!(state.opened);
    assert_eq!((state.current, state.direction), (0, Direction::Forward));
}

#[tokio::test]
async fn go_clamps_and_tracks_direction() {
    let wizard = scripted_wizard(Arc::new(ClientSettings::default()), ScriptedTransport::new([]));
    wizard.open().await;

    assert_eq!(wizard.go(99).await, Transition::Moved { from: 0, to: 4 });
    assert_eq!(wizard.state().await.direction, Direction::Forward);

    assert_eq!(wizard.prev().await, Transition::Moved { from: 4, to: 3 });
    assert_eq!(wizard.state().await.direction, Direction::Backward);

    assert_eq!(wizard.go(0).await, Transition::Moved { from: 3, to: 0 });
    assert_eq!(wizard.prev().await, Transition::Moved { from: 0, to: 0 });
    assert_eq!(wizard.next().await, Transition::Moved { from: 0, to: 1 });
}

#[tokio::test]
async fn leaving_rsvp_backward_needs_no_submission() {
    let transport = ScriptedTransport::new([]);
    let wizard = scripted_wizard(
        settings_with(|s| s.api_base_url = Some("http://backend.test".into())),
        transport.clone(),
    );
    open_at_rsvp(&wizard).await;

    assert_eq!(wizard.prev().await, Transition::Moved { from: 2, to: 1 });
    assert_eq!(transport.calls(), 0);
    assert_eq!(wizard.status().await, SubmissionStatus::Idle);
}

#[tokio::test]
async fn accepted_rsvp_advances() {
    let base = spawn_backend(Router::new().route(
        "/api/rsvp",
        post(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["rsvp"]["name"], "Jonas Jonaitis");
            assert_eq!(body["rsvp"]["attending"], "taip");
            assert_eq!(body["rsvp"]["guests"], 2);
            Json(json!({ "ok": true }))
        }),
    ))
    .await;
    let wizard = http_wizard(settings_with(|s| s.api_base_url = Some(base)));
    open_at_rsvp(&wizard).await;

    assert_eq!(wizard.next().await, Transition::Moved { from: 2, to: 3 });
    assert_eq!(wizard.status().await, SubmissionStatus::success(MSG_SENT));
    assert_eq!(wizard.state().await.step(), Step::DressCode);
}

#[tokio::test]
async fn missing_dev_backend_still_advances() {
    let origin = spawn_backend(Router::new().fallback(|| async {
        (StatusCode::NOT_FOUND, "<pre>Cannot POST /api/rsvp</pre>")
    }))
    .await;
    let wizard = http_wizard(settings_with(|s| {
        s.post_enabled = Some(true);
        s.rsvp_endpoint = Some(format!("{origin}/api/rsvp"));
    }));
    open_at_rsvp(&wizard).await;

    assert_eq!(
        wizard.submit_and_continue().await,
        Transition::Moved { from: 2, to: 3 }
    );
    assert_eq!(
        wizard.status().await,
        SubmissionStatus::success(MSG_BACKEND_NOT_CONNECTED)
    );
}

#[tokio::test]
async fn html_server_error_keeps_guest_on_rsvp() {
    let base = spawn_backend(Router::new().route(
        "/api/rsvp",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/html")],
                "<html><body>Application error</body></html>",
            )
                .into_response()
        }),
    ))
    .await;
    let wizard = http_wizard(settings_with(|s| s.api_base_url = Some(base)));
    open_at_rsvp(&wizard).await;

    assert_eq!(wizard.go(4).await, Transition::Blocked);
    assert_eq!(wizard.state().await.current, 2);
    assert_eq!(wizard.status().await, SubmissionStatus::error(MSG_SERVER_ERROR));
}

#[tokio::test]
async fn invalid_draft_blocks_without_network() {
    let transport = ScriptedTransport::new([]);
    let wizard = scripted_wizard(
        settings_with(|s| s.api_base_url = Some("http://backend.test".into())),
        transport.clone(),
    );
    open_at_rsvp(&wizard).await;
    wizard.edit_draft(|d| d.name = "  ".into()).await;

    assert_eq!(wizard.next().await, Transition::Blocked);
    assert_eq!(transport.calls(), 0);
    assert!(matches!(wizard.status().await, SubmissionStatus::Error { .. }));
}

#[tokio::test]
async fn navigating_away_mid_submission_cancels_it() {
    let (pending, _release) = Scripted::ok().gated();
    let transport = ScriptedTransport::new([pending]);
    let wizard = Arc::new(scripted_wizard(
        settings_with(|s| s.api_base_url = Some("http://backend.test".into())),
        transport.clone(),
    ));
    open_at_rsvp(&wizard).await;

    let forward = tokio::spawn({
        let wizard = wizard.clone();
        async move { wizard.next().await }
    });
    transport.started.notified().await;
    assert!(wizard.is_busy().await);

    assert_eq!(wizard.prev().await, Transition::Moved { from: 2, to: 1 });
    assert_eq!(forward.await.expect("join"), Transition::Blocked);
    assert_eq!(wizard.state().await.current, 1);
    assert_eq!(wizard.status().await, SubmissionStatus::Idle);
    assert!(!wizard.is_busy().await);
}

#[tokio::test]
async fn local_only_submission_advances() {
    let transport = ScriptedTransport::new([]);
    let wizard = scripted_wizard(Arc::new(ClientSettings::default()), transport.clone());
    open_at_rsvp(&wizard).await;

    assert_eq!(
        wizard.submit_and_continue().await,
        Transition::Moved { from: 2, to: 3 }
    );
    assert_eq!(transport.calls(), 0);
    assert_eq!(wizard.status().await, SubmissionStatus::success(MSG_LOCAL_ONLY));
}

#[tokio::test]
async fn submit_outside_rsvp_step_only_moves() {
    let transport = ScriptedTransport::new([Scripted::ok(), Scripted::ok()]);
    let wizard = scripted_wizard(
        settings_with(|s| s.api_base_url = Some("http://backend.test".into())),
        transport.clone(),
    );
    wizard.open().await;

    assert_eq!(
        wizard.submit_and_continue().await,
        Transition::Moved { from: 0, to: 1 }
    );
    wizard.go(4).await;
    assert_eq!(
        wizard.submit_and_continue().await,
        Transition::Moved { from: 4, to: 4 }
    );
    assert_eq!(transport.calls(), 0);
    assert_eq!(wizard.status().await, SubmissionStatus::Idle);
}

#[tokio::test]
async fn editing_draft_clears_outcome_and_persists() {
    let store = Arc::new(MemoryDraftStore::default());
    let controller = SubmissionController::new(
        Arc::new(ClientSettings::default()),
        WEDDING,
        ScriptedTransport::new([]),
    );
    let wizard = Wizard::new(controller, store.clone());
    assert_eq!(wizard.draft().await, RsvpDraft::default());

    wizard.open().await;
    wizard.go(2).await;
    assert_eq!(wizard.next().await, Transition::Blocked);
    assert!(wizard.status().await.is_settled());

    wizard.edit_draft(|d| d.guests = 1).await;
    assert!(wizard.status().await.is_settled(), "unchanged draft keeps the message");
    assert_eq!(store.load().expect("load"), None);

    wizard.edit_draft(|d| d.name = "Ona".into()).await;
    assert_eq!(wizard.status().await, SubmissionStatus::Idle);
    assert_eq!(store.load().expect("load").map(|d| d.name), Some("Ona".to_string()));
}

#[tokio::test]
async fn wizard_restores_stored_draft() {
    let stored = RsvpDraft {
        name: "Petras".into(),
        attending: "ne".into(),
        ..RsvpDraft::default()
    };
    let controller = SubmissionController::new(
        Arc::new(ClientSettings::default()),
        WEDDING,
        ScriptedTransport::new([]),
    );
    let wizard = Wizard::new(controller, Arc::new(MemoryDraftStore::with_draft(stored.clone())));
    assert_eq!(wizard.draft().await, stored);
}

#[test]
fn steps_are_in_invitation_order() {
    let ids: Vec<_> = STEPS.iter().map(|s| s.id()).collect();
    assert_eq!(ids, ["welcome", "details", "rsvp", "dresscode", "end"]);
    assert_eq!(Step::DressCode.title(), "Aprangos kodas");
}
