use std::sync::Arc;

use shared::domain::RsvpDraft;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::{
    draft_store::DraftStore,
    submission::{SubmissionController, SubmissionStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Welcome,
    Details,
    Rsvp,
    DressCode,
    End,
}

impl Step {
    pub fn id(self) -> &'static str {
        match self {
            Step::Welcome => "welcome",
            Step::Details => "details",
            Step::Rsvp => "rsvp",
            Step::DressCode => "dresscode",
            Step::End => "end",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Welcome => "Pakvietimas",
            Step::Details => "Detalės",
            Step::Rsvp => "RSVP",
            Step::DressCode => "Aprangos kodas",
            Step::End => "Pabaiga",
        }
    }
}

pub const STEPS: [Step; 5] = [
    Step::Welcome,
    Step::Details,
    Step::Rsvp,
    Step::DressCode,
    Step::End,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardState {
    pub opened: bool,
    pub current: usize,
    pub direction: Direction,
}

impl Default for WizardState {
    fn default() -> Self {
        Self {
            opened: false,
            current: 0,
            direction: Direction::Forward,
        }
    }
}

impl WizardState {
    pub fn step(&self) -> Step {
        STEPS[self.current]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: usize, to: usize },
    /// Leaving the RSVP step needed a successful submission and did not get one.
    Blocked,
    NotOpened,
}

/// The invitation's step sequence plus the draft it collects.
pub struct Wizard {
    state: Mutex<WizardState>,
    draft: Mutex<RsvpDraft>,
    store: Arc<dyn DraftStore>,
    submission: SubmissionController,
}

impl Wizard {
    pub fn new(submission: SubmissionController, store: Arc<dyn DraftStore>) -> Self {
        let draft = match store.load() {
            Ok(Some(draft)) => draft,
            Ok(None) => RsvpDraft::default(),
            Err(err) => {
                warn!(%err, "wizard: stored draft unreadable, starting fresh");
                RsvpDraft::default()
            }
        };
        Self {
            state: Mutex::new(WizardState::default()),
            draft: Mutex::new(draft),
            store,
            submission,
        }
    }

    pub async fn state(&self) -> WizardState {
        *self.state.lock().await
    }

    pub async fn draft(&self) -> RsvpDraft {
        self.draft.lock().await.clone()
    }

    pub async fn status(&self) -> SubmissionStatus {
        self.submission.status().await
    }

    /// Step controls are disabled while a submission is pending.
    pub async fn is_busy(&self) -> bool {
        matches!(self.submission.status().await, SubmissionStatus::Submitting { .. })
    }

    pub async fn open(&self) {
        let mut state = self.state.lock().await;
        state.opened = true;
        state.current = 0;
        state.direction = Direction::Forward;
    }

    pub async fn next(&self) -> Transition {
        let current = self.state.lock().await.current;
        self.go(current + 1).await
    }

    pub async fn prev(&self) -> Transition {
        let current = self.state.lock().await.current;
        self.go(current.saturating_sub(1)).await
    }

    /// Moves to `target`, clamped to the step range. Moving forward out of
    /// the RSVP step submits first and only moves on success.
    pub async fn go(&self, target: usize) -> Transition {
        let state = self.state().await;
        if !state.opened {
            return Transition::NotOpened;
        }
        let target = target.min(STEPS.len() - 1);
        if state.step() == Step::Rsvp && target > state.current {
            return self.submit_and_go(target).await;
        }
        self.move_to(target).await
    }

    /// The RSVP step's own "submit and continue" action. Anywhere else it is
    /// a plain forward move and nothing is sent.
    pub async fn submit_and_continue(&self) -> Transition {
        let state = self.state().await;
        if !state.opened {
            return Transition::NotOpened;
        }
        let target = (state.current + 1).min(STEPS.len() - 1);
        if state.step() != Step::Rsvp {
            return self.move_to(target).await;
        }
        self.submit_and_go(target).await
    }

    async fn submit_and_go(&self, target: usize) -> Transition {
        let draft = self.draft().await;
        if !self.submission.submit(&draft).await {
            return Transition::Blocked;
        }
        self.move_to(target).await
    }

    async fn move_to(&self, target: usize) -> Transition {
        let from = {
            let mut state = self.state.lock().await;
            let from = state.current;
            state.direction = if target > from {
                Direction::Forward
            } else {
                Direction::Backward
            };
            state.current = target;
            from
        };
        if STEPS[target] != Step::Rsvp && self.submission.cancel().await {
            info!(from, to = target, "wizard: left RSVP step mid-submission");
        }
        Transition::Moved { from, to: target }
    }

    /// Applies a field edit, clears a stale outcome message and persists the
    /// draft.
    pub async fn edit_draft(&self, edit: impl FnOnce(&mut RsvpDraft)) {
        let snapshot = {
            let mut draft = self.draft.lock().await;
            let before = draft.clone();
            edit(&mut draft);
            if *draft == before {
                return;
            }
            draft.clone()
        };
        self.submission.reset_if_settled().await;
        if let Err(err) = self.store.save(&snapshot) {
            warn!(%err, "wizard: failed to persist draft");
        }
    }
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
