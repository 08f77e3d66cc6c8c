//! Client side of the invitation: endpoint resolution, the RSVP request
//! client, the submission controller and the step wizard that gates on it.

pub mod draft_store;
pub mod endpoint;
pub mod http;
pub mod settings;
pub mod submission;
pub mod wizard;

pub use draft_store::{DraftStore, JsonFileDraftStore, MemoryDraftStore};
pub use http::{ApiFailure, HttpTransport, RequestError, RsvpTransport};
pub use settings::{load_settings, ClientSettings};
pub use submission::{SubmissionController, SubmissionStatus};
pub use wizard::{Step, Transition, Wizard, STEPS};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
