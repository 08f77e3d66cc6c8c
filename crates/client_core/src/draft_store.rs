use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use shared::domain::RsvpDraft;

pub const DRAFT_KEY: &str = "wedding_rsvp";

/// Device-local key-value storage for the most recent draft.
pub trait DraftStore: Send + Sync {
    /// `Ok(None)` when nothing usable is stored.
    fn load(&self) -> Result<Option<RsvpDraft>>;
    fn save(&self, draft: &RsvpDraft) -> Result<()>;
}

/// One JSON object per file, the draft under [`DRAFT_KEY`]. Other keys are
/// preserved on save.
pub struct JsonFileDraftStore {
    path: PathBuf,
}

impl JsonFileDraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read draft store '{}'", self.path.display()))
            }
        };
        match serde_json::from_str(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            _ => Ok(Map::new()),
        }
    }
}

impl DraftStore for JsonFileDraftStore {
    fn load(&self) -> Result<Option<RsvpDraft>> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(DRAFT_KEY)
            .and_then(|value| serde_json::from_value(value.clone()).ok()))
    }

    fn save(&self, draft: &RsvpDraft) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(DRAFT_KEY.to_string(), serde_json::to_value(draft)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create draft directory '{}'", parent.display())
            })?;
        }
        let raw = serde_json::to_string_pretty(&Value::Object(entries))?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write draft store '{}'", self.path.display()))
    }
}

#[derive(Default)]
pub struct MemoryDraftStore {
    draft: Mutex<Option<RsvpDraft>>,
}

impl MemoryDraftStore {
    pub fn with_draft(draft: RsvpDraft) -> Self {
        Self {
            draft: Mutex::new(Some(draft)),
        }
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self) -> Result<Option<RsvpDraft>> {
        let draft = self.draft.lock().map_err(|_| anyhow!("draft store poisoned"))?;
        Ok(draft.clone())
    }

    fn save(&self, draft: &RsvpDraft) -> Result<()> {
        let mut slot = self.draft.lock().map_err(|_| anyhow!("draft store poisoned"))?;
        *slot = Some(draft.clone());
        Ok(())
    }
}
