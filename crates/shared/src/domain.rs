use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_GUESTS: i64 = 1;
pub const MAX_GUESTS: i64 = 6;

/// Static facts about the wedding the invitation is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeddingInfo {
    pub groom: &'static str,
    pub bride: &'static str,
    /// Ceremony start, local summer time (EEST).
    pub date_iso: &'static str,
    pub church_name: &'static str,
    pub church_maps_query: &'static str,
    pub party_place: &'static str,
}

pub const WEDDING: WeddingInfo = WeddingInfo {
    groom: "Deividas",
    bride: "Aistė",
    date_iso: "2026-06-25T14:00:00+03:00",
    church_name: "Kulautuvos bažnyčia",
    church_maps_query: "Kulautuvos bažnyčia",
    party_place: "Vieta dar tikslinama",
};

impl WeddingInfo {
    pub fn ceremony_start(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.date_iso).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Attending {
    #[default]
    #[serde(rename = "taip")]
    Yes,
    #[serde(rename = "gal")]
    Undecided,
    #[serde(rename = "ne")]
    No,
}

impl Attending {
    pub const ALL: [Attending; 3] = [Attending::Yes, Attending::Undecided, Attending::No];

    pub fn as_str(self) -> &'static str {
        match self {
            Attending::Yes => "taip",
            Attending::Undecided => "gal",
            Attending::No => "ne",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Attending::Yes => "Taip, su malonumu",
            Attending::Undecided => "Dar nežinau",
            Attending::No => "Deja, negalėsiu",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL.into_iter().find(|choice| choice.as_str() == value)
    }
}

/// The locally editable RSVP form.
///
/// `attending` keeps the raw field value: it is usually one of
/// [`Attending::as_str`], but a restored or hand-edited draft may carry
/// anything, including an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_attending")]
    pub attending: String,
    #[serde(default = "default_guests")]
    pub guests: i64,
    #[serde(default)]
    pub diet: String,
    #[serde(default)]
    pub note: String,
}

fn default_attending() -> String {
    Attending::default().as_str().to_string()
}

fn default_guests() -> i64 {
    MIN_GUESTS
}

impl Default for RsvpDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            attending: default_attending(),
            guests: default_guests(),
            diet: String::new(),
            note: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub done: bool,
}

impl Countdown {
    pub fn until<Tz: chrono::TimeZone>(target: DateTime<Tz>, now: DateTime<Utc>) -> Self {
        let remaining = target.with_timezone(&Utc) - now;
        let total_seconds = remaining.num_seconds().max(0);
        Self {
            days: total_seconds / 86_400,
            hours: (total_seconds % 86_400) / 3_600,
            minutes: (total_seconds % 3_600) / 60,
            seconds: total_seconds % 60,
            done: remaining <= chrono::Duration::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn draft_defaults_to_attending_single_guest() {
        let draft = RsvpDraft::default();
        assert_eq!(draft.attending, "taip");
        assert_eq!(draft.guests, 1);
        assert!(draft.name.is_empty());
    }

    #[test]
    fn partial_stored_draft_fills_defaults() {
        let draft: RsvpDraft = serde_json::from_str(r#"{"name":"Ona"}"#).expect("draft");
        assert_eq!(draft.name, "Ona");
        assert_eq!(draft.attending, "taip");
        assert_eq!(draft.guests, 1);
    }

    #[test]
    fn attending_parses_wire_values() {
        assert_eq!(Attending::parse(" gal "), Some(Attending::Undecided));
        assert_eq!(Attending::parse("maybe"), None);
        assert_eq!(
            serde_json::to_string(&Attending::No).expect("json"),
            "\"ne\""
        );
    }

    #[test]
    fn countdown_splits_remaining_time() {
        let now = Utc.with_ymd_and_hms(2026, 6, 24, 9, 58, 30).unwrap();
        let target = WEDDING.ceremony_start().expect("date");
        let countdown = Countdown::until(target, now);
        assert_eq!(
            (countdown.days, countdown.hours, countdown.minutes, countdown.seconds),
            (1, 1, 1, 30)
        );
        assert!(!countdown.done);
    }

    #[test]
    fn countdown_saturates_after_ceremony() {
        let now = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();
        let countdown = Countdown::until(WEDDING.ceremony_start().expect("date"), now);
        assert!(countdown.done);
        assert_eq!(countdown.days + countdown.seconds, 0);
    }
}
