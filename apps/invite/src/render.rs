use chrono::Utc;
use client_core::{wizard::WizardState, Step, SubmissionStatus, STEPS};
use shared::domain::{Attending, Countdown, RsvpDraft, WEDDING};

pub fn maps_link(query: &str) -> String {
    let query: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://www.google.com/maps?q={query}")
}

pub fn progress(state: &WizardState) -> String {
    STEPS
        .iter()
        .enumerate()
        .map(|(i, _)| if i == state.current { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn step_screen(state: &WizardState, draft: &RsvpDraft) -> String {
    if !state.opened {
        return format!(
            "{} & {} invite you. Type 'open' to open the invitation.",
            WEDDING.groom, WEDDING.bride
        );
    }

    let step = state.step();
    let body = match step {
        Step::Welcome => {
            let countdown = WEDDING
                .ceremony_start()
                .map(|start| Countdown::until(start, Utc::now()));
            let countdown = match countdown {
                Some(c) if c.done => "The day has come!".to_string(),
                Some(c) => format!(
                    "{} d {:02} h {:02} min {:02} s to go",
                    c.days, c.hours, c.minutes, c.seconds
                ),
                None => String::new(),
            };
            format!("{} & {}\n{countdown}", WEDDING.groom, WEDDING.bride)
        }
        Step::Details => {
            let date = WEDDING
                .ceremony_start()
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| WEDDING.date_iso.to_string());
            format!(
                "Ceremony: {date}, {}\nMap: {}\nParty: {}",
                WEDDING.church_name,
                maps_link(WEDDING.church_maps_query),
                WEDDING.party_place
            )
        }
        Step::Rsvp => {
            let attending = Attending::parse(&draft.attending)
                .map(|a| format!("{} ({})", a.as_str(), a.label()))
                .unwrap_or_else(|| draft.attending.clone());
            let choices = Attending::ALL
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join("/");
            format!(
                "name:      {}\nattending: {attending}  [{choices}]\nguests:    {} (1-6)\ndiet:      {}\nnote:      {}\n'submit' sends your answer",
                draft.name, draft.guests, draft.diet, draft.note
            )
        }
        Step::DressCode => "Dress code: festive, in soft pastel tones.".to_string(),
        Step::End => "Thank you! See you at the celebration.".to_string(),
    };

    format!(
        "[{}] {} {}\n{body}",
        state.current + 1,
        step.title(),
        progress(state)
    )
}

pub fn status_line(status: &SubmissionStatus) -> Option<String> {
    match status {
        SubmissionStatus::Idle => None,
        SubmissionStatus::Submitting { message } => Some(format!("… {message}")),
        SubmissionStatus::Success { message } => Some(format!("✓ {message}")),
        SubmissionStatus::Error { message } => Some(format!("✗ {message}")),
    }
}
