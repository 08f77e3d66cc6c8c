use thiserror::Error;

/// Field-level rejection of a draft. The display text is shown to the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RsvpValidationError {
    #[error("Please enter your first and last name.")]
    MissingName,
    #[error("Invalid number of guests (1-6).")]
    InvalidGuests,
    #[error("Please choose whether you will attend.")]
    MissingAttending,
}
