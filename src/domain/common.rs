use chrono::{DateTime, Utc};

/// Identifies records that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Records carrying a calendar timestamp used for month filtering.
pub trait Dated {
    fn date(&self) -> DateTime<Utc>;
}

/// Records carrying a positive monetary amount.
pub trait Amounted {
    fn amount(&self) -> f64;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

impl<T: Dated + ?Sized> Dated for &T {
    fn date(&self) -> DateTime<Utc> {
        (**self).date()
    }
}

impl<T: Amounted + ?Sized> Amounted for &T {
    fn amount(&self) -> f64 {
        (**self).amount()
    }
}

/// Generates a fresh record identifier.
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Treats blank optional text as absent.
pub(crate) fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
