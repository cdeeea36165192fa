use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Columns of `entries` minus the audio blob, which is only read by the
/// audio download endpoint.
pub const ENTRY_COLUMNS: &str =
    "id, user_id, title, kind, content, audio_mime, mood, is_capsule, capsule_open_date, created_at";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "entry_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Text,
    Voice,
}

#[derive(Debug, Clone, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub kind: EntryKind,
    pub content: Option<String>,
    pub audio_mime: Option<String>,
    pub mood: String,
    pub is_capsule: bool,
    pub capsule_open_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// A capsule stays sealed until its open date.
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        self.is_capsule && self.capsule_open_date.map_or(false, |open| open > now)
    }

    pub fn into_view(self, now: DateTime<Utc>) -> EntryView {
        let locked = self.is_locked(now);
        EntryView {
            id: self.id,
            title: self.title,
            kind: self.kind,
            content: if locked { None } else { self.content },
            has_audio: self.kind == EntryKind::Voice,
            mood: self.mood,
            is_capsule: self.is_capsule,
            capsule_open_date: self.capsule_open_date,
            locked,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EntryView {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub content: Option<String>,
    pub has_audio: bool,
    pub mood: String,
    pub is_capsule: bool,
    pub capsule_open_date: Option<DateTime<Utc>>,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTextEntryRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[validate(length(max = 50, message = "Mood must be at most 50 characters"))]
    pub mood: Option<String>,
    pub is_capsule: Option<bool>,
    pub capsule_open_date: Option<DateTime<Utc>>,
}

/// Metadata for a voice entry; the audio itself is the request body.
#[derive(Debug, Deserialize, Validate)]
pub struct VoiceEntryQuery {
    #[validate(length(max = 200, message = "Title must be at most 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 50, message = "Mood must be at most 50 characters"))]
    pub mood: Option<String>,
    pub is_capsule: Option<bool>,
    pub capsule_open_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CreatedEntryResponse {
    pub message: String,
    pub id: Uuid,
}

/// Resolves the capsule flag and open date of a new entry. Giving an open
/// date implies a capsule, and a capsule must open in the future.
pub fn capsule_settings(
    is_capsule: Option<bool>,
    open_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> AppResult<(bool, Option<DateTime<Utc>>)> {
    let is_capsule = is_capsule.unwrap_or(open_date.is_some());
    if !is_capsule {
        return Ok((false, None));
    }
    match open_date {
        None => Err(AppError::Validation(
            "capsule_open_date is required for capsule entries".into(),
        )),
        Some(date) if date <= now => Err(AppError::Validation(
            "capsule_open_date must be in the future".into(),
        )),
        Some(date) => Ok((true, Some(date))),
    }
}

/// Falls back to "neutral" for missing or blank moods.
pub fn entry_mood(mood: Option<&str>) -> String {
    match mood.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => "neutral".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(is_capsule: bool, open: Option<DateTime<Utc>>) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Morning".into(),
            kind: EntryKind::Text,
            content: Some("dear diary".into()),
            audio_mime: None,
            mood: "calm".into(),
            is_capsule,
            capsule_open_date: open,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sealed_capsule_hides_content() {
        let now = Utc::now();
        let view = entry(true, Some(now + Duration::days(30))).into_view(now);
        assert!(view.locked);
        assert!(view.content.is_none());
    }

    #[test]
    fn test_opened_capsule_shows_content() {
        let now = Utc::now();
        let view = entry(true, Some(now - Duration::minutes(1))).into_view(now);
        assert!(!view.locked);
        assert_eq!(view.content.as_deref(), Some("dear diary"));
    }

    #[test]
    fn test_plain_entry_is_never_locked() {
        let now = Utc::now();
        assert!(!entry(false, None).is_locked(now));
    }

    #[test]
    fn test_capsule_settings() {
        let now = Utc::now();
        let later = now + Duration::days(1);

        assert_eq!(capsule_settings(None, None, now).unwrap(), (false, None));
        assert_eq!(
            capsule_settings(None, Some(later), now).unwrap(),
            (true, Some(later))
        );
        assert_eq!(
            capsule_settings(Some(false), Some(later), now).unwrap(),
            (false, None)
        );
        assert!(matches!(
            capsule_settings(Some(true), None, now),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            capsule_settings(Some(true), Some(now - Duration::days(1)), now),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_entry_mood_defaults_to_neutral() {
        assert_eq!(entry_mood(None), "neutral");
        assert_eq!(entry_mood(Some("  ")), "neutral");
        assert_eq!(entry_mood(Some("Grateful")), "Grateful");
    }

    #[test]
    fn test_view_serializes_kind_as_type() {
        let json = serde_json::to_value(entry(false, None).into_view(Utc::now())).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["has_audio"], false);
    }
}
