#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The "Final" snapshot: the user-approved pairing of a cover letter and a
/// pitch script for one application. At most one row per application carries
/// `is_current = true`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FinalRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub coverletter_content: Option<String>,
    pub pitch_content: Option<String>,
    pub coverletter_version: i32,
    pub pitch_version: i32,
    pub coverletter_word_count: i32,
    pub pitch_word_count: i32,
    pub finalized_at: Option<DateTime<Utc>>,
    pub finalized_by_user_id: Option<Uuid>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinalRow {
    /// True iff both fields hold non-empty text. Finalization requires this.
    pub fn content_ready(&self) -> bool {
        has_text(&self.coverletter_content) && has_text(&self.pitch_content)
    }

    pub fn finalized(&self) -> bool {
        self.finalized_at.is_some()
    }
}

fn has_text(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

/// Whitespace-token word count, recomputed on every field write.
pub fn word_count(text: &str) -> i32 {
    text.split_whitespace().count() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_final() -> FinalRow {
        FinalRow {
            id: Uuid::new_v4(),
            application_id: Uuid::new_v4(),
            coverletter_content: None,
            pitch_content: None,
            coverletter_version: 1,
            pitch_version: 1,
            coverletter_word_count: 0,
            pitch_word_count: 0,
            finalized_at: None,
            finalized_by_user_id: None,
            is_current: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_content_ready_requires_both_fields() {
        let mut final_row = blank_final();
        assert!(!final_row.content_ready());

        final_row.coverletter_content = Some("Dear Hiring Team,".to_string());
        assert!(!final_row.content_ready());

        final_row.pitch_content = Some("[0:00] Hi, I'm...".to_string());
        assert!(final_row.content_ready());
    }

    #[test]
    fn test_content_ready_rejects_whitespace_only_fields() {
        let mut final_row = blank_final();
        final_row.coverletter_content = Some("   ".to_string());
        final_row.pitch_content = Some("a real pitch".to_string());
        assert!(!final_row.content_ready());
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("abc"), 1);
        assert_eq!(word_count("one two  three\nfour"), 4);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_finalized_tracks_timestamp() {
        let mut final_row = blank_final();
        assert!(!final_row.finalized());
        final_row.finalized_at = Some(Utc::now());
        assert!(final_row.finalized());
    }
}
