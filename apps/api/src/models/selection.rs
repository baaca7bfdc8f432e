#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A prompt selection: the four user-chosen parameters that drive prompt
/// generation. Scoped to an application (the newest row is the active
/// selection) or saved as a reusable per-user profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromptSelectionRow {
    pub id: Uuid,
    pub application_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub tone_preference: String,
    pub main_strength: String,
    pub experience_level: String,
    pub career_motivation: String,
    pub profile_name: Option<String>,
    pub is_default_profile: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromptSelectionRow {
    pub fn display_name(&self) -> String {
        match self.profile_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("Profile {}", self.id),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} tone, {} level, focused on {}",
            self.tone_preference, self.experience_level, self.main_strength
        )
    }

    /// All four trait fields are present and non-blank.
    pub fn is_complete(&self) -> bool {
        [
            &self.tone_preference,
            &self.main_strength,
            &self.experience_level,
            &self.career_motivation,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }

    /// Two selections match when all four trait fields are equal.
    pub fn matches(&self, other: &PromptSelectionRow) -> bool {
        self.tone_preference == other.tone_preference
            && self.main_strength == other.main_strength
            && self.experience_level == other.experience_level
            && self.career_motivation == other.career_motivation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection() -> PromptSelectionRow {
        PromptSelectionRow {
            id: Uuid::new_v4(),
            application_id: Some(Uuid::new_v4()),
            user_id: Some(Uuid::new_v4()),
            tone_preference: "Professional".to_string(),
            main_strength: "Leadership".to_string(),
            experience_level: "Senior".to_string(),
            career_motivation: "Impact".to_string(),
            profile_name: None,
            is_default_profile: false,
            last_used_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let mut sel = selection();
        assert_eq!(sel.display_name(), format!("Profile {}", sel.id));

        sel.profile_name = Some("Default Profile".to_string());
        assert_eq!(sel.display_name(), "Default Profile");

        sel.profile_name = Some("   ".to_string());
        assert_eq!(sel.display_name(), format!("Profile {}", sel.id));
    }

    #[test]
    fn test_summary_mentions_three_traits() {
        let summary = selection().summary();
        assert!(summary.contains("Professional"));
        assert!(summary.contains("Senior"));
        assert!(summary.contains("Leadership"));
    }

    #[test]
    fn test_is_complete_rejects_blank_fields() {
        let mut sel = selection();
        assert!(sel.is_complete());
        sel.career_motivation = "  ".to_string();
        assert!(!sel.is_complete());
    }

    #[test]
    fn test_matches_compares_all_four_fields() {
        let a = selection();
        let mut b = a.clone();
        b.id = Uuid::new_v4();
        b.profile_name = Some("different metadata is fine".to_string());
        assert!(a.matches(&b));

        b.experience_level = "Junior".to_string();
        assert!(!a.matches(&b));
    }
}
