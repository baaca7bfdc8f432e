//! Selection store — captures the four trait choices per application and
//! manages reusable per-user profiles.
//!
//! The active selection for an application is simply the newest row
//! (most-recent-wins); selections are inserted, never edited in place.

pub mod handlers;

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::selection::PromptSelectionRow;

/// The four normalized trait values ready for persistence.
#[derive(Debug, Clone)]
pub struct SelectionFields {
    pub tone_preference: String,
    pub main_strength: String,
    pub experience_level: String,
    pub career_motivation: String,
}

/// Resolves the "Other" free-text override: if `choice` is the literal
/// sentinel "Other", the non-blank free-text alternative replaces it. This is
/// the single normalization point — nothing downstream re-checks "Other".
pub fn resolve_choice(choice: &str, other: Option<&str>) -> Result<String, AppError> {
    let choice = choice.trim();
    if choice.is_empty() {
        return Err(AppError::Validation(
            "Selection choice must not be blank".to_string(),
        ));
    }
    if choice != "Other" {
        return Ok(choice.to_string());
    }
    match other.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(AppError::Validation(
            "A free-text value is required when 'Other' is selected".to_string(),
        )),
    }
}

/// Inserts a new selection scoped to the application. The newest row becomes
/// the active selection.
pub async fn record_selection(
    pool: &PgPool,
    application_id: Uuid,
    user_id: Uuid,
    fields: &SelectionFields,
) -> Result<PromptSelectionRow, AppError> {
    let row = sqlx::query_as::<_, PromptSelectionRow>(
        r#"
        INSERT INTO prompt_selections
            (id, application_id, user_id, tone_preference, main_strength,
             experience_level, career_motivation, last_used_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(application_id)
    .bind(user_id)
    .bind(&fields.tone_preference)
    .bind(&fields.main_strength)
    .bind(&fields.experience_level)
    .bind(&fields.career_motivation)
    .fetch_one(pool)
    .await?;

    info!(
        "Recorded selection {} for application {application_id}",
        row.id
    );
    Ok(row)
}

/// The active (newest) selection for an application, if any.
pub async fn current_selection(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Option<PromptSelectionRow>, AppError> {
    Ok(sqlx::query_as::<_, PromptSelectionRow>(
        r#"
        SELECT * FROM prompt_selections
        WHERE application_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(application_id)
    .fetch_optional(pool)
    .await?)
}

/// Saves the given fields as the user's default profile. The
/// at-most-one-default-per-user invariant is enforced inside one transaction:
/// clear the flag on every existing profile, then insert the new default.
pub async fn save_default_profile(
    pool: &PgPool,
    user_id: Uuid,
    fields: &SelectionFields,
    profile_name: Option<&str>,
) -> Result<PromptSelectionRow, AppError> {
    let name = match profile_name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => "Default Profile".to_string(),
    };

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE prompt_selections SET is_default_profile = FALSE, updated_at = now()
         WHERE user_id = $1 AND is_default_profile",
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let row = sqlx::query_as::<_, PromptSelectionRow>(
        r#"
        INSERT INTO prompt_selections
            (id, user_id, tone_preference, main_strength, experience_level,
             career_motivation, profile_name, is_default_profile, last_used_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&fields.tone_preference)
    .bind(&fields.main_strength)
    .bind(&fields.experience_level)
    .bind(&fields.career_motivation)
    .bind(&name)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!("Saved default profile {} for user {user_id}", row.id);
    Ok(row)
}

/// Copies a saved profile onto an application as its newest selection and
/// stamps `last_used_at` on the source profile.
pub async fn copy_profile_to_application(
    pool: &PgPool,
    profile_id: Uuid,
    application_id: Uuid,
    user_id: Uuid,
) -> Result<PromptSelectionRow, AppError> {
    let profile = sqlx::query_as::<_, PromptSelectionRow>(
        "SELECT * FROM prompt_selections WHERE id = $1 AND user_id = $2",
    )
    .bind(profile_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;

    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, PromptSelectionRow>(
        r#"
        INSERT INTO prompt_selections
            (id, application_id, user_id, tone_preference, main_strength,
             experience_level, career_motivation, profile_name, last_used_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(application_id)
    .bind(user_id)
    .bind(&profile.tone_preference)
    .bind(&profile.main_strength)
    .bind(&profile.experience_level)
    .bind(&profile.career_motivation)
    .bind(format!("Applied from: {}", profile.display_name()))
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE prompt_selections SET last_used_at = now(), updated_at = now() WHERE id = $1")
        .bind(profile_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(row)
}

/// Recent saved profiles for a user (newest usage first).
pub async fn list_profiles(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<PromptSelectionRow>, AppError> {
    Ok(sqlx::query_as::<_, PromptSelectionRow>(
        r#"
        SELECT * FROM prompt_selections
        WHERE user_id = $1 AND application_id IS NULL
        ORDER BY last_used_at DESC NULLS LAST, created_at DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_choice_passes_plain_values_through() {
        assert_eq!(
            resolve_choice("Leadership", None).unwrap(),
            "Leadership".to_string()
        );
        // Free text is ignored unless the sentinel was chosen.
        assert_eq!(
            resolve_choice("Leadership", Some("ignored")).unwrap(),
            "Leadership".to_string()
        );
    }

    #[test]
    fn test_resolve_choice_substitutes_other() {
        assert_eq!(
            resolve_choice("Other", Some("Developer advocacy")).unwrap(),
            "Developer advocacy".to_string()
        );
    }

    #[test]
    fn test_resolve_choice_other_requires_free_text() {
        assert!(resolve_choice("Other", None).is_err());
        assert!(resolve_choice("Other", Some("   ")).is_err());
    }

    #[test]
    fn test_resolve_choice_rejects_blank_choice() {
        assert!(resolve_choice("", None).is_err());
        assert!(resolve_choice("  ", Some("text")).is_err());
    }

    #[test]
    fn test_resolve_choice_trims_whitespace() {
        assert_eq!(resolve_choice(" Growth ", None).unwrap(), "Growth");
        assert_eq!(
            resolve_choice("Other", Some("  hands-on mentoring  ")).unwrap(),
            "hands-on mentoring"
        );
    }
}
