//! Axum handlers for the generation pipeline: the traits submission that
//! kicks off both background jobs, and the synchronous per-artifact
//! regeneration endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::load_application;
use crate::cv;
use crate::errors::AppError;
use crate::finals::{clear_field, FinalField};
use crate::generation::prompts::{build_coverletter_prompt, build_pitch_prompt, build_prompts};
use crate::generation::service::{
    extract_company_name, extract_job_title, GenerationContext,
};
use crate::jobs::{Artifact, GenerationJob};
use crate::models::application::ArtifactStatus;
use crate::models::selection::PromptSelectionRow;
use crate::selection::{
    copy_profile_to_application, current_selection, record_selection, resolve_choice,
    save_default_profile, SelectionFields,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TraitsRequest {
    pub user_id: Uuid,
    /// Apply a saved profile instead of submitting fresh choices.
    pub apply_profile_id: Option<Uuid>,
    pub tone_preference: Option<String>,
    pub main_strength: Option<String>,
    /// Free-text override used when `main_strength` is "Other".
    pub main_strength_other: Option<String>,
    pub experience_level: Option<String>,
    pub career_motivation: Option<String>,
    /// Free-text override used when `career_motivation` is "Other".
    pub career_motivation_other: Option<String>,
    #[serde(default)]
    pub save_as_default: bool,
    pub profile_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TraitsResponse {
    pub application_id: Uuid,
    pub selection: PromptSelectionRow,
    pub coverletter_status: String,
    pub pitch_status: String,
    pub company_name: String,
    pub job_title: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct RegenerateRequest {
    /// Custom prompt override; when absent the prompt is rebuilt from the
    /// application's active selection.
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub application_id: Uuid,
    pub artifact: &'static str,
    pub content: String,
    pub status: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// PATCH /api/v1/applications/:id/traits
///
/// Records the selection (fresh choices with "Other" normalization, or a
/// saved profile), builds both prompts, flips both statuses to `processing`,
/// and enqueues the two generation jobs. Company and title are extracted
/// best-effort along the way.
pub async fn handle_submit_traits(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<TraitsRequest>,
) -> Result<(StatusCode, Json<TraitsResponse>), AppError> {
    let application = load_application(&state.db, application_id).await?;

    let selection = match req.apply_profile_id {
        Some(profile_id) => {
            copy_profile_to_application(&state.db, profile_id, application_id, req.user_id).await?
        }
        None => {
            let fields = normalized_fields(&req)?;
            if req.save_as_default {
                save_default_profile(
                    &state.db,
                    req.user_id,
                    &fields,
                    req.profile_name.as_deref(),
                )
                .await?;
            }
            record_selection(&state.db, application_id, req.user_id, &fields).await?
        }
    };

    let prompts = build_prompts(&selection)?;

    // Best-effort display metadata; failures fall back, never block.
    let company_name = extract_company_name(&state.llm, &application.job_description).await;
    let job_title = extract_job_title(&state.llm, &application.job_description).await;

    let processing = ArtifactStatus::Processing.as_db_value();
    sqlx::query(
        r#"
        UPDATE applications
        SET coverletter_status = $2, pitch_status = $2,
            company_name = $3, job_title = $4, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(application_id)
    .bind(&processing)
    .bind(&company_name)
    .bind(&job_title)
    .execute(&state.db)
    .await?;

    state.jobs.enqueue(GenerationJob {
        artifact: Artifact::CoverLetter,
        application_id,
        prompt: prompts.coverletter,
    });
    state.jobs.enqueue(GenerationJob {
        artifact: Artifact::Pitch,
        application_id,
        prompt: prompts.pitch,
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(TraitsResponse {
            application_id,
            selection,
            coverletter_status: processing.clone(),
            pitch_status: processing,
            company_name,
            job_title,
        }),
    ))
}

/// POST /api/v1/applications/:id/generate_coverletter
///
/// Synchronous regeneration. On success the fresh draft replaces the old one
/// and the matching field on the current Final is cleared; on failure the
/// status records the error and the message is returned inline.
pub async fn handle_regenerate_coverletter(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<RegenerateResponse>, AppError> {
    regenerate(&state, application_id, Artifact::CoverLetter, req.prompt).await
}

/// POST /api/v1/applications/:id/generate_pitch
pub async fn handle_regenerate_pitch(
    State(state): State<AppState>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<RegenerateResponse>, AppError> {
    regenerate(&state, application_id, Artifact::Pitch, req.prompt).await
}

// ────────────────────────────────────────────────────────────────────────────
// Internals
// ────────────────────────────────────────────────────────────────────────────

fn normalized_fields(req: &TraitsRequest) -> Result<SelectionFields, AppError> {
    let required = |value: &Option<String>, name: &str| -> Result<String, AppError> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(AppError::Validation(format!("'{name}' is required"))),
        }
    };

    // "Other" substitution happens exactly once, right here at capture.
    Ok(SelectionFields {
        tone_preference: required(&req.tone_preference, "tone_preference")?,
        main_strength: resolve_choice(
            &required(&req.main_strength, "main_strength")?,
            req.main_strength_other.as_deref(),
        )?,
        experience_level: required(&req.experience_level, "experience_level")?,
        career_motivation: resolve_choice(
            &required(&req.career_motivation, "career_motivation")?,
            req.career_motivation_other.as_deref(),
        )?,
    })
}

async fn regenerate(
    state: &AppState,
    application_id: Uuid,
    artifact: Artifact,
    prompt_override: Option<String>,
) -> Result<Json<RegenerateResponse>, AppError> {
    let application = load_application(&state.db, application_id).await?;

    let prompt = match prompt_override.map(|p| p.trim().to_string()) {
        Some(p) if !p.is_empty() => p,
        _ => {
            let selection = current_selection(&state.db, application_id)
                .await?
                .ok_or_else(|| {
                    AppError::UnprocessableEntity(
                        "No prompt selection found; submit traits first".to_string(),
                    )
                })?;
            match artifact {
                Artifact::CoverLetter => build_coverletter_prompt(&selection)?,
                Artifact::Pitch => build_pitch_prompt(&selection)?,
            }
        }
    };

    let cv_text = cv::extract_text(
        &state.s3,
        &state.config.s3_bucket,
        application.cv_key.as_deref(),
    )
    .await;
    let context = GenerationContext {
        job_description: application.job_description.clone(),
        cv_text,
    };

    match state.generator.generate(&prompt, &context).await {
        Ok(content) => {
            persist_regenerated(state, application_id, artifact, &content).await?;

            // New draft content invalidates any finalized text for this
            // artifact; the sibling artifact's Final field is untouched.
            let field = match artifact {
                Artifact::CoverLetter => FinalField::CoverLetter,
                Artifact::Pitch => FinalField::Pitch,
            };
            clear_field(&state.db, application_id, field).await?;

            Ok(Json(RegenerateResponse {
                application_id,
                artifact: artifact.label(),
                content,
                status: ArtifactStatus::Done.as_db_value(),
            }))
        }
        Err(e) => {
            let reason = e.to_string();
            persist_failed_status(state, application_id, artifact, &reason).await?;
            Err(AppError::Generation(format!(
                "Failed to regenerate {}: {reason}",
                artifact.label()
            )))
        }
    }
}

async fn persist_regenerated(
    state: &AppState,
    application_id: Uuid,
    artifact: Artifact,
    content: &str,
) -> Result<(), AppError> {
    let sql = match artifact {
        Artifact::CoverLetter => {
            "UPDATE applications SET coverletter_text = $2, coverletter_status = $3, updated_at = now() WHERE id = $1"
        }
        Artifact::Pitch => {
            "UPDATE applications SET pitch_text = $2, pitch_status = $3, updated_at = now() WHERE id = $1"
        }
    };
    sqlx::query(sql)
        .bind(application_id)
        .bind(content)
        .bind(ArtifactStatus::Done.as_db_value())
        .execute(&state.db)
        .await?;
    Ok(())
}

async fn persist_failed_status(
    state: &AppState,
    application_id: Uuid,
    artifact: Artifact,
    reason: &str,
) -> Result<(), AppError> {
    let sql = match artifact {
        Artifact::CoverLetter => {
            "UPDATE applications SET coverletter_status = $2, updated_at = now() WHERE id = $1"
        }
        Artifact::Pitch => {
            "UPDATE applications SET pitch_status = $2, updated_at = now() WHERE id = $1"
        }
    };
    sqlx::query(sql)
        .bind(application_id)
        .bind(ArtifactStatus::Failed(reason.to_string()).as_db_value())
        .execute(&state.db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> TraitsRequest {
        TraitsRequest {
            user_id: Uuid::new_v4(),
            apply_profile_id: None,
            tone_preference: Some("Professional".to_string()),
            main_strength: Some("Leadership".to_string()),
            main_strength_other: None,
            experience_level: Some("Senior".to_string()),
            career_motivation: Some("Impact".to_string()),
            career_motivation_other: None,
            save_as_default: false,
            profile_name: None,
        }
    }

    #[test]
    fn test_normalized_fields_passes_plain_choices() {
        let fields = normalized_fields(&base_request()).unwrap();
        assert_eq!(fields.tone_preference, "Professional");
        assert_eq!(fields.main_strength, "Leadership");
        assert_eq!(fields.experience_level, "Senior");
        assert_eq!(fields.career_motivation, "Impact");
    }

    #[test]
    fn test_normalized_fields_substitutes_other_once() {
        let mut req = base_request();
        req.main_strength = Some("Other".to_string());
        req.main_strength_other = Some("Developer advocacy".to_string());

        let fields = normalized_fields(&req).unwrap();
        assert_eq!(fields.main_strength, "Developer advocacy");
        // The sentinel never reaches the stored selection.
        assert_ne!(fields.main_strength, "Other");
    }

    #[test]
    fn test_normalized_fields_rejects_other_without_text() {
        let mut req = base_request();
        req.career_motivation = Some("Other".to_string());
        req.career_motivation_other = None;
        assert!(normalized_fields(&req).is_err());
    }

    #[test]
    fn test_normalized_fields_requires_every_choice() {
        let mut req = base_request();
        req.experience_level = None;
        let err = normalized_fields(&req).unwrap_err();
        assert!(err.to_string().contains("experience_level"));
    }
}
